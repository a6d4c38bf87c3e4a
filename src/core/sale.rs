//! Sale business logic - pending sales created by checkout and admin status changes.
//!
//! Creating a sale and debiting the product's stock happen in one transaction;
//! cancelling a sale gives the units back.

use crate::{
    core::{
        money,
        product::{adjust_stock_atomic, get_product_by_id},
        realtime::{ChangeEvent, ChangeFeed, Table},
    },
    entities::{Sale, SaleStatus, sale},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Order fields captured by checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSale {
    pub product_id: i64,
    pub quantity: i64,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Chat user placing the order
    pub buyer_id: Option<String>,
}

/// One product and quantity of a multi-item order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// A whole cart. Each line becomes one sale; the customer fields are shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewOrder {
    pub lines: Vec<OrderLine>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub buyer_id: Option<String>,
}

impl From<NewSale> for NewOrder {
    fn from(new: NewSale) -> Self {
        Self {
            lines: vec![OrderLine {
                product_id: new.product_id,
                quantity: new.quantity,
            }],
            customer_name: new.customer_name,
            customer_phone: new.customer_phone,
            buyer_id: new.buyer_id,
        }
    }
}

/// Checks `1 <= requested <= available`.
///
/// # Errors
/// Returns `InvalidQuantity` when the request is outside that range, which includes
/// every request against a product with no stock.
pub fn validate_quantity(requested: i64, available: i32) -> Result<()> {
    if requested < 1 || requested > i64::from(available) {
        return Err(Error::InvalidQuantity {
            requested,
            available,
        });
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Records a `pending` sale and debits the stock in the same transaction.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist or is inactive
/// - The quantity is outside `1..=stock_quantity`
/// - Any database operation fails, in which case nothing is written
pub async fn create_pending_sale(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    new: NewSale,
) -> Result<sale::Model> {
    create_pending_order(db, feed, new.into())
        .await?
        .pop()
        .ok_or_else(|| Error::Validation {
            message: "An order needs at least one item".to_string(),
        })
}

/// Records one `pending` sale per line and debits every product, all in one
/// transaction. Either every line is stored or none is.
///
/// Lines naming the same product are checked against the stock left by the
/// earlier ones.
///
/// # Errors
/// Returns an error if:
/// - The order has no lines
/// - A product does not exist or is inactive
/// - A quantity does not fit the remaining stock
/// - Any database operation fails
#[instrument(skip(db, feed, order), fields(lines = order.lines.len()))]
pub async fn create_pending_order(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    order: NewOrder,
) -> Result<Vec<sale::Model>> {
    if order.lines.is_empty() {
        return Err(Error::Validation {
            message: "An order needs at least one item".to_string(),
        });
    }
    let customer_name = blank_to_none(order.customer_name);
    let customer_phone = blank_to_none(order.customer_phone);

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(order.lines.len());

    for line in &order.lines {
        let product = get_product_by_id(&txn, line.product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| Error::ProductNotFound {
                id: line.product_id.to_string(),
            })?;
        validate_quantity(line.quantity, product.stock_quantity)?;

        let quantity = i32::try_from(line.quantity).map_err(|_| Error::InvalidQuantity {
            requested: line.quantity,
            available: product.stock_quantity,
        })?;
        let total_cents = money::line_total(product.price_cents, line.quantity)?;

        let sale = sale::ActiveModel {
            product_id: Set(Some(product.id)),
            product_name: Set(product.name.clone()),
            quantity: Set(quantity),
            unit_price_cents: Set(product.price_cents),
            total_cents: Set(total_cents),
            customer_name: Set(customer_name.clone()),
            customer_phone: Set(customer_phone.clone()),
            status: Set(SaleStatus::Pending),
            pix_code: Set(None),
            buyer_id: Set(order.buyer_id.clone()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        adjust_stock_atomic(&txn, product.id, -quantity).await?;
        created.push(sale);
    }

    txn.commit().await?;

    for sale in &created {
        info!(sale_id = sale.id, total_cents = sale.total_cents, "Pending sale recorded");
        feed.publish(ChangeEvent::inserted(Table::Sales, sale.id));
        if let Some(product_id) = sale.product_id {
            feed.publish(ChangeEvent::updated(Table::Products, product_id));
        }
    }
    Ok(created)
}

/// Stores the generated payment payload on a sale.
pub async fn attach_pix_code(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    sale_id: i64,
    pix_code: &str,
) -> Result<sale::Model> {
    let mut active: sale::ActiveModel = get_sale_by_id(db, sale_id)
        .await?
        .ok_or(Error::SaleNotFound { id: sale_id })?
        .into();
    active.pix_code = Set(Some(pix_code.to_string()));
    let updated = active.update(db).await?;
    feed.publish(ChangeEvent::updated(Table::Sales, sale_id));
    Ok(updated)
}

/// Lists sales newest first, optionally only those with `status`.
pub async fn list_sales(
    db: &DatabaseConnection,
    status: Option<SaleStatus>,
) -> Result<Vec<sale::Model>> {
    let mut select = Sale::find();
    if let Some(status) = status {
        select = select.filter(sale::Column::Status.eq(status));
    }
    select
        .order_by_desc(sale::Column::CreatedAt)
        .order_by_desc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_sale_by_id<C>(db: &C, sale_id: i64) -> Result<Option<sale::Model>>
where
    C: ConnectionTrait,
{
    Sale::find_by_id(sale_id).one(db).await.map_err(Into::into)
}

/// Moves a sale to `next`, refusing backward or repeated transitions.
///
/// Cancelling returns the sold units to the product, if it still exists.
///
/// # Errors
/// Returns `SaleNotFound` for unknown IDs and `InvalidStatusTransition` when the
/// move is not allowed from the current status.
#[instrument(skip(db, feed))]
pub async fn update_sale_status(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    sale_id: i64,
    next: SaleStatus,
) -> Result<sale::Model> {
    let txn = db.begin().await?;

    let current = get_sale_by_id(&txn, sale_id)
        .await?
        .ok_or(Error::SaleNotFound { id: sale_id })?;
    if !current.status.can_transition_to(next) {
        return Err(Error::InvalidStatusTransition {
            from: current.status,
            to: next,
        });
    }

    let restocked = match (next, current.product_id) {
        (SaleStatus::Cancelled, Some(product_id)) => {
            adjust_stock_atomic(&txn, product_id, current.quantity).await?;
            Some(product_id)
        }
        _ => None,
    };

    let mut active: sale::ActiveModel = current.into();
    active.status = Set(next);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(sale_id, status = %next, "Sale status changed");
    feed.publish(ChangeEvent::updated(Table::Sales, sale_id));
    if let Some(product_id) = restocked {
        feed.publish(ChangeEvent::updated(Table::Products, product_id));
    }
    Ok(updated)
}
