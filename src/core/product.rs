//! Product business logic - catalog queries, admin CRUD and inventory.
//!
//! The catalog shows only active products; the back-office sees everything. Stock is
//! adjusted with a guarded `UPDATE ... WHERE stock_quantity >= n` so two checkouts can
//! never take the same last unit, and every write publishes a change notification.

use crate::{
    core::realtime::{ChangeEvent, ChangeFeed, Table},
    entities::{Product, Sale, product, sale},
    errors::{Error, Result},
};
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::{info, instrument};

/// Default number of products per catalog page
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Sort orders offered by the catalog and the admin list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductOrder {
    #[default]
    NameAsc,
    PriceAsc,
    PriceDesc,
    StockAsc,
    NewestFirst,
}

/// Filter, order and page window for [`list_products`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub category_id: Option<i64>,
    /// Hide inactive products (catalog view)
    pub active_only: bool,
    pub order: ProductOrder,
    /// Zero-based page index
    pub page: u64,
    pub page_size: u64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            category_id: None,
            active_only: true,
            order: ProductOrder::default(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of products plus totals for pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub items: Vec<product::Model>,
    pub page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Fields for a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub image_url: String,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub category_id: Option<i64>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
    /// `Some(None)` clears the category
    pub category_id: Option<Option<i64>>,
}

/// Lists products matching `query`, one page at a time.
pub async fn list_products(db: &DatabaseConnection, query: &ProductQuery) -> Result<ProductPage> {
    let mut select = Product::find();

    if query.active_only {
        select = select.filter(product::Column::IsActive.eq(true));
    }
    if let Some(category_id) = query.category_id {
        select = select.filter(product::Column::CategoryId.eq(category_id));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(product::Column::Name.contains(search))
                .add(product::Column::Description.contains(search)),
        );
    }

    select = match query.order {
        ProductOrder::NameAsc => select.order_by_asc(product::Column::Name),
        ProductOrder::PriceAsc => select.order_by_asc(product::Column::PriceCents),
        ProductOrder::PriceDesc => select.order_by_desc(product::Column::PriceCents),
        ProductOrder::StockAsc => select.order_by_asc(product::Column::StockQuantity),
        ProductOrder::NewestFirst => select.order_by_desc(product::Column::CreatedAt),
    }
    .order_by_asc(product::Column::Id);

    let paginator = select.paginate(db, query.page_size.max(1));
    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(query.page).await?;

    Ok(ProductPage {
        items,
        page: query.page,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// Retrieves all active products ordered by name. This is what the catalog view caches.
pub async fn get_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every product, newest first, for the admin product list.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a product by its exact name.
pub async fn get_product_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_price(price_cents: i64) -> Result<()> {
    if price_cents < 0 {
        #[allow(clippy::cast_precision_loss)]
        return Err(Error::InvalidAmount {
            amount: price_cents as f64 / 100.0,
        });
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<()> {
    if stock < 0 {
        return Err(Error::Validation {
            message: format!("Stock cannot be negative (got {stock})"),
        });
    }
    Ok(())
}

/// Product names identify products in chat commands, so they must be unique.
async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    current_id: Option<i64>,
) -> Result<()> {
    match get_product_by_name(db, name).await? {
        Some(other) if Some(other.id) != current_id => Err(Error::Validation {
            message: format!("A product named '{}' already exists", other.name),
        }),
        _ => Ok(()),
    }
}

async fn ensure_category_exists(db: &DatabaseConnection, category_id: Option<i64>) -> Result<()> {
    if let Some(id) = category_id {
        if crate::core::category::get_category_by_id(db, id).await?.is_none() {
            return Err(Error::CategoryNotFound { id: id.to_string() });
        }
    }
    Ok(())
}

/// Creates a new product after validating its fields.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only, or already used
/// - The price or stock is negative
/// - The category does not exist
/// - The database insert operation fails
#[instrument(skip(db, feed, new), fields(name = %new.name))]
pub async fn create_product(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    new: NewProduct,
) -> Result<product::Model> {
    validate_name(&new.name)?;
    validate_price(new.price_cents)?;
    validate_stock(new.stock_quantity)?;
    ensure_name_available(db, &new.name, None).await?;
    ensure_category_exists(db, new.category_id).await?;

    let now = chrono::Utc::now();
    let created = product::ActiveModel {
        name: Set(new.name.trim().to_string()),
        description: Set(new.description.trim().to_string()),
        price_cents: Set(new.price_cents),
        image_url: Set(new.image_url.trim().to_string()),
        stock_quantity: Set(new.stock_quantity),
        is_active: Set(new.is_active),
        category_id: Set(new.category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(product_id = created.id, "Product created");
    feed.publish(ChangeEvent::inserted(Table::Products, created.id));
    Ok(created)
}

/// Applies a partial update to a product.
///
/// # Errors
/// Returns `ProductNotFound` if the product does not exist, or a validation error
/// for any field that fails the same checks as [`create_product`].
#[instrument(skip(db, feed, patch))]
pub async fn update_product(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    product_id: i64,
    patch: ProductPatch,
) -> Result<product::Model> {
    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?
        .into();

    if let Some(name) = patch.name {
        validate_name(&name)?;
        ensure_name_available(db, &name, Some(product_id)).await?;
        product.name = Set(name.trim().to_string());
    }
    if let Some(description) = patch.description {
        product.description = Set(description.trim().to_string());
    }
    if let Some(price_cents) = patch.price_cents {
        validate_price(price_cents)?;
        product.price_cents = Set(price_cents);
    }
    if let Some(image_url) = patch.image_url {
        product.image_url = Set(image_url.trim().to_string());
    }
    if let Some(stock) = patch.stock_quantity {
        validate_stock(stock)?;
        product.stock_quantity = Set(stock);
    }
    if let Some(is_active) = patch.is_active {
        product.is_active = Set(is_active);
    }
    if let Some(category_id) = patch.category_id {
        ensure_category_exists(db, category_id).await?;
        product.category_id = Set(category_id);
    }
    product.updated_at = Set(chrono::Utc::now());

    let updated = product.update(db).await?;
    feed.publish(ChangeEvent::updated(Table::Products, updated.id));
    Ok(updated)
}

/// Permanently deletes a product.
///
/// Sales keep their snapshot of name and price; their product reference is cleared
/// in the same transaction.
///
/// # Errors
/// Returns `ProductNotFound` if the product does not exist.
#[instrument(skip(db, feed))]
pub async fn delete_product(db: &DatabaseConnection, feed: &ChangeFeed, product_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    if get_product_by_id(&txn, product_id).await?.is_none() {
        return Err(Error::ProductNotFound {
            id: product_id.to_string(),
        });
    }

    Sale::update_many()
        .col_expr(sale::Column::ProductId, Expr::value(Option::<i64>::None))
        .filter(sale::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    Product::delete_by_id(product_id).exec(&txn).await?;

    txn.commit().await?;

    info!(product_id, "Product deleted");
    feed.publish(ChangeEvent::deleted(Table::Products, product_id));
    Ok(())
}

/// Products ordered by stock, lowest first, for the inventory view.
pub async fn get_inventory(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::StockQuantity)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the stock of a product to an absolute value.
///
/// # Errors
/// Returns a validation error for negative stock and `ProductNotFound` for unknown IDs.
pub async fn set_stock(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    product_id: i64,
    new_stock: i32,
) -> Result<product::Model> {
    update_product(
        db,
        feed,
        product_id,
        ProductPatch {
            stock_quantity: Some(new_stock),
            ..Default::default()
        },
    )
    .await
}

/// Adds `delta` (possibly negative) to a product's stock in one statement.
///
/// The update only matches while the result stays non-negative, so concurrent
/// decrements cannot oversell. Does not publish; callers running inside a
/// transaction publish after commit.
///
/// # Errors
/// Returns `ProductNotFound` for unknown IDs and `InvalidQuantity` when there are
/// not enough units.
pub async fn adjust_stock_atomic<C>(db: &C, product_id: i64, delta: i32) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let current = get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })?;

    let result = Product::update_many()
        .col_expr(
            product::Column::StockQuantity,
            Expr::col(product::Column::StockQuantity).add(delta),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::StockQuantity.gte(-delta))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::InvalidQuantity {
            requested: i64::from(-delta),
            available: current.stock_quantity,
        });
    }

    get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })
}

/// Coarse stock classification shown in the inventory view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    OutOfStock,
    Low,
    Medium,
    Adequate,
}

impl StockLevel {
    /// 0 is out of stock, 1-5 low, 6-20 medium, above 20 adequate.
    #[must_use]
    pub const fn from_quantity(quantity: i32) -> Self {
        match quantity {
            i32::MIN..=0 => Self::OutOfStock,
            1..=5 => Self::Low,
            6..=20 => Self::Medium,
            _ => Self::Adequate,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of stock",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::Adequate => "Adequate",
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::OutOfStock => "🔴",
            Self::Low => "🟠",
            Self::Medium => "🟡",
            Self::Adequate => "🟢",
        }
    }
}

/// Counts of products needing attention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventorySummary {
    pub out_of_stock: usize,
    pub low_stock: usize,
}

#[must_use]
pub fn summarize_inventory(products: &[product::Model]) -> InventorySummary {
    products
        .iter()
        .fold(InventorySummary::default(), |mut summary, p| {
            match StockLevel::from_quantity(p.stock_quantity) {
                StockLevel::OutOfStock => summary.out_of_stock += 1,
                StockLevel::Low => summary.low_stock += 1,
                StockLevel::Medium | StockLevel::Adequate => {}
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();

        // Test empty name validation
        let result = create_product(&db, &feed, new_product("   ", 1000, 1)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Test negative price validation
        let result = create_product(&db, &feed, new_product("Bolo", -1, 1)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // Test negative stock validation
        let result = create_product(&db, &feed, new_product("Bolo", 1000, -1)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Nothing was stored
        assert!(get_all_products(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();

        let product = create_product(&db, &feed, new_product(" Widget ", 1990, 5)).await?;

        assert_eq!(product.name, "Widget");
        assert_eq!(product.price_cents, 1990);
        assert_eq!(product.stock_quantity, 5);
        assert!(product.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_product_names_are_unique() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        create_test_product(&db, "Widget", 1990, 5).await?;
        let other = create_test_product(&db, "Gadget", 990, 5).await?;

        let dup = create_product(&db, &feed, new_product("Widget", 100, 1)).await;
        assert!(matches!(dup, Err(Error::Validation { .. })));

        let rename = ProductPatch {
            name: Some("Widget".to_string()),
            ..Default::default()
        };
        let clash = update_product(&db, &feed, other.id, rename).await;
        assert!(matches!(clash, Err(Error::Validation { .. })));

        // Keeping its own name is fine.
        let same = ProductPatch {
            name: Some("Gadget".to_string()),
            ..Default::default()
        };
        assert_eq!(update_product(&db, &feed, other.id, same).await?.name, "Gadget");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_unknown_category() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();

        let mut new = new_product("Widget", 1990, 5);
        new.category_id = Some(42);
        let result = create_product(&db, &feed, new).await;
        assert!(matches!(result, Err(Error::CategoryNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_lists_only_active_sorted_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Torta", 1500, 2).await?;
        create_test_product(&db, "Bolo", 2000, 1).await?;
        let hidden = create_test_product(&db, "Antigo", 100, 1).await?;
        update_product(
            &db,
            &ChangeFeed::default(),
            hidden.id,
            ProductPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        let names: Vec<String> = get_active_products(&db)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Bolo", "Torta"]);

        let page = list_products(&db, &ProductQuery::default()).await?;
        assert_eq!(page.total_items, 2);

        let admin_view = list_products(
            &db,
            &ProductQuery {
                active_only: false,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(admin_view.total_items, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_search_category_and_pages() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let cakes = crate::core::category::create_category(&db, &feed, "Bolos").await?;

        for i in 0..5 {
            let mut new = new_product(&format!("Bolo {i}"), 1000 + i64::from(i), 3);
            new.category_id = Some(cakes.id);
            create_product(&db, &feed, new).await?;
        }
        create_test_product(&db, "Torta de limão", 1800, 3).await?;

        let search = list_products(
            &db,
            &ProductQuery {
                search: Some("LIMÃO".to_lowercase()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(search.items.len(), 1);
        assert_eq!(search.items[0].name, "Torta de limão");

        let by_category = list_products(
            &db,
            &ProductQuery {
                category_id: Some(cakes.id),
                order: ProductOrder::PriceDesc,
                page_size: 2,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_category.total_items, 5);
        assert_eq!(by_category.total_pages, 3);
        assert_eq!(by_category.items[0].name, "Bolo 4");

        let last_page = list_products(
            &db,
            &ProductQuery {
                category_id: Some(cakes.id),
                order: ProductOrder::PriceDesc,
                page: 2,
                page_size: 2,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(last_page.items.len(), 1);
        assert_eq!(last_page.items[0].name, "Bolo 0");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_patch() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;

        let updated = update_product(
            &db,
            &feed,
            product.id,
            ProductPatch {
                price_cents: Some(2500),
                description: Some("Now bigger".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.price_cents, 2500);
        assert_eq!(updated.description, "Now bigger");
        assert_eq!(updated.stock_quantity, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_product(&db, &ChangeFeed::default(), 999, ProductPatch::default()).await;
        assert!(matches!(result, Err(Error::ProductNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_keeps_sale_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;
        let sale = create_test_sale(&db, product.id, 2).await?;

        delete_product(&db, &feed, product.id).await?;

        assert!(get_product_by_id(&db, product.id).await?.is_none());
        let kept = Sale::find_by_id(sale.id).one(&db).await?.unwrap();
        assert_eq!(kept.product_id, None);
        assert_eq!(kept.product_name, "Widget");
        assert_eq!(kept.total_cents, 3980);

        let again = delete_product(&db, &feed, product.id).await;
        assert!(matches!(again, Err(Error::ProductNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_stock_rejects_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;

        assert_eq!(set_stock(&db, &feed, product.id, 12).await?.stock_quantity, 12);
        let result = set_stock(&db, &feed, product.id, -1).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(
            get_product_by_id(&db, product.id).await?.unwrap().stock_quantity,
            12
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_stock_atomic_never_goes_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Widget", 1990, 3).await?;

        let after = adjust_stock_atomic(&db, product.id, -2).await?;
        assert_eq!(after.stock_quantity, 1);

        let result = adjust_stock_atomic(&db, product.id, -2).await;
        assert!(matches!(
            result,
            Err(Error::InvalidQuantity {
                requested: 2,
                available: 1
            })
        ));

        let restocked = adjust_stock_atomic(&db, product.id, 4).await?;
        assert_eq!(restocked.stock_quantity, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_inventory_order_and_summary() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Plenty", 100, 50).await?;
        create_test_product(&db, "None", 100, 0).await?;
        create_test_product(&db, "Few", 100, 3).await?;
        create_test_product(&db, "Some", 100, 10).await?;

        let inventory = get_inventory(&db).await?;
        let names: Vec<&str> = inventory.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["None", "Few", "Some", "Plenty"]);

        assert_eq!(
            summarize_inventory(&inventory),
            InventorySummary {
                out_of_stock: 1,
                low_stock: 1
            }
        );
        Ok(())
    }

    #[test]
    fn test_stock_level_boundaries() {
        assert_eq!(StockLevel::from_quantity(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::from_quantity(1), StockLevel::Low);
        assert_eq!(StockLevel::from_quantity(5), StockLevel::Low);
        assert_eq!(StockLevel::from_quantity(6), StockLevel::Medium);
        assert_eq!(StockLevel::from_quantity(20), StockLevel::Medium);
        assert_eq!(StockLevel::from_quantity(21), StockLevel::Adequate);
    }

    #[tokio::test]
    async fn test_writes_publish_changes() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let mut sub = feed.subscribe(Table::Products);

        let product = create_product(&db, &feed, new_product("Widget", 1990, 5)).await?;
        set_stock(&db, &feed, product.id, 1).await?;
        delete_product(&db, &feed, product.id).await?;

        use crate::core::realtime::Notification::Changed;
        assert_eq!(sub.recv().await, Some(Changed(ChangeEvent::inserted(Table::Products, product.id))));
        assert_eq!(sub.recv().await, Some(Changed(ChangeEvent::updated(Table::Products, product.id))));
        assert_eq!(sub.recv().await, Some(Changed(ChangeEvent::deleted(Table::Products, product.id))));
        Ok(())
    }
}
