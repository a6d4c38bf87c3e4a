//! Checkout flow - one session per buyer, from order form to payment payload.
//!
//! A session moves `Idle -> Submitting -> PayloadReady -> Closed`, with `Error`
//! reachable from `Submitting`. Only one submission may be in flight per session:
//! a second submit while `Submitting` is ignored. Closing a session always wins,
//! so a submission that finishes after the buyer closed it cannot reopen it; the
//! sales it stored are cancelled instead.
//!
//! An order is one or more lines (a single `/buy` or a whole cart). Every line
//! becomes a pending sale and one payment code covers the order total.

use crate::{
    config::storefront::PixConfig,
    core::{
        cart::Cart,
        money,
        pix::{self, PaymentRequest, PixCharge, PixError},
        product::get_product_by_id,
        realtime::ChangeFeed,
        sale::{self, NewOrder, OrderLine, validate_quantity},
    },
    entities::{SaleModel, SaleStatus, SiteSettingsModel},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Where a checkout session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Waiting for the order form
    Idle,
    /// A submission is in flight
    Submitting,
    /// Sale stored; the payment code may be shown
    PayloadReady(Box<PaymentOffer>),
    /// Submission failed; `retry` goes back to `Idle`
    Error(String),
    Closed,
}

/// The pending sales of one order and the single payment code covering them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOffer {
    /// ID of the first sale; the payload reference is derived from it
    pub order_id: i64,
    /// One sale per order line, in line order
    pub sales: Vec<SaleModel>,
    pub total_cents: i64,
    pub charge: PixCharge,
}

/// What the buyer filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub lines: Vec<OrderLine>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

impl OrderForm {
    /// An order for a single product.
    #[must_use]
    pub fn single(product_id: i64, quantity: i64) -> Self {
        Self {
            lines: vec![OrderLine {
                product_id,
                quantity,
            }],
            ..Default::default()
        }
    }

    /// An order for everything in `cart`.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            lines: cart.order_lines(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_customer(mut self, name: Option<String>, phone: Option<String>) -> Self {
        self.customer_name = name;
        self.customer_phone = phone;
        self
    }
}

/// Payee data for the payload, taken from the settings row and `[pix]` config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentContext {
    pub pix_key: String,
    pub merchant_name: String,
    pub merchant_city: String,
}

impl PaymentContext {
    /// Combines settings and config. The merchant name comes from `[pix]` when set,
    /// else from the company name.
    #[must_use]
    pub fn new(settings: Option<&SiteSettingsModel>, pix_config: &PixConfig) -> Self {
        let company_name = settings.map(|s| s.company_name.clone()).unwrap_or_default();
        Self {
            pix_key: settings.map(|s| s.pix_key.trim().to_string()).unwrap_or_default(),
            merchant_name: pix_config
                .merchant_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(company_name),
            merchant_city: pix_config.merchant_city.clone(),
        }
    }

    fn request<'a>(
        &'a self,
        amount_cents: i64,
        description: &'a str,
        reference: &'a str,
    ) -> PaymentRequest<'a> {
        PaymentRequest {
            key: &self.pix_key,
            amount_cents,
            description,
            merchant_name: &self.merchant_name,
            merchant_city: &self.merchant_city,
            reference,
        }
    }
}

/// Result of a submit that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ready(Box<PaymentOffer>),
    /// Another submission was already in flight or finished; nothing was done
    Ignored,
    /// The session was closed while submitting; the result was discarded
    Closed,
}

/// Reference token embedded in the payload for an order.
#[must_use]
pub fn sale_reference(order_id: i64) -> String {
    format!("PED{order_id}")
}

/// Payload description: the product name, or the first name and how many more.
#[must_use]
pub fn order_description<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, rest @ ..] => format!("{} e mais {}", first.as_ref(), rest.len()),
    }
}

/// A single buyer's checkout. Cloning shares the same session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    state: Arc<Mutex<CheckoutState>>,
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CheckoutState::Idle)),
        }
    }

    pub async fn state(&self) -> CheckoutState {
        self.state.lock().await.clone()
    }

    /// `Idle -> Submitting`; false when the session is in any other state.
    async fn begin_submit(&self) -> bool {
        let mut state = self.state.lock().await;
        if *state == CheckoutState::Idle {
            *state = CheckoutState::Submitting;
            true
        } else {
            false
        }
    }

    /// Leaves `Submitting` for `next`. False when the session moved on meanwhile.
    async fn finish_submit(&self, next: CheckoutState) -> bool {
        let mut state = self.state.lock().await;
        if *state == CheckoutState::Submitting {
            *state = next;
            true
        } else {
            false
        }
    }

    /// Validates the order, stores its pending sales and builds one payment code.
    ///
    /// # Errors
    /// - `InvalidQuantity` when a quantity is outside `1..=stock`, or `Validation`
    ///   for an empty order; the session stays `Idle` and no sale is created
    /// - `Payment(MissingKey)` when no PIX key is configured, and any store or
    ///   payload failure; the session moves to `Error`
    #[instrument(skip_all, fields(lines = form.lines.len()))]
    pub async fn submit(
        &self,
        db: &DatabaseConnection,
        feed: &ChangeFeed,
        payment: &PaymentContext,
        form: OrderForm,
        buyer_id: Option<String>,
    ) -> Result<SubmitOutcome> {
        if !self.begin_submit().await {
            debug!("submit ignored, session is not idle");
            return Ok(SubmitOutcome::Ignored);
        }

        match place_order(db, feed, payment, form, buyer_id).await {
            Ok(offer) => {
                let offer = Box::new(offer);
                if self
                    .finish_submit(CheckoutState::PayloadReady(offer.clone()))
                    .await
                {
                    Ok(SubmitOutcome::Ready(offer))
                } else {
                    // Nobody will see the code, so release the stock it holds.
                    info!(order_id = offer.order_id, "Checkout closed before the payload was ready");
                    cancel_sales(db, feed, &offer.sales).await;
                    Ok(SubmitOutcome::Closed)
                }
            }
            Err(e @ (Error::InvalidQuantity { .. } | Error::Validation { .. })) => {
                self.finish_submit(CheckoutState::Idle).await;
                Err(e)
            }
            Err(e) => {
                warn!("Checkout failed: {e}");
                self.finish_submit(CheckoutState::Error(e.to_string())).await;
                Err(e)
            }
        }
    }

    /// `Error -> Idle`. Returns whether the session was in `Error`.
    pub async fn retry(&self) -> bool {
        let mut state = self.state.lock().await;
        if matches!(*state, CheckoutState::Error(_)) {
            *state = CheckoutState::Idle;
            true
        } else {
            false
        }
    }

    /// Closes the session from any state.
    pub async fn close(&self) {
        *self.state.lock().await = CheckoutState::Closed;
    }
}

async fn place_order(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    payment: &PaymentContext,
    form: OrderForm,
    buyer_id: Option<String>,
) -> Result<PaymentOffer> {
    if form.lines.is_empty() {
        return Err(Error::Validation {
            message: "Your cart is empty".to_string(),
        });
    }

    let mut names = Vec::with_capacity(form.lines.len());
    let mut totals = Vec::with_capacity(form.lines.len());
    for line in &form.lines {
        let product = get_product_by_id(db, line.product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| Error::ProductNotFound {
                id: line.product_id.to_string(),
            })?;
        validate_quantity(line.quantity, product.stock_quantity)?;
        totals.push(money::line_total(product.price_cents, line.quantity)?);
        names.push(product.name);
    }

    if payment.pix_key.trim().is_empty() {
        error!("Checkout attempted without a PIX key configured");
        return Err(PixError::MissingKey.into());
    }

    // Catch payload problems before a sale exists.
    let total_cents = money::checked_sum(totals)?;
    let description = order_description(&names);
    pix::build_payload(&payment.request(total_cents, &description, "***"))?;

    let pending = sale::create_pending_order(
        db,
        feed,
        NewOrder {
            lines: form.lines,
            customer_name: form.customer_name,
            customer_phone: form.customer_phone,
            buyer_id,
        },
    )
    .await?;

    match charge_order(db, feed, payment, &pending).await {
        Ok(offer) => {
            info!(order_id = offer.order_id, total_cents = offer.total_cents, "Payment payload ready");
            Ok(offer)
        }
        Err(e) => {
            cancel_sales(db, feed, &pending).await;
            Err(e)
        }
    }
}

/// Builds the payment code for stored sales and attaches it to each of them.
async fn charge_order(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    payment: &PaymentContext,
    pending: &[SaleModel],
) -> Result<PaymentOffer> {
    let order_id = pending.first().map(|s| s.id).ok_or_else(|| Error::Validation {
        message: "Your cart is empty".to_string(),
    })?;
    // Stored totals win over the pre-check in case a price changed in between.
    let total_cents = money::checked_sum(pending.iter().map(|s| s.total_cents))?;
    let names: Vec<&str> = pending.iter().map(|s| s.product_name.as_str()).collect();
    let description = order_description(&names);
    let reference = sale_reference(order_id);

    let charge = pix::generate_charge(&payment.request(total_cents, &description, &reference))?;

    let mut sales = Vec::with_capacity(pending.len());
    for stored in pending {
        sales.push(sale::attach_pix_code(db, feed, stored.id, &charge.payload).await?);
    }

    Ok(PaymentOffer {
        order_id,
        sales,
        total_cents,
        charge,
    })
}

/// Cancels sales nobody will pay for, giving their units back.
async fn cancel_sales(db: &DatabaseConnection, feed: &ChangeFeed, sales: &[SaleModel]) {
    for pending in sales {
        if let Err(e) = sale::update_sale_status(db, feed, pending.id, SaleStatus::Cancelled).await
        {
            error!(sale_id = pending.id, "Failed to cancel sale after checkout stopped: {e}");
        }
    }
}

/// Open checkout sessions keyed by chat user ID.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRegistry {
    sessions: Arc<Mutex<HashMap<u64, CheckoutSession>>>,
}

impl CheckoutRegistry {
    /// Starts a fresh session for `user_id`, closing the previous one.
    pub async fn open(&self, user_id: u64) -> CheckoutSession {
        let session = CheckoutSession::new();
        let previous = self.sessions.lock().await.insert(user_id, session.clone());
        if let Some(previous) = previous {
            previous.close().await;
        }
        session
    }

    pub async fn get(&self, user_id: u64) -> Option<CheckoutSession> {
        self.sessions.lock().await.get(&user_id).cloned()
    }

    /// Closes and forgets the session. Returns whether one was open.
    pub async fn close(&self, user_id: u64) -> bool {
        let removed = self.sessions.lock().await.remove(&user_id);
        match removed {
            Some(session) => {
                session.close().await;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::database::create_tables;
    use crate::core::sale::list_sales;
    use crate::test_utils::*;
    use sea_orm::ConnectionTrait;

    fn payment() -> PaymentContext {
        PaymentContext {
            pix_key: "merchant@example.com".to_string(),
            merchant_name: "Minha Loja".to_string(),
            merchant_city: "Sao Paulo".to_string(),
        }
    }

    fn form(product_id: i64, quantity: i64) -> OrderForm {
        OrderForm::single(product_id, quantity).with_customer(Some("Ana".to_string()), None)
    }

    async fn stock_of(db: &DatabaseConnection, id: i64) -> i32 {
        get_product_by_id(db, id).await.unwrap().unwrap().stock_quantity
    }

    #[tokio::test]
    async fn test_submit_produces_payload() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;
        let session = CheckoutSession::new();

        let outcome = session
            .submit(&db, &feed, &payment(), form(product.id, 1), Some("7".to_string()))
            .await?;
        let SubmitOutcome::Ready(offer) = outcome else {
            panic!("expected a payment offer, got {outcome:?}");
        };

        assert_eq!(offer.sales.len(), 1);
        assert_eq!(offer.order_id, offer.sales[0].id);
        assert_eq!(offer.total_cents, 1990);
        assert_eq!(offer.sales[0].status, SaleStatus::Pending);
        assert_eq!(offer.sales[0].customer_name.as_deref(), Some("Ana"));
        assert_eq!(offer.sales[0].pix_code.as_deref(), Some(offer.charge.payload.as_str()));
        assert!(offer.charge.qr_png.is_some());

        let decoded = pix::decode_payload(&offer.charge.payload).unwrap();
        assert_eq!(decoded.key, "merchant@example.com");
        assert_eq!(decoded.amount.as_deref(), Some("19.90"));
        assert_eq!(decoded.description.as_deref(), Some("Widget"));
        assert_eq!(
            decoded.reference.as_deref(),
            Some(sale_reference(offer.order_id).as_str())
        );

        assert_eq!(session.state().await, CheckoutState::PayloadReady(offer));
        assert_eq!(stock_of(&db, product.id).await, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_quantity_stays_idle() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 2).await?;
        let session = CheckoutSession::new();

        for quantity in [0, -3, 3] {
            let result = session
                .submit(&db, &feed, &payment(), form(product.id, quantity), None)
                .await;
            assert!(matches!(result, Err(Error::InvalidQuantity { .. })));
            assert_eq!(session.state().await, CheckoutState::Idle);
        }

        assert!(list_sales(&db, None).await?.is_empty());
        assert_eq!(stock_of(&db, product.id).await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_stock_rejects_buy() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Gone", 1990, 0).await?;
        let session = CheckoutSession::new();

        let result = session
            .submit(&db, &feed, &payment(), form(product.id, 1), None)
            .await;
        assert!(matches!(
            result,
            Err(Error::InvalidQuantity {
                requested: 1,
                available: 0
            })
        ));
        assert!(list_sales(&db, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_key_moves_to_error_without_sale() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;
        let session = CheckoutSession::new();
        let no_key = PaymentContext {
            pix_key: "  ".to_string(),
            ..payment()
        };

        let result = session
            .submit(&db, &feed, &no_key, form(product.id, 1), None)
            .await;
        assert!(matches!(result, Err(Error::Payment(PixError::MissingKey))));
        assert!(matches!(session.state().await, CheckoutState::Error(_)));
        assert!(list_sales(&db, None).await?.is_empty());

        assert!(session.retry().await);
        assert_eq!(session.state().await, CheckoutState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_insert_moves_to_error_then_retry() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;
        let session = CheckoutSession::new();

        // Simulate the store rejecting the insert.
        db.execute_unprepared("DROP TABLE sales").await?;

        let result = session
            .submit(&db, &feed, &payment(), form(product.id, 1), None)
            .await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert!(matches!(session.state().await, CheckoutState::Error(_)));
        assert_eq!(stock_of(&db, product.id).await, 5);

        // A submit in the Error state does nothing until retry.
        let ignored = session
            .submit(&db, &feed, &payment(), form(product.id, 1), None)
            .await?;
        assert_eq!(ignored, SubmitOutcome::Ignored);

        assert!(session.retry().await);
        assert_eq!(session.state().await, CheckoutState::Idle);

        create_tables(&db).await?;
        let outcome = session
            .submit(&db, &feed, &payment(), form(product.id, 1), None)
            .await?;
        assert!(matches!(outcome, SubmitOutcome::Ready(_)));
        assert_eq!(list_sales(&db, None).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_double_submit_creates_one_sale() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;
        let session = CheckoutSession::new();
        let ctx = payment();

        let (first, second) = tokio::join!(
            session.submit(&db, &feed, &ctx, form(product.id, 1), None),
            session.submit(&db, &feed, &ctx, form(product.id, 1), None),
        );

        let outcomes = [first?, second?];
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, SubmitOutcome::Ready(_)))
                .count(),
            1
        );
        assert!(outcomes.contains(&SubmitOutcome::Ignored));
        assert_eq!(list_sales(&db, None).await?.len(), 1);
        assert_eq!(stock_of(&db, product.id).await, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_cart_order_has_one_payload_for_the_total() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let bolo = create_test_product(&db, "Bolo", 2500, 4).await?;
        let suco = create_test_product(&db, "Suco", 800, 10).await?;
        let mut cart = Cart::default();
        cart.add(&bolo, 2)?;
        cart.add(&suco, 3)?;
        let session = CheckoutSession::new();

        let outcome = session
            .submit(&db, &feed, &payment(), OrderForm::from_cart(&cart), None)
            .await?;
        let SubmitOutcome::Ready(offer) = outcome else {
            panic!("expected a payment offer, got {outcome:?}");
        };

        assert_eq!(offer.sales.len(), 2);
        assert_eq!(offer.total_cents, 7400);
        assert!(
            offer
                .sales
                .iter()
                .all(|s| s.pix_code.as_deref() == Some(offer.charge.payload.as_str()))
        );

        let decoded = pix::decode_payload(&offer.charge.payload).unwrap();
        assert_eq!(decoded.amount.as_deref(), Some("74.00"));
        assert_eq!(decoded.description.as_deref(), Some("Bolo e mais 1"));
        assert_eq!(stock_of(&db, bolo.id).await, 2);
        assert_eq!(stock_of(&db, suco.id).await, 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_cart_line_over_stock_rejects_whole_order() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let bolo = create_test_product(&db, "Bolo", 2500, 4).await?;
        let suco = create_test_product(&db, "Suco", 800, 1).await?;
        let session = CheckoutSession::new();
        let form = OrderForm {
            lines: vec![
                OrderLine {
                    product_id: bolo.id,
                    quantity: 1,
                },
                OrderLine {
                    product_id: suco.id,
                    quantity: 2,
                },
            ],
            ..Default::default()
        };

        let result = session.submit(&db, &feed, &payment(), form, None).await;
        assert!(matches!(result, Err(Error::InvalidQuantity { .. })));
        assert_eq!(session.state().await, CheckoutState::Idle);
        assert!(list_sales(&db, None).await?.is_empty());
        assert_eq!(stock_of(&db, bolo.id).await, 4);

        let empty = session
            .submit(&db, &feed, &payment(), OrderForm::default(), None)
            .await;
        assert!(matches!(empty, Err(Error::Validation { .. })));
        assert_eq!(session.state().await, CheckoutState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn test_close_during_submit_cancels_the_sale() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;
        let registry = CheckoutRegistry::default();
        let session = registry.open(1).await;
        let ctx = payment();

        let (outcome, closed) = tokio::join!(
            session.submit(&db, &feed, &ctx, form(product.id, 1), None),
            async {
                // Let the submission start before the buyer closes the checkout.
                tokio::task::yield_now().await;
                registry.close(1).await
            }
        );

        assert!(closed);
        assert_eq!(outcome?, SubmitOutcome::Closed);
        assert_eq!(session.state().await, CheckoutState::Closed);

        let sales = list_sales(&db, None).await?;
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].status, SaleStatus::Cancelled);
        assert_eq!(stock_of(&db, product.id).await, 5);
        Ok(())
    }

    #[test]
    fn test_order_description() {
        assert_eq!(order_description::<&str>(&[]), "");
        assert_eq!(order_description(&["Widget"]), "Widget");
        assert_eq!(order_description(&["Bolo", "Suco", "Pao"]), "Bolo e mais 2");
    }

    #[tokio::test]
    async fn test_close_while_submitting_wins() {
        let session = CheckoutSession::new();
        assert!(session.begin_submit().await);
        assert!(!session.begin_submit().await);

        session.close().await;
        assert!(!session.finish_submit(CheckoutState::Error("late".to_string())).await);
        assert_eq!(session.state().await, CheckoutState::Closed);
        assert!(!session.retry().await);
    }

    #[tokio::test]
    async fn test_payload_problem_caught_before_sale() -> Result<()> {
        let db = setup_test_db().await?;
        let feed = ChangeFeed::default();
        let product = create_test_product(&db, "Widget", 1990, 5).await?;
        let session = CheckoutSession::new();
        let blank_city = PaymentContext {
            merchant_city: "   ".to_string(),
            ..payment()
        };

        let result = session
            .submit(&db, &feed, &blank_city, form(product.id, 1), None)
            .await;
        assert!(matches!(result, Err(Error::Payment(PixError::MissingCity))));
        // Rejected by the dry run, so nothing was stored.
        assert!(list_sales(&db, None).await?.is_empty());
        assert_eq!(stock_of(&db, product.id).await, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_registry_replaces_and_closes_sessions() {
        let registry = CheckoutRegistry::default();
        let first = registry.open(1).await;
        let second = registry.open(1).await;

        assert_eq!(first.state().await, CheckoutState::Closed);
        assert_eq!(second.state().await, CheckoutState::Idle);
        assert!(registry.get(2).await.is_none());

        assert!(registry.close(1).await);
        assert_eq!(second.state().await, CheckoutState::Closed);
        assert!(registry.get(1).await.is_none());
        assert!(!registry.close(1).await);
    }

    #[test]
    fn test_payment_context_merchant_name() {
        let config = PixConfig {
            merchant_city: "Recife".to_string(),
            merchant_name: None,
        };
        let settings = SiteSettingsModel {
            id: 1,
            company_name: "Doces da Ana".to_string(),
            logo_url: String::new(),
            welcome_message: String::new(),
            pix_key: " ana@example.com ".to_string(),
            primary_color: "#000000".to_string(),
            secondary_color: "#000000".to_string(),
            updated_at: chrono::Utc::now(),
        };

        let ctx = PaymentContext::new(Some(&settings), &config);
        assert_eq!(ctx.pix_key, "ana@example.com");
        assert_eq!(ctx.merchant_name, "Doces da Ana");
        assert_eq!(ctx.merchant_city, "Recife");

        let overridden = PaymentContext::new(
            Some(&settings),
            &PixConfig {
                merchant_name: Some("ANA LTDA".to_string()),
                ..config.clone()
            },
        );
        assert_eq!(overridden.merchant_name, "ANA LTDA");
        assert!(PaymentContext::new(None, &config).pix_key.is_empty());
    }
}
