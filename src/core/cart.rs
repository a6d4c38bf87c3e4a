//! Shopping carts - products a buyer has picked but not ordered yet.
//!
//! Carts live in memory, one per chat user, and are only checked against stock.
//! Nothing is reserved until checkout turns the cart into pending sales, at which
//! point every line is validated again inside the order transaction.

use crate::{
    core::{
        money,
        sale::{OrderLine, validate_quantity},
    },
    entities::ProductModel,
    errors::{Error, Result},
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// One product in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    /// Name and price as they were when last added, for display only
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    /// # Errors
    /// Returns `Validation` on overflow.
    pub fn total_cents(&self) -> Result<i64> {
        money::line_total(self.unit_price_cents, self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units of `product_id` already in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: i64) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    /// Adds `quantity` units, merging with an existing line for the same product.
    ///
    /// # Errors
    /// - `ProductNotFound` for an inactive product
    /// - `InvalidQuantity` when `quantity < 1` or the merged quantity exceeds the
    ///   product's stock; the cart is left unchanged
    pub fn add(&mut self, product: &ProductModel, quantity: i64) -> Result<()> {
        if !product.is_active {
            return Err(Error::ProductNotFound {
                id: product.name.clone(),
            });
        }
        validate_quantity(quantity, product.stock_quantity)?;
        let merged = self
            .quantity_of(product.id)
            .checked_add(quantity)
            .ok_or(Error::InvalidQuantity {
                requested: quantity,
                available: product.stock_quantity,
            })?;
        validate_quantity(merged, product.stock_quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                line.quantity = merged;
                line.product_name.clone_from(&product.name);
                line.unit_price_cents = product.price_cents;
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price_cents: product.price_cents,
                quantity,
            }),
        }
        Ok(())
    }

    /// Drops the line for `product_id`. Returns whether there was one.
    pub fn remove(&mut self, product_id: i64) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Estimated total at the prices shown in the cart.
    ///
    /// # Errors
    /// Returns `Validation` on overflow.
    pub fn total_cents(&self) -> Result<i64> {
        let totals = self
            .lines
            .iter()
            .map(CartLine::total_cents)
            .collect::<Result<Vec<_>>>()?;
        money::checked_sum(totals)
    }

    /// The cart as order lines for checkout.
    #[must_use]
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|l| OrderLine {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect()
    }
}

/// Carts keyed by chat user ID.
#[derive(Debug, Clone, Default)]
pub struct CartRegistry {
    carts: Arc<Mutex<HashMap<u64, Cart>>>,
}

impl CartRegistry {
    /// Adds to the user's cart and returns the updated cart.
    ///
    /// # Errors
    /// See [`Cart::add`].
    pub async fn add(&self, user_id: u64, product: &ProductModel, quantity: i64) -> Result<Cart> {
        let mut carts = self.carts.lock().await;
        let cart = carts.entry(user_id).or_default();
        cart.add(product, quantity)?;
        debug!(user_id, product_id = product.id, quantity, "Added to cart");
        Ok(cart.clone())
    }

    /// The user's cart; empty when they have none.
    pub async fn get(&self, user_id: u64) -> Cart {
        self.carts
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn remove(&self, user_id: u64, product_id: i64) -> bool {
        self.carts
            .lock()
            .await
            .get_mut(&user_id)
            .is_some_and(|cart| cart.remove(product_id))
    }

    /// Empties the user's cart. Returns whether it had anything in it.
    pub async fn clear(&self, user_id: u64) -> bool {
        self.carts
            .lock()
            .await
            .remove(&user_id)
            .is_some_and(|cart| !cart.is_empty())
    }
}
