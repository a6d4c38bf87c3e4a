//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        product::{self, NewProduct},
        realtime::ChangeFeed,
        sale::{self, NewSale},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Product fields with sensible defaults.
///
/// # Defaults
/// * `description`: empty
/// * `image_url`: empty
/// * `is_active`: true
/// * `category_id`: None
#[must_use]
pub fn new_product(name: &str, price_cents: i64, stock_quantity: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: String::new(),
        price_cents,
        image_url: String::new(),
        stock_quantity,
        is_active: true,
        category_id: None,
    }
}

/// Creates an active test product. Change notifications go to a throwaway feed.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price_cents: i64,
    stock_quantity: i32,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        &ChangeFeed::default(),
        new_product(name, price_cents, stock_quantity),
    )
    .await
}

/// Creates a pending sale of `quantity` units, debiting the product's stock.
pub async fn create_test_sale(
    db: &DatabaseConnection,
    product_id: i64,
    quantity: i64,
) -> Result<entities::sale::Model> {
    sale::create_pending_sale(
        db,
        &ChangeFeed::default(),
        NewSale {
            product_id,
            quantity,
            customer_name: Some("Test customer".to_string()),
            customer_phone: None,
            buyer_id: Some("test_user".to_string()),
        },
    )
    .await
}
