//! Database configuration module for the storefront.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity` so the database schema
//! always matches the Rust entity definitions without hand-written SQL.

use crate::entities::{AdminUser, Category, Product, Sale, SiteSettings};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    info!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all storefront tables if they do not exist yet.
///
/// Categories are created before products and products before sales so the
/// foreign keys generated from the entity relations resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut product_table = schema.create_table_from_entity(Product);
    let mut sale_table = schema.create_table_from_entity(Sale);
    let mut settings_table = schema.create_table_from_entity(SiteSettings);
    let mut admin_table = schema.create_table_from_entity(AdminUser);

    for table in [
        category_table.if_not_exists(),
        product_table.if_not_exists(),
        sale_table.if_not_exists(),
        settings_table.if_not_exists(),
        admin_table.if_not_exists(),
    ] {
        db.execute(builder.build(&*table)).await?;
    }

    Ok(())
}
