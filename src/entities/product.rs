//! Product entity - An item listed in the storefront catalog.
//!
//! Prices are held as integer cents so totals and payment amounts never go
//! through floating point. Products are the only rows the back-office hard-deletes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Widget")
    pub name: String,
    /// Free-text description shown in the catalog
    pub description: String,
    /// Unit price in cents
    pub price_cents: i64,
    /// Image reference (URL), empty when the product has no picture
    pub image_url: String,
    /// Units available for sale, never negative
    pub stock_quantity: i32,
    /// Inactive products are hidden from the catalog but still visible to admins
    pub is_active: bool,
    /// Optional category this product is filed under
    pub category_id: Option<i64>,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product may belong to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
