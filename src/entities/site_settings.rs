//! Site settings entity - Singleton row with branding and payment configuration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site settings database model. The store keeps at most one row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Company name shown in the catalog header and used as PIX merchant name
    pub company_name: String,
    /// Logo image reference
    pub logo_url: String,
    /// Greeting shown above the catalog
    pub welcome_message: String,
    /// PIX key receiving payments; empty means checkout is not configured
    pub pix_key: String,
    /// Primary theme colour as `#rrggbb`
    pub primary_color: String,
    /// Secondary theme colour as `#rrggbb`
    pub secondary_color: String,
    /// When the settings were last modified
    pub updated_at: DateTimeUtc,
}

/// `SiteSettings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
