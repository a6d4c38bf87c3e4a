//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod admin_user;
pub mod category;
pub mod product;
pub mod sale;
pub mod site_settings;

// Re-export specific types to avoid conflicts
pub use admin_user::{Column as AdminUserColumn, Entity as AdminUser, Model as AdminUserModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel, SaleStatus};
pub use site_settings::{
    Column as SiteSettingsColumn, Entity as SiteSettings, Model as SiteSettingsModel,
};
