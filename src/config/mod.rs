/// Database configuration and connection management
pub mod database;

/// Store defaults, PIX merchant data and seed categories loaded from config.toml
pub mod storefront;

/// First administrator credentials from environment variables
pub mod admins;
