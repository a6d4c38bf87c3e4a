use crate::core::pix::PixError;
use crate::entities::sale::SaleStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Invalid quantity {requested}: must be between 1 and {available}")]
    InvalidQuantity { requested: i64, available: i32 },

    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    #[error("Category not found: {id}")]
    CategoryNotFound { id: String },

    #[error("Sale not found: {id}")]
    SaleNotFound { id: i64 },

    #[error("Sale cannot move from {from} to {to}")]
    InvalidStatusTransition { from: SaleStatus, to: SaleStatus },

    #[error("Payment payload error: {0}")]
    Payment(#[from] PixError),

    #[error("Invalid username or password")]
    Auth,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether the failure came from bad user input rather than the store or the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidAmount { .. }
                | Self::InvalidQuantity { .. }
                | Self::ProductNotFound { .. }
                | Self::CategoryNotFound { .. }
                | Self::SaleNotFound { .. }
                | Self::InvalidStatusTransition { .. }
                | Self::Auth
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
