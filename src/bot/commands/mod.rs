//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Admin login, logout and dashboard
pub mod admin;

/// Shopping cart commands
pub mod cart;

/// Customer-facing catalog and checkout commands
pub mod catalog;

/// Category management commands
pub mod categories;

/// General utility commands
pub mod general;

/// Inventory commands
pub mod inventory;

/// Product management commands
pub mod products;

/// Sales back-office commands
pub mod sales;

/// Site settings and theme commands
pub mod styling;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use admin::*;
pub use cart::*;
pub use catalog::*;
pub use categories::*;
pub use general::*;
pub use inventory::*;
pub use products::*;
pub use sales::*;
pub use styling::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        catalog(),
        product(),
        buy(),
        cart(),
        cancel_checkout(),
        admin(),
        products(),
        inventory(),
        sales(),
        styling(),
        category(),
    ]
}
