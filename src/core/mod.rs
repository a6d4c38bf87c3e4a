//! Core business logic - framework-agnostic catalog, checkout and back-office operations.
//!
//! Every function here talks to the store through a `DatabaseConnection` and knows
//! nothing about the chat surface. Writes publish on the [`realtime::ChangeFeed`] so
//! views held by the bot layer refetch.

pub mod auth;
pub mod cart;
pub mod category;
pub mod checkout;
pub mod dashboard;
pub mod money;
pub mod pix;
pub mod product;
pub mod realtime;
pub mod sale;
pub mod settings;
pub mod theme;
