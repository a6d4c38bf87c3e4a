//! Autocomplete handlers for Discord slash command parameters.
//!
//! Customer-facing suggestions are served from the cached views in [`BotData`],
//! which the change feed keeps current, so typing does not hit the database.
//! Admin suggestions include inactive products and are read from the store.

use crate::{bot::BotData, core::product, errors::Error};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

fn matching_names(names: impl Iterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect();
    matching.sort();
    matching
}

/// Suggests names of products currently on sale.
pub async fn autocomplete_product_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let products = ctx.data().catalog.snapshot().await;
    matching_names(products.into_iter().map(|p| p.name), partial)
}

/// Suggests names of every product, active or not.
pub async fn autocomplete_any_product_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(products) = product::get_all_products(&ctx.data().database).await else {
        return Vec::new();
    };
    matching_names(products.into_iter().map(|p| p.name), partial)
}

/// Suggests category names.
pub async fn autocomplete_category_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let categories = ctx.data().categories.snapshot().await;
    matching_names(categories.into_iter().map(|c| c.name), partial)
}
