//! Product Discord commands - `products add|edit|delete|list`.
//!
//! Back-office product management. Every subcommand requires an admin session.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, is_admin},
        core::{
            category,
            money::{format_brl, to_cents},
            product::{self, NewProduct, ProductPatch},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use sea_orm::DatabaseConnection;

    /// Parent command for managing the products on sale.
    #[poise::command(
        slash_command,
        subcommands("products_add", "products_edit", "products_delete", "products_list"),
        check = "is_admin"
    )]
    pub async fn products(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product management command. Available subcommands:\n\
            `/products add` - Add a new product\n\
            `/products edit` - Change a product\n\
            `/products delete` - Delete a product\n\
            `/products list` - List all products, newest first";

        ctx.say(help_text).await?;
        Ok(())
    }

    async fn resolve_category(db: &DatabaseConnection, name: Option<String>) -> Result<Option<i64>> {
        match name {
            Some(name) => category::get_category_by_name(db, &name)
                .await?
                .map(|c| Some(c.id))
                .ok_or(Error::CategoryNotFound { id: name }),
            None => Ok(None),
        }
    }

    /// Adds a new product to the catalog.
    #[poise::command(slash_command, rename = "add", check = "is_admin", ephemeral)]
    pub async fn products_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name"] name: String,
        #[description = "Unit price in reais (e.g., 19.90)"] price: f64,
        #[description = "Units in stock"]
        #[min = 0]
        stock: i32,
        #[description = "Short description"] description: Option<String>,
        #[description = "Image URL"] image_url: Option<String>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: Option<String>,
        #[description = "Show in the catalog (defaults to yes)"] active: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let new = NewProduct {
            name,
            description: description.unwrap_or_default(),
            price_cents: to_cents(price)?,
            image_url: image_url.unwrap_or_default(),
            stock_quantity: stock,
            is_active: active.unwrap_or(true),
            category_id: resolve_category(&data.database, category).await?,
        };

        let created = product::create_product(&data.database, &data.feed, new).await?;
        ctx.say(format!(
            "✅ Product '{}' added at **{}** with {} in stock.",
            created.name,
            format_brl(created.price_cents),
            created.stock_quantity
        ))
        .await?;
        Ok(())
    }

    /// Changes one or more fields of a product.
    #[poise::command(slash_command, rename = "edit", check = "is_admin", ephemeral)]
    #[allow(clippy::too_many_arguments)]
    pub async fn products_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to change"]
        #[autocomplete = "autocomplete::autocomplete_any_product_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "New unit price in reais"] price: Option<f64>,
        #[description = "New stock"]
        #[min = 0]
        stock: Option<i32>,
        #[description = "New description"] description: Option<String>,
        #[description = "New image URL"] image_url: Option<String>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: Option<String>,
        #[description = "Remove the category"] clear_category: Option<bool>,
        #[description = "Show in the catalog"] active: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let Some(existing) = product::get_product_by_name(db, &name).await? else {
            ctx.say(format!("❌ Product '{name}' not found.")).await?;
            return Ok(());
        };

        let category_id = if clear_category.unwrap_or(false) {
            Some(None)
        } else {
            resolve_category(db, category).await?.map(Some)
        };

        let patch = ProductPatch {
            name: new_name,
            description,
            price_cents: price.map(to_cents).transpose()?,
            image_url,
            stock_quantity: stock,
            is_active: active,
            category_id,
        };
        if patch == ProductPatch::default() {
            ctx.say("Nothing to change.").await?;
            return Ok(());
        }

        let updated = product::update_product(db, &data.feed, existing.id, patch).await?;
        ctx.say(format!(
            "✅ Product '{}' updated: {} · {} in stock · {}.",
            updated.name,
            format_brl(updated.price_cents),
            updated.stock_quantity,
            if updated.is_active { "visible" } else { "hidden" }
        ))
        .await?;
        Ok(())
    }

    /// Deletes a product. Past sales keep their copy of its name and price.
    #[poise::command(slash_command, rename = "delete", check = "is_admin", ephemeral)]
    pub async fn products_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to delete"]
        #[autocomplete = "autocomplete::autocomplete_any_product_name"]
        name: String,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(existing) = product::get_product_by_name(&data.database, &name).await? else {
            ctx.say(format!("❌ Product '{name}' not found.")).await?;
            return Ok(());
        };

        product::delete_product(&data.database, &data.feed, existing.id).await?;
        ctx.say(format!("✅ Product '{name}' has been deleted.")).await?;
        Ok(())
    }

    /// Lists all products, newest first.
    #[poise::command(slash_command, rename = "list", check = "is_admin", ephemeral)]
    pub async fn products_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let products = product::get_all_products(&data.database).await?;

        if products.is_empty() {
            ctx.say("No products yet. Use `/products add` to create some!")
                .await?;
            return Ok(());
        }

        let total = products.len();
        let embed_fields: Vec<(String, String, bool)> = products
            .into_iter()
            .take(25)
            .map(|p| {
                let status = if p.is_active { "🟢" } else { "⚪ hidden" };
                (
                    format!("{} ({})", p.name, format_brl(p.price_cents)),
                    format!("#{} · {} in stock · {status}", p.id, p.stock_quantity),
                    false,
                )
            })
            .collect();

        let mut list_embed = serenity::CreateEmbed::default()
            .title("**Products**")
            .color(data.theme().await.primary)
            .fields(embed_fields);
        if total > 25 {
            list_embed = list_embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing the 25 newest of {total}. Use /catalog to page through active products."
            )));
        }

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
