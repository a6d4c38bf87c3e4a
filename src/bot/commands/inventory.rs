//! Inventory Discord commands - `inventory list` and `inventory set`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, is_admin},
        core::product::{self, StockLevel},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Stock levels and adjustments.
    #[poise::command(
        slash_command,
        subcommands("inventory_list", "inventory_set"),
        check = "is_admin"
    )]
    pub async fn inventory(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Inventory command. Available subcommands:\n\
            `/inventory list` - Stock of every product, lowest first\n\
            `/inventory set` - Set the stock of a product",
        )
        .await?;
        Ok(())
    }

    /// Lists every product by stock, lowest first.
    #[poise::command(slash_command, rename = "list", check = "is_admin", ephemeral)]
    pub async fn inventory_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let products = product::get_inventory(&data.database).await?;

        if products.is_empty() {
            ctx.say("No products yet.").await?;
            return Ok(());
        }

        let summary = product::summarize_inventory(&products);
        let lines: Vec<String> = products
            .iter()
            .map(|p| {
                let level = StockLevel::from_quantity(p.stock_quantity);
                format!(
                    "{} **{}** · {} ({})",
                    level.emoji(),
                    p.name,
                    p.stock_quantity,
                    level.label()
                )
            })
            .collect();

        // Embed descriptions are capped at 4096 characters.
        let mut description = String::new();
        for line in &lines {
            if description.len() + line.len() + 1 > 4000 {
                description.push('…');
                break;
            }
            description.push_str(line);
            description.push('\n');
        }

        let embed = serenity::CreateEmbed::default()
            .title("📦 Inventory")
            .color(data.theme().await.primary)
            .description(description)
            .field("Out of stock", summary.out_of_stock.to_string(), true)
            .field("Low stock (1-5)", summary.low_stock.to_string(), true);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Sets the stock of a product.
    #[poise::command(slash_command, rename = "set", check = "is_admin", ephemeral)]
    pub async fn inventory_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product"]
        #[autocomplete = "autocomplete::autocomplete_any_product_name"]
        name: String,
        #[description = "New stock"]
        #[min = 0]
        stock: i32,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(existing) = product::get_product_by_name(&data.database, &name).await? else {
            ctx.say(format!("❌ Product '{name}' not found.")).await?;
            return Ok(());
        };

        let updated = product::set_stock(&data.database, &data.feed, existing.id, stock).await?;
        let level = StockLevel::from_quantity(updated.stock_quantity);
        ctx.say(format!(
            "✅ Stock of '{}' changed from {} to {} {} ({}).",
            updated.name,
            existing.stock_quantity,
            updated.stock_quantity,
            level.emoji(),
            level.label()
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
