//! Category Discord commands - `category add` and `category list`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, is_admin},
        core::category,
        errors::{Error, Result},
    };

    /// Catalog categories.
    #[poise::command(
        slash_command,
        subcommands("category_add", "category_list"),
        check = "is_admin"
    )]
    pub async fn category(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Category command. Available subcommands:\n\
            `/category add` - Create a category\n\
            `/category list` - List categories",
        )
        .await?;
        Ok(())
    }

    /// Creates a category.
    #[poise::command(slash_command, rename = "add", check = "is_admin", ephemeral)]
    pub async fn category_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category name"] name: String,
    ) -> Result<()> {
        let data = ctx.data();
        let created = category::create_category(&data.database, &data.feed, &name).await?;
        ctx.say(format!("✅ Category '{}' created.", created.name))
            .await?;
        Ok(())
    }

    /// Lists categories.
    #[poise::command(slash_command, rename = "list", check = "is_admin", ephemeral)]
    pub async fn category_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let categories = category::get_all_categories(&ctx.data().database).await?;
        if categories.is_empty() {
            ctx.say("No categories yet. Use `/category add` to create one.")
                .await?;
            return Ok(());
        }

        let list = categories
            .iter()
            .map(|c| format!("• {}", c.name))
            .collect::<Vec<_>>()
            .join("\n");
        ctx.say(format!("**Categories**\n{list}")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
