//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Storefront Help**\n\
        Browse the catalog and pay with PIX right here.\n\n\
        **Shopping**\n\
        • `/catalog [search] [category] [sort] [page]` - Browse the products on sale.\n\
        • `/product <name>` - Shows one product in detail.\n\
        • `/buy <product> [quantity] [name] [phone]` - Places an order and shows its PIX code.\n\
        • `/cart <add|show|remove|clear|checkout>` - Collect several products and pay once.\n\
        • `/cancel_checkout` - Closes your open checkout.\n\n\
        **Back-office** (log in first)\n\
        • `/admin <login|logout|dashboard>` - Sign in and see the store at a glance.\n\
        • `/products <add|edit|delete|list>` - Manage products.\n\
        • `/inventory <list|set>` - Check and adjust stock.\n\
        • `/sales <list|details|status>` - Follow up on orders.\n\
        • `/styling <show|set>` - Store name, welcome text, colours and PIX key.\n\
        • `/category <add|list>` - Manage catalog categories.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
