//! Admin Discord commands - `admin login`, `admin logout` and `admin dashboard`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, is_admin},
        core::{dashboard, product},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Back-office access.
    #[poise::command(slash_command, subcommands("admin_login", "admin_logout", "admin_dashboard"))]
    pub async fn admin(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Admin command. Available subcommands:\n\
            `/admin login` - Sign in to the back-office\n\
            `/admin logout` - Sign out\n\
            `/admin dashboard` - Revenue, sales and stock at a glance",
        )
        .await?;
        Ok(())
    }

    /// Signs in to the back-office.
    #[poise::command(slash_command, rename = "login", ephemeral)]
    pub async fn admin_login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Admin username"] username: String,
        #[description = "Admin password"] password: String,
    ) -> Result<()> {
        let data = ctx.data();
        match data
            .sessions
            .login(&data.database, ctx.author().id.get(), &username, &password)
            .await
        {
            Ok(admin) => {
                ctx.say(format!("🔓 Logged in as **{}**.", admin.username))
                    .await?;
            }
            Err(Error::Auth) => {
                ctx.say("❌ Invalid username or password.").await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Signs out of the back-office.
    #[poise::command(slash_command, rename = "logout", ephemeral)]
    pub async fn admin_logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let message = if ctx.data().sessions.logout(ctx.author().id.get()).await {
            "🔒 Logged out."
        } else {
            "You were not logged in."
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Shows revenue, sales counts and products needing restock.
    #[poise::command(slash_command, rename = "dashboard", check = "is_admin", ephemeral)]
    pub async fn admin_dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let summary = dashboard::generate_dashboard(&data.database).await?;
        let stock = product::summarize_inventory(&product::get_inventory(&data.database).await?);

        let embed = serenity::CreateEmbed::default()
            .title("📊 Dashboard")
            .color(data.theme().await.primary)
            .description(summary.to_string())
            .field("🔴 Out of stock", stock.out_of_stock.to_string(), true)
            .field("🟠 Low stock", stock.low_stock.to_string(), true);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
