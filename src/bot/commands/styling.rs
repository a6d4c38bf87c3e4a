//! Styling Discord commands - `styling show` and `styling set`.
//!
//! Edits the site settings singleton. The new theme reaches every view through the
//! settings change notification; nothing here touches cached state directly.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, is_admin},
        core::{
            settings::{self, SettingsUpdate},
            theme::{Theme, format_hex_color},
        },
        entities::SiteSettingsModel,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Store branding, colours and PIX key.
    #[poise::command(
        slash_command,
        subcommands("styling_show", "styling_set"),
        check = "is_admin"
    )]
    pub async fn styling(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Styling command. Available subcommands:\n\
            `/styling show` - Current store settings\n\
            `/styling set` - Change name, texts, colours or PIX key",
        )
        .await?;
        Ok(())
    }

    fn settings_embed(s: &SiteSettingsModel) -> serenity::CreateEmbed {
        let theme = Theme::from_settings(Some(s));
        let pix_key = if s.pix_key.is_empty() {
            "⚠️ not configured".to_string()
        } else {
            format!("`{}`", s.pix_key)
        };
        let mut embed = serenity::CreateEmbed::default()
            .title(&s.company_name)
            .color(theme.primary)
            .field("Welcome message", non_empty(&s.welcome_message), false)
            .field("PIX key", pix_key, false)
            .field("Primary colour", format_hex_color(theme.primary), true)
            .field("Secondary colour", format_hex_color(theme.secondary), true)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Last updated {}",
                s.updated_at.format("%d/%m/%Y %H:%M UTC")
            )));
        if !s.logo_url.is_empty() {
            embed = embed.thumbnail(&s.logo_url);
        }
        embed
    }

    fn non_empty(value: &str) -> String {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    }

    /// Shows the current store settings.
    #[poise::command(slash_command, rename = "show", check = "is_admin", ephemeral)]
    pub async fn styling_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let Some(current) = settings::get_settings(&data.database).await? else {
            ctx.say("No settings saved yet. Use `/styling set` to create them.")
                .await?;
            return Ok(());
        };
        ctx.send(poise::CreateReply::default().embed(settings_embed(&current)))
            .await?;
        Ok(())
    }

    /// Changes the store settings. Omitted fields keep their value.
    #[poise::command(slash_command, rename = "set", check = "is_admin", ephemeral)]
    pub async fn styling_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Store name"] company_name: Option<String>,
        #[description = "Logo image URL"] logo_url: Option<String>,
        #[description = "Greeting shown above the catalog"] welcome_message: Option<String>,
        #[description = "PIX key receiving payments"] pix_key: Option<String>,
        #[description = "Primary colour, #rrggbb"] primary_color: Option<String>,
        #[description = "Secondary colour, #rrggbb"] secondary_color: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let update = SettingsUpdate {
            company_name,
            logo_url,
            welcome_message,
            pix_key,
            primary_color,
            secondary_color,
        };
        if update == SettingsUpdate::default() {
            ctx.say("Nothing to change.").await?;
            return Ok(());
        }

        let saved =
            settings::save_settings(&data.database, &data.feed, update, &data.config.store).await?;
        ctx.send(
            poise::CreateReply::default()
                .content("✅ Settings saved.")
                .embed(settings_embed(&saved)),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
