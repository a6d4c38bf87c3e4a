//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the storefront, including all
//! slash commands, autocomplete handlers, and the shared bot state: cached views
//! kept fresh by the change feed, admin sessions and open checkouts.

/// Discord command implementations (catalog, checkout, admin back-office, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::storefront::Config,
    core::{
        auth::AdminSessions,
        cart::CartRegistry,
        category,
        checkout::{CheckoutRegistry, PaymentContext},
        product,
        realtime::{ChangeFeed, LiveView, Table},
        settings,
        theme::Theme,
    },
    entities::{CategoryModel, ProductModel, SiteSettingsModel},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Change notifications published by every write
    pub feed: ChangeFeed,
    pub config: Arc<Config>,
    /// Active products, used for autocomplete
    pub catalog: LiveView<Vec<ProductModel>>,
    pub categories: LiveView<Vec<CategoryModel>>,
    /// The settings singleton; the theme and payment key are derived from it
    pub settings: LiveView<Option<SiteSettingsModel>>,
    pub sessions: AdminSessions,
    /// Per-user carts, emptied by a successful `/cart checkout`
    pub carts: CartRegistry,
    pub checkouts: CheckoutRegistry,
}

impl BotData {
    /// Loads the initial contents of every cached view.
    pub async fn load(
        database: DatabaseConnection,
        feed: ChangeFeed,
        config: Arc<Config>,
    ) -> Result<Self> {
        let catalog = LiveView::new(product::get_active_products(&database).await?);
        let categories = LiveView::new(category::get_all_categories(&database).await?);
        let settings = LiveView::new(settings::get_settings(&database).await?);

        Ok(Self {
            database,
            feed,
            config,
            catalog,
            categories,
            settings,
            sessions: AdminSessions::default(),
            carts: CartRegistry::default(),
            checkouts: CheckoutRegistry::default(),
        })
    }

    /// Starts one refresher task per cached view.
    pub fn spawn_refreshers(&self) -> Vec<JoinHandle<()>> {
        let catalog = {
            let db = self.database.clone();
            self.catalog
                .spawn_refresher(self.feed.subscribe(Table::Products), move || {
                    let db = db.clone();
                    async move { product::get_active_products(&db).await }
                })
        };
        let categories = {
            let db = self.database.clone();
            self.categories
                .spawn_refresher(self.feed.subscribe(Table::Categories), move || {
                    let db = db.clone();
                    async move { category::get_all_categories(&db).await }
                })
        };
        let settings = {
            let db = self.database.clone();
            self.settings
                .spawn_refresher(self.feed.subscribe(Table::SiteSettings), move || {
                    let db = db.clone();
                    async move { settings::get_settings(&db).await }
                })
        };
        vec![catalog, categories, settings]
    }

    /// Theme derived from the current settings.
    pub async fn theme(&self) -> Theme {
        Theme::from_settings(self.settings.snapshot().await.as_ref())
    }

    pub async fn payment_context(&self) -> PaymentContext {
        PaymentContext::new(self.settings.snapshot().await.as_ref(), &self.config.pix)
    }

    /// Warning shown to customers while checkout cannot produce payment codes.
    pub async fn misconfiguration_banner(&self) -> Option<&'static str> {
        if settings::has_pix_key(self.settings.snapshot().await.as_ref()) {
            None
        } else {
            Some("⚠️ Payments are not configured yet: the store has no PIX key. Checkout is disabled.")
        }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Command check: the caller is logged in as an administrator.
pub async fn is_admin(ctx: Context<'_>) -> Result<bool> {
    Ok(ctx.data().sessions.is_admin(ctx.author().id.get()).await)
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if error.is_user_error() {
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
                "❌ Something went wrong talking to the store. Please try again.".to_string()
            };
            if let Err(e) = ctx
                .send(poise::CreateReply::default().content(reply).ephemeral(true))
                .await
            {
                error!("Failed to send error message: {e}");
            }
        }
        poise::FrameworkError::CommandCheckFailed { ctx, error, .. } => {
            if let Some(e) = error {
                error!("Admin check failed: {e}");
            }
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .content("🔒 Administrators only. Log in with `/admin login` first.")
                        .ephemeral(true),
                )
                .await
            {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the framework and runs the bot until the gateway connection ends.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    if data.misconfiguration_banner().await.is_some() {
        error!("No PIX key configured; checkout will refuse orders until one is set with /styling set");
    }
    let refreshers = data.spawn_refreshers();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    let result = client.start().await;
    for handle in refreshers {
        handle.abort();
    }
    if let Err(e) = &result {
        warn!("Client stopped: {e:?}");
    }
    result.map_err(Error::from)
}

pub use commands::*;
pub use handlers::*;
