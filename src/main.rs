use dotenvy::dotenv;
use pix_storefront::{
    bot::{self, BotData},
    config,
    core::{auth, category, realtime::ChangeFeed, settings},
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load storefront configuration
    let store_config = config::storefront::load_default_config()
        .inspect_err(|e| error!("Critical error loading storefront configuration: {e}"))?;
    info!("Successfully processed storefront configuration.");

    // 4. Connect and create tables
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Seed settings, categories and the first admin
    let feed = ChangeFeed::default();
    settings::ensure_settings(&db, &feed, &store_config.store).await?;
    category::ensure_categories(&db, &feed, &store_config.categories).await?;
    match config::admins::get_admin_seed() {
        Some(seed) => {
            if auth::ensure_admin(&db, &seed).await? {
                info!("Created admin account '{}'", seed.username);
            }
        }
        None => warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set; no admin account was seeded"),
    }

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let data = BotData::load(db, feed, Arc::new(store_config)).await?;
    bot::run_bot(token, data).await
}
