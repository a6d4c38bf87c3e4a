//! Site settings singleton - branding and the PIX key.

use crate::{
    config::storefront::StoreDefaults,
    core::{
        realtime::{ChangeEvent, ChangeFeed, Table},
        theme::parse_hex_color,
    },
    entities::{SiteSettings, site_settings},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, warn};

/// Fields an admin may change; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub company_name: Option<String>,
    pub logo_url: Option<String>,
    pub welcome_message: Option<String>,
    pub pix_key: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
}

impl SettingsUpdate {
    fn validate(&self) -> Result<()> {
        for color in [&self.primary_color, &self.secondary_color].into_iter().flatten() {
            if parse_hex_color(color).is_none() {
                return Err(Error::Validation {
                    message: format!("'{color}' is not a colour in #rrggbb form"),
                });
            }
        }
        if self
            .company_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(Error::Validation {
                message: "Company name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Returns the settings row, if one exists.
pub async fn get_settings(db: &DatabaseConnection) -> Result<Option<site_settings::Model>> {
    SiteSettings::find()
        .order_by_asc(site_settings::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether checkout can build payloads with these settings.
#[must_use]
pub fn has_pix_key(settings: Option<&site_settings::Model>) -> bool {
    settings.is_some_and(|s| !s.pix_key.trim().is_empty())
}

fn pick(update: Option<String>, fallback: &str) -> String {
    update.map_or_else(|| fallback.to_string(), |v| v.trim().to_string())
}

/// Inserts the settings row when absent, updates it otherwise.
///
/// Fields missing from `update` are taken from `defaults` on insert.
///
/// # Errors
/// Returns `Validation` for a blank company name or a malformed colour.
pub async fn save_settings(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    update: SettingsUpdate,
    defaults: &StoreDefaults,
) -> Result<site_settings::Model> {
    update.validate()?;
    let now = chrono::Utc::now();

    let (saved, event) = match get_settings(db).await? {
        Some(existing) => {
            let mut active: site_settings::ActiveModel = existing.into();
            if let Some(v) = update.company_name {
                active.company_name = Set(v.trim().to_string());
            }
            if let Some(v) = update.logo_url {
                active.logo_url = Set(v.trim().to_string());
            }
            if let Some(v) = update.welcome_message {
                active.welcome_message = Set(v.trim().to_string());
            }
            if let Some(v) = update.pix_key {
                active.pix_key = Set(v.trim().to_string());
            }
            if let Some(v) = update.primary_color {
                active.primary_color = Set(v.trim().to_lowercase());
            }
            if let Some(v) = update.secondary_color {
                active.secondary_color = Set(v.trim().to_lowercase());
            }
            active.updated_at = Set(now);
            let saved = active.update(db).await?;
            let event = ChangeEvent::updated(Table::SiteSettings, i64::from(saved.id));
            (saved, event)
        }
        None => {
            let saved = site_settings::ActiveModel {
                company_name: Set(pick(update.company_name, &defaults.company_name)),
                logo_url: Set(pick(update.logo_url, &defaults.logo_url)),
                welcome_message: Set(pick(update.welcome_message, &defaults.welcome_message)),
                pix_key: Set(pick(update.pix_key, &defaults.pix_key)),
                primary_color: Set(pick(update.primary_color, &defaults.primary_color).to_lowercase()),
                secondary_color: Set(
                    pick(update.secondary_color, &defaults.secondary_color).to_lowercase(),
                ),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
            let event = ChangeEvent::inserted(Table::SiteSettings, i64::from(saved.id));
            (saved, event)
        }
    };

    feed.publish(event);
    Ok(saved)
}

/// Seeds the settings row from configuration on first run.
pub async fn ensure_settings(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    defaults: &StoreDefaults,
) -> Result<site_settings::Model> {
    let settings = match get_settings(db).await? {
        Some(existing) => existing,
        None => {
            info!("No site settings found, seeding from configuration");
            save_settings(db, feed, SettingsUpdate::default(), defaults).await?
        }
    };
    if !has_pix_key(Some(&settings)) {
        warn!("PIX key is not configured; checkout stays disabled until an admin sets one");
    }
    Ok(settings)
}
