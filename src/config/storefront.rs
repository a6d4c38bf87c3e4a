//! Storefront configuration loading from config.toml
//!
//! The TOML file carries the defaults used to seed the site settings singleton on
//! first run, the merchant data the PIX payload needs but the settings row does not
//! hold, and the initial list of catalog categories.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Branding and payment defaults for the settings singleton
    #[serde(default)]
    pub store: StoreDefaults,
    /// Merchant data embedded in every payment payload
    pub pix: PixConfig,
    /// Categories to create when missing
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Defaults copied into the site settings row when the store has none yet.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreDefaults {
    pub company_name: String,
    pub logo_url: String,
    pub welcome_message: String,
    /// PIX key; left empty the storefront starts with checkout disabled
    pub pix_key: String,
    pub primary_color: String,
    pub secondary_color: String,
}

impl Default for StoreDefaults {
    fn default() -> Self {
        Self {
            company_name: "Minha Loja".to_string(),
            logo_url: String::new(),
            welcome_message: "Bem-vindo ao nosso catálogo!".to_string(),
            pix_key: String::new(),
            primary_color: "#2563eb".to_string(),
            secondary_color: "#1e40af".to_string(),
        }
    }
}

/// Merchant fields required by the BR Code format.
#[derive(Debug, Deserialize, Clone)]
pub struct PixConfig {
    /// City of the receiving account (tag 60)
    pub merchant_city: String,
    /// Overrides the company name as merchant name (tag 59)
    #[serde(default)]
    pub merchant_name: Option<String>,
}

/// A single seeded category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    pub name: String,
}

/// Loads storefront configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing or the merchant city is blank
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.pix.merchant_city.trim().is_empty() {
        return Err(Error::Config {
            message: "pix.merchant_city must not be empty".to_string(),
        });
    }

    Ok(config)
}

/// Loads configuration from `STOREFRONT_CONFIG`, or ./config.toml when unset
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("STOREFRONT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
