//! Colour theme derived from the site settings.
//!
//! The theme is a plain value: views take it as an argument and the bot derives a
//! new one whenever the settings row changes.

use crate::entities::SiteSettingsModel;

pub const DEFAULT_PRIMARY: u32 = 0x0025_63eb;
pub const DEFAULT_SECONDARY: u32 = 0x001e_40af;

/// Embed colours as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: u32,
    pub secondary: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY,
            secondary: DEFAULT_SECONDARY,
        }
    }
}

impl Theme {
    /// Theme for the given settings; unparsable colours keep their default.
    #[must_use]
    pub fn from_settings(settings: Option<&SiteSettingsModel>) -> Self {
        let Some(settings) = settings else {
            return Self::default();
        };
        Self {
            primary: parse_hex_color(&settings.primary_color).unwrap_or(DEFAULT_PRIMARY),
            secondary: parse_hex_color(&settings.secondary_color).unwrap_or(DEFAULT_SECONDARY),
        }
    }
}

/// Parses `#rrggbb` (case-insensitive).
#[must_use]
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Formats `0xRRGGBB` back to `#rrggbb`.
#[must_use]
pub fn format_hex_color(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(primary: &str, secondary: &str) -> SiteSettingsModel {
        SiteSettingsModel {
            id: 1,
            company_name: "Loja".to_string(),
            logo_url: String::new(),
            welcome_message: String::new(),
            pix_key: String::new(),
            primary_color: primary.to_string(),
            secondary_color: secondary.to_string(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#2563eb"), Some(0x2563eb));
        assert_eq!(parse_hex_color(" #FFFFFF "), Some(0xffffff));
        assert_eq!(parse_hex_color("2563eb"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color("#+12345"), None);
    }

    #[test]
    fn test_theme_from_settings() {
        assert_eq!(Theme::from_settings(None), Theme::default());

        let theme = Theme::from_settings(Some(&settings("#ff0000", "#00ff00")));
        assert_eq!(theme.primary, 0xff0000);
        assert_eq!(theme.secondary, 0x00ff00);

        let fallback = Theme::from_settings(Some(&settings("red", "#00ff00")));
        assert_eq!(fallback.primary, DEFAULT_PRIMARY);
        assert_eq!(fallback.secondary, 0x00ff00);
    }

    #[test]
    fn test_format_hex_color() {
        assert_eq!(format_hex_color(0x2563eb), "#2563eb");
        assert_eq!(format_hex_color(0xff), "#0000ff");
    }
}
