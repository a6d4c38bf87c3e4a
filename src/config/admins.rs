//! Administrator bootstrap from environment variables.
//!
//! The back-office needs at least one account before anyone can log in. When
//! `ADMIN_USERNAME` and `ADMIN_PASSWORD` are both set, start-up creates that account
//! if it does not exist yet.

/// Credentials for the first administrator
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads `ADMIN_USERNAME` / `ADMIN_PASSWORD`.
///
/// Returns `None` unless both are set and non-blank.
#[must_use]
pub fn get_admin_seed() -> Option<AdminSeed> {
    admin_seed_from(
        std::env::var("ADMIN_USERNAME").ok(),
        std::env::var("ADMIN_PASSWORD").ok(),
    )
}

fn admin_seed_from(username: Option<String>, password: Option<String>) -> Option<AdminSeed> {
    let username = username?.trim().to_string();
    let password = password?;
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some(AdminSeed { username, password })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_requires_both_values() {
        assert!(admin_seed_from(Some("admin".into()), None).is_none());
        assert!(admin_seed_from(None, Some("secret".into())).is_none());
        assert!(admin_seed_from(Some("  ".into()), Some("secret".into())).is_none());
    }

    #[test]
    fn test_seed_trims_username() {
        let seed = admin_seed_from(Some(" admin ".into()), Some("secret".into()));
        assert_eq!(
            seed,
            Some(AdminSeed {
                username: "admin".to_string(),
                password: "secret".to_string(),
            })
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let seed = AdminSeed {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{seed:?}").contains("hunter2"));
    }
}
