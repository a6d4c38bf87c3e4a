//! Administrator authentication - Argon2 password hashes and in-memory chat sessions.

use crate::{
    config::admins::AdminSeed,
    entities::{AdminUser, admin_user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;
use sea_orm::{Set, prelude::*};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Hashes a plain-text password with Argon2 and a random salt.
///
/// # Errors
/// Returns `Validation` for an empty password.
#[instrument(skip(password))]
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(Error::Validation {
            message: "Password cannot be empty".to_string(),
        });
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Validation {
            message: format!("Password hashing failed: {e}"),
        })
}

/// Checks a password against a stored hash. A malformed hash never matches.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("Stored password hash could not be parsed");
        return false;
    };
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            warn!("Password verification failed: {e}");
            false
        }
    }
}

/// [`verify_password`] on the blocking pool; Argon2 is too slow for a runtime worker.
pub async fn verify_password_blocking(stored_hash: String, password: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
        .await
        .unwrap_or_else(|e| {
            error!("Password verification task failed: {e}");
            false
        })
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
/// Same as [`hash_password`], plus `Validation` if the task itself fails.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Validation {
            message: format!("Password hashing task failed: {e}"),
        })?
}

/// Creates an administrator account.
///
/// # Errors
/// Returns `Validation` for a blank username, an empty password or a taken username.
pub async fn create_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<admin_user::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::Validation {
            message: "Username cannot be empty".to_string(),
        });
    }
    if find_admin(db, username).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Admin '{username}' already exists"),
        });
    }

    let password_hash = hash_password_blocking(password.to_string()).await?;
    let created = admin_user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(username, "Admin account created");
    Ok(created)
}

async fn find_admin(db: &DatabaseConnection, username: &str) -> Result<Option<admin_user::Model>> {
    AdminUser::find()
        .filter(admin_user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates the seeded administrator unless the account already exists.
///
/// Returns whether an account was created.
pub async fn ensure_admin(db: &DatabaseConnection, seed: &AdminSeed) -> Result<bool> {
    if find_admin(db, seed.username.trim()).await?.is_some() {
        debug!(username = %seed.username, "Seed admin already present");
        return Ok(false);
    }
    create_admin(db, &seed.username, &seed.password).await?;
    Ok(true)
}

/// Verifies credentials against the admin table.
///
/// # Errors
/// Returns `Auth` for an unknown user or a wrong password, without saying which.
#[instrument(skip(db, password))]
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<admin_user::Model> {
    let admin = find_admin(db, username.trim()).await?.ok_or(Error::Auth)?;
    if verify_password_blocking(admin.password_hash.clone(), password.to_string()).await {
        Ok(admin)
    } else {
        Err(Error::Auth)
    }
}

/// Chat users currently logged in as administrators, keyed by user ID.
///
/// Sessions live as long as the bot process.
#[derive(Debug, Clone, Default)]
pub struct AdminSessions {
    inner: Arc<RwLock<HashMap<u64, String>>>,
}

impl AdminSessions {
    /// Verifies credentials and marks `user_id` as logged in.
    pub async fn login(
        &self,
        db: &DatabaseConnection,
        user_id: u64,
        username: &str,
        password: &str,
    ) -> Result<admin_user::Model> {
        let admin = login(db, username, password).await?;
        self.inner.write().await.insert(user_id, admin.username.clone());
        info!(user_id, username = %admin.username, "Admin logged in");
        Ok(admin)
    }

    /// Clears the session. Returns whether one existed.
    pub async fn logout(&self, user_id: u64) -> bool {
        self.inner.write().await.remove(&user_id).is_some()
    }

    /// Admin username for a logged-in chat user.
    pub async fn username(&self, user_id: u64) -> Option<String> {
        self.inner.read().await.get(&user_id).cloned()
    }

    pub async fn is_admin(&self, user_id: u64) -> bool {
        self.inner.read().await.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert_ne!(hash, "s3cret");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret"));
        assert!(!verify_password(&hash, "S3cret"));
        assert!(!verify_password("not-a-hash", "s3cret"));
        assert!(hash_password("").is_err());
    }

    #[tokio::test]
    async fn test_login_checks_password() -> Result<()> {
        let db = setup_test_db().await?;
        create_admin(&db, "admin", "hunter2").await?;

        assert_eq!(login(&db, " admin ", "hunter2").await?.username, "admin");
        assert!(matches!(login(&db, "admin", "wrong").await, Err(Error::Auth)));
        assert!(matches!(login(&db, "nobody", "hunter2").await, Err(Error::Auth)));
        Ok(())
    }

    #[tokio::test]
    async fn test_blocking_helpers_match_sync_versions() -> Result<()> {
        let hash = hash_password_blocking("s3cret".to_string()).await?;
        assert!(verify_password(&hash, "s3cret"));
        assert!(verify_password_blocking(hash.clone(), "s3cret".to_string()).await);
        assert!(!verify_password_blocking(hash, "wrong".to_string()).await);
        assert!(hash_password_blocking(String::new()).await.is_err());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_logins_both_complete() -> Result<()> {
        let db = setup_test_db().await?;
        create_admin(&db, "ana", "hunter2").await?;
        create_admin(&db, "bia", "swordfish").await?;
        let sessions = AdminSessions::default();

        let (first, second) = tokio::join!(
            sessions.login(&db, 1, "ana", "hunter2"),
            sessions.login(&db, 2, "bia", "swordfish"),
        );
        assert_eq!(first?.username, "ana");
        assert_eq!(second?.username, "bia");
        assert!(sessions.is_admin(1).await && sessions.is_admin(2).await);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_admin_rejects_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        create_admin(&db, "admin", "hunter2").await?;
        let dup = create_admin(&db, "admin", "other").await;
        assert!(matches!(dup, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let seed = AdminSeed {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(ensure_admin(&db, &seed).await?);
        assert!(!ensure_admin(&db, &seed).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_sessions_login_logout() -> Result<()> {
        let db = setup_test_db().await?;
        create_admin(&db, "admin", "hunter2").await?;
        let sessions = AdminSessions::default();

        assert!(sessions.login(&db, 7, "admin", "nope").await.is_err());
        assert!(!sessions.is_admin(7).await);

        sessions.login(&db, 7, "admin", "hunter2").await?;
        assert!(sessions.is_admin(7).await);
        assert!(!sessions.is_admin(8).await);
        assert_eq!(sessions.username(7).await.as_deref(), Some("admin"));

        assert!(sessions.logout(7).await);
        assert!(!sessions.is_admin(7).await);
        assert!(!sessions.logout(7).await);
        Ok(())
    }
}
