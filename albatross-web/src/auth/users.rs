//! In-memory credential store

use crate::UserSeed;
use albatross_core::{AlbatrossError, AlbatrossResult, Authenticator, ErrorContext, UserRecord};
use async_trait::async_trait;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Internal user data with password hash
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
}

impl UserData {
    /// Create new user with hashed password
    pub fn new(username: String, password: &str, is_active: bool) -> AlbatrossResult<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash: hash_password(password)?,
            is_active,
        })
    }

    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id.clone(),
            username: self.username.clone(),
            is_active: self.is_active,
        }
    }
}

/// Username-keyed user store
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserData>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from configured accounts, hashing every password
    pub async fn from_seeds(seeds: &[UserSeed]) -> AlbatrossResult<Self> {
        let store = Self::new();
        for seed in seeds {
            store
                .insert(UserData::new(seed.username.clone(), &seed.password, seed.is_active)?)
                .await;
        }
        info!(users = seeds.len(), "Credential store seeded");
        Ok(store)
    }

    /// Development fallback account
    pub async fn with_default_admin() -> AlbatrossResult<Self> {
        warn!("No users configured; creating default 'admin' account for development");
        Self::from_seeds(&[UserSeed {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            is_active: true,
        }])
        .await
    }

    pub async fn insert(&self, user: UserData) {
        debug!(username = %user.username, "Adding user");
        self.users.write().await.insert(user.username.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl Authenticator for MemoryUserStore {
    async fn verify(&self, username: &str, password: &str) -> AlbatrossResult<Option<UserRecord>> {
        let Some(user) = self.users.read().await.get(username).cloned() else {
            debug!(username, "Unknown username");
            return Ok(None);
        };

        // Hash verification is CPU bound; keep it off the async workers.
        let hash = user.password_hash.clone();
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AlbatrossError::Authenticator {
                message: format!("Password verification task failed: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("users").with_operation("verify"),
            })??;

        Ok(valid.then(|| user.to_record()))
    }
}

/// Hash password using Argon2
fn hash_password(password: &str) -> AlbatrossResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AlbatrossError::Authenticator {
            message: format!("Failed to hash password: {}", e),
            source: None,
            context: ErrorContext::new("users").with_operation("hash_password"),
        })
}

/// Verify password against hash
fn verify_password(password: &str, hash: &str) -> AlbatrossResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AlbatrossError::Authenticator {
        message: format!("Stored password hash is malformed: {}", e),
        source: None,
        context: ErrorContext::new("users").with_operation("verify_password"),
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_known_user() {
        let store = MemoryUserStore::from_seeds(&[UserSeed {
            username: "alice".to_string(),
            password: "wonderland".to_string(),
            is_active: true,
        }])
        .await
        .unwrap();

        let user = store.verify("alice", "wonderland").await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.is_active);

        assert!(store.verify("alice", "wrong").await.unwrap().is_none());
        assert!(store.verify("nobody", "wonderland").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inactive_user_is_reported_inactive() {
        let store = MemoryUserStore::from_seeds(&[UserSeed {
            username: "bob".to_string(),
            password: "builder".to_string(),
            is_active: false,
        }])
        .await
        .unwrap();

        let user = store.verify("bob", "builder").await.unwrap().unwrap();
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn test_passwords_are_hashed() {
        let store = MemoryUserStore::new();
        let user = UserData::new("carol".to_string(), "secret", true).unwrap();
        assert_ne!(user.password_hash, "secret");
        assert!(user.password_hash.starts_with("$argon2"));

        let id = user.id.clone();
        store.insert(user).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.verify("carol", "secret").await.unwrap().unwrap().id, id);
    }

    #[tokio::test]
    async fn test_default_admin() {
        let store = MemoryUserStore::with_default_admin().await.unwrap();
        assert!(store.verify("admin", "admin123").await.unwrap().is_some());
    }
}
