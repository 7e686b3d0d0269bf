//! In-memory session store and session cookie transport

use crate::SessionSettings;
use albatross_core::{session_error, AlbatrossResult, SessionExpiry, SessionHandle, SessionStore, UserRecord};
use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Server-side session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub expiry: SessionExpiry,
    pub created_at: DateTime<Utc>,
}

impl SessionHandle for SessionRecord {
    fn expiry(&self) -> SessionExpiry {
        self.expiry
    }

    fn set_expiry(&mut self, expiry: SessionExpiry) {
        self.expiry = expiry;
    }
}

/// Session records keyed by session id
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    max_age: Duration,
}

impl MemorySessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }

    /// Look up a live session; expired records are treated as absent
    pub async fn load(&self, session_id: &str) -> Option<SessionRecord> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|record| !self.is_expired(record, Utc::now()))
            .cloned()
    }

    pub async fn destroy(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Drop every record older than the persisted session lifetime
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !self.is_expired(record, now));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    // Browser-session records also age out server-side after max_age.
    fn is_expired(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.max_age) {
            Ok(max_age) => record.created_at + max_age <= now,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    type Handle = SessionRecord;

    async fn establish(&self, user: &UserRecord) -> AlbatrossResult<SessionRecord> {
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            username: user.username.clone(),
            expiry: SessionExpiry::Persistent,
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn save(&self, handle: &SessionRecord) -> AlbatrossResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&handle.id) {
            Some(existing) => {
                *existing = handle.clone();
                Ok(())
            }
            None => Err(session_error!(format!("Session {} no longer exists", handle.id))),
        }
    }
}

/// Read the session id from the request cookies
pub fn session_id_from_jar<'a>(jar: &'a CookieJar, settings: &SessionSettings) -> Option<&'a str> {
    jar.get(&settings.cookie_name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}

/// Session cookie for `record`; browser-session cookies carry no Max-Age
pub fn session_cookie(record: &SessionRecord, settings: &SessionSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build((settings.cookie_name.clone(), record.id.clone()))
        .path("/")
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Lax)
        .build();

    if record.expiry == SessionExpiry::Persistent {
        let age = i64::try_from(settings.cookie_age_secs).unwrap_or(i64::MAX);
        cookie.set_max_age(time::Duration::seconds(age));
    }
    cookie
}

/// Cookie that removes the session cookie from the browser
pub fn removal_cookie(settings: &SessionSettings) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), "")).path("/").build()
}
