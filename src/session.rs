//! Session Store
//!
//! Owns the locally persisted proof of authentication: the bearer token, the
//! issue timestamp and the profile returned at login. Expiry is lazy - there
//! is no timer; every read re-derives validity from the stored timestamp
//! against the fixed 24-hour TTL. Consumers are the boot-time state
//! initialization and the route guard, which is all the lazy check needs.
//!
//! The profile is persisted next to the token so a restart can restore the
//! authenticated user without fabricating a placeholder or re-fetching.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{KeyValueStorage, MemoryStorage};

/// How long a session stays valid after login
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

const TOKEN_KEY: &str = "token";
const TIMESTAMP_KEY: &str = "login_timestamp";
const PROFILE_KEY: &str = "user_profile";
const REMEMBER_ME_KEY: &str = "rememberMe";
const SAVED_USERNAME_KEY: &str = "savedUsername";

/// Profile of the authenticated user, as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserProfile {
    /// Name used in greetings: the first name when present, else the username
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.username
        } else {
            &self.first_name
        }
    }
}

/// The locally held proof of authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Whether this session has outlived the TTL at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.issued_at.timestamp_millis() >= SESSION_TTL_MS
    }
}

/// Persists and retrieves the session over a key-value storage collaborator.
///
/// All operations swallow storage failures: a session that cannot be read is
/// treated as absent, a session that cannot be written leaves the user
/// logged out on the next boot. Cloning is cheap and every clone sees the
/// same underlying storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by process memory only; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Read the persisted session. Returns `None` if any piece is absent,
    /// malformed or the TTL has elapsed.
    pub fn load(&self) -> Option<Session> {
        let token = self.storage.get(TOKEN_KEY)?;
        let issued_at = self.issued_at()?;
        let now = Utc::now();
        if now.timestamp_millis() - issued_at.timestamp_millis() >= SESSION_TTL_MS {
            debug!("persisted session has expired");
            return None;
        }
        let raw_profile = self.storage.get(PROFILE_KEY)?;
        let user = match serde_json::from_str(&raw_profile) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "persisted profile is malformed, treating as logged out");
                return None;
            }
        };
        Some(Session {
            user,
            token,
            issued_at,
        })
    }

    /// Persist a fresh session: token, now as the issue timestamp, and the
    /// profile returned by the login response. Overwrites any prior session.
    pub fn save(&self, token: &str, user: &UserProfile) {
        let now = Utc::now().timestamp_millis();
        match serde_json::to_string(user) {
            Ok(profile) => self.storage.set(PROFILE_KEY, &profile),
            Err(e) => warn!(error = %e, "failed to serialize profile"),
        }
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(TIMESTAMP_KEY, &now.to_string());
    }

    /// Remove every persisted session field. Idempotent.
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(TIMESTAMP_KEY);
        self.storage.remove(PROFILE_KEY);
    }

    /// Validity check without materializing the profile, for quick gating.
    pub fn is_valid(&self) -> bool {
        if self.storage.get(TOKEN_KEY).is_none() {
            return false;
        }
        match self.issued_at() {
            Some(issued_at) => {
                Utc::now().timestamp_millis() - issued_at.timestamp_millis() < SESSION_TTL_MS
            }
            None => false,
        }
    }

    /// The persisted bearer token, if any. Does not check expiry; the
    /// gateway attaches whatever token exists and lets the server's 401
    /// answer invalidate it.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// Drop the token and its timestamp. Called when any request comes back
    /// 401, so the UI stops claiming an authenticated state the server has
    /// already rejected.
    pub fn invalidate_token(&self) {
        debug!("invalidating persisted token");
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(TIMESTAMP_KEY);
    }

    /// Remember the username for the login form's remember-me checkbox.
    pub fn remember_username(&self, username: &str) {
        self.storage.set(REMEMBER_ME_KEY, "true");
        self.storage.set(SAVED_USERNAME_KEY, username);
    }

    /// The remembered username, if remember-me is on.
    pub fn remembered_username(&self) -> Option<String> {
        if self.storage.get(REMEMBER_ME_KEY).as_deref() != Some("true") {
            return None;
        }
        self.storage.get(SAVED_USERNAME_KEY).filter(|u| !u.is_empty())
    }

    /// Turn remember-me off and drop the saved username.
    pub fn forget_username(&self) {
        self.storage.set(REMEMBER_ME_KEY, "false");
        self.storage.remove(SAVED_USERNAME_KEY);
    }

    fn issued_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(TIMESTAMP_KEY)?;
        let millis = match raw.parse::<i64>() {
            Ok(millis) => millis,
            Err(e) => {
                warn!(raw, error = %e, "persisted login timestamp is malformed");
                return None;
            }
        };
        Utc.timestamp_millis_opt(millis).single()
    }

    #[cfg(test)]
    pub(crate) fn set_raw(&self, key: &str, value: &str) {
        self.storage.set(key, value);
    }
}

#[cfg(test)]
pub(crate) fn test_profile() -> UserProfile {
    UserProfile {
        id: 1,
        username: "emilys".to_string(),
        email: "emily.johnson@x.dummyjson.com".to_string(),
        first_name: "Emily".to_string(),
        last_name: "Johnson".to_string(),
        gender: Some("female".to_string()),
        image: None,
    }
}
