//! Server-side session management
//!
//! A session maps an opaque cookie token to a serialized principal held in
//! a key-value backend with a TTL. Expiration is sliding: resolving a
//! session re-arms its TTL from the current time, at most once per
//! configured touch interval to bound write amplification.

use anyhow::Result;
use chrono::{DateTime, Utc};
use common::kv::KeyValueStore;
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::Principal;

/// Length of session tokens in characters
const TOKEN_LEN: usize = 48;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in seconds; re-armed on activity
    pub ttl_seconds: u64,
    /// Minimum interval between TTL refreshes for one session
    pub touch_seconds: u64,
    /// Name of the session cookie
    pub cookie_name: String,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_TTL_SECONDS`: session lifetime (default: 1209600, 14 days)
    /// - `SESSION_TOUCH_SECONDS`: refresh rate limit (default: 86400, 1 day)
    /// - `SESSION_COOKIE`: session cookie name (default: "sid")
    pub fn from_env() -> Self {
        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(14 * 24 * 60 * 60);

        let touch_seconds = std::env::var("SESSION_TOUCH_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24 * 60 * 60);

        let cookie_name = std::env::var("SESSION_COOKIE").unwrap_or_else(|_| "sid".to_string());

        Self {
            ttl_seconds,
            touch_seconds,
            cookie_name,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 14 * 24 * 60 * 60,
            touch_seconds: 24 * 60 * 60,
            cookie_name: "sid".to_string(),
        }
    }
}

/// Serialized session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    user_id: Uuid,
    email: String,
    name: String,
    touched_at: DateTime<Utc>,
}

/// Session manager over a key-value backend
#[derive(Clone)]
pub struct SessionManager<S: KeyValueStore> {
    store: S,
    config: SessionConfig,
}

impl<S: KeyValueStore> SessionManager<S> {
    /// Create a new session manager
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// Name of the cookie carrying the session token
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Configured session lifetime, for the cookie Max-Age
    pub fn ttl_seconds(&self) -> u64 {
        self.config.ttl_seconds
    }

    /// Create a new session for an authenticated principal and return its
    /// opaque token
    pub async fn create(&self, principal: &Principal) -> Result<String> {
        let token = generate_token();
        let record = SessionRecord {
            user_id: principal.id,
            email: principal.email.clone(),
            name: principal.name.clone(),
            touched_at: Utc::now(),
        };

        self.store
            .set(
                &session_key(&token),
                &serde_json::to_string(&record)?,
                Some(self.config.ttl_seconds),
            )
            .await?;

        info!("Created session for user: {}", principal.id);
        Ok(token)
    }

    /// Resolve a token to its principal.
    ///
    /// Unknown, expired, and destroyed tokens all resolve to `None`; a
    /// caller cannot tell the cases apart. A successful resolve re-arms the
    /// TTL when the last refresh is older than the touch interval.
    pub async fn resolve(&self, token: &str) -> Result<Option<Principal>> {
        let key = session_key(token);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };

        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("Dropping undecodable session record: {}", e);
                self.store.delete(&key).await?;
                return Ok(None);
            }
        };

        let age = Utc::now() - record.touched_at;
        if age.num_seconds() >= self.config.touch_seconds as i64 {
            self.touch(token).await?;
        }

        Ok(Some(Principal {
            id: record.user_id,
            email: record.email,
            name: record.name,
        }))
    }

    /// Extend a session's lifetime from the current time
    pub async fn touch(&self, token: &str) -> Result<()> {
        let key = session_key(token);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(());
        };

        if let Ok(mut record) = serde_json::from_str::<SessionRecord>(&raw) {
            record.touched_at = Utc::now();
            self.store
                .set(
                    &key,
                    &serde_json::to_string(&record)?,
                    Some(self.config.ttl_seconds),
                )
                .await?;
        }

        Ok(())
    }

    /// Destroy a session. Resolving the token afterwards yields `None`.
    /// Destroying an absent session is not an error.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        self.store.delete(&session_key(token)).await?;
        info!("Destroyed session");
        Ok(())
    }
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Generate an unguessable token from the operating system CSPRNG
fn generate_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
