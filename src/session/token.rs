//! Bearer token persistence
//!
//! The token lives in a cookie-equivalent scoped store: a small JSON
//! document on disk holding the value, its cookie attributes, and the
//! issuance time. Absence of a token is a valid state, not a failure, and
//! an expired token is treated as absent and purged on read.

use crate::core::config::SessionConfig;
use crate::core::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;

/// SameSite policy for the token cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
}

/// Cookie flags stored alongside the token value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieAttributes {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    /// Max-age in seconds; absent means session-lifetime
    pub max_age: Option<u64>,
}

impl CookieAttributes {
    /// The attribute set the dashboard uses: http-only, same-site strict,
    /// secure when the deployment says so.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            http_only: true,
            secure: config.cookie_secure,
            same_site: SameSite::Strict,
            max_age: config.cookie_max_age,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    value: String,
    attributes: CookieAttributes,
    issued_at: DateTime<Utc>,
}

impl StoredToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.attributes.max_age {
            Some(secs) => now >= self.issued_at + Duration::seconds(secs as i64),
            None => false,
        }
    }
}

/// File-persisted store for the single bearer token.
pub struct TokenStore {
    path: PathBuf,
    current: RwLock<Option<StoredToken>>,
}

impl TokenStore {
    /// Open the store at the given path, loading a previously persisted
    /// token if one exists. A missing or unreadable file means "no token".
    pub fn open(path: PathBuf) -> Self {
        let current = std::fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<StoredToken>(&bytes).ok());

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    /// Current token value, or None when absent or expired. Expired tokens
    /// are purged from memory and disk.
    pub async fn get(&self) -> Option<String> {
        let now = Utc::now();
        {
            let current = self.current.read().await;
            match current.as_ref() {
                Some(stored) if !stored.is_expired(now) => return Some(stored.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Token present but expired: purge it.
        let mut current = self.current.write().await;
        if current.as_ref().is_some_and(|s| s.is_expired(now)) {
            *current = None;
            let _ = tokio::fs::remove_file(&self.path).await;
        }
        current.as_ref().map(|s| s.value.clone())
    }

    /// Store a token with its cookie attributes and persist it.
    pub async fn set(&self, token: String, attributes: CookieAttributes) -> Result<()> {
        let stored = StoredToken {
            value: token,
            attributes,
            issued_at: Utc::now(),
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&stored)?;
        tokio::fs::write(&self.path, bytes).await?;

        *self.current.write().await = Some(stored);
        Ok(())
    }

    /// Remove the token from memory and disk. Clearing an already-empty
    /// store is fine.
    pub async fn clear(&self) -> Result<()> {
        *self.current.write().await = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
