//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Provider, UserRecord};
use crate::error::{Error, Result};

/// The single active session of this application instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: Provider,
    pub login_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Session for `user` issued at `issued_at`. The lifetime must be
    /// positive and the expiry representable.
    pub fn for_user(user: &UserRecord, issued_at: DateTime<Utc>, ttl: Duration) -> Result<Self> {
        if ttl <= Duration::zero() {
            return Err(Error::InvalidConfig(format!(
                "session lifetime must be positive, got {ttl}"
            )));
        }
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            Error::InvalidConfig(format!("session lifetime {ttl} overflows the clock"))
        })?;

        Ok(Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            provider: user.provider,
            login_time: issued_at,
            expires_at,
        })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
