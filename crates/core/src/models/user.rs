//! User record model

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const ID_PREFIX: &str = "user_";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Origin of an identity assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Email and password form
    #[default]
    Manual,
    Google,
    Facebook,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Manual => "manual",
            Provider::Google => "google",
            Provider::Facebook => "facebook",
        }
    }

    /// Human-readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Manual => "Email",
            Provider::Google => "Google",
            Provider::Facebook => "Facebook",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(Provider::Manual),
            "google" => Ok(Provider::Google),
            "facebook" => Ok(Provider::Facebook),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// A stored user account
///
/// Serialized with camelCase keys into the durable slot. Fields missing from
/// older payloads fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    /// Argon2 PHC string, absent for social accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    #[serde(default)]
    pub login_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub agreed_to_terms: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreed_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Build a first-time record from a save payload
    pub fn from_patch(id: String, patch: UserPatch, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id,
            email: patch.email.clone(),
            name: String::new(),
            password_hash: None,
            provider: Provider::Manual,
            provider_id: None,
            avatar: None,
            verified: false,
            created_at: now,
            last_login: now,
            login_count: 1,
            phone: None,
            agreed_to_terms: false,
            agreed_at: None,
        };
        record.merge(patch);
        record
    }

    /// Shallow-merge the fields present in `patch`. Nothing is ever cleared.
    pub fn merge(&mut self, patch: UserPatch) {
        self.email = patch.email;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(hash) = patch.password_hash {
            self.password_hash = Some(hash);
        }
        if let Some(provider) = patch.provider {
            self.provider = provider;
        }
        if let Some(provider_id) = patch.provider_id {
            self.provider_id = Some(provider_id);
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(verified) = patch.verified {
            self.verified = verified;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(agreed) = patch.agreed_to_terms {
            self.agreed_to_terms = agreed;
        }
        if let Some(agreed_at) = patch.agreed_at {
            self.agreed_at = Some(agreed_at);
        }
    }

    /// Case-insensitive email comparison
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

/// Payload for a save: the email keys the record, everything else is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub provider: Option<Provider>,
    pub provider_id: Option<String>,
    pub avatar: Option<String>,
    pub verified: Option<bool>,
    pub phone: Option<String>,
    pub agreed_to_terms: Option<bool>,
    pub agreed_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

/// Generate a best-effort unique user id: `user_<millis>_<9 base36 chars>`
pub fn generate_user_id(now: DateTime<Utc>) -> String {
    format!("{}{}_{}", ID_PREFIX, now.timestamp_millis(), random_base36(9))
}

/// Random lowercase base36 string of `len` characters
pub fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
