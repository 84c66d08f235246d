//! Application configuration
//!
//! Loaded from `mitra.toml` in the platform config directory. Every key is
//! optional; a missing file means all defaults.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "mitra.toml";

/// Accepted values of `session_ttl_days`
pub const SESSION_TTL_DAYS: RangeInclusive<i64> = 1..=3650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitraConfig {
    /// Session lifetime from issuance
    pub session_ttl_days: i64,
    pub min_password_len: usize,
    /// Simulated latency of the login form
    pub login_delay_ms: u64,
    /// Simulated latency of the signup form
    pub signup_delay_ms: u64,
    /// Simulated latency of Google/Facebook sign-in
    pub social_delay_ms: u64,
    /// Pause between a notice and navigation
    pub redirect_delay_ms: u64,
    /// Pause after an account is created from the signup page
    pub signup_redirect_delay_ms: u64,
    pub toast_timeout_ms: u64,
    /// Durable slot database, relative to the data directory
    pub database_file: String,
}

impl Default for MitraConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: 7,
            min_password_len: 6,
            login_delay_ms: 1500,
            signup_delay_ms: 2000,
            social_delay_ms: 2000,
            redirect_delay_ms: 1500,
            signup_redirect_delay_ms: 2000,
            toast_timeout_ms: 5000,
            database_file: "mitra.db".to_string(),
        }
    }
}

impl MitraConfig {
    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<()> {
        if !SESSION_TTL_DAYS.contains(&self.session_ttl_days) {
            return Err(Error::InvalidConfig(format!(
                "session_ttl_days must be between {} and {}, got {}",
                SESSION_TTL_DAYS.start(),
                SESSION_TTL_DAYS.end(),
                self.session_ttl_days
            )));
        }
        Ok(())
    }

    /// Load from a file, falling back to defaults when it does not exist
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from the platform config directory
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn session_ttl(&self) -> Result<chrono::Duration> {
        self.validate()?;
        chrono::Duration::try_days(self.session_ttl_days).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "session_ttl_days {} is out of range",
                self.session_ttl_days
            ))
        })
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn signup_delay(&self) -> Duration {
        Duration::from_millis(self.signup_delay_ms)
    }

    pub fn social_delay(&self) -> Duration {
        Duration::from_millis(self.social_delay_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn signup_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.signup_redirect_delay_ms)
    }

    pub fn toast_timeout(&self) -> Duration {
        Duration::from_millis(self.toast_timeout_ms)
    }

    /// Full path of the durable slot database inside `data_dir`
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "studymitra", "mitra").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine home directory",
            ))
        })
    }

    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().to_path_buf())
    }

    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }
}
