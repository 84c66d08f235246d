//! Mitra Core Library
//!
//! User records, sessions, slot storage, validation and the authentication
//! flows behind the Study Mitra login and signup screens.

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod invariants;
pub mod models;
pub mod notice;
pub mod providers;
pub mod record_store;
pub mod storage;
pub mod strength;
pub mod validation;

pub use auth::{AuthOutcome, AuthService};
pub use config::MitraConfig;
pub use error::{Error, Result};
pub use models::*;
pub use notice::{Notice, Severity};
pub use providers::{Page, SocialProvider};
pub use record_store::{DataExport, RecordStore};
pub use storage::{KeyValueStore, MemorySlot, SqliteSlot, SESSION_SLOT, USERS_SLOT};
pub use strength::StrengthTier;
pub use validation::{Field, Issue, LoginForm, Rules, SignupForm, ValidationReport};
