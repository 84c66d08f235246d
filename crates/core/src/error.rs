//! Error types for Mitra Core

use thiserror::Error;

use crate::validation::ValidationReport;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid password. Please try again.")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Conflicting update: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
