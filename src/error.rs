// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Argon2 hashing failed: {0}")]
    Argon2(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Validation failures surfaced to the admin as a blocking popup.
/// The `Display` text is exactly what the popup shows.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FormError {
    #[error("Please enter both username and password")]
    MissingCredentials,
    #[error("Please fill in all fields")]
    MissingPasswordFields,
    #[error("New password must be at least {0} characters long")]
    PasswordTooShort(usize),
    #[error("New passwords do not match")]
    PasswordMismatch,
    #[error("New password must be different from current password")]
    PasswordUnchanged,
    #[error("Please enter a valid number of days")]
    InvalidDays,
    #[error("Subscription days cannot be negative")]
    NegativeDays,
    #[error("Please enter a message")]
    EmptyMessage,
    #[error("Please fill in all required fields")]
    MissingClientFields,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
    #[error("CLI error: {0}")]
    Cli(String),
}

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
pub type CryptoResult<T> = Result<T, CryptoError>;
pub type FormResult<T> = Result<T, FormError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
