//! Core error types for studyx-core.
//!
//! Failures are grouped the way they surface to a user: authentication,
//! store queries/writes, and input validation. None of them is fatal; every
//! error is scoped to the action that triggered it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyx-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Authentication gateway failures
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Document store failures
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A write the current user is not allowed to make, caught locally.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CoreError {
    /// Short message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Auth(AuthError::NotSignedIn) => "Please login again".to_string(),
            CoreError::Auth(e) => e.to_string(),
            CoreError::Store(StoreError::PermissionDenied { .. }) => {
                "Permission denied. Check access rules.".to_string()
            }
            CoreError::Store(StoreError::NotFound { .. }) => {
                "Not found or already deleted".to_string()
            }
            CoreError::Store(e) => format!("Error: {e}"),
            CoreError::Validation(e) => e.to_string(),
            CoreError::Unauthorized(what) => format!("Cannot {what}: Unauthorized"),
            other => format!("Error: {other}"),
        }
    }
}

/// Authentication gateway errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredential,

    /// Password rejected by the identity backend
    #[error("Password is too weak (minimum {min_len} characters)")]
    WeakPassword { min_len: usize },

    /// Sign-up with an address that already has an account
    #[error("An account already exists for {0}")]
    EmailInUse(String),

    /// Operation requires a signed-in user
    #[error("Not signed in")]
    NotSignedIn,

    /// Backend unreachable or failed
    #[error("Authentication backend failed: {0}")]
    Backend(String),
}

/// Document store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Rejected by the store's access rules
    #[error("Permission denied on {collection}: {reason}")]
    PermissionDenied { collection: String, reason: String },

    /// Document does not exist
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Transient failure; the caller may try again later
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Backend failure
    #[error("Backend failure: {0}")]
    Backend(String),

    /// Stored document could not be decoded/encoded
    #[error("Document codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        AuthError::Backend(err.to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Backend(err.to_string())
    }
}

/// Validation errors, reported inline against the offending input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required input left empty
    #[error("{field} is required")]
    Required { field: String },

    /// Email address does not look like one
    #[error("Please enter a valid email")]
    InvalidEmail,

    /// Password below the minimum length
    #[error("Password must be at least {min_len} characters")]
    PasswordTooShort { min_len: usize },

    /// Confirmation differs from password
    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    /// Name of the input this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field } => field,
            ValidationError::InvalidEmail => "email",
            ValidationError::PasswordTooShort { .. } => "password",
            ValidationError::PasswordMismatch => "confirm_password",
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key not present in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_short() {
        let err = CoreError::from(StoreError::NotFound {
            collection: "tasks".into(),
            id: "t1".into(),
        });
        assert_eq!(err.user_message(), "Not found or already deleted");

        let err = CoreError::from(AuthError::NotSignedIn);
        assert_eq!(err.user_message(), "Please login again");

        let err = CoreError::Unauthorized("delete task".into());
        assert_eq!(err.user_message(), "Cannot delete task: Unauthorized");

        let err = CoreError::from(ConfigError::UnknownKey("timer.x".into()));
        assert!(err.user_message().starts_with("Error: Configuration error"));
    }

    #[test]
    fn validation_error_names_field() {
        assert_eq!(ValidationError::required("title").field(), "title");
        assert_eq!(ValidationError::PasswordMismatch.field(), "confirm_password");
        assert_eq!(
            ValidationError::required("Title").to_string(),
            "Title is required"
        );
    }
}
