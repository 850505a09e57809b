//! Error taxonomy for configuration, profiles, providers, and consumers.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or incomplete configuration. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("configuration: missing {0}")]
    MissingSection(&'static str),

    #[error("configuration: profile \"{0}\" not found")]
    UnknownProfile(String),
}

/// A credential-provider call failed.
#[derive(Debug, Error)]
#[error("{operation} for user '{user}' failed: {message}")]
pub struct ProviderError {
    pub operation: &'static str,
    pub user: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(operation: &'static str, user: &str, message: impl Into<String>) -> Self {
        Self {
            operation,
            user: user.to_string(),
            message: message.into(),
        }
    }
}

/// A secret-store call failed for one consumer.
#[derive(Debug, Error)]
#[error("{operation} on '{consumer}' failed: {message}")]
pub struct ConsumerError {
    pub operation: &'static str,
    pub consumer: String,
    pub message: String,
}

impl ConsumerError {
    pub fn new(operation: &'static str, consumer: &str, message: impl Into<String>) -> Self {
        Self {
            operation,
            consumer: consumer.to_string(),
            message: message.into(),
        }
    }
}

/// Per-profile failure reported by the orchestrator.
#[derive(Debug, Error)]
pub enum RotateError {
    #[error("invalid profile: {0}")]
    ProfileValidation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Consumer(#[from] ConsumerError),
}

impl RotateError {
    /// Whether this error should turn the process exit status non-zero.
    pub fn is_hard(&self) -> bool {
        matches!(self, RotateError::Provider(_) | RotateError::Consumer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new("DeleteAccessKey", "ci", "throttled");
        assert_eq!(
            err.to_string(),
            "DeleteAccessKey for user 'ci' failed: throttled"
        );
    }

    #[test]
    fn test_hard_errors() {
        assert!(RotateError::from(ProviderError::new("ListAccessKeys", "ci", "x")).is_hard());
        assert!(RotateError::from(ConsumerError::new("upsert secret", "o/r", "x")).is_hard());
        assert!(!RotateError::ProfileValidation("missing user".into()).is_hard());
    }
}
