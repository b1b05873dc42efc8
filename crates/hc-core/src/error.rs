//! Error types for has-comments

use crate::comment::ValidationErrors;
use thiserror::Error;

/// Main error type for has-comments
#[derive(Debug, Error)]
pub enum HasCommentsError {
    /// One or more validation rules failed; nothing was written
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Persistence layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Comment not found
    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    /// A moderation call named an owner the comment does not belong to
    #[error("Comment {comment} belongs to {owner}, not {given}")]
    OwnerMismatch {
        comment: String,
        owner: String,
        given: String,
    },

    /// A policy rule names a predicate the owner does not provide
    #[error("Unknown policy method '{method}' on {owner_type}")]
    UnknownPolicyMethod { owner_type: String, method: String },

    /// Spam checking service error
    #[error("Spam service error: {0}")]
    Service(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<HasCommentsError>,
    },
}

impl HasCommentsError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        HasCommentsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Violations carried by this error, looking through context wrappers
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            HasCommentsError::Validation(errors) => Some(errors),
            HasCommentsError::WithContext { source, .. } => source.violations(),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for HasCommentsError {
    fn from(errors: ValidationErrors) -> Self {
        HasCommentsError::Validation(errors)
    }
}

impl From<toml::de::Error> for HasCommentsError {
    fn from(err: toml::de::Error) -> Self {
        HasCommentsError::Toml(err.to_string())
    }
}

/// Result type alias for has-comments
pub type Result<T> = std::result::Result<T, HasCommentsError>;
