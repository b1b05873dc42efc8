//! Error types for the Akismet client

use hc_core::SpamCheckError;
use thiserror::Error;

/// Errors raised while talking to the spam service
#[derive(Debug, Error)]
pub enum AkismetError {
    #[error("Akismet key is not configured")]
    MissingKey,

    #[error("Akismet blog URL is not configured")]
    MissingBlog,

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Unexpected response {body:?}{}", format_help(.help))]
    UnexpectedResponse { body: String, help: Option<String> },
}

fn format_help(help: &Option<String>) -> String {
    match help {
        Some(help) => format!(" ({help})"),
        None => String::new(),
    }
}

impl AkismetError {
    /// Classify a transport error, separating timeouts from everything else
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AkismetError::Timeout
        } else {
            AkismetError::Http(err)
        }
    }
}

impl From<AkismetError> for SpamCheckError {
    fn from(err: AkismetError) -> Self {
        match err {
            AkismetError::MissingKey | AkismetError::MissingBlog => {
                SpamCheckError::NotConfigured(err.to_string())
            }
            AkismetError::Timeout => SpamCheckError::Timeout,
            AkismetError::Http(e) if e.is_timeout() => SpamCheckError::Timeout,
            AkismetError::Http(e) => SpamCheckError::Transport(e.to_string()),
            AkismetError::Status(_) => SpamCheckError::Transport(err.to_string()),
            AkismetError::UnexpectedResponse { .. } => {
                SpamCheckError::InvalidResponse(err.to_string())
            }
        }
    }
}
