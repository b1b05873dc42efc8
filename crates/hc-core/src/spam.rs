//! Spam checking contract
//!
//! The manager talks to an external classification service through
//! [`SpamChecker`]. Details of the inbound request travel explicitly in a
//! [`RequestContext`].

use crate::comment::Comment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Details of the HTTP request that submitted a comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestContext {
    pub user_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl RequestContext {
    pub fn new(user_ip: impl Into<String>) -> Self {
        Self {
            user_ip: Some(user_ip.into()),
            ..Self::default()
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }
}

/// Failure talking to the spam service
#[derive(Debug, Error)]
pub enum SpamCheckError {
    /// The call did not finish in time
    #[error("spam service timed out")]
    Timeout,

    /// Network or HTTP failure
    #[error("spam service unreachable: {0}")]
    Transport(String),

    /// The service answered with something unexpected
    #[error("unexpected spam service response: {0}")]
    InvalidResponse(String),

    /// Missing or rejected credentials
    #[error("spam service not configured: {0}")]
    NotConfigured(String),
}

impl From<SpamCheckError> for crate::HasCommentsError {
    fn from(err: SpamCheckError) -> Self {
        crate::HasCommentsError::Service(err.to_string())
    }
}

/// Client of an external spam classification service
pub trait SpamChecker: Send + Sync {
    /// Classify a candidate comment
    fn is_spam(&self, comment: &Comment, request: &RequestContext)
        -> Result<bool, SpamCheckError>;

    /// Tell the service a comment was spam it missed
    fn report_spam(&self, comment: &Comment, request: &RequestContext)
        -> Result<(), SpamCheckError>;

    /// Tell the service a comment it flagged was legitimate
    fn report_ham(&self, comment: &Comment, request: &RequestContext)
        -> Result<(), SpamCheckError>;
}

/// Spam checker used when no service is configured: nothing is spam
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpamChecker;

impl SpamChecker for NullSpamChecker {
    fn is_spam(&self, _: &Comment, _: &RequestContext) -> Result<bool, SpamCheckError> {
        Ok(false)
    }

    fn report_spam(&self, _: &Comment, _: &RequestContext) -> Result<(), SpamCheckError> {
        Ok(())
    }

    fn report_ham(&self, _: &Comment, _: &RequestContext) -> Result<(), SpamCheckError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentBuilder;
    use crate::types::OwnerRef;

    #[test]
    fn test_request_context_builder() {
        let request = RequestContext::new("127.0.0.1")
            .user_agent("curl/8.0")
            .referrer("http://example.com/posts/1");
        assert_eq!(request.user_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(request.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(request.referrer.as_deref(), Some("http://example.com/posts/1"));
    }

    #[test]
    fn test_null_checker() {
        let comment = CommentBuilder::new(OwnerRef::new("Post", 1))
            .body("Buy now")
            .build();
        let checker = NullSpamChecker;
        assert!(!checker.is_spam(&comment, &RequestContext::default()).unwrap());
        assert!(checker.report_spam(&comment, &RequestContext::default()).is_ok());
    }

    #[test]
    fn test_error_conversion() {
        let err: crate::HasCommentsError = SpamCheckError::Timeout.into();
        assert_eq!(err.to_string(), "Spam service error: spam service timed out");
    }
}
