//! Blocking Akismet REST client

use crate::error::AkismetError;
use crate::params::comment_params;
use hc_core::config::AkismetConfig;
use hc_core::{Comment, RequestContext, SpamCheckError, SpamChecker};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};

/// User agent announced to the service
pub const USER_AGENT: &str = concat!("has-comments/", env!("CARGO_PKG_VERSION"), " | hc-akismet");

const DEBUG_HELP_HEADER: &str = "x-akismet-debug-help";
const PRO_TIP_HEADER: &str = "x-akismet-pro-tip";
const SUBMIT_ACK: &str = "Thanks for making the web a better place.";

/// Outcome of `verify-key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Valid,
    Invalid,
}

/// Raw answer from one call
#[derive(Debug)]
struct Reply {
    body: String,
    help: Option<String>,
    pro_tip: Option<String>,
}

/// Client for the Akismet REST API
#[derive(Debug, Clone)]
pub struct AkismetClient {
    http: Client,
    key: String,
    blog: String,
    endpoint: String,
}

impl AkismetClient {
    /// Create a client; every call is bounded by `timeout`
    pub fn new(
        key: impl Into<String>,
        blog: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AkismetError> {
        let key = key.into();
        let blog = blog.into();
        if key.trim().is_empty() {
            return Err(AkismetError::MissingKey);
        }
        if blog.trim().is_empty() {
            return Err(AkismetError::MissingBlog);
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            key,
            blog,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `[akismet]` config section
    pub fn from_config(config: &AkismetConfig) -> Result<Self, AkismetError> {
        Self::new(
            config.key.clone(),
            config.blog.clone(),
            config.endpoint.clone(),
            config.timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, action: &str) -> String {
        format!("{}/{}", self.endpoint, action)
    }

    fn call(&self, action: &str, form: &[(&'static str, String)]) -> Result<Reply, AkismetError> {
        debug!(action, endpoint = %self.endpoint, "Calling spam service");

        let response = self
            .http
            .post(self.url(action))
            .form(form)
            .send()
            .map_err(AkismetError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AkismetError::Status(status.as_u16()));
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let help = header(DEBUG_HELP_HEADER);
        let pro_tip = header(PRO_TIP_HEADER);
        let body = response.text().map_err(AkismetError::from_transport)?;

        Ok(Reply {
            body: body.trim().to_string(),
            help,
            pro_tip,
        })
    }

    fn comment_call(
        &self,
        action: &str,
        comment: &Comment,
        request: &RequestContext,
    ) -> Result<Reply, AkismetError> {
        let form = comment_params(&self.blog, comment, request).to_form(&self.key);
        self.call(action, &form)
    }

    /// Ask the service whether `comment` is spam
    pub fn comment_check(
        &self,
        comment: &Comment,
        request: &RequestContext,
    ) -> Result<bool, AkismetError> {
        let reply = self.comment_call("comment-check", comment, request)?;
        if let Some(tip) = &reply.pro_tip {
            debug!(comment_id = %comment.id, tip = %tip, "Spam service pro tip");
        }
        parse_check(reply)
    }

    /// Report a missed spam comment
    pub fn submit_spam(
        &self,
        comment: &Comment,
        request: &RequestContext,
    ) -> Result<(), AkismetError> {
        let reply = self.comment_call("submit-spam", comment, request)?;
        parse_submit(reply)?;
        info!(comment_id = %comment.id, "Reported spam");
        Ok(())
    }

    /// Report a false positive
    pub fn submit_ham(
        &self,
        comment: &Comment,
        request: &RequestContext,
    ) -> Result<(), AkismetError> {
        let reply = self.comment_call("submit-ham", comment, request)?;
        parse_submit(reply)?;
        info!(comment_id = %comment.id, "Reported ham");
        Ok(())
    }

    /// Check the configured key against the configured blog
    pub fn verify_key(&self) -> Result<KeyStatus, AkismetError> {
        let form = [
            ("api_key", self.key.clone()),
            ("blog", self.blog.clone()),
        ];
        parse_verify(self.call("verify-key", &form)?)
    }
}

fn unexpected(reply: Reply) -> AkismetError {
    AkismetError::UnexpectedResponse {
        body: reply.body,
        help: reply.help,
    }
}

fn parse_check(reply: Reply) -> Result<bool, AkismetError> {
    match reply.body.as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(unexpected(reply)),
    }
}

fn parse_submit(reply: Reply) -> Result<(), AkismetError> {
    if reply.body == SUBMIT_ACK {
        Ok(())
    } else {
        Err(unexpected(reply))
    }
}

fn parse_verify(reply: Reply) -> Result<KeyStatus, AkismetError> {
    match reply.body.as_str() {
        "valid" => Ok(KeyStatus::Valid),
        "invalid" => Ok(KeyStatus::Invalid),
        _ => Err(unexpected(reply)),
    }
}

impl SpamChecker for AkismetClient {
    fn is_spam(&self, comment: &Comment, request: &RequestContext) -> Result<bool, SpamCheckError> {
        Ok(self.comment_check(comment, request)?)
    }

    fn report_spam(
        &self,
        comment: &Comment,
        request: &RequestContext,
    ) -> Result<(), SpamCheckError> {
        Ok(self.submit_spam(comment, request)?)
    }

    fn report_ham(&self, comment: &Comment, request: &RequestContext) -> Result<(), SpamCheckError> {
        Ok(self.submit_ham(comment, request)?)
    }
}
