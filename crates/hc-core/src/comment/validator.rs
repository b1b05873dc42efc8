//! Comment validation

use super::model::Comment;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Minimum author name length, in characters
pub const MIN_NAME_LENGTH: usize = 3;

/// Maximum author name length, in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// Base error when the owner does not accept comments
pub const CLOSED_MESSAGE: &str = "You cannot comment on this object.";

/// Base error when the author may not comment on the owner
pub const UNAUTHORISED_MESSAGE: &str = "You are not allowed to comment on this object.";

/// Base error when a positive spam verdict rejects the comment
pub const SPAM_MESSAGE: &str = "Your comment was classified as spam.";

const BLANK: &str = "can't be blank";
const INVALID: &str = "is invalid";

/// Dot-atom or quoted local part, then a hostname or a domain literal.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let atom = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+";
    let quoted = r#""(?:[^"\\\r\n]|\\.)*""#;
    let label = r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?";
    let literal = r"\[[^\[\]\\\r\n]*\]";
    let pattern = format!(
        r"^(?:{atom}(?:\.{atom})*|{quoted})@(?:{label}(?:\.{label})*|{literal})$"
    );
    Regex::new(&pattern).expect("email pattern compiles")
});

/// Attribute a violation is reported against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Not tied to a single attribute (policy failures)
    Base,
    Body,
    Name,
    Email,
    Url,
    Owner,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Base => "base",
            Field::Body => "body",
            Field::Name => "name",
            Field::Email => "email",
            Field::Url => "url",
            Field::Owner => "commentable",
        };
        write!(f, "{}", name)
    }
}

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: Field,
    pub message: String,
}

impl Violation {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Violation not tied to a single attribute
    pub fn base(message: impl Into<String>) -> Self {
        Self::new(Field::Base, message)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Field::Base => write!(f, "{}", self.message),
            field => write!(f, "{} {}", field, self.message),
        }
    }
}

/// Every rule a comment failed, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// All violations
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The violation that governs the primary reported error
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// Messages reported against one field
    pub fn on(&self, field: Field) -> Vec<&str> {
        self.violations
            .iter()
            .filter(|v| v.field == field)
            .map(|v| v.message.as_str())
            .collect()
    }

    /// Messages not tied to a single attribute
    pub fn base(&self) -> Vec<&str> {
        self.on(Field::Base)
    }

    /// `Ok(())` when nothing failed
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<Violation>> for ValidationErrors {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Validator for comment attributes
///
/// Covers the attribute rules only. Owner policies (open, authorisation)
/// are evaluated by the manager, which appends their base violations.
pub struct CommentValidator {
    min_name_length: usize,
    max_name_length: usize,
}

impl CommentValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            min_name_length: MIN_NAME_LENGTH,
            max_name_length: MAX_NAME_LENGTH,
        }
    }

    /// Validate all attribute rules, collecting every violation
    pub fn validate(&self, comment: &Comment) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if is_blank(Some(&comment.body)) {
            errors.add(Violation::new(Field::Body, BLANK));
        }

        if !comment.owner.is_complete() {
            errors.add(Violation::new(Field::Owner, BLANK));
        }

        if comment.user_id.is_none() {
            if is_blank(comment.name.as_deref()) {
                errors.add(Violation::new(Field::Name, BLANK));
            }
            if is_blank(comment.email.as_deref()) {
                errors.add(Violation::new(Field::Email, BLANK));
            }
        }

        if let Some(name) = present(comment.name.as_deref()) {
            if let Err(message) = self.validate_name(name) {
                errors.add(Violation::new(Field::Name, message));
            }
        }

        if let Some(email) = present(comment.email.as_deref()) {
            if !is_valid_email(email) {
                errors.add(Violation::new(Field::Email, INVALID));
            }
        }

        if let Some(url) = present(comment.url.as_deref()) {
            if !is_valid_url(url) {
                errors.add(Violation::new(Field::Url, INVALID));
            }
        }

        errors
    }

    /// Validate author name length
    pub fn validate_name(&self, name: &str) -> std::result::Result<(), String> {
        let length = name.chars().count();
        if length < self.min_name_length {
            return Err(format!(
                "is too short (minimum is {} characters)",
                self.min_name_length
            ));
        }
        if length > self.max_name_length {
            return Err(format!(
                "is too long (maximum is {} characters)",
                self.max_name_length
            ));
        }
        Ok(())
    }
}

impl Default for CommentValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check an address against the e-mail grammar
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Check for an absolute http(s) URL with a host
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().map(|h| !h.is_empty()).unwrap_or(false)
        }
        Err(_) => false,
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
