//! Per-owner-type commenting options

use crate::policy::PolicyRule;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default for [`CommentableOptions::authorisation`]: everyone may comment
pub const DEFAULT_AUTHORISATION: bool = true;

/// Default for [`CommentableOptions::open`]
pub const DEFAULT_OPEN: bool = true;

/// Whether new comments wait for a moderator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequireApproval {
    /// Every comment starts pending
    Always,
    /// Every comment is approved on creation
    Never,
    /// Repeat commenters are approved, first-timers wait
    #[default]
    Auto,
}

impl RequireApproval {
    /// Short config form (`true`, `false`, `auto`)
    pub fn as_str(&self) -> &'static str {
        match self {
            RequireApproval::Always => "true",
            RequireApproval::Never => "false",
            RequireApproval::Auto => "auto",
        }
    }
}

impl fmt::Display for RequireApproval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for RequireApproval {
    fn from(required: bool) -> Self {
        if required {
            RequireApproval::Always
        } else {
            RequireApproval::Never
        }
    }
}

impl Serialize for RequireApproval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RequireApproval::Always => serializer.serialize_bool(true),
            RequireApproval::Never => serializer.serialize_bool(false),
            RequireApproval::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for RequireApproval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RequireApprovalVisitor;

        impl<'de> Visitor<'de> for RequireApprovalVisitor {
            type Value = RequireApproval;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("true, false or \"auto\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
                Ok(RequireApproval::from(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                match v {
                    "auto" => Ok(RequireApproval::Auto),
                    "true" => Ok(RequireApproval::Always),
                    "false" => Ok(RequireApproval::Never),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(RequireApprovalVisitor)
    }
}

/// How an owner type accepts comments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentableOptions {
    /// Whether the owner accepts comments at all
    pub open: PolicyRule,
    /// Moderation mode for new comments
    pub require_approval: RequireApproval,
    /// Ask the spam checker about every new comment
    pub check_spam: bool,
    /// Refuse comments the spam checker flags instead of only recording it
    pub reject_on_spam: bool,
    /// Whether a given author may comment
    pub authorisation: PolicyRule,
}

impl Default for CommentableOptions {
    fn default() -> Self {
        Self {
            open: PolicyRule::Literal(DEFAULT_OPEN),
            require_approval: RequireApproval::Auto,
            check_spam: false,
            reject_on_spam: false,
            authorisation: PolicyRule::Literal(DEFAULT_AUTHORISATION),
        }
    }
}

impl CommentableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self, rule: impl Into<PolicyRule>) -> Self {
        self.open = rule.into();
        self
    }

    pub fn require_approval(mut self, mode: RequireApproval) -> Self {
        self.require_approval = mode;
        self
    }

    pub fn check_spam(mut self, check: bool) -> Self {
        self.check_spam = check;
        self
    }

    pub fn reject_on_spam(mut self, reject: bool) -> Self {
        self.reject_on_spam = reject;
        self
    }

    pub fn authorisation(mut self, rule: impl Into<PolicyRule>) -> Self {
        self.authorisation = rule.into();
        self
    }
}
