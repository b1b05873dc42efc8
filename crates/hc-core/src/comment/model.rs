//! Comment data models

use crate::types::{CommentId, OwnerRef, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment attached to a commentable owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier
    pub id: CommentId,
    /// Author name (public users)
    #[serde(default)]
    pub name: Option<String>,
    /// Author e-mail (public users)
    #[serde(default)]
    pub email: Option<String>,
    /// Author website
    #[serde(default)]
    pub url: Option<String>,
    /// Comment text
    pub body: String,
    /// Authenticated author (registered users)
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Owner of this comment
    pub owner: OwnerRef,
    /// When the comment was approved; `None` while pending
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Spam flag, independent of approval
    #[serde(default)]
    pub spam: bool,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
    /// When the comment was last changed
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Mark as approved. Keeps the first approval time.
    ///
    /// Returns `true` if the approval state changed.
    pub fn approve(&mut self) -> bool {
        if self.approved_at.is_some() {
            return false;
        }
        let now = Utc::now();
        self.approved_at = Some(now);
        self.updated_at = now;
        true
    }

    /// Return to pending. Returns `true` if the approval state changed.
    pub fn unapprove(&mut self) -> bool {
        if self.approved_at.take().is_none() {
            return false;
        }
        self.updated_at = Utc::now();
        true
    }

    /// Approve or unapprove from a form-style toggle
    pub fn set_approved(&mut self, approved: bool) -> bool {
        if approved {
            self.approve()
        } else {
            self.unapprove()
        }
    }

    /// Set the spam flag. Returns `true` if the flag changed.
    pub fn set_spam(&mut self, spam: bool) -> bool {
        if self.spam == spam {
            return false;
        }
        self.spam = spam;
        self.updated_at = Utc::now();
        true
    }

    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }

    pub fn is_spam(&self) -> bool {
        self.spam
    }

    /// Current moderation state
    pub fn state(&self) -> ModerationState {
        if self.is_approved() {
            ModerationState::Approved
        } else {
            ModerationState::Pending
        }
    }

    /// Whether the author is an authenticated user
    pub fn is_registered_user(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether the author supplied both a name and an e-mail address
    pub fn is_public_user(&self) -> bool {
        self.name.is_some() && self.email.is_some()
    }

    /// The attributes that identify who wrote this comment
    pub fn identity(&self) -> Option<Identity> {
        if let Some(user_id) = self.user_id {
            return Some(Identity::Registered(user_id));
        }
        match (&self.name, &self.email) {
            (Some(name), Some(email)) => Some(Identity::Public {
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }
}

/// Who wrote a comment, as used for repeat-commenter lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// Authenticated user
    Registered(UserId),
    /// Anonymous author identified by name and e-mail
    Public { name: String, email: String },
}

impl Identity {
    /// Check whether a stored comment was written by this identity
    pub fn matches(&self, comment: &Comment) -> bool {
        match self {
            Identity::Registered(user_id) => comment.user_id == Some(*user_id),
            Identity::Public { name, email } => {
                comment.name.as_deref() == Some(name.as_str())
                    && comment.email.as_deref() == Some(email.as_str())
            }
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Registered(user_id) => write!(f, "user {}", user_id),
            Identity::Public { name, email } => write!(f, "{} <{}>", name, email),
        }
    }
}

/// Approval state of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationState {
    /// Waiting for approval
    Pending,
    /// Visible
    Approved,
}

impl std::fmt::Display for ModerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationState::Pending => write!(f, "pending"),
            ModerationState::Approved => write!(f, "approved"),
        }
    }
}

/// Which of an owner's comments to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommentScope {
    #[default]
    All,
    Approved,
    Pending,
}

impl CommentScope {
    /// Check if a comment falls in this scope
    pub fn includes(&self, comment: &Comment) -> bool {
        match self {
            CommentScope::All => true,
            CommentScope::Approved => comment.is_approved(),
            CommentScope::Pending => !comment.is_approved(),
        }
    }
}

/// Sort comments newest first, breaking ties by latest approval
pub fn sort_by_recency(comments: &mut [Comment]) {
    comments.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.approved_at.cmp(&a.approved_at))
    });
}
