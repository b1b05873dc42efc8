//! Comment input and builder for fluent API

use super::model::Comment;
use crate::types::{CommentId, OwnerRef, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Submitted comment content, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewComment {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub body: String,
    pub user_id: Option<UserId>,
}

impl NewComment {
    /// Turn the input into a pending, non-spam comment owned by `owner`
    pub fn into_comment(self, owner: OwnerRef) -> Comment {
        let now = Utc::now();
        Comment {
            id: CommentId::new(),
            name: self.name,
            email: self.email,
            url: self.url,
            body: self.body,
            user_id: self.user_id,
            owner,
            approved_at: None,
            spam: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Builder for comment input with fluent API
#[derive(Debug, Default)]
pub struct CommentBuilder {
    owner: Option<OwnerRef>,
    input: NewComment,
}

impl CommentBuilder {
    /// Create a new builder for a comment on `owner`
    pub fn new(owner: OwnerRef) -> Self {
        Self {
            owner: Some(owner),
            input: NewComment::default(),
        }
    }

    /// Create a builder without an owner; the manager supplies it
    pub fn input() -> Self {
        Self::default()
    }

    /// Set the comment text
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.input.body = body.into();
        self
    }

    /// Set the author name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.input.name = Some(name.into());
        self
    }

    /// Set the author e-mail
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.input.email = Some(email.into());
        self
    }

    /// Set the author website
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.input.url = Some(url.into());
        self
    }

    /// Set the authenticated author
    pub fn user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.input.user_id = Some(user_id.into());
        self
    }

    /// Public author shortcut: name, e-mail and optional website
    pub fn public_author(
        self,
        name: impl Into<String>,
        email: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        let mut builder = self.name(name).email(email);
        builder.input.url = url;
        builder
    }

    /// The submitted content, for [`CommentManager::create`](super::CommentManager::create)
    pub fn into_input(self) -> NewComment {
        self.input
    }

    /// Build the comment directly, without validation or policies
    ///
    /// Owners default to an empty reference when none was given, which the
    /// validator rejects.
    pub fn build(self) -> Comment {
        let owner = self.owner.unwrap_or_else(|| OwnerRef::new("", ""));
        self.input.into_comment(owner)
    }
}
