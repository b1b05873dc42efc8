//! Comment manager: creation, moderation and counter caches

use super::builder::NewComment;
use super::model::{Comment, CommentScope};
use super::validator::{
    CommentValidator, ValidationErrors, Violation, CLOSED_MESSAGE, SPAM_MESSAGE,
    UNAUTHORISED_MESSAGE,
};
use crate::commentable::Commentable;
use crate::error::{HasCommentsError, Result};
use crate::options::RequireApproval;
use crate::spam::{NullSpamChecker, RequestContext, SpamChecker};
use crate::store::{poisoned, CommentStore};
use crate::types::{CommentId, OwnerRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Settings shared by every owner type
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagerSettings {
    /// Record a spam verdict when the spam service cannot answer
    pub inconclusive_as_spam: bool,
}

/// Lifecycle engine for comments
///
/// Holds no per-request state; one manager can serve concurrent requests.
/// Counter cache recomputation is serialized per owner.
pub struct CommentManager {
    store: Arc<dyn CommentStore>,
    spam_checker: Arc<dyn SpamChecker>,
    validator: CommentValidator,
    settings: ManagerSettings,
    owner_locks: Mutex<HashMap<OwnerRef, Arc<Mutex<()>>>>,
}

impl CommentManager {
    /// Create a manager without a spam service
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self::with_spam_checker(store, Arc::new(NullSpamChecker))
    }

    /// Create a manager backed by a spam service
    pub fn with_spam_checker(
        store: Arc<dyn CommentStore>,
        spam_checker: Arc<dyn SpamChecker>,
    ) -> Self {
        Self {
            store,
            spam_checker,
            validator: CommentValidator::new(),
            settings: ManagerSettings::default(),
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the shared settings
    pub fn settings(mut self, settings: ManagerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn CommentStore> {
        &self.store
    }

    /// Run every validation rule, including the owner's policies
    pub fn validate(&self, input: &NewComment, commentable: &dyn Commentable) -> Result<ValidationErrors> {
        let candidate = input.clone().into_comment(commentable.owner_ref());
        self.validate_candidate(&candidate, commentable)
    }

    fn validate_candidate(
        &self,
        candidate: &Comment,
        commentable: &dyn Commentable,
    ) -> Result<ValidationErrors> {
        let mut errors = self.validator.validate(candidate);

        if !commentable.open_for_comments()?.is_truthy() {
            errors.add(Violation::base(CLOSED_MESSAGE));
        }
        if !commentable
            .authorised_for_comments(candidate.user_id)?
            .is_truthy()
        {
            errors.add(Violation::base(UNAUTHORISED_MESSAGE));
        }

        Ok(errors)
    }

    /// Create a comment on `commentable`
    ///
    /// Fails with [`HasCommentsError::Validation`](crate::HasCommentsError::Validation)
    /// listing every violated rule; nothing is stored in that case. Once
    /// the comment is stored the call succeeds; a failed counter recount
    /// is only logged.
    pub fn create(
        &self,
        input: NewComment,
        commentable: &dyn Commentable,
        request: &RequestContext,
    ) -> Result<Comment> {
        let owner = commentable.owner_ref();
        let mut comment = input.into_comment(owner.clone());

        let errors = self.validate_candidate(&comment, commentable)?;
        if !errors.is_empty() {
            debug!("Rejected comment on {}: {}", owner, errors);
            return Err(errors.into());
        }

        let options = commentable.options();
        if options.check_spam {
            match self.spam_checker.is_spam(&comment, request) {
                Ok(true) if options.reject_on_spam => {
                    info!("Rejected spam comment on {}", owner);
                    return Err(ValidationErrors::from(vec![Violation::base(SPAM_MESSAGE)]).into());
                }
                Ok(verdict) => comment.spam = verdict,
                Err(e) => {
                    warn!("Spam check inconclusive for comment on {}: {}", owner, e);
                    comment.spam = self.settings.inconclusive_as_spam;
                }
            }
        }

        let approve = match commentable.auto_approve_comments() {
            RequireApproval::Never => true,
            RequireApproval::Always => false,
            RequireApproval::Auto => match comment.identity() {
                Some(identity) => self.store.exists_with_identity(&identity)?,
                None => false,
            },
        };
        if approve {
            comment.approve();
        }

        self.store.insert(&comment)?;
        debug!("Stored comment {} on {}", comment.id, owner);

        let recount = self.with_owner_lock(&owner, || {
            commentable.recalculate_comments_count(self.store.as_ref())?;
            if comment.is_approved() {
                commentable.recalculate_approved_count(self.store.as_ref())?;
            }
            Ok(())
        });
        if let Err(e) = recount {
            warn!("Stored comment {} but failed to recount {}: {}", comment.id, owner, e);
        }

        if comment.is_approved() {
            info!("Comment {} on {} approved on creation", comment.id, owner);
        }
        Ok(comment)
    }

    /// Load a comment by ID
    pub fn get(&self, id: &CommentId) -> Result<Comment> {
        self.store.get(id)
    }

    /// Approve a comment; approving twice keeps the first timestamp
    ///
    /// The change is applied to the stored record, so changes made through
    /// another copy of `comment` are kept.
    pub fn approve(&self, comment: Comment, commentable: &dyn Commentable) -> Result<Comment> {
        self.change_approval(&comment, commentable, true)
    }

    /// Return a comment to pending
    pub fn unapprove(&self, comment: Comment, commentable: &dyn Commentable) -> Result<Comment> {
        self.change_approval(&comment, commentable, false)
    }

    /// Flag a comment as spam and report it to the spam service
    pub fn mark_spam(&self, comment: Comment, request: &RequestContext) -> Result<Comment> {
        let (comment, changed) = self.change_spam(&comment, true)?;
        if !changed {
            debug!("Comment {} already marked as spam", comment.id);
            return Ok(comment);
        }
        match self.spam_checker.report_spam(&comment, request) {
            Ok(()) => info!("Submitted spam for comment {}", comment.id),
            Err(e) => warn!("Failed to submit spam for comment {}: {}", comment.id, e),
        }
        Ok(comment)
    }

    /// Clear a comment's spam flag and report it as ham
    pub fn mark_ham(&self, comment: Comment, request: &RequestContext) -> Result<Comment> {
        let (comment, changed) = self.change_spam(&comment, false)?;
        if !changed {
            debug!("Comment {} is not marked as spam", comment.id);
            return Ok(comment);
        }
        match self.spam_checker.report_ham(&comment, request) {
            Ok(()) => info!("Submitted ham for comment {}", comment.id),
            Err(e) => warn!("Failed to submit ham for comment {}: {}", comment.id, e),
        }
        Ok(comment)
    }

    /// An owner's comments, newest first
    pub fn list(&self, commentable: &dyn Commentable, scope: CommentScope) -> Result<Vec<Comment>> {
        self.store.list_for_owner(&commentable.owner_ref(), scope)
    }

    /// Delete all comments of an owner that is being destroyed
    pub fn destroy_comments_for(&self, commentable: &dyn Commentable) -> Result<usize> {
        let owner = commentable.owner_ref();
        let removed = self.with_owner_lock(&owner, || {
            let removed = self.store.delete_for_owner(&owner)?;
            commentable.set_comments_count(0);
            commentable.set_approved_comments_count(0);
            Ok(removed)
        })?;
        info!("Deleted {} comments of {}", removed, owner);
        Ok(removed)
    }

    fn change_approval(
        &self,
        comment: &Comment,
        commentable: &dyn Commentable,
        approved: bool,
    ) -> Result<Comment> {
        let owner = commentable.owner_ref();
        ensure_owner(comment, &owner)?;

        self.with_owner_lock(&owner, || {
            let mut stored = self.store.get(&comment.id)?;
            ensure_owner(&stored, &owner)?;
            if !stored.set_approved(approved) {
                debug!("Comment {} already {}", stored.id, stored.state());
                return Ok(stored);
            }
            self.store.update(&stored)?;

            let count = commentable.recalculate_approved_count(self.store.as_ref())?;
            debug!("{} now has {} approved comments", owner, count);
            info!("Comment {} is now {}", stored.id, stored.state());
            Ok(stored)
        })
    }

    /// Set the stored spam flag; also returns whether it changed
    fn change_spam(&self, comment: &Comment, spam: bool) -> Result<(Comment, bool)> {
        self.with_owner_lock(&comment.owner, || {
            let mut stored = self.store.get(&comment.id)?;
            ensure_owner(&stored, &comment.owner)?;
            let changed = stored.set_spam(spam);
            if changed {
                self.store.update(&stored)?;
            }
            Ok((stored, changed))
        })
    }

    fn with_owner_lock<T>(&self, owner: &OwnerRef, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = {
            let mut locks = self.owner_locks.lock().map_err(poisoned)?;
            locks.entry(owner.clone()).or_default().clone()
        };
        let result = {
            let _guard = lock.lock().map_err(poisoned)?;
            f()
        };
        drop(lock);

        // Drop the entry once no other caller holds this owner's lock
        let mut locks = self.owner_locks.lock().map_err(poisoned)?;
        if locks
            .get(owner)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(owner);
        }
        result
    }
}

fn ensure_owner(comment: &Comment, owner: &OwnerRef) -> Result<()> {
    if &comment.owner == owner {
        return Ok(());
    }
    Err(HasCommentsError::OwnerMismatch {
        comment: comment.id.to_string(),
        owner: comment.owner.to_string(),
        given: owner.to_string(),
    })
}
