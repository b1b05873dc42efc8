//! Comment module
//!
//! Handles the comment model, validation, and the lifecycle manager.

pub mod builder;
pub mod manager;
pub mod model;
pub mod validator;

pub use builder::{CommentBuilder, NewComment};
pub use manager::{CommentManager, ManagerSettings};
pub use model::*;
pub use validator::{
    CommentValidator, Field, ValidationErrors, Violation, CLOSED_MESSAGE, SPAM_MESSAGE,
    UNAUTHORISED_MESSAGE,
};
