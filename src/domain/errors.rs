//! # Command Error Taxonomy
//!
//! Every failure a command handler can produce, so the global error handler
//! can map each one to a localized message. Unexpected errors end up in the
//! `Other` variant and are logged server-side with an opaque user message.

use crate::infrastructure::square::{SquareError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The user has no stored session. Prompts for `/login`.
    #[error("unauthenticated")]
    Unauthenticated,

    /// An upload payload failed local validation before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The Square Cloud API rejected or failed the request.
    #[error(transparent)]
    Square(#[from] SquareError),

    /// A Discord API call failed.
    #[error(transparent)]
    Discord(#[from] poise::serenity_prelude::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
