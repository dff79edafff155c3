//! Error types shared across the Huddle crates.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HuddleError>;

/// Top-level error for the Huddle libraries.
#[derive(Debug, Error)]
pub enum HuddleError {
    /// Configuration could not be read or parsed.
    #[error("config: {0}")]
    Config(String),

    /// The durable schedule store failed or is unreachable.
    #[error("store: {0}")]
    Store(String),

    /// Member input was rejected at creation time. The caller re-prompts;
    /// this is never fatal.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Typed reasons a schedule draft is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unrecognized date")]
    BadDate,
    #[error("unrecognized time")]
    BadTime,
    #[error("unrecognized recurrence, use Once/Daily/Weekly/Monthly/Yearly")]
    BadRecurrence,
    #[error("reminder text is empty")]
    EmptyMessage,
}
