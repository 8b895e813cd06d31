//! Errors produced by the built-in validators.

use thiserror::Error;

/// Failure raised by the sugar validators (`not_null`, `check`, ...).
///
/// Displays as the caller's message, unprefixed, so it can be surfaced to
/// users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("{0}")]
    InvalidArgument(String),
}

impl ChainError {
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(message) => message,
        }
    }
}
