//! Domain error type
//!
//! Repositories and actions propagate `anyhow::Error`. The variants here are
//! raised inside it for user mistakes (`err.downcast_ref::<Error>()`); any
//! other error in the chain, SQLite or I/O, is a store failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or a value is outside its allow-list
    #[error("{0}")]
    Validation(String),

    /// Update/delete target does not exist. Holds the entity label.
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for errors caused by user input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

/// Classify an `anyhow::Error` chain: user errors exit 1, everything else 2
pub fn is_user_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<Error>())
        .any(Error::is_user_error)
}
