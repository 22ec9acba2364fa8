//! Shared error definitions for janitor primitives.

use thiserror::Error;

/// Result alias used throughout the janitor.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating janitor primitive types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The provided resource type label could not be parsed.
    #[error("invalid resource type `{label}`")]
    InvalidResourceType {
        /// The offending label.
        label: String,
    },

    /// Resource definition failed validation.
    #[error("invalid resource: {reason}")]
    InvalidResource {
        /// Human-readable reason for rejection.
        reason: String,
    },
}
