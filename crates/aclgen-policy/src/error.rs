//! Error types for policy loading and policy services.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors raised while loading a policy or applying policy services.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Failed to read a policy file.
    #[error("Failed to read policy file '{path}': {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The policy file is not valid YAML/JSON for the policy model.
    #[error("Failed to parse policy '{origin}': {message}")]
    Parse {
        /// File path or `<inline>`.
        origin: String,
        /// Parser message.
        message: String,
    },

    /// A term is structurally invalid (no name, no action, bad port range).
    #[error("Invalid term '{term}': {message}")]
    InvalidTerm {
        /// The term name.
        term: String,
        /// Error message.
        message: String,
    },

    /// The `established` option was used with stateless protocols.
    #[error("Established option supplied with inappropriate protocol(s) {protocols:?} in term {term}")]
    Established {
        /// The term name.
        term: String,
        /// The offending protocols.
        protocols: Vec<String>,
    },
}

impl PolicyError {
    /// Creates a parse error.
    pub fn parse(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    /// Creates an invalid term error.
    pub fn invalid_term(term: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTerm {
            term: term.into(),
            message: message.into(),
        }
    }
}
