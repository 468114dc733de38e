//! Error types shared across the MountFS crates.
//!
//! The taxonomy keeps resolution faults apart from I/O faults: a missing
//! mount is absence (`Ok(None)`), a missing required child is `NotFound`
//! with diagnostic content, and a failing attribute read or stream open
//! is `Io` and never downgraded to "not found". Operations a backend
//! simply does not support (delete on a read-only archive, code-signer
//! queries) decline with a negative result instead of erroring.

use crate::path::PathError;

/// Errors raised by resolution and backend operations.
#[derive(thiserror::Error, Debug)]
pub enum VfsError {
    /// A required child does not exist. Carries the searched name and the
    /// names of the children actually present, for diagnosis.
    #[error("child not found '{name}' under '{parent}', available children: [{children}]", children = .available.join(", "))]
    NotFound {
        name: String,
        parent: String,
        available: Vec<String>,
    },

    /// A resolution entry point was handed an unusable argument.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Lower-level I/O failure: attribute read, stream open, directory
    /// iteration, archive access.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The URI could not be parsed.
    #[error("invalid uri: {0}")]
    Uri(#[from] url::ParseError),

    /// Path validation error.
    #[error(transparent)]
    Path(#[from] PathError),
}

impl VfsError {
    /// True for the not-found resolution fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }
}
