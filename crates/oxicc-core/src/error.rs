//! Crate-level error type

use thiserror::Error;

use crate::icc::IccError;

/// Result type for operations that touch the filesystem
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from profile files on disk
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or unsupported profile content
    #[error(transparent)]
    Icc(#[from] IccError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The profile-level error, if this is one.
    pub fn as_icc(&self) -> Option<&IccError> {
        match self {
            Self::Icc(e) => Some(e),
            Self::Io(_) => None,
        }
    }
}
