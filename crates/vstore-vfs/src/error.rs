use std::io;

use vstore_types::ContextError;

use crate::path::VfsPath;

/// Errors from storage backend operations.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// Nothing exists at the path.
    #[error("file not found: {path}")]
    NotFound { path: VfsPath },

    /// An exclusive create found an existing file.
    #[error("file already exists: {path}")]
    AlreadyExists { path: VfsPath },

    /// The operation's context was cancelled or ran out of time.
    #[error(transparent)]
    Cancelled(#[from] ContextError),

    /// The location string names a scheme no backend handles.
    #[error("unsupported storage scheme {0:?}")]
    UnsupportedScheme(String),

    /// The location string could not be turned into a path.
    #[error("invalid storage location {location:?}: {reason}")]
    InvalidLocation { location: String, reason: String },

    /// I/O error from the underlying storage.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: VfsPath,
        #[source]
        source: io::Error,
    },

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl VfsError {
    /// Returns `true` for [`VfsError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`VfsError::AlreadyExists`].
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns `true` for [`VfsError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Classify an `io::Error` for `path`, mapping the not-found and
    /// already-exists kinds to their dedicated variants.
    pub fn from_io(path: &VfsPath, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path: path.clone() },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path: path.clone() },
            _ => Self::Io {
                path: path.clone(),
                source,
            },
        }
    }
}

/// Result alias for storage operations.
pub type VfsResult<T> = Result<T, VfsError>;
