//! Error types for store operations.

use thiserror::Error;
use vstore_acl::AclError;
use vstore_codec::CodecError;
use vstore_types::ContextError;
use vstore_vfs::{VfsError, VfsPath};

/// A validator rejected a resource.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that can occur during store operations.
///
/// `AlreadyExists` and `PreconditionFailed` are reported bare so callers can
/// branch on them; backend faults are wrapped with the kind and path.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `create` found a resource already stored at the path.
    #[error("already exists: {path}")]
    AlreadyExists { path: VfsPath },

    /// `update` found no resource to replace.
    #[error("precondition failed: {path} does not exist")]
    PreconditionFailed { path: VfsPath },

    /// The configured validator rejected the resource.
    #[error("invalid {kind} {name:?}: {source}")]
    Validation {
        kind: String,
        name: String,
        #[source]
        source: ValidationError,
    },

    /// A name appeared in the directory listing but could not be read back.
    #[error("{kind} {name:?} was listed but not found")]
    ListedButNotFound { kind: String, name: String },

    /// The backend failed.
    #[error("error accessing {kind} at {path}: {source}")]
    Io {
        kind: String,
        path: VfsPath,
        #[source]
        source: VfsError,
    },

    /// A stored document could not be decoded.
    #[error("error parsing {kind} at {path}: {source}")]
    Decode {
        kind: String,
        path: VfsPath,
        #[source]
        source: CodecError,
    },

    /// A resource could not be encoded.
    #[error("error encoding {kind} {name:?}: {source}")]
    Encode {
        kind: String,
        name: String,
        #[source]
        source: CodecError,
    },

    /// No ACL decision could be made, so nothing was written.
    #[error("error computing acl for {path}: {source}")]
    Acl {
        path: VfsPath,
        #[source]
        source: AclError,
    },

    /// The resource name cannot be used as a file name.
    #[error("invalid resource name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The store handle could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation's context was cancelled or its deadline passed.
    #[error(transparent)]
    Cancelled(#[from] ContextError),
}

impl StoreError {
    /// Returns `true` for a `create` that lost to an existing resource.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns `true` for an `update` of a missing resource.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Wrap a backend error, keeping cancellation distinguishable.
    pub(crate) fn io(kind: &str, path: &VfsPath, source: VfsError) -> Self {
        match source {
            VfsError::Cancelled(e) => Self::Cancelled(e),
            source => Self::Io {
                kind: kind.to_string(),
                path: path.clone(),
                source,
            },
        }
    }

    pub(crate) fn acl(path: &VfsPath, source: AclError) -> Self {
        match source {
            AclError::Cancelled(e) => Self::Cancelled(e),
            source => Self::Acl {
                path: path.clone(),
                source,
            },
        }
    }
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_classify() {
        let path = VfsPath::new("/widgets/a");
        assert!(StoreError::AlreadyExists { path: path.clone() }.is_already_exists());
        assert!(StoreError::PreconditionFailed { path: path.clone() }.is_precondition_failed());
        assert!(!StoreError::AlreadyExists { path }.is_precondition_failed());
    }

    #[test]
    fn backend_cancellation_is_not_wrapped() {
        let path = VfsPath::new("/widgets/a");
        let err = StoreError::io("Widget", &path, VfsError::Cancelled(ContextError::Cancelled));
        assert!(err.is_cancelled());
    }

    #[test]
    fn io_error_carries_kind_and_path() {
        let path = VfsPath::new("/widgets/a");
        let err = StoreError::io("Widget", &path, VfsError::LockPoisoned);
        let message = err.to_string();
        assert!(message.contains("Widget"), "{message}");
        assert!(message.contains("/widgets/a"), "{message}");
    }

    #[test]
    fn precondition_message() {
        let err = StoreError::PreconditionFailed {
            path: VfsPath::new("/widgets/a"),
        };
        assert_eq!(err.to_string(), "precondition failed: /widgets/a does not exist");
    }
}
