use thiserror::Error;
use vstore_types::{SchemaVersion, TypeError};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed document: {0}")]
    Syntax(String),

    #[error("document is missing {0:?}")]
    MissingTypeMeta(&'static str),

    #[error(transparent)]
    InvalidApiVersion(#[from] TypeError),

    #[error("no kind {0:?} is registered")]
    UnknownKind(String),

    #[error("kind {kind:?} has no schema version {version}")]
    UnknownVersion { kind: String, version: SchemaVersion },

    #[error("document kind {found:?} does not match expected kind {expected:?}")]
    KindMismatch { expected: String, found: String },

    #[error("cannot convert {kind} between {from} and {to}: {reason}")]
    Conversion {
        kind: String,
        from: SchemaVersion,
        to: SchemaVersion,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
