/// Errors that can occur while resolving an ACL.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    /// The owner asked for a canned ACL no backend understands.
    #[error("unknown canned ACL {0:?}")]
    UnknownCannedAcl(String),

    /// A strategy could not decide and refused to guess.
    #[error("acl strategy '{strategy}' failed: {message}")]
    Strategy { strategy: String, message: String },

    /// Resolution was abandoned because the context is done.
    #[error(transparent)]
    Cancelled(#[from] vstore_types::ContextError),
}

impl AclError {
    /// Create a strategy error with a name and message.
    pub fn strategy(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Strategy {
            strategy: strategy.into(),
            message: message.into(),
        }
    }
}

pub type AclResult<T> = Result<T, AclError>;
