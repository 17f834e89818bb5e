use std::fmt;

use serde::{Deserialize, Serialize};

/// Access-control metadata attached to a file when it is written.
///
/// Backends apply the variants they understand and ignore the rest: the
/// local filesystem honours [`Acl::FileMode`], object-style backends record
/// [`Acl::Canned`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acl {
    /// Unix permission bits, e.g. `0o600`.
    FileMode(u32),
    /// A named, provider-defined ACL such as `private` or
    /// `bucket-owner-full-control`.
    Canned(String),
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileMode(mode) => write!(f, "mode {mode:04o}"),
            Self::Canned(name) => write!(f, "canned {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(Acl::FileMode(0o600).to_string(), "mode 0600");
        assert_eq!(Acl::Canned("private".into()).to_string(), "canned private");
    }
}
