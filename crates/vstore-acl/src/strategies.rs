use vstore_vfs::{Acl, VfsPath};

use crate::error::{AclError, AclResult};
use crate::owner::{Owner, CANNED_ACL_ANNOTATION};
use crate::resolver::AclStrategy;

/// Canned ACL names accepted by [`CannedAclStrategy`].
pub const KNOWN_CANNED_ACLS: &[&str] = &[
    "private",
    "public-read",
    "public-read-write",
    "authenticated-read",
    "bucket-owner-read",
    "bucket-owner-full-control",
];

// ---------------------------------------------------------------------------
// FileModeStrategy
// ---------------------------------------------------------------------------

/// Restricts files on local filesystems to their owner.
///
/// Resources can hold credentials, so the default mode is `0o600`.
#[derive(Clone, Debug)]
pub struct FileModeStrategy {
    mode: u32,
}

impl FileModeStrategy {
    pub fn new(mode: u32) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }
}

impl Default for FileModeStrategy {
    fn default() -> Self {
        Self::new(0o600)
    }
}

impl AclStrategy for FileModeStrategy {
    fn name(&self) -> &str {
        "file-mode"
    }

    fn acl_for(&self, scheme: &str, _: &VfsPath, _: &Owner) -> AclResult<Option<Acl>> {
        if scheme == "file" {
            Ok(Some(Acl::FileMode(self.mode)))
        } else {
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// CannedAclStrategy
// ---------------------------------------------------------------------------

/// Attaches a canned ACL on object-style backends.
///
/// The owner may pick a different canned ACL through the
/// [`CANNED_ACL_ANNOTATION`] annotation. Unknown names are rejected rather
/// than passed through.
#[derive(Clone, Debug)]
pub struct CannedAclStrategy {
    schemes: Vec<String>,
    default_acl: String,
}

impl CannedAclStrategy {
    /// Applies `default_acl` to writes on any of `schemes`.
    pub fn new(
        schemes: impl IntoIterator<Item = impl Into<String>>,
        default_acl: impl Into<String>,
    ) -> AclResult<Self> {
        let default_acl = default_acl.into();
        check_known(&default_acl)?;
        Ok(Self {
            schemes: schemes.into_iter().map(Into::into).collect(),
            default_acl,
        })
    }

    pub fn default_acl(&self) -> &str {
        &self.default_acl
    }

    fn applies_to(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s == scheme)
    }
}

impl Default for CannedAclStrategy {
    fn default() -> Self {
        Self {
            schemes: vec!["memfs".into(), "s3".into(), "gs".into()],
            default_acl: "private".into(),
        }
    }
}

impl AclStrategy for CannedAclStrategy {
    fn name(&self) -> &str {
        "canned-acl"
    }

    fn acl_for(&self, scheme: &str, _: &VfsPath, owner: &Owner) -> AclResult<Option<Acl>> {
        if !self.applies_to(scheme) {
            return Ok(None);
        }
        let name = match owner.annotation(CANNED_ACL_ANNOTATION) {
            Some(requested) => {
                check_known(requested)?;
                requested
            }
            None => self.default_acl.as_str(),
        };
        Ok(Some(Acl::Canned(name.to_string())))
    }
}

fn check_known(name: &str) -> AclResult<()> {
    if KNOWN_CANNED_ACLS.contains(&name) {
        Ok(())
    } else {
        Err(AclError::UnknownCannedAcl(name.to_string()))
    }
}
