use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// API group every vstore document belongs to.
pub const API_GROUP: &str = "vstore.dev";

/// A schema version within [`API_GROUP`], e.g. `v1alpha2`.
///
/// Documents carry their version in the `apiVersion` field as
/// `"vstore.dev/<version>"`. A store handle writes exactly one version; the
/// decoder accepts any version registered with the scheme.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(Cow<'static, str>);

impl SchemaVersion {
    /// The original document layout.
    pub const V1ALPHA1: SchemaVersion = SchemaVersion::from_static("v1alpha1");

    /// The current layout, and the in-memory form of every built-in kind.
    pub const V1ALPHA2: SchemaVersion = SchemaVersion::from_static("v1alpha2");

    /// Create a version from a static string.
    pub const fn from_static(version: &'static str) -> Self {
        Self(Cow::Borrowed(version))
    }

    /// Create a version from an owned string.
    pub fn new(version: impl Into<String>) -> Self {
        Self(Cow::Owned(version.into()))
    }

    /// The bare version string (`v1alpha2`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full `apiVersion` value (`vstore.dev/v1alpha2`).
    pub fn api_version(&self) -> String {
        format!("{API_GROUP}/{}", self.0)
    }

    /// Parse an `apiVersion` value, rejecting foreign groups.
    pub fn parse_api_version(api_version: &str) -> Result<Self, TypeError> {
        let (group, version) = api_version
            .split_once('/')
            .ok_or_else(|| TypeError::InvalidApiVersion(api_version.to_string()))?;
        if version.is_empty() || version.contains('/') {
            return Err(TypeError::InvalidApiVersion(api_version.to_string()));
        }
        if group != API_GROUP {
            return Err(TypeError::GroupMismatch {
                expected: API_GROUP.to_string(),
                found: group.to_string(),
            });
        }
        Ok(Self::new(version))
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::V1ALPHA2
    }
}

impl fmt::Debug for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaVersion({})", self.0)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
