use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Owner annotation that overrides the canned ACL for object-style backends.
pub const CANNED_ACL_ANNOTATION: &str = "vstore.dev/canned-acl";

/// The context a write happens on behalf of, e.g. a cluster or a tenant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: BTreeMap::new(),
        }
    }

    /// Builder-style annotation setter.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}
