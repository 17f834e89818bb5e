//! Built-in resource kinds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::meta::ObjectMeta;
use crate::resource::Resource;

/// A deployable unit: an image run at some number of replicas.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: WidgetSpec,
}

/// Desired state of a [`Widget`].
///
/// In `v1alpha1` documents `replicas` was named `size`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSpec {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub replicas: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Widget {
    /// A widget with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            spec: WidgetSpec::default(),
        }
    }

    /// Builder-style image setter.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.spec.image = image.into();
        self
    }

    /// Builder-style replica count setter.
    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.spec.replicas = replicas;
        self
    }
}

impl Resource for Widget {
    const KIND: &'static str = "Widget";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// A named bag of string settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSet {
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl ConfigSet {
    /// An empty config set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            data: BTreeMap::new(),
        }
    }

    /// Builder-style entry insertion.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

impl Resource for ConfigSet {
    const KIND: &'static str = "ConfigSet";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
