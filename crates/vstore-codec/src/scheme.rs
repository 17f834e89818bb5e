use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;
use vstore_types::{ConfigSet, Resource, SchemaVersion, Widget};

use crate::error::{CodecError, CodecResult};

/// Rewrites a document body (header already removed) in place.
///
/// Returns a human-readable reason on failure; the scheme adds the kind and
/// versions involved.
pub type ConvertFn = fn(&mut Map<String, Value>) -> Result<(), String>;

/// Conversions between one older schema version and the hub version.
#[derive(Clone, Copy)]
pub struct VersionConversion {
    /// Older version → hub version.
    pub upgrade: ConvertFn,
    /// Hub version → older version.
    pub downgrade: ConvertFn,
}

impl VersionConversion {
    /// A conversion for versions whose layout is identical to the hub.
    pub fn identity() -> Self {
        fn same(_: &mut Map<String, Value>) -> Result<(), String> {
            Ok(())
        }
        Self {
            upgrade: same,
            downgrade: same,
        }
    }
}

impl std::fmt::Debug for VersionConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VersionConversion")
    }
}

/// Everything the scheme knows about one kind.
#[derive(Clone, Debug)]
pub struct KindRegistration {
    hub: SchemaVersion,
    older: BTreeMap<SchemaVersion, VersionConversion>,
}

impl KindRegistration {
    /// The in-memory version of this kind.
    pub fn hub(&self) -> &SchemaVersion {
        &self.hub
    }

    /// Returns `true` if documents of this kind may carry `version`.
    pub fn recognizes(&self, version: &SchemaVersion) -> bool {
        *version == self.hub || self.older.contains_key(version)
    }

    /// All recognized versions, sorted.
    pub fn versions(&self) -> Vec<SchemaVersion> {
        let mut versions: Vec<SchemaVersion> = self.older.keys().cloned().collect();
        versions.push(self.hub.clone());
        versions.sort();
        versions
    }
}

/// Registry of resource kinds and their schema versions.
///
/// Each kind has one hub version: the layout its Rust type serializes to.
/// Older versions register a [`VersionConversion`] to and from the hub.
/// There is no process-wide instance; a scheme is built once and handed to a
/// [`crate::CodecFactory`].
#[derive(Clone, Debug)]
pub struct Scheme {
    kinds: BTreeMap<String, KindRegistration>,
}

impl Scheme {
    /// A scheme with no kinds registered.
    pub fn empty() -> Self {
        Self {
            kinds: BTreeMap::new(),
        }
    }

    /// A scheme with the built-in kinds ([`Widget`], [`ConfigSet`]) and their
    /// version conversions.
    pub fn with_builtin_kinds() -> Self {
        let mut scheme = Self::empty();
        scheme.register::<Widget>(SchemaVersion::V1ALPHA2);
        scheme.register::<ConfigSet>(SchemaVersion::V1ALPHA2);
        scheme.add_conversion_unchecked(
            Widget::KIND,
            SchemaVersion::V1ALPHA1,
            VersionConversion {
                upgrade: widget_v1alpha1_upgrade,
                downgrade: widget_v1alpha1_downgrade,
            },
        );
        scheme.add_conversion_unchecked(
            ConfigSet::KIND,
            SchemaVersion::V1ALPHA1,
            VersionConversion::identity(),
        );
        scheme
    }

    /// Register a kind by name with its hub version. Re-registering a kind
    /// replaces it, dropping its conversions.
    pub fn register_kind(&mut self, kind: impl Into<String>, hub: SchemaVersion) {
        self.kinds.insert(
            kind.into(),
            KindRegistration {
                hub,
                older: BTreeMap::new(),
            },
        );
    }

    /// Register `T` with its hub version.
    pub fn register<T: Resource>(&mut self, hub: SchemaVersion) {
        self.register_kind(T::KIND, hub);
    }

    /// Teach the scheme how to read and write `version` of `kind`.
    pub fn register_conversion(
        &mut self,
        kind: &str,
        version: SchemaVersion,
        conversion: VersionConversion,
    ) -> CodecResult<()> {
        let registration = self
            .kinds
            .get_mut(kind)
            .ok_or_else(|| CodecError::UnknownKind(kind.to_string()))?;
        registration.older.insert(version, conversion);
        Ok(())
    }

    fn add_conversion_unchecked(
        &mut self,
        kind: &str,
        version: SchemaVersion,
        conversion: VersionConversion,
    ) {
        if let Some(registration) = self.kinds.get_mut(kind) {
            registration.older.insert(version, conversion);
        }
    }

    /// Look up a kind.
    pub fn kind(&self, kind: &str) -> CodecResult<&KindRegistration> {
        self.kinds
            .get(kind)
            .ok_or_else(|| CodecError::UnknownKind(kind.to_string()))
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Returns `true` if `kind` is registered and recognizes `version`.
    pub fn recognizes(&self, kind: &str, version: &SchemaVersion) -> bool {
        self.kinds
            .get(kind)
            .map(|r| r.recognizes(version))
            .unwrap_or(false)
    }

    /// Convert a body from `from` to the kind's hub version.
    pub(crate) fn upgrade(
        &self,
        kind: &str,
        from: &SchemaVersion,
        body: &mut Map<String, Value>,
    ) -> CodecResult<()> {
        let registration = self.kind(kind)?;
        if *from == registration.hub {
            return Ok(());
        }
        let conversion = registration.older.get(from).ok_or_else(|| CodecError::UnknownVersion {
            kind: kind.to_string(),
            version: from.clone(),
        })?;
        debug!(kind, from = %from, to = %registration.hub, "upgrading document");
        (conversion.upgrade)(body).map_err(|reason| CodecError::Conversion {
            kind: kind.to_string(),
            from: from.clone(),
            to: registration.hub.clone(),
            reason,
        })
    }

    /// Convert a hub-version body to `to`.
    pub(crate) fn downgrade(
        &self,
        kind: &str,
        to: &SchemaVersion,
        body: &mut Map<String, Value>,
    ) -> CodecResult<()> {
        let registration = self.kind(kind)?;
        if *to == registration.hub {
            return Ok(());
        }
        let conversion = registration.older.get(to).ok_or_else(|| CodecError::UnknownVersion {
            kind: kind.to_string(),
            version: to.clone(),
        })?;
        (conversion.downgrade)(body).map_err(|reason| CodecError::Conversion {
            kind: kind.to_string(),
            from: registration.hub.clone(),
            to: to.clone(),
            reason,
        })
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::with_builtin_kinds()
    }
}

// ---------------------------------------------------------------------------
// Widget v1alpha1: `spec.size` became `spec.replicas` in v1alpha2.
// ---------------------------------------------------------------------------

fn widget_v1alpha1_upgrade(body: &mut Map<String, Value>) -> Result<(), String> {
    rename_spec_field(body, "size", "replicas")
}

fn widget_v1alpha1_downgrade(body: &mut Map<String, Value>) -> Result<(), String> {
    rename_spec_field(body, "replicas", "size")
}

fn rename_spec_field(body: &mut Map<String, Value>, from: &str, to: &str) -> Result<(), String> {
    let spec = match body.get_mut("spec") {
        Some(Value::Object(spec)) => spec,
        Some(Value::Null) | None => return Ok(()),
        Some(_) => return Err("spec is not an object".into()),
    };
    if spec.contains_key(to) {
        return Err(format!("field spec.{to} is not valid in this version"));
    }
    if let Some(value) = spec.remove(from) {
        spec.insert(to.to_string(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn builtin_kinds_registered() {
        let scheme = Scheme::default();
        let kinds: Vec<_> = scheme.kinds().collect();
        assert_eq!(kinds, vec!["ConfigSet", "Widget"]);
        assert!(scheme.recognizes("Widget", &SchemaVersion::V1ALPHA1));
        assert!(scheme.recognizes("Widget", &SchemaVersion::V1ALPHA2));
        assert!(!scheme.recognizes("Widget", &SchemaVersion::new("v2")));
        assert!(!scheme.recognizes("Gadget", &SchemaVersion::V1ALPHA2));
    }

    #[test]
    fn versions_are_sorted() {
        let scheme = Scheme::default();
        let versions = scheme.kind("Widget").unwrap().versions();
        assert_eq!(versions, vec![SchemaVersion::V1ALPHA1, SchemaVersion::V1ALPHA2]);
    }

    #[test]
    fn widget_upgrade_renames_size() {
        let scheme = Scheme::default();
        let mut b = body(json!({ "metadata": { "name": "a" }, "spec": { "size": 3 } }));
        scheme.upgrade("Widget", &SchemaVersion::V1ALPHA1, &mut b).unwrap();
        assert_eq!(b["spec"], json!({ "replicas": 3 }));
    }

    #[test]
    fn widget_downgrade_renames_replicas() {
        let scheme = Scheme::default();
        let mut b = body(json!({ "spec": { "replicas": 2, "image": "x" } }));
        scheme.downgrade("Widget", &SchemaVersion::V1ALPHA1, &mut b).unwrap();
        assert_eq!(b["spec"], json!({ "size": 2, "image": "x" }));
    }

    #[test]
    fn widget_upgrade_rejects_hub_field_in_old_version() {
        let scheme = Scheme::default();
        let mut b = body(json!({ "spec": { "replicas": 1 } }));
        let err = scheme.upgrade("Widget", &SchemaVersion::V1ALPHA1, &mut b).unwrap_err();
        assert!(matches!(err, CodecError::Conversion { .. }), "got {err}");
    }

    #[test]
    fn hub_version_is_untouched() {
        let scheme = Scheme::default();
        let original = body(json!({ "spec": { "replicas": 1 } }));
        let mut b = original.clone();
        scheme.upgrade("Widget", &SchemaVersion::V1ALPHA2, &mut b).unwrap();
        assert_eq!(b, original);
    }

    #[test]
    fn unknown_version_rejected() {
        let scheme = Scheme::default();
        let mut b = Map::new();
        let err = scheme.upgrade("Widget", &SchemaVersion::new("v9"), &mut b).unwrap_err();
        assert!(matches!(err, CodecError::UnknownVersion { .. }));
    }

    #[test]
    fn conversion_for_unknown_kind_rejected() {
        let mut scheme = Scheme::empty();
        let err = scheme
            .register_conversion("Gadget", SchemaVersion::V1ALPHA1, VersionConversion::identity())
            .unwrap_err();
        assert!(matches!(err, CodecError::UnknownKind(k) if k == "Gadget"));
    }

    #[test]
    fn custom_kind_registration() {
        let mut scheme = Scheme::empty();
        scheme.register_kind("Gadget", SchemaVersion::new("v1"));
        scheme
            .register_conversion("Gadget", SchemaVersion::new("v0"), VersionConversion::identity())
            .unwrap();
        assert!(scheme.recognizes("Gadget", &SchemaVersion::new("v0")));
        assert_eq!(scheme.kind("Gadget").unwrap().hub(), &SchemaVersion::new("v1"));
    }
}
