use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Metadata carried by every resource.
///
/// `name` is unique within a kind. `creation_timestamp` is assigned once by
/// the store on first write and never overwritten afterwards; `None` is the
/// zero value meaning "not yet assigned".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name, unique within its kind.
    pub name: String,
    /// When the resource was first stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Identifying key/value pairs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Non-identifying key/value pairs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Metadata with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns `true` if no creation timestamp has been assigned.
    pub fn is_creation_timestamp_zero(&self) -> bool {
        self.creation_timestamp.is_none()
    }

    /// Assign `now` (truncated to whole seconds) as the creation timestamp
    /// unless one is already set. Returns `true` if a value was assigned.
    ///
    /// Documents store timestamps with seconds precision; truncating here
    /// keeps the in-memory value equal to what a later read returns.
    pub fn stamp_creation(&mut self, now: DateTime<Utc>) -> bool {
        if self.creation_timestamp.is_some() {
            return false;
        }
        self.creation_timestamp = Some(now.trunc_subsecs(0));
        true
    }
}

/// The self-describing header of a stored document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// `<group>/<version>`, e.g. `vstore.dev/v1alpha2`.
    pub api_version: String,
    /// The resource kind, e.g. `Widget`.
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamp_assigns_once() {
        let mut meta = ObjectMeta::named("a");
        assert!(meta.is_creation_timestamp_zero());

        let first = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert!(meta.stamp_creation(first));
        assert_eq!(meta.creation_timestamp, Some(first));

        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(!meta.stamp_creation(later));
        assert_eq!(meta.creation_timestamp, Some(first));
    }

    #[test]
    fn stamp_truncates_subseconds() {
        let mut meta = ObjectMeta::named("a");
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(750);
        meta.stamp_creation(now);
        let stamped = meta.creation_timestamp.unwrap();
        assert_eq!(stamped, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn empty_fields_are_omitted() {
        let json = serde_json::to_value(ObjectMeta::named("a")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "a" }));
    }

    #[test]
    fn camel_case_timestamp_field() {
        let mut meta = ObjectMeta::named("a");
        meta.stamp_creation(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["creationTimestamp"], "2024-05-01T12:00:00Z");

        let back: ObjectMeta = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn type_meta_field_names() {
        let tm = TypeMeta {
            api_version: "vstore.dev/v1alpha2".into(),
            kind: "Widget".into(),
        };
        let json = serde_json::to_value(&tm).unwrap();
        assert_eq!(json["apiVersion"], "vstore.dev/v1alpha2");
        assert_eq!(json["kind"], "Widget");
    }
}
