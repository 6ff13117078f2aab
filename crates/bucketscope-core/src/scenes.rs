//! Scene metadata parsing and projection.
//!
//! Scene records have no fixed schema. They are kept as ordered JSON maps and
//! every derived view (table columns, image reference, cell text) is a pure
//! function over them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::listing::is_image_name;

/// Tracing target for scene metadata handling.
pub const TRACING_TARGET: &str = "bucketscope_core::scenes";

/// Candidate fields checked, in order, for an image reference.
pub const IMAGE_REFERENCE_KEYS: [&str; 6] =
    ["image", "img", "filename", "file", "thumbnail", "asset"];

/// A single scene: an ordered key to dynamic value mapping.
pub type SceneRecord = Map<String, Value>;

/// How table columns are derived from the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ColumnPolicy {
    /// Scalar keys of the first record only. Assumes homogeneous records.
    #[default]
    FirstRecord,
    /// Scalar keys of every record, in first-seen order.
    Union,
}

/// Records parsed from one metadata payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSet {
    records: Vec<SceneRecord>,
}

impl SceneSet {
    pub fn new(records: Vec<SceneRecord>) -> Self {
        Self { records }
    }

    /// Interprets a metadata payload permissively.
    ///
    /// Accepts `{"scenes": [...]}` or a bare array. Any other shape, and any
    /// payload that is not JSON at all, yields an empty set.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Scene metadata is not valid JSON, showing no scenes"
                );
                Self::default()
            }
        }
    }

    /// Interprets an already parsed metadata document.
    pub fn from_value(value: Value) -> Self {
        let entries = match value {
            Value::Object(mut document) => match document.remove("scenes") {
                Some(Value::Array(entries)) => entries,
                _ => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        "Scene metadata has no scenes array"
                    );
                    Vec::new()
                }
            },
            Value::Array(entries) => entries,
            _ => Vec::new(),
        };

        let total = entries.len();
        let records: Vec<SceneRecord> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect();

        if records.len() != total {
            tracing::debug!(
                target: TRACING_TARGET,
                skipped = total - records.len(),
                "Skipped scene entries that are not objects"
            );
        }

        Self { records }
    }

    pub fn records(&self) -> &[SceneRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&SceneRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Table columns under the given policy.
    pub fn columns(&self, policy: ColumnPolicy) -> Vec<String> {
        derive_columns(&self.records, policy)
    }
}

/// Returns `true` for values shown directly in a table cell.
fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Derives table columns from the records.
///
/// Null, object and array values never produce a column.
pub fn derive_columns(records: &[SceneRecord], policy: ColumnPolicy) -> Vec<String> {
    let scalar_keys = |record: &SceneRecord| {
        record
            .iter()
            .filter(|(_, value)| is_scalar(value))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>()
    };

    match policy {
        ColumnPolicy::FirstRecord => records.first().map(scalar_keys).unwrap_or_default(),
        ColumnPolicy::Union => {
            let mut columns: Vec<String> = Vec::new();
            for key in records.iter().flat_map(scalar_keys) {
                if !columns.contains(&key) {
                    columns.push(key);
                }
            }
            columns
        }
    }
}

/// Finds the first candidate field holding an image file name.
pub fn derive_image_reference(record: &SceneRecord) -> Option<&str> {
    IMAGE_REFERENCE_KEYS.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(reference)) if is_image_name(reference) => Some(reference.as_str()),
        _ => None,
    })
}

/// Resolves an image reference against the current navigation path.
pub fn resolve_image_object(path: &str, reference: &str) -> String {
    format!("{path}{reference}")
}

/// Text for a table cell; missing fields render empty.
pub fn format_cell(record: &SceneRecord, column: &str) -> String {
    record.get(column).map(format_value).unwrap_or_default()
}

/// Text for any value in the detail view.
///
/// Strings are shown without quotes, objects and arrays as pretty JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> SceneRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_wrapped_scenes_columns_and_image() {
        let set = SceneSet::from_slice(br#"{"scenes":[{"id":1,"image":"x.png"}]}"#);
        assert_eq!(set.len(), 1);
        assert_eq!(set.columns(ColumnPolicy::FirstRecord), vec!["id", "image"]);
        assert_eq!(derive_image_reference(&set.records()[0]), Some("x.png"));
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let set = SceneSet::from_slice(br#"[{"id":1}]"#);
        assert_eq!(set.records(), &[record(json!({"id": 1}))]);
    }

    #[test]
    fn test_other_shapes_yield_no_scenes() {
        assert!(SceneSet::from_slice(br#"{"foo":"bar"}"#).is_empty());
        assert!(SceneSet::from_slice(br#"{"scenes":"nope"}"#).is_empty());
        assert!(SceneSet::from_slice(br#"42"#).is_empty());
        assert!(SceneSet::from_slice(b"not json").is_empty());
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let set = SceneSet::from_slice(br#"[{"id":1}, 7, "x", {"id":2}]"#);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_columns_preserve_key_order_and_skip_structures() {
        let records = vec![record(json!({
            "zeta": "z",
            "tags": ["a", "b"],
            "alpha": 2,
            "meta": {"k": "v"},
            "missing": null,
            "flag": true
        }))];

        assert_eq!(
            derive_columns(&records, ColumnPolicy::FirstRecord),
            vec!["zeta", "alpha", "flag"]
        );
    }

    #[test]
    fn test_first_record_policy_ignores_later_fields() {
        let records = vec![
            record(json!({"id": 1, "name": "a"})),
            record(json!({"id": 2, "extra": "b", "name": "c"})),
        ];

        assert_eq!(
            derive_columns(&records, ColumnPolicy::FirstRecord),
            vec!["id", "name"]
        );
        assert_eq!(
            derive_columns(&records, ColumnPolicy::Union),
            vec!["id", "name", "extra"]
        );
    }

    #[test]
    fn test_no_records_no_columns() {
        assert!(derive_columns(&[], ColumnPolicy::FirstRecord).is_empty());
        assert!(derive_columns(&[], ColumnPolicy::Union).is_empty());
    }

    #[test]
    fn test_image_reference_precedence() {
        let scene = record(json!({
            "image": "notes.txt",
            "img": 3,
            "filename": "frame_01.JPEG",
            "thumbnail": "thumb.png"
        }));
        assert_eq!(derive_image_reference(&scene), Some("frame_01.JPEG"));

        let none = record(json!({"id": 1, "asset": "clip.mp4"}));
        assert_eq!(derive_image_reference(&none), None);
    }

    #[test]
    fn test_resolve_against_path() {
        assert_eq!(resolve_image_object("shots/", "a.png"), "shots/a.png");
        assert_eq!(resolve_image_object("", "a.png"), "a.png");
    }

    #[test]
    fn test_cell_formatting() {
        let scene = record(json!({"id": 7, "name": "intro", "ok": false, "n": null}));
        assert_eq!(format_cell(&scene, "id"), "7");
        assert_eq!(format_cell(&scene, "name"), "intro");
        assert_eq!(format_cell(&scene, "ok"), "false");
        assert_eq!(format_cell(&scene, "n"), "null");
        assert_eq!(format_cell(&scene, "absent"), "");
        assert_eq!(format_value(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_column_policy_parses_from_str() {
        use std::str::FromStr;
        assert_eq!(ColumnPolicy::from_str("union").unwrap(), ColumnPolicy::Union);
        assert_eq!(ColumnPolicy::default().as_ref(), "first-record");
    }
}
