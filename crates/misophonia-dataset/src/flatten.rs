//! Flattening nested records into single-level columns for analysis.
//!
//! Keys are built with brackets: `foregrounds[0][source_item][labels][1]`.
//! Every array also produces a `len(...)` column holding its length, so
//! ragged lists stay comparable across rows.

use std::collections::BTreeMap;

use misophonia_spec::MisophoniaRecord;
use serde_json::Value;

use crate::error::{DatasetError, DatasetResult};

/// Flattens a JSON value into bracketed keys.
///
/// Objects and arrays are descended into; strings, numbers, booleans, and
/// nulls become columns. An array at `key` adds `len(key)` unless that column
/// is already present. Writing a scalar to an existing key is an error.
///
/// # Example
///
/// ```
/// use misophonia_dataset::flatten_value;
/// use serde_json::json;
///
/// let flat = flatten_value(&json!({"a": {"b": [1, 2]}})).unwrap();
/// assert_eq!(flat["a[b][1]"], json!(2));
/// assert_eq!(flat["len(a[b])"], json!(2));
/// ```
pub fn flatten_value(value: &Value) -> DatasetResult<BTreeMap<String, Value>> {
    let mut out = BTreeMap::new();
    flatten_into(&mut out, "", value)?;
    Ok(out)
}

/// Flattens a persisted item record.
pub fn flatten_record(record: &MisophoniaRecord) -> DatasetResult<BTreeMap<String, Value>> {
    flatten_value(&serde_json::to_value(record)?)
}

fn child_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}[{}]", prefix, key)
    }
}

fn flatten_into(
    out: &mut BTreeMap<String, Value>,
    prefix: &str,
    value: &Value,
) -> DatasetResult<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(out, &child_key(prefix, key), child)?;
            }
        }
        Value::Array(items) => {
            out.entry(format!("len({})", prefix))
                .or_insert_with(|| Value::from(items.len()));
            for (index, child) in items.iter().enumerate() {
                flatten_into(out, &child_key(prefix, &index.to_string()), child)?;
            }
        }
        scalar => {
            if out.contains_key(prefix) {
                return Err(DatasetError::KeyCollision {
                    key: prefix.to_string(),
                });
            }
            out.insert(prefix.to_string(), scalar.clone());
        }
    }
    Ok(())
}
