//! Free-form `misc_info` payloads
//!
//! `misc_info` lets clients attach extra attributes to a part. The accepted
//! shape is deliberately shallow and the types below encode it directly:
//!
//! ```text
//! MiscInfo   = { key: MiscValue }
//! MiscValue  = MiscScalar | [MiscItem] | MiscObject
//! MiscItem   = MiscScalar | MiscObject
//! MiscObject = { key: MiscScalar }
//! MiscScalar = string | number
//! ```
//!
//! Nulls are dropped wherever they appear. Everything else (booleans, lists
//! inside lists, objects inside objects) is rejected.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use super::error::ValidationError;

pub const MISC_INFO_FIELD: &str = "misc_info";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MiscScalar {
    Text(String),
    Number(Number),
}

pub type MiscObject = BTreeMap<String, MiscScalar>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MiscItem {
    Scalar(MiscScalar),
    Object(MiscObject),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MiscValue {
    Scalar(MiscScalar),
    List(Vec<MiscItem>),
    Object(MiscObject),
}

/// A cleaned, non-empty `misc_info` object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MiscInfo(BTreeMap<String, MiscValue>);

impl MiscInfo {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn misc_error(message: &str) -> ValidationError {
    ValidationError::for_field(MISC_INFO_FIELD, message)
}

fn scalar(value: &Value) -> Option<MiscScalar> {
    match value {
        Value::String(s) => Some(MiscScalar::Text(s.clone())),
        Value::Number(n) => Some(MiscScalar::Number(n.clone())),
        _ => None,
    }
}

/// Clean a raw `misc_info` value
///
/// Returns `Ok(None)` for null input and for objects that end up empty after
/// nulls are dropped.
pub fn clean_misc_info(raw: &Value) -> Result<Option<MiscInfo>, ValidationError> {
    let entries = match raw {
        Value::Null => return Ok(None),
        Value::Object(entries) => entries,
        _ => return Err(misc_error("misc_info must be an object")),
    };

    let mut cleaned = BTreeMap::new();
    for (key, value) in entries {
        if let Some(value) = clean_value(value)? {
            cleaned.insert(key.clone(), value);
        }
    }

    Ok((!cleaned.is_empty()).then_some(MiscInfo(cleaned)))
}

fn clean_value(value: &Value) -> Result<Option<MiscValue>, ValidationError> {
    if let Some(s) = scalar(value) {
        return Ok(Some(MiscValue::Scalar(s)));
    }
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => clean_list(items).map(|items| Some(MiscValue::List(items))),
        Value::Object(entries) => clean_object(entries).map(|obj| Some(MiscValue::Object(obj))),
        _ => Err(misc_error(
            "misc_info values must be string, number, list, or object",
        )),
    }
}

fn clean_list(items: &[Value]) -> Result<Vec<MiscItem>, ValidationError> {
    let mut cleaned = Vec::with_capacity(items.len());
    for item in items {
        if let Some(s) = scalar(item) {
            cleaned.push(MiscItem::Scalar(s));
            continue;
        }
        match item {
            Value::Null => {}
            Value::Object(entries) => cleaned.push(MiscItem::Object(clean_object(entries)?)),
            _ => {
                return Err(misc_error(
                    "misc_info list items must be string, number, or object",
                ))
            }
        }
    }
    Ok(cleaned)
}

fn clean_object(entries: &Map<String, Value>) -> Result<MiscObject, ValidationError> {
    let mut cleaned = MiscObject::new();
    for (key, value) in entries {
        if value.is_null() {
            continue;
        }
        let Some(s) = scalar(value) else {
            return Err(misc_error("misc_info object values must be string or number"));
        };
        cleaned.insert(key.clone(), s);
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_empty_collapse_to_none() {
        assert_eq!(clean_misc_info(&json!(null)).unwrap(), None);
        assert_eq!(clean_misc_info(&json!({})).unwrap(), None);
        assert_eq!(clean_misc_info(&json!({"a": null})).unwrap(), None);
    }

    #[test]
    fn test_mixed_list_round_trips() {
        let raw = json!({"a": [1, "x", {"b": 2}]});
        let cleaned = clean_misc_info(&raw).unwrap().unwrap();
        assert_eq!(cleaned.to_value(), raw);
        assert!(matches!(cleaned.0.get("a"), Some(MiscValue::List(items)) if items.len() == 3));
    }

    #[test]
    fn test_nulls_dropped_inside_containers() {
        let raw = json!({"list": [null, 1], "obj": {"k": null, "v": "x"}, "gone": null});
        let cleaned = clean_misc_info(&raw).unwrap().unwrap();
        assert_eq!(cleaned.to_value(), json!({"list": [1], "obj": {"v": "x"}}));
        assert_eq!(cleaned.0.len(), 2);
    }

    #[test]
    fn test_empty_nested_containers_are_kept() {
        let cleaned = clean_misc_info(&json!({"list": [], "obj": {}})).unwrap().unwrap();
        assert_eq!(cleaned.to_value(), json!({"list": [], "obj": {}}));
    }

    #[test]
    fn test_rejects_nested_list_in_list() {
        let err = clean_misc_info(&json!({"a": [1, [2]]})).unwrap_err();
        assert_eq!(err.message, "misc_info list items must be string, number, or object");
        assert_eq!(err.field_name(), Some("misc_info"));
    }

    #[test]
    fn test_rejects_deep_objects_and_booleans() {
        let err = clean_misc_info(&json!({"a": {"b": {"c": 1}}})).unwrap_err();
        assert_eq!(err.message, "misc_info object values must be string or number");

        let err = clean_misc_info(&json!({"a": true})).unwrap_err();
        assert_eq!(err.message, "misc_info values must be string, number, list, or object");

        let err = clean_misc_info(&json!({"a": [{"b": [1]}]})).unwrap_err();
        assert_eq!(err.message, "misc_info object values must be string or number");
    }

    #[test]
    fn test_rejects_non_object() {
        let err = clean_misc_info(&json!([1, 2])).unwrap_err();
        assert_eq!(err.message, "misc_info must be an object");
        assert!(clean_misc_info(&json!("text")).is_err());
    }
}
