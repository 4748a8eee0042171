//! Part payload validation
//!
//! [`validate_part_data`] turns an untyped JSON object into [`PartChanges`]
//! by folding the input through a fixed list of stages. The first failing
//! stage wins, so the order below decides which error a client sees when
//! several fields are wrong at once.

use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use super::error::ValidationError;
use super::misc_info::{clean_misc_info, MiscInfo};
use super::validators::{is_truthy, is_valid_url, parse_positive_int, validate_max_length};
use crate::models::{NewPart, PartCategory, PartStatus, PartType};

/// Default for `amount` when the key is present but empty
pub const DEFAULT_AMOUNT: i64 = 1;

struct TextField {
    key: &'static str,
    max_len: Option<usize>,
}

const TEXT_FIELDS: [TextField; 9] = [
    TextField { key: "type", max_len: Some(50) },
    TextField { key: "name", max_len: Some(200) },
    TextField { key: "part_id", max_len: Some(100) },
    TextField { key: "subsystem", max_len: Some(100) },
    TextField { key: "assigned", max_len: Some(100) },
    TextField { key: "status", max_len: Some(50) },
    TextField { key: "notes", max_len: None },
    TextField { key: "file", max_len: Some(200) },
    TextField { key: "onshape_url", max_len: Some(500) },
];

const CATEGORY_NAMES: [&str; 4] = ["review", "cnc", "hand", "completed"];

const STATUS_NAMES: [&str; 7] = [
    "Pending",
    "Reviewed",
    "Approved",
    "In Progress",
    "Already Started",
    "Completed",
    "Cancelled",
];

/// Cleaned part fields
///
/// `None` means the key was absent from the input. For nullable fields,
/// `Some(None)` is an explicit null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartChanges {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub part_type: Option<Option<PartType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<PartStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onshape_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<PartCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc_info: Option<Option<MiscInfo>>,
}

impl PartChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The cleaned fields as a JSON object with only the keys that were present
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Apply creation defaults; `name` is the only required field
    pub fn into_new_part(self) -> Result<NewPart, ValidationError> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ValidationError::for_field("name", "name is required"))?;

        Ok(NewPart {
            part_type: self.part_type.flatten(),
            name,
            part_id: self.part_id,
            subsystem: self.subsystem,
            assigned: self.assigned,
            status: self.status.flatten().unwrap_or_default(),
            notes: self.notes,
            file: self.file,
            onshape_url: self.onshape_url,
            amount: self.amount.unwrap_or(DEFAULT_AMOUNT),
            category: self.category.flatten().unwrap_or_default(),
            misc_info: self.misc_info.flatten(),
            claimed_date: None,
        })
    }

    fn text_slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "name" => Some(&mut self.name),
            "part_id" => Some(&mut self.part_id),
            "subsystem" => Some(&mut self.subsystem),
            "assigned" => Some(&mut self.assigned),
            "notes" => Some(&mut self.notes),
            "file" => Some(&mut self.file),
            "onshape_url" => Some(&mut self.onshape_url),
            // `type` and `status` are normalized by their own stages
            _ => None,
        }
    }
}

type StageResult = Result<PartChanges, ValidationError>;
type Stage = fn(&Map<String, Value>, PartChanges) -> StageResult;

const STAGES: [Stage; 7] = [
    string_fields,
    numeric_fields,
    misc_info,
    part_type,
    category,
    status,
    onshape_url,
];

/// Validate a raw part payload and return the cleaned fields
pub fn validate_part_data(raw: &Map<String, Value>) -> Result<PartChanges, ValidationError> {
    STAGES
        .iter()
        .try_fold(PartChanges::default(), |changes, stage| stage(raw, changes))
}

fn clean_text(
    raw: &Map<String, Value>,
    field: &TextField,
) -> Result<Option<String>, ValidationError> {
    let value = match raw.get(field.key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    let Value::String(text) = value else {
        return Err(ValidationError::for_field(
            field.key,
            format!("{} must be a string", field.key),
        ));
    };

    let trimmed = text.trim();
    if let Some(max) = field.max_len {
        validate_max_length(trimmed, max, field.key)?;
    }
    Ok(Some(trimmed.to_string()))
}

fn string_fields(raw: &Map<String, Value>, mut changes: PartChanges) -> StageResult {
    for field in &TEXT_FIELDS {
        let Some(text) = clean_text(raw, field)? else {
            continue;
        };
        if let Some(slot) = changes.text_slot(field.key) {
            *slot = Some(text);
        }
    }
    Ok(changes)
}

fn numeric_fields(raw: &Map<String, Value>, mut changes: PartChanges) -> StageResult {
    if let Some(value) = raw.get("amount") {
        changes.amount = Some(parse_positive_int(value, "amount", DEFAULT_AMOUNT)?);
    }
    Ok(changes)
}

fn misc_info(raw: &Map<String, Value>, mut changes: PartChanges) -> StageResult {
    if let Some(value) = raw.get("misc_info").or_else(|| raw.get("miscInfo")) {
        changes.misc_info = Some(clean_misc_info(value)?);
    }
    Ok(changes)
}

fn part_type(raw: &Map<String, Value>, mut changes: PartChanges) -> StageResult {
    // Anything other than a string or null was already rejected by `string_fields`
    let text = match raw.get("type") {
        None => return Ok(changes),
        Some(Value::Null) => "",
        Some(value) => value.as_str().unwrap_or_default(),
    };

    let text = text.trim();
    changes.part_type = Some(if text.is_empty() {
        None
    } else {
        let parsed = text
            .to_lowercase()
            .parse::<PartType>()
            .map_err(|_| ValidationError::for_field("type", "type must be 'cnc' or 'hand'"))?;
        Some(parsed)
    });
    Ok(changes)
}

/// Membership check against the raw value; falsy values clear the field
fn enum_member<T: FromStr>(
    value: &Value,
    field: &str,
    names: &[&str],
) -> Result<Option<T>, ValidationError> {
    if !is_truthy(value) {
        return Ok(None);
    }
    value
        .as_str()
        .and_then(|s| s.parse::<T>().ok())
        .map(Some)
        .ok_or_else(|| {
            ValidationError::for_field(field, format!("{} must be one of: {}", field, names.join(", ")))
        })
}

fn category(raw: &Map<String, Value>, mut changes: PartChanges) -> StageResult {
    if let Some(value) = raw.get("category") {
        changes.category = Some(enum_member(value, "category", &CATEGORY_NAMES)?);
    }
    Ok(changes)
}

fn status(raw: &Map<String, Value>, mut changes: PartChanges) -> StageResult {
    if let Some(value) = raw.get("status") {
        changes.status = Some(enum_member(value, "status", &STATUS_NAMES)?);
    }
    Ok(changes)
}

fn onshape_url(_raw: &Map<String, Value>, changes: PartChanges) -> StageResult {
    if let Some(url) = changes.onshape_url.as_deref() {
        if !url.is_empty() && !is_valid_url(url) {
            return Err(ValidationError::for_field(
                "onshape_url",
                "onshape_url must be a valid URL",
            ));
        }
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: Value) -> Result<PartChanges, ValidationError> {
        match value {
            Value::Object(map) => validate_part_data(&map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_name_lists_match_enums() {
        let categories: Vec<&str> = PartCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(categories, CATEGORY_NAMES);
        let statuses: Vec<&str> = PartStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(statuses, STATUS_NAMES);
    }

    #[test]
    fn test_strings_are_trimmed() {
        let changes = validate(json!({"name": "  Drive Gear ", "notes": "\tcheck\n"})).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Drive Gear"));
        assert_eq!(changes.notes.as_deref(), Some("check"));
        assert_eq!(changes.part_id, None);
    }

    #[test]
    fn test_null_string_fields_are_omitted() {
        let changes = validate(json!({"name": null, "notes": null})).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_null_type_is_an_explicit_clear() {
        let changes = validate(json!({"type": null})).unwrap();
        assert_eq!(changes.part_type, Some(None));

        let again = validate(Value::Object(changes.to_map())).unwrap();
        assert_eq!(again, changes);
    }

    #[test]
    fn test_status_is_checked_untrimmed() {
        let err = validate(json!({"status": " Pending"})).unwrap_err();
        assert_eq!(err.field_name(), Some("status"));

        let changes = validate(json!({"status": "In Progress"})).unwrap();
        assert_eq!(changes.status, Some(Some(PartStatus::InProgress)));
    }

    #[test]
    fn test_falsy_category_clears() {
        let changes = validate(json!({"category": ""})).unwrap();
        assert_eq!(changes.category, Some(None));
        let err = validate(json!({"category": 5})).unwrap_err();
        assert_eq!(err.message, "category must be one of: review, cnc, hand, completed");
    }

    #[test]
    fn test_stage_order_string_before_numeric() {
        let err = validate(json!({"amount": -1, "name": 7})).unwrap_err();
        assert_eq!(err.field_name(), Some("name"));
    }

    #[test]
    fn test_into_new_part_defaults() {
        let part = validate(json!({"name": "Shaft", "type": "hand"}))
            .unwrap()
            .into_new_part()
            .unwrap();
        assert_eq!(part.category, PartCategory::Review);
        assert_eq!(part.status, PartStatus::Pending);
        assert_eq!(part.amount, DEFAULT_AMOUNT);
        assert_eq!(part.part_type, Some(PartType::Hand));

        let err = validate(json!({"name": "   "})).unwrap().into_new_part().unwrap_err();
        assert_eq!(err.field_name(), Some("name"));
        assert!(PartChanges::default().into_new_part().is_err());
    }

    #[test]
    fn test_to_map_only_contains_present_keys() {
        let changes = validate(json!({"name": "Bracket", "type": ""})).unwrap();
        let map = changes.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("type"), Some(&Value::Null));
    }
}
