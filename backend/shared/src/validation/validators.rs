//! Field validators for part input
//!
//! Reusable checks shared by the part validation stages. Each check works on a
//! raw `serde_json::Value` as decoded from a request body.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::error::ValidationError;

lazy_static! {
    /// http(s) URL with a domain name, `localhost` or a dotted-quad host
    static ref URL_REGEX: Regex = Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$"
    ).unwrap();
}

/// Check a URL against the accepted http(s) pattern
pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

/// JSON truthiness: null, false, zero and empty strings/containers are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Reject values whose length in characters exceeds `max`
pub fn validate_max_length(value: &str, max: usize, field: &str) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::for_field(
            field,
            format!("{} exceeds maximum length of {} characters", field, max),
        ));
    }
    Ok(())
}

/// Parse a positive integer, falling back to `default` for null or `""`
///
/// Floats truncate toward zero and strings are parsed after trimming.
/// Booleans are rejected even though they look like 0/1.
pub fn parse_positive_int(value: &Value, field: &str, default: i64) -> Result<i64, ValidationError> {
    let not_a_number = || ValidationError::for_field(field, format!("{} must be a number", field));

    let parsed = match value {
        Value::Null => return Ok(default),
        Value::String(s) if s.is_empty() => return Ok(default),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_a_number())?,
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => n.as_f64().map(|f| f.trunc() as i64).ok_or_else(not_a_number)?,
        },
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => return Err(not_a_number()),
    };

    if parsed <= 0 {
        return Err(ValidationError::for_field(
            field,
            format!("{} must be greater than 0", field),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/a?b=1"));
        assert!(is_valid_url("http://localhost:5000/parts"));
        assert!(is_valid_url("http://192.168.1.10:8080"));
        assert!(is_valid_url("HTTPS://CAD.ONSHAPE.COM/documents/abc"));
        assert!(is_valid_url("https://example.com/"));
        assert!(!is_valid_url("ftp://x.com"));
        assert!(!is_valid_url("not-a-url"));
        assert!(!is_valid_url("https://nodot"));
        assert!(!is_valid_url("https://example.com/a b"));
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("review")));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!({"a": 1})));
    }

    #[test]
    fn test_validate_max_length_counts_chars() {
        assert!(validate_max_length("ééé", 3, "name").is_ok());
        let err = validate_max_length("abcd", 3, "name").unwrap_err();
        assert_eq!(err.message, "name exceeds maximum length of 3 characters");
        assert_eq!(err.field_name(), Some("name"));
    }

    #[test]
    fn test_parse_positive_int() {
        assert_eq!(parse_positive_int(&json!(null), "amount", 1).unwrap(), 1);
        assert_eq!(parse_positive_int(&json!(""), "amount", 1).unwrap(), 1);
        assert_eq!(parse_positive_int(&json!("5"), "amount", 1).unwrap(), 5);
        assert_eq!(parse_positive_int(&json!(" 7 "), "amount", 1).unwrap(), 7);
        assert_eq!(parse_positive_int(&json!(2.9), "amount", 1).unwrap(), 2);
        assert_eq!(parse_positive_int(&json!(12), "amount", 1).unwrap(), 12);

        let err = parse_positive_int(&json!(true), "amount", 1).unwrap_err();
        assert_eq!(err.message, "amount must be a number");
        assert!(parse_positive_int(&json!("abc"), "amount", 1).is_err());
        assert!(parse_positive_int(&json!(" "), "amount", 1).is_err());
        assert!(parse_positive_int(&json!([1]), "amount", 1).is_err());

        let err = parse_positive_int(&json!(-3), "amount", 1).unwrap_err();
        assert_eq!(err.message, "amount must be greater than 0");
        assert!(parse_positive_int(&json!(0.5), "amount", 1).is_err());
    }
}
