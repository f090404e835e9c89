//! Text/number coercion for loosely-typed attribute values.

use serde_json::{Number, Value};

use super::MappingError;

/// Renders a scalar as text.
///
/// Numbers keep their JSON spelling, so `100` reads back as `"100"` and
/// `50.0` as `"50.0"`. Null, empty strings and composite values yield `None`.
pub(crate) fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads an integer from a number or numeric string.
pub(crate) fn i64_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses declared text into the JSON number the service expects.
pub(crate) fn number_from_text(
    kind: &str,
    attribute: &'static str,
    text: &str,
) -> Result<Value, MappingError> {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Ok(Value::from(int));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| MappingError::InvalidNumber {
            kind: kind.to_string(),
            attribute,
            value: text.to_string(),
        })
}

/// Compares two attribute values, treating numbers and numeric text as equal
/// when they denote the same value.
pub(crate) fn values_equivalent(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        _ => text_from_value(a) == text_from_value(b),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_keeps_number_spelling() {
        assert_eq!(text_from_value(&json!(100)).as_deref(), Some("100"));
        assert_eq!(text_from_value(&json!(50.0)).as_deref(), Some("50.0"));
        assert_eq!(text_from_value(&json!("1h")).as_deref(), Some("1h"));
        assert_eq!(text_from_value(&json!("")), None);
        assert_eq!(text_from_value(&Value::Null), None);
    }

    #[test]
    fn test_number_from_text() {
        assert_eq!(number_from_text("k", "value", "100").unwrap(), json!(100));
        assert_eq!(number_from_text("k", "value", " 50.0 ").unwrap(), json!(50.0));
        assert!(matches!(
            number_from_text("k", "value", "lots"),
            Err(MappingError::InvalidNumber { attribute: "value", .. })
        ));
        assert!(number_from_text("k", "value", "NaN").is_err());
    }

    #[test]
    fn test_values_equivalent() {
        assert!(values_equivalent(&json!("50.0"), &json!(50)));
        assert!(values_equivalent(&json!(100), &json!("100")));
        assert!(values_equivalent(&json!("1h"), &json!("1h")));
        assert!(!values_equivalent(&json!("1h"), &json!("1d")));
        assert!(!values_equivalent(&json!(1), &json!(2)));
    }

    #[test]
    fn test_i64_from_value() {
        assert_eq!(i64_from_value(&json!(7)), Some(7));
        assert_eq!(i64_from_value(&json!(7.0)), Some(7));
        assert_eq!(i64_from_value(&json!("42")), Some(42));
        assert_eq!(i64_from_value(&json!(7.5)), None);
        assert_eq!(i64_from_value(&json!("x")), None);
    }
}
