//! Field decoders for sensor payloads.
//!
//! Sensor firmware is loosely typed: numbers arrive as floats or strings and
//! optional fields may hold anything. A field that cannot be interpreted
//! decodes to `None` instead of failing the whole report.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn finite_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Strings as-is, numbers and booleans in their JSON spelling.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// Any finite number or numeric string, rounded to the nearest integer.
pub fn integer<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(finite_number)
        .map(|number| number.round() as i32))
}

/// Like [`integer`], but negative values are dropped.
pub fn unsigned<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(finite_number)
        .filter(|number| *number >= 0.0)
        .map(|number| number.round() as u32))
}

pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(finite_number))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "super::text")]
        label: Option<String>,
        #[serde(default, deserialize_with = "super::integer")]
        level: Option<i32>,
        #[serde(default, deserialize_with = "super::unsigned")]
        slot: Option<u32>,
        #[serde(default, deserialize_with = "super::number")]
        range: Option<f64>,
    }

    fn decode(value: serde_json::Value) -> Fields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_and_null_fields_are_none() {
        let decoded = decode(json!({"label": null}));
        assert!(decoded.label.is_none());
        assert!(decoded.level.is_none());
        assert!(decoded.range.is_none());
    }

    #[test]
    fn numbers_are_coerced() {
        let decoded = decode(json!({"level": -50.4, "slot": "6", "range": "2.5"}));
        assert_eq!(decoded.level, Some(-50));
        assert_eq!(decoded.slot, Some(6));
        assert_eq!(decoded.range, Some(2.5));

        let decoded = decode(json!({"level": "-61", "slot": -3}));
        assert_eq!(decoded.level, Some(-61));
        assert!(decoded.slot.is_none());
    }

    #[test]
    fn unusable_values_decode_to_none() {
        let decoded = decode(json!({
            "label": {"nested": true},
            "level": "strong",
            "slot": [1, 2],
            "range": false
        }));
        assert!(decoded.label.is_none());
        assert!(decoded.level.is_none());
        assert!(decoded.slot.is_none());
        assert!(decoded.range.is_none());
    }

    #[test]
    fn scalar_text_keeps_json_spelling() {
        assert_eq!(decode(json!({"label": 42})).label.as_deref(), Some("42"));
        assert_eq!(decode(json!({"label": true})).label.as_deref(), Some("true"));
    }
}
