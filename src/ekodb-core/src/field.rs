//! Wrapped field values
//!
//! The server stores typed fields as `{"type": T, "value": v}`. The builders
//! produce that shape for writes; the extractors unwrap it on reads and pass
//! plain values through unchanged.

use crate::models::Record;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

fn wrapped(field_type: &str, value: impl Into<Value>) -> Value {
    json!({ "type": field_type, "value": value.into() })
}

pub fn uuid(value: impl Into<String>) -> Value {
    wrapped("UUID", value.into())
}

/// Exact decimal, sent as its string form
pub fn decimal(value: impl Into<String>) -> Value {
    wrapped("Decimal", value.into())
}

pub fn date_time(value: DateTime<Utc>) -> Value {
    wrapped("DateTime", value.to_rfc3339())
}

/// Duration in milliseconds
pub fn duration(milliseconds: i64) -> Value {
    wrapped("Duration", milliseconds)
}

pub fn number(value: impl Into<Value>) -> Value {
    wrapped("Number", value)
}

pub fn set(values: Vec<Value>) -> Value {
    wrapped("Set", values)
}

pub fn vector(values: Vec<f64>) -> Value {
    wrapped("Vector", values)
}

pub fn binary(bytes: &[u8]) -> Value {
    wrapped("Binary", STANDARD.encode(bytes))
}

pub fn bytes(bytes: &[u8]) -> Value {
    wrapped("Bytes", STANDARD.encode(bytes))
}

pub fn array(values: Vec<Value>) -> Value {
    wrapped("Array", values)
}

pub fn object(value: Map<String, Value>) -> Value {
    wrapped("Object", value)
}

pub fn string(value: impl Into<String>) -> Value {
    wrapped("String", value.into())
}

pub fn integer(value: i64) -> Value {
    wrapped("Integer", value)
}

pub fn float(value: f64) -> Value {
    wrapped("Float", value)
}

pub fn boolean(value: bool) -> Value {
    wrapped("Boolean", value)
}

/// Inner value of a wrapped field, or the field itself when not wrapped
pub fn get_value(field: &Value) -> &Value {
    match field {
        Value::Object(map) => map.get("value").unwrap_or(field),
        _ => field,
    }
}

pub fn get_string_value(field: &Value) -> Option<&str> {
    get_value(field).as_str()
}

/// Integers as-is; floats truncated toward zero
pub fn get_int_value(field: &Value) -> Option<i64> {
    let value = get_value(field);
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f.trunc() as i64)
}

pub fn get_float_value(field: &Value) -> Option<f64> {
    get_value(field).as_f64()
}

/// Accepts numbers and numeric strings
pub fn get_decimal_value(field: &Value) -> Option<f64> {
    let value = get_value(field);
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

pub fn get_bool_value(field: &Value) -> Option<bool> {
    get_value(field).as_bool()
}

/// Every element must be numeric, otherwise `None`
pub fn get_vector_value(field: &Value) -> Option<Vec<f64>> {
    get_value(field)
        .as_array()?
        .iter()
        .map(Value::as_f64)
        .collect()
}

pub fn get_array_value(field: &Value) -> Option<&Vec<Value>> {
    get_value(field).as_array()
}

pub fn get_object_value(field: &Value) -> Option<&Map<String, Value>> {
    get_value(field).as_object()
}

pub fn get_date_time_value(field: &Value) -> Option<DateTime<Utc>> {
    let text = get_value(field).as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Base64 string or an array of byte values
pub fn get_bytes_value(field: &Value) -> Option<Vec<u8>> {
    match get_value(field) {
        Value::String(encoded) => STANDARD.decode(encoded).ok(),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect(),
        _ => None,
    }
}

/// Copy of the record with every field unwrapped; `id` is kept verbatim
pub fn extract_record(record: &Record) -> Record {
    record
        .iter()
        .map(|(key, value)| {
            let plain = if key == "id" {
                value.clone()
            } else {
                get_value(value).clone()
            };
            (key.clone(), plain)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builders_wrap_type_and_value() {
        assert_eq!(decimal("99.99"), json!({"type": "Decimal", "value": "99.99"}));
        assert_eq!(duration(1500), json!({"type": "Duration", "value": 1500}));
        assert_eq!(bytes(b"hi"), json!({"type": "Bytes", "value": "aGk="}));

        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(date_time(at)["value"], json!("2025-03-01T12:00:00+00:00"));
    }

    #[test]
    fn test_extractors_accept_wrapped_and_plain() {
        assert_eq!(get_string_value(&string("alice")), Some("alice"));
        assert_eq!(get_string_value(&json!("bob")), Some("bob"));
        assert_eq!(get_int_value(&json!({"type": "Float", "value": 3.9})), Some(3));
        assert_eq!(get_int_value(&json!("nope")), None);
        assert_eq!(get_decimal_value(&decimal("12.5")), Some(12.5));
        assert_eq!(get_bool_value(&boolean(true)), Some(true));
    }

    #[test]
    fn test_vector_rejects_mixed_elements() {
        assert_eq!(get_vector_value(&vector(vec![0.5, 1.0])), Some(vec![0.5, 1.0]));
        assert_eq!(get_vector_value(&json!([1, "x"])), None);
    }

    #[test]
    fn test_bytes_from_array_and_base64() {
        assert_eq!(get_bytes_value(&binary(b"abc")), Some(b"abc".to_vec()));
        assert_eq!(get_bytes_value(&json!([1, 2, 255])), Some(vec![1, 2, 255]));
        assert_eq!(get_bytes_value(&json!([1, 256])), None);
    }

    #[test]
    fn test_date_time_round_trip_through_wrapper() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(get_date_time_value(&date_time(at)), Some(at));
        assert_eq!(get_date_time_value(&json!("yesterday")), None);
    }

    #[test]
    fn test_extract_record_keeps_id() {
        let mut record = Record::new();
        record.insert("id".to_string(), json!({"type": "String", "value": "u1"}));
        record.insert("age".to_string(), integer(30));
        record.insert("name".to_string(), json!("plain"));

        let plain = extract_record(&record);
        assert_eq!(plain["id"], json!({"type": "String", "value": "u1"}));
        assert_eq!(plain["age"], json!(30));
        assert_eq!(plain["name"], json!("plain"));
    }
}
