//! Tolerant field coercion for loosely specified API payloads.
//!
//! Each deserializer first reads the raw JSON value, then coerces it:
//!
//! | target | accepted                              | fallback |
//! |--------|---------------------------------------|----------|
//! | string | string as-is, other scalars as text   | `""`     |
//! | i32    | integer, float (truncated), int string| `0`      |
//! | f64    | number, numeric string                | `0.0`    |
//! | bool   | bool, `true/false/1/0/t/f` strings    | `false`  |
//! | count  | non-negative integer or int string    | `None`   |
//! | array  | array (elements kept as raw values)   | `None`   |
//!
//! Integers outside the target range fall back too. Combine with
//! `#[serde(default)]` so absent fields get the same fallback.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn to_i32(value: &Value) -> i32 {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(v) => i32::try_from(v).unwrap_or(0),
            None => n
                .as_f64()
                .map(f64::trunc)
                .filter(|v| (i32::MIN as f64..=i32::MAX as f64).contains(v))
                .map_or(0, |v| v as i32),
        },
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn to_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

pub fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim(), "1" | "t" | "T" | "true" | "TRUE" | "True"),
        _ => false,
    }
}

pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|v| to_string(&v))
}

pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Value::deserialize(deserializer).map(|v| to_i32(&v))
}

pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Value::deserialize(deserializer).map(|v| to_f64(&v))
}

pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Value::deserialize(deserializer).map(|v| to_bool(&v))
}

pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Value::deserialize(deserializer).map(|v| to_u64(&v))
}

pub fn array<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error> {
    Value::deserialize(deserializer).map(to_array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_coercion() {
        assert_eq!(to_string(&json!("BTC")), "BTC");
        assert_eq!(to_string(&json!(null)), "");
        assert_eq!(to_string(&json!(42)), "42");
        assert_eq!(to_string(&json!(true)), "true");
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(to_i32(&json!(3)), 3);
        assert_eq!(to_i32(&json!(3.9)), 3);
        assert_eq!(to_i32(&json!("12")), 12);
        assert_eq!(to_i32(&json!("1.5")), 0);
        assert_eq!(to_i32(&json!([1])), 0);
        assert_eq!(to_i32(&json!(null)), 0);
    }

    #[test]
    fn test_int_out_of_range_degrades() {
        assert_eq!(to_i32(&json!(4_294_967_297i64)), 0);
        assert_eq!(to_i32(&json!(-3_000_000_000i64)), 0);
        assert_eq!(to_i32(&json!(1e12)), 0);
        assert_eq!(to_i32(&json!(18_446_744_073_709_551_615u64)), 0);
        assert_eq!(to_i32(&json!("99999999999")), 0);
        assert_eq!(to_i32(&json!(i32::MAX)), i32::MAX);
        assert_eq!(to_i32(&json!(-2.5)), -2);
    }

    #[test]
    fn test_count_coercion() {
        assert_eq!(to_u64(&json!(2)), Some(2));
        assert_eq!(to_u64(&json!("2")), Some(2));
        assert_eq!(to_u64(&json!(" 15 ")), Some(15));
        assert_eq!(to_u64(&json!(-1)), None);
        assert_eq!(to_u64(&json!("lots")), None);
        assert_eq!(to_u64(&json!(null)), None);
    }

    #[test]
    fn test_array_coercion() {
        assert_eq!(to_array(json!([1, null])), Some(vec![json!(1), json!(null)]));
        assert_eq!(to_array(json!("")), None);
        assert_eq!(to_array(json!({})), None);
        assert_eq!(to_array(json!(null)), None);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(to_f64(&json!(1.25)), 1.25);
        assert_eq!(to_f64(&json!(-7)), -7.0);
        assert_eq!(to_f64(&json!("3.5")), 3.5);
        assert_eq!(to_f64(&json!("n/a")), 0.0);
        assert_eq!(to_f64(&json!({"x": 1})), 0.0);
    }

    #[test]
    fn test_bool_coercion() {
        assert!(to_bool(&json!(true)));
        assert!(to_bool(&json!("true")));
        assert!(to_bool(&json!("1")));
        assert!(!to_bool(&json!("0")));
        assert!(!to_bool(&json!("yes")));
        // Numbers are not booleans
        assert!(!to_bool(&json!(1)));
        assert!(!to_bool(&json!(null)));
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "string")]
        name: String,
        #[serde(default, deserialize_with = "int")]
        kind: i32,
        #[serde(default, deserialize_with = "float")]
        amount: f64,
        #[serde(default, deserialize_with = "boolean")]
        flag: bool,
    }

    #[test]
    fn test_absent_and_null_fields_default() {
        let row: Row = serde_json::from_value(json!({"amount": null})).unwrap();
        assert_eq!(row.name, "");
        assert_eq!(row.kind, 0);
        assert_eq!(row.amount, 0.0);
        assert!(!row.flag);
    }

    #[test]
    fn test_wrong_types_degrade() {
        let row: Row = serde_json::from_value(json!({
            "name": 5,
            "kind": "2",
            "amount": [1, 2],
            "flag": {"nested": true}
        }))
        .unwrap();
        assert_eq!(row.name, "5");
        assert_eq!(row.kind, 2);
        assert_eq!(row.amount, 0.0);
        assert!(!row.flag);
    }
}
