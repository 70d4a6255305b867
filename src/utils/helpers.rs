// src/utils/helpers.rs
//
// D1 returns rows as loosely typed JSON objects; SQLite's flexible typing
// means integers may arrive as numbers or strings and booleans as 0/1.
// These helpers coerce row fields the same lenient way on every read path.

use serde_json::Value;
use std::collections::HashMap;

pub type DbRow = HashMap<String, Value>;

/// Safely parses a value to a floating-point number.
/// If parsing fails or results in NaN, returns a default value.
pub fn safe_parse_float(value: &Value, default_value: f64) -> f64 {
    match value {
        Value::Null => default_value,
        Value::Number(n) => n.as_f64().unwrap_or(default_value),
        Value::String(s) => {
            if s.trim().is_empty() {
                default_value
            } else {
                s.parse::<f64>().unwrap_or(default_value)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => default_value,
    }
}

pub fn row_f64(row: &DbRow, key: &str) -> f64 {
    row.get(key)
        .map(|v| safe_parse_float(v, 0.0))
        .unwrap_or(0.0)
}

pub fn row_i64(row: &DbRow, key: &str) -> i64 {
    match row.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        Some(Value::Bool(b)) => *b as i64,
        _ => 0,
    }
}

pub fn row_bool(row: &DbRow, key: &str) -> bool {
    match row.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(other) => safe_parse_float(other, 0.0) != 0.0,
        None => false,
    }
}

pub fn row_string(row: &DbRow, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub fn row_opt_string(row: &DbRow, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
