//! Single-value text encoding for environment values and interactive answers.
//!
//! Values are written as JSON, so `true` and `"true"` stay distinguishable.
//! Reading is lenient: anything that is not a recognized literal is taken
//! verbatim as a string, which lets users type `localhost` instead of
//! `"localhost"` at a prompt.

use crate::value::Value;

/// Encode a value as its JSON text (`"foo"`, `true`, `null`, `12.3`).
///
/// JSON has no literal for non-finite floats, so a top-level NaN or infinity
/// is written as `NaN`, `Infinity` or `-Infinity`, which [`decode`] reads
/// back. Inside a list they still become `null`.
pub fn encode(value: &Value) -> String {
    match value {
        Value::Float(f) if f.is_nan() => "NaN".into(),
        Value::Float(f) if f.is_infinite() && *f > 0.0 => "Infinity".into(),
        Value::Float(f) if f.is_infinite() => "-Infinity".into(),
        _ => serde_json::to_string(value).expect("distconf: configuration values always encode as JSON"),
    }
}

/// Decode text produced by [`encode`], or free-form input.
///
/// Scalars and lists are recognized. JSON objects, invalid JSON and the
/// empty string come back as the verbatim string. Integer literals too large
/// for `i64` are also kept as strings so no digits are lost.
pub fn decode(text: &str) -> Value {
    match text {
        "NaN" => return Value::Float(f64::NAN),
        "Infinity" => return Value::Float(f64::INFINITY),
        "-Infinity" => return Value::Float(f64::NEG_INFINITY),
        _ => {}
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Table(_)) | Err(_) => Value::String(text.to_string()),
        Ok(Value::Float(_)) if is_integer_literal(text) => Value::String(text.to_string()),
        Ok(value) => value,
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.trim();
    let digits = digits.strip_prefix('-').unwrap_or(digits);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
