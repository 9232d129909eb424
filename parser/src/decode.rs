//! Primitive decoding of raw option values.
//!
//! Only booleans and numbers are decoded here. Every other kind passes the
//! raw string through; membership checks and coercion belong to the
//! validator.

use argschema_core::{Kind, parse_number};
use serde_json::Value;

use crate::error::{DecodeError, DecodeReason};

/// Decodes `true`/`1` and `false`/`0`.
///
/// # Examples
///
/// ```
/// use argschema::decode;
///
/// assert_eq!(decode::boolean("flag", "1"), Ok(true));
/// assert_eq!(decode::boolean("flag", "false"), Ok(false));
/// assert!(decode::boolean("flag", "yes").is_err());
/// ```
pub fn boolean(option: &str, raw: &str) -> Result<bool, DecodeError> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DecodeError::new(
            option,
            DecodeReason::InvalidBoolean(raw.to_string()),
        )),
    }
}

/// Decodes numeric text.
pub fn number(option: &str, raw: &str) -> Result<Value, DecodeError> {
    parse_number(raw)
        .map(Value::Number)
        .ok_or_else(|| DecodeError::new(option, DecodeReason::InvalidNumber(raw.to_string())))
}

/// Decodes `raw` according to `kind`.
pub fn value(option: &str, raw: &str, kind: Kind) -> Result<Value, DecodeError> {
    match kind {
        Kind::Boolean => boolean(option, raw).map(Value::Bool),
        Kind::Number => number(option, raw),
        _ => Ok(Value::String(raw.to_string())),
    }
}
