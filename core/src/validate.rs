//! Value validation and coercion against a [`Schema`].
//!
//! [`validate`] walks a [`serde_json::Value`] alongside a schema, applies
//! defaults and coercion, and collects every failure into one
//! [`ValidationError`] instead of stopping at the first.
//!
//! # Examples
//!
//! ```
//! use argschema_core::*;
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     ("port", Schema::number().int().min(1000.0)),
//!     ("verbose", Schema::boolean().default(false)),
//! ]);
//!
//! let out = validate(&schema, &json!({"port": 3000})).unwrap();
//! assert_eq!(out, json!({"port": 3000, "verbose": false}));
//!
//! let err = validate(&schema, &json!({"port": 1.5, "extra": 1})).unwrap_err();
//! assert_eq!(err.issues.len(), 3);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::types::{Check, Schema, SchemaDef, UnknownKeys};

/// One step of a path into a validated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Machine-readable category of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    UnrecognizedKeys,
    TooSmall,
    TooBig,
    NotInteger,
    InvalidString,
    InvalidEnumValue,
    InvalidLiteral,
    Custom,
}

/// A single validation failure at one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    /// Dotted rendering of [`path`](Issue::path), e.g. `options.port`.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} at \"{}\"", self.message, self.path_string())
        }
    }
}

/// Aggregated validation failure listing every violated path.
///
/// # Examples
///
/// ```
/// use argschema_core::*;
/// use serde_json::json;
///
/// let schema = Schema::tuple([Schema::string()]);
/// let err = validate(&schema, &json!(["good", "bad"])).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Validation error: Array must contain at most 1 element(s)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation error: ")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl ValidationError {
    /// Returns `true` if any issue is located at `path` (dotted form).
    pub fn has_path(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path_string() == path)
    }
}

/// Validates `value` against `schema`, returning the coerced output.
///
/// # Errors
///
/// Returns a [`ValidationError`] carrying every issue found.
pub fn validate(schema: &Schema, value: &Value) -> Result<Value, ValidationError> {
    let mut walker = Walker::default();
    let output = walker.visit(schema, Some(value));
    if walker.issues.is_empty() {
        Ok(output.unwrap_or(Value::Null))
    } else {
        Err(ValidationError {
            issues: walker.issues,
        })
    }
}

#[derive(Default)]
struct Walker {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl Walker {
    fn report(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues.push(Issue {
            code,
            path: self.path.clone(),
            message: message.into(),
        });
    }

    fn at<T>(&mut self, segment: PathSegment, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let out = f(self);
        self.path.pop();
        out
    }

    /// Returns `None` when the value is absent and allowed to stay absent,
    /// or when validation failed (an issue is then recorded).
    ///
    /// A wrapper layer's own coercion, checks and refinements apply to the
    /// value its inner schema produced; they are skipped when the value is
    /// absent.
    fn visit(&mut self, schema: &Schema, value: Option<&Value>) -> Option<Value> {
        let value = match (schema.def(), value) {
            (SchemaDef::Optional(_), None) => return None,
            (SchemaDef::Default { value: fallback, .. }, None) => fallback,
            (_, Some(value)) => value,
            (_, None) => {
                self.report(IssueCode::Required, "Required");
                return None;
            }
        };

        let before = self.issues.len();
        let coerced;
        let value = if schema.is_coerced() {
            coerced = coerce(terminal_def(schema), value);
            &coerced
        } else {
            value
        };

        let output = self.visit_def(schema.def(), value)?;
        self.apply_checks(schema.checks(), &output);

        if self.issues.len() == before {
            for refinement in schema.refinements() {
                if !refinement.accepts(&output) {
                    self.report(IssueCode::Custom, refinement.message());
                }
            }
        }

        (self.issues.len() == before).then_some(output)
    }

    fn visit_def(&mut self, def: &SchemaDef, value: &Value) -> Option<Value> {
        match def {
            SchemaDef::Boolean => self.expect(value, "boolean", Value::is_boolean),
            SchemaDef::String => self.expect(value, "string", Value::is_string),
            SchemaDef::Number => self.expect(value, "number", Value::is_number),
            SchemaDef::Any => Some(value.clone()),
            SchemaDef::Enum(values) => {
                let Some(text) = value.as_str() else {
                    self.invalid_type("string", value);
                    return None;
                };
                if values.iter().any(|v| v == text) {
                    Some(value.clone())
                } else {
                    let expected = values
                        .iter()
                        .map(|v| format!("'{v}'"))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    self.report(
                        IssueCode::InvalidEnumValue,
                        format!("Invalid enum value. Expected {expected}, received '{text}'"),
                    );
                    None
                }
            }
            SchemaDef::Literal(expected) => {
                if literal_matches(expected, value) {
                    Some(expected.clone())
                } else {
                    self.report(
                        IssueCode::InvalidLiteral,
                        format!("Invalid literal value, expected {expected}"),
                    );
                    None
                }
            }
            SchemaDef::Array(element) => {
                let Some(items) = value.as_array() else {
                    self.invalid_type("array", value);
                    return None;
                };
                let out: Vec<Option<Value>> = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        self.at(PathSegment::Index(index), |w| w.visit(element, Some(item)))
                    })
                    .collect();
                out.into_iter()
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array)
            }
            SchemaDef::Tuple { items, rest } => {
                let Some(values) = value.as_array() else {
                    self.invalid_type("array", value);
                    return None;
                };
                if values.len() < items.len() {
                    self.report(
                        IssueCode::TooSmall,
                        format!("Array must contain at least {} element(s)", items.len()),
                    );
                    return None;
                }
                if rest.is_none() && values.len() > items.len() {
                    self.report(
                        IssueCode::TooBig,
                        format!("Array must contain at most {} element(s)", items.len()),
                    );
                    return None;
                }
                let out: Vec<Option<Value>> = values
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let schema = items.get(index).or(rest.as_deref());
                        self.at(PathSegment::Index(index), |w| match schema {
                            Some(schema) => w.visit(schema, Some(item)),
                            None => Some(item.clone()),
                        })
                    })
                    .collect();
                out.into_iter()
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array)
            }
            SchemaDef::Object {
                shape,
                unknown_keys,
            } => {
                let Some(object) = value.as_object() else {
                    self.invalid_type("object", value);
                    return None;
                };
                let before = self.issues.len();
                let mut out = Map::new();
                for (key, schema) in shape {
                    let field = self.at(PathSegment::Key(key.clone()), |w| {
                        w.visit(schema, object.get(key))
                    });
                    if let Some(field) = field {
                        out.insert(key.clone(), field);
                    }
                }

                let unknown: BTreeSet<&String> =
                    object.keys().filter(|k| !shape.contains_key(*k)).collect();
                match unknown_keys {
                    UnknownKeys::Strict if !unknown.is_empty() => {
                        let keys = unknown
                            .iter()
                            .map(|k| format!("'{k}'"))
                            .collect::<Vec<_>>()
                            .join(", ");
                        self.report(
                            IssueCode::UnrecognizedKeys,
                            format!("Unrecognized key(s) in object: {keys}"),
                        );
                    }
                    UnknownKeys::Passthrough => {
                        for key in unknown {
                            out.insert(key.clone(), object[key].clone());
                        }
                    }
                    _ => {}
                }

                (self.issues.len() == before).then_some(Value::Object(out))
            }
            // Absent values are settled in `visit`.
            SchemaDef::Optional(inner) | SchemaDef::Default { inner, .. } => {
                self.visit(inner, Some(value))
            }
        }
    }

    fn expect(&mut self, value: &Value, expected: &str, is: fn(&Value) -> bool) -> Option<Value> {
        if is(value) {
            Some(value.clone())
        } else {
            self.invalid_type(expected, value);
            None
        }
    }

    fn invalid_type(&mut self, expected: &str, value: &Value) {
        self.report(
            IssueCode::InvalidType,
            format!("Expected {expected}, received {}", type_name_of(value)),
        );
    }

    fn apply_checks(&mut self, checks: &[Check], value: &Value) {
        for check in checks {
            match (check, value) {
                (Check::Int, Value::Number(n)) => {
                    if n.as_f64().is_some_and(|f| f.fract() != 0.0) {
                        self.report(IssueCode::NotInteger, "Expected integer, received float");
                    }
                }
                (Check::Positive, Value::Number(n)) => {
                    if n.as_f64().is_some_and(|f| f <= 0.0) {
                        self.report(IssueCode::TooSmall, "Number must be greater than 0");
                    }
                }
                (Check::Nonnegative, Value::Number(n)) => {
                    if n.as_f64().is_some_and(|f| f < 0.0) {
                        self.report(
                            IssueCode::TooSmall,
                            "Number must be greater than or equal to 0",
                        );
                    }
                }
                (Check::Min(bound), Value::Number(n)) => {
                    if n.as_f64().is_some_and(|f| f < *bound) {
                        self.report(
                            IssueCode::TooSmall,
                            format!("Number must be greater than or equal to {bound}"),
                        );
                    }
                }
                (Check::Max(bound), Value::Number(n)) => {
                    if n.as_f64().is_some_and(|f| f > *bound) {
                        self.report(
                            IssueCode::TooBig,
                            format!("Number must be less than or equal to {bound}"),
                        );
                    }
                }
                (Check::MinLength(len), Value::String(s)) if s.chars().count() < *len => {
                    self.report(
                        IssueCode::TooSmall,
                        format!("String must contain at least {len} character(s)"),
                    );
                }
                (Check::MaxLength(len), Value::String(s)) if s.chars().count() > *len => {
                    self.report(
                        IssueCode::TooBig,
                        format!("String must contain at most {len} character(s)"),
                    );
                }
                (Check::MinLength(len), Value::Array(a)) if a.len() < *len => {
                    self.report(
                        IssueCode::TooSmall,
                        format!("Array must contain at least {len} element(s)"),
                    );
                }
                (Check::MaxLength(len), Value::Array(a)) if a.len() > *len => {
                    self.report(
                        IssueCode::TooBig,
                        format!("Array must contain at most {len} element(s)"),
                    );
                }
                (Check::StartsWith(prefix), Value::String(s)) if !s.starts_with(prefix.as_str()) => {
                    self.report(
                        IssueCode::InvalidString,
                        format!("Invalid input: must start with \"{prefix}\""),
                    );
                }
                (Check::EndsWith(suffix), Value::String(s)) if !s.ends_with(suffix.as_str()) => {
                    self.report(
                        IssueCode::InvalidString,
                        format!("Invalid input: must end with \"{suffix}\""),
                    );
                }
                _ => {}
            }
        }
    }
}

/// The innermost definition below any `Optional`/`Default` layers.
fn terminal_def(schema: &Schema) -> &SchemaDef {
    match schema.def() {
        SchemaDef::Optional(inner) | SchemaDef::Default { inner, .. } => terminal_def(inner),
        def => def,
    }
}

/// Converts `value` toward the type `def` expects; unconvertible input is
/// returned unchanged so the type check reports it.
fn coerce(def: &SchemaDef, value: &Value) -> Value {
    match (def, value) {
        (SchemaDef::Number, Value::String(s)) => parse_number(s)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        (SchemaDef::Number, Value::Bool(b)) => Value::from(u8::from(*b)),
        (SchemaDef::Boolean, Value::String(s)) => match s.trim() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => value.clone(),
        },
        (SchemaDef::Boolean, Value::Number(n)) => match n.as_f64() {
            Some(f) => Value::Bool(f != 0.0),
            None => value.clone(),
        },
        (SchemaDef::String, Value::Number(n)) => Value::String(n.to_string()),
        (SchemaDef::String, Value::Bool(b)) => Value::String(b.to_string()),
        _ => value.clone(),
    }
}

/// Parses numeric text as an integer when possible, otherwise as a finite
/// float.
///
/// # Examples
///
/// ```
/// use argschema_core::parse_number;
///
/// assert_eq!(parse_number("42").unwrap().as_i64(), Some(42));
/// assert_eq!(parse_number("1.5").unwrap().as_f64(), Some(1.5));
/// assert!(parse_number("abc").is_none());
/// assert!(parse_number("NaN").is_none());
/// ```
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    if let Ok(uint) = text.parse::<u64>() {
        return Some(Number::from(uint));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

fn literal_matches(expected: &Value, value: &Value) -> bool {
    if expected == value {
        return true;
    }
    // Command-line input arrives as text; accept its rendering of a
    // non-string literal.
    match (expected, value) {
        (Value::Number(n), Value::String(s)) => {
            parse_number(s).is_some_and(|parsed| parsed.as_f64() == n.as_f64())
        }
        (Value::Bool(b), Value::String(s)) => s == &b.to_string(),
        _ => false,
    }
}

fn type_name_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_required_field_missing() {
        let schema = Schema::object([("name", Schema::string())]);
        let err = validate(&schema, &json!({})).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].code, IssueCode::Required);
        assert_eq!(err.issues[0].path_string(), "name");
    }

    #[test]
    fn test_optional_field_stays_absent() {
        let schema = Schema::object([("name", Schema::string().optional())]);
        assert_eq!(validate(&schema, &json!({})).unwrap(), json!({}));
    }

    #[test]
    fn test_default_applied_and_overridden() {
        let schema = Schema::object([("count", Schema::number().default(5))]);
        assert_eq!(validate(&schema, &json!({})).unwrap(), json!({"count": 5}));
        assert_eq!(
            validate(&schema, &json!({"count": 10})).unwrap(),
            json!({"count": 10})
        );
    }

    #[test]
    fn test_checks_after_default_apply_to_value() {
        let schema = Schema::object([("port", Schema::number().default(80).int())]);
        assert_eq!(validate(&schema, &json!({})).unwrap(), json!({"port": 80}));
        assert_eq!(
            validate(&schema, &json!({"port": 8080})).unwrap(),
            json!({"port": 8080})
        );

        let err = validate(&schema, &json!({"port": 1.5})).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path_string(), "port");
        assert_eq!(err.issues[0].message, "Expected integer, received float");
    }

    #[test]
    fn test_refinement_after_optional_runs_when_present() {
        let schema = Schema::object([(
            "name",
            Schema::string().optional().refine(|_| false, "never"),
        )]);
        assert_eq!(validate(&schema, &json!({})).unwrap(), json!({}));

        let err = validate(&schema, &json!({"name": "x"})).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::Custom);
        assert_eq!(err.issues[0].message, "never");
    }

    #[test]
    fn test_coerce_after_optional_converts_inner_value() {
        let schema = Schema::tuple([Schema::number().optional().coerce()]);
        assert_eq!(validate(&schema, &json!(["7"])).unwrap(), json!([7]));
        assert!(validate(&schema, &json!(["seven"])).is_err());
    }

    #[test]
    fn test_strict_object_lists_all_unknown_keys() {
        let schema = Schema::object([("a", Schema::string().optional())]);
        let err = validate(&schema, &json!({"z": 1, "b": true})).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::UnrecognizedKeys);
        assert_eq!(
            err.issues[0].message,
            "Unrecognized key(s) in object: 'b', 'z'"
        );
    }

    #[test]
    fn test_passthrough_and_strip_objects() {
        let shape = [("a", Schema::string().optional())];
        let passthrough = Schema::object(shape.clone()).passthrough();
        assert_eq!(
            validate(&passthrough, &json!({"x": "y"})).unwrap(),
            json!({"x": "y"})
        );

        let strip = Schema::object(shape).strip();
        assert_eq!(validate(&strip, &json!({"x": "y"})).unwrap(), json!({}));
    }

    #[test]
    fn test_coerce_positional_strings() {
        let schema = Schema::tuple([
            Schema::string(),
            Schema::number().coerce(),
            Schema::boolean().coerce(),
        ]);
        assert_eq!(
            validate(&schema, &json!(["foo", "1", "true"])).unwrap(),
            json!(["foo", 1, true])
        );
    }

    #[test]
    fn test_coerce_failure_reports_type() {
        let schema = Schema::number().coerce();
        let err = validate(&schema, &json!("abc")).unwrap_err();
        assert_eq!(err.issues[0].message, "Expected number, received string");
    }

    #[test]
    fn test_number_checks() {
        let schema = Schema::number().int().positive();
        assert!(validate(&schema, &json!(3)).is_ok());

        let err = validate(&schema, &json!(-1.5)).unwrap_err();
        let codes: Vec<_> = err.issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![IssueCode::NotInteger, IssueCode::TooSmall]);

        let port = Schema::number().min(1000.0).max(65535.0);
        assert!(validate(&port, &json!(80)).is_err());
        assert!(validate(&port, &json!(70000)).is_err());
        assert!(validate(&port, &json!(3000)).is_ok());
    }

    #[test]
    fn test_tuple_arity() {
        let pair = Schema::tuple([Schema::number(), Schema::number()]);
        assert_eq!(
            validate(&pair, &json!([1])).unwrap_err().issues[0].code,
            IssueCode::TooSmall
        );
        assert_eq!(
            validate(&pair, &json!([1, 2, 3])).unwrap_err().issues[0].code,
            IssueCode::TooBig
        );

        let variadic = pair.rest(Schema::string());
        assert_eq!(
            validate(&variadic, &json!([1, 2, "a", "b"])).unwrap(),
            json!([1, 2, "a", "b"])
        );
    }

    #[test]
    fn test_array_element_paths() {
        let schema = Schema::object([("file", Schema::array(Schema::number()))]);
        let err = validate(&schema, &json!({"file": [1, "x", 3, "y"]})).unwrap_err();
        let paths: Vec<_> = err.issues.iter().map(Issue::path_string).collect();
        assert_eq!(paths, vec!["file.1", "file.3"]);
    }

    #[test]
    fn test_enum_and_literal() {
        let color = Schema::enumeration(["red", "blue"]);
        let err = validate(&color, &json!("green")).unwrap_err();
        assert_eq!(
            err.issues[0].message,
            "Invalid enum value. Expected 'red' | 'blue', received 'green'"
        );

        let five = Schema::literal(5);
        assert_eq!(validate(&five, &json!("5")).unwrap(), json!(5));
        assert!(validate(&Schema::literal("red"), &json!("blue")).is_err());
    }

    #[test]
    fn test_refinement_runs_after_checks() {
        let schema = Schema::string()
            .min_length(3)
            .refine(|v| v.as_str().is_some_and(|s| s.ends_with(".json")), "Must be a JSON file");

        let err = validate(&schema, &json!("a")).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);

        let err = validate(&schema, &json!("app.toml")).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::Custom);
    }

    #[test]
    fn test_error_display_aggregates() {
        let schema = Schema::object([
            ("options", Schema::object([("port", Schema::number())])),
            ("positionals", Schema::tuple([Schema::string()])),
        ]);
        let err = validate(
            &schema,
            &json!({"options": {"port": "x", "bogus": true}, "positionals": ["a", "b"]}),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Expected number, received string at \"options.port\"; \
             Unrecognized key(s) in object: 'bogus' at \"options\"; \
             Array must contain at most 1 element(s) at \"positionals\""
        );
        assert!(err.has_path("options.port"));
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert!(parse_number("inf").is_none());
        assert!(parse_number("").is_none());
        assert_eq!(parse_number("18446744073709551615").unwrap().as_u64(), Some(u64::MAX));
    }
}
