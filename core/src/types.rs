//! Native schema model for command-line values.
//!
//! [`Schema`] is the builder-style representation tool authors use in code.
//! A schema is a definition ([`SchemaDef`]) plus value checks, custom
//! refinements and an optional coercion marker. Wrapper definitions
//! ([`SchemaDef::Optional`], [`SchemaDef::Default`]) are transparent to kind
//! resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Policy for object keys that the shape does not declare.
///
/// # Examples
///
/// ```
/// use argschema_core::UnknownKeys;
///
/// assert_eq!(UnknownKeys::default(), UnknownKeys::Strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    /// Reject undeclared keys (the default).
    #[default]
    Strict,
    /// Keep undeclared keys untouched.
    Passthrough,
    /// Drop undeclared keys silently.
    Strip,
}

/// A value check applied after the type itself has been accepted.
///
/// Number checks are ignored for non-numbers and length checks apply to
/// strings (characters) and arrays (elements).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", content = "value", rename_all = "snake_case")]
pub enum Check {
    /// Number must have no fractional part.
    Int,
    /// Number must be greater than zero.
    Positive,
    /// Number must be greater than or equal to zero.
    Nonnegative,
    /// Number must be greater than or equal to the bound.
    Min(f64),
    /// Number must be less than or equal to the bound.
    Max(f64),
    /// String or array must have at least this many characters/elements.
    MinLength(usize),
    /// String or array must have at most this many characters/elements.
    MaxLength(usize),
    /// String must start with the given prefix.
    StartsWith(String),
    /// String must end with the given suffix.
    EndsWith(String),
}

/// A caller-supplied predicate with the message reported when it fails.
#[derive(Clone)]
pub struct Refinement {
    pub(crate) predicate: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    pub(crate) message: String,
}

impl Refinement {
    /// Message reported when the predicate rejects a value.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Runs the predicate.
    pub fn accepts(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Shape definition of a [`Schema`].
#[derive(Debug, Clone)]
pub enum SchemaDef {
    /// `true` / `false`.
    Boolean,
    /// Any string.
    String,
    /// Any finite number.
    Number,
    /// Anything; passed through unchanged.
    Any,
    /// Ordered sequence of one element schema.
    Array(Box<Schema>),
    /// Fixed positions with an optional variadic rest element.
    Tuple {
        items: Vec<Schema>,
        rest: Option<Box<Schema>>,
    },
    /// One of a fixed set of strings.
    Enum(Vec<String>),
    /// Exactly one value.
    Literal(Value),
    /// Inner schema; absence is accepted.
    Optional(Box<Schema>),
    /// Inner schema; absence is replaced by `value`.
    Default { inner: Box<Schema>, value: Value },
    /// Keyed record with an unknown-key policy.
    Object {
        shape: BTreeMap<String, Schema>,
        unknown_keys: UnknownKeys,
    },
}

/// Declarative description of one expected value.
///
/// # Examples
///
/// ```
/// use argschema_core::{Schema, SchemaDef};
///
/// let port = Schema::number().int().min(1.0).max(65535.0).default(8080);
/// assert!(matches!(port.def(), SchemaDef::Default { .. }));
///
/// let coords = Schema::tuple([Schema::number(), Schema::number()]).rest(Schema::string());
/// assert!(matches!(coords.def(), SchemaDef::Tuple { rest: Some(_), .. }));
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    def: SchemaDef,
    checks: Vec<Check>,
    refinements: Vec<Refinement>,
    coerce: bool,
    description: Option<String>,
}

impl Schema {
    /// Creates a schema from a raw definition.
    pub fn from_def(def: SchemaDef) -> Self {
        Self {
            def,
            checks: Vec::new(),
            refinements: Vec::new(),
            coerce: false,
            description: None,
        }
    }

    pub fn boolean() -> Self {
        Self::from_def(SchemaDef::Boolean)
    }

    pub fn string() -> Self {
        Self::from_def(SchemaDef::String)
    }

    pub fn number() -> Self {
        Self::from_def(SchemaDef::Number)
    }

    pub fn any() -> Self {
        Self::from_def(SchemaDef::Any)
    }

    /// Creates an array of `element`.
    pub fn array(element: Schema) -> Self {
        Self::from_def(SchemaDef::Array(Box::new(element)))
    }

    /// Creates a fixed tuple; add a variadic tail with [`rest`](Schema::rest).
    pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Self {
        Self::from_def(SchemaDef::Tuple {
            items: items.into_iter().collect(),
            rest: None,
        })
    }

    /// Creates an enum over the given string values.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_core::{Schema, validate};
    ///
    /// let color = Schema::enumeration(["red", "blue"]);
    /// assert!(validate(&color, &"red".into()).is_ok());
    /// assert!(validate(&color, &"green".into()).is_err());
    /// ```
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_def(SchemaDef::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::from_def(SchemaDef::Literal(value.into()))
    }

    /// Creates a strict object from `(key, schema)` pairs.
    pub fn object<I, K>(shape: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::from_def(SchemaDef::Object {
            shape: shape.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            unknown_keys: UnknownKeys::Strict,
        })
    }

    /// Wraps the schema so an absent value is accepted.
    pub fn optional(self) -> Self {
        Self::from_def(SchemaDef::Optional(Box::new(self)))
    }

    /// Wraps the schema so an absent value is replaced by `value`.
    pub fn default(self, value: impl Into<Value>) -> Self {
        Self::from_def(SchemaDef::Default {
            inner: Box::new(self),
            value: value.into(),
        })
    }

    /// Adds a variadic rest element. No effect on non-tuple schemas.
    pub fn rest(mut self, element: Schema) -> Self {
        if let SchemaDef::Tuple { rest, .. } = &mut self.def {
            *rest = Some(Box::new(element));
        }
        self
    }

    /// Accepts string input and converts it to this schema's type before
    /// validating.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    pub fn int(self) -> Self {
        self.check(Check::Int)
    }

    pub fn positive(self) -> Self {
        self.check(Check::Positive)
    }

    pub fn nonnegative(self) -> Self {
        self.check(Check::Nonnegative)
    }

    pub fn min(self, bound: f64) -> Self {
        self.check(Check::Min(bound))
    }

    pub fn max(self, bound: f64) -> Self {
        self.check(Check::Max(bound))
    }

    pub fn min_length(self, len: usize) -> Self {
        self.check(Check::MinLength(len))
    }

    pub fn max_length(self, len: usize) -> Self {
        self.check(Check::MaxLength(len))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.check(Check::StartsWith(prefix.into()))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.check(Check::EndsWith(suffix.into()))
    }

    /// Appends a check.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Adds a custom predicate, reported with `message` when it fails.
    ///
    /// Refinements only run once the value passed every built-in check.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema_core::{Schema, validate};
    ///
    /// let config = Schema::string().refine(
    ///     |v| v.as_str().is_some_and(|s| s.ends_with(".json")),
    ///     "Must be a JSON file",
    /// );
    /// assert!(validate(&config, &"app.json".into()).is_ok());
    /// let err = validate(&config, &"app.toml".into()).unwrap_err();
    /// assert_eq!(err.issues[0].message, "Must be a JSON file");
    /// ```
    pub fn refine<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    /// Sets how an object treats undeclared keys. No effect on non-objects.
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        if let SchemaDef::Object { unknown_keys, .. } = &mut self.def {
            *unknown_keys = policy;
        }
        self
    }

    pub fn strict(self) -> Self {
        self.unknown_keys(UnknownKeys::Strict)
    }

    pub fn passthrough(self) -> Self {
        self.unknown_keys(UnknownKeys::Passthrough)
    }

    pub fn strip(self) -> Self {
        self.unknown_keys(UnknownKeys::Strip)
    }

    /// Attaches a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn def(&self) -> &SchemaDef {
        &self.def
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }

    pub fn is_coerced(&self) -> bool {
        self.coerce
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns `true` if an absent value is acceptable (optional or
    /// defaulted).
    pub fn accepts_absent(&self) -> bool {
        matches!(self.def, SchemaDef::Optional(_) | SchemaDef::Default { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_only_applies_to_tuples() {
        let schema = Schema::string().rest(Schema::number());
        assert!(matches!(schema.def(), SchemaDef::String));

        let schema = Schema::tuple([Schema::number()]).rest(Schema::string());
        match schema.def() {
            SchemaDef::Tuple { items, rest } => {
                assert_eq!(items.len(), 1);
                assert!(matches!(rest.as_deref().map(Schema::def), Some(SchemaDef::String)));
            }
            other => panic!("expected tuple, got {other:?}"),
        }
    }

    #[test]
    fn test_checks_accumulate_in_order() {
        let schema = Schema::number().int().positive().max(10.0);
        assert_eq!(
            schema.checks(),
            &[Check::Int, Check::Positive, Check::Max(10.0)]
        );
    }

    #[test]
    fn test_wrappers_accept_absent() {
        assert!(Schema::string().optional().accepts_absent());
        assert!(Schema::boolean().default(true).accepts_absent());
        assert!(!Schema::string().accepts_absent());
    }

    #[test]
    fn test_unknown_keys_policy_on_object() {
        let schema = Schema::object([("name", Schema::string())]).passthrough();
        assert!(matches!(
            schema.def(),
            SchemaDef::Object {
                unknown_keys: UnknownKeys::Passthrough,
                ..
            }
        ));
    }

    #[test]
    fn test_check_serializes_with_tag() {
        let json = serde_json::to_value(Check::Min(1.0)).unwrap();
        assert_eq!(json, serde_json::json!({"check": "min", "value": 1.0}));
        let json = serde_json::to_value(Check::Int).unwrap();
        assert_eq!(json, serde_json::json!({"check": "int"}));
    }
}
