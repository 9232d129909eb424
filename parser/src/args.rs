//! Argument schemas and parse results.

use std::collections::BTreeMap;

use argschema_core::{Kind, Schema, SchemaError, SchemaNode, UnknownKeys, check_node, resolve_kind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scanner::{OPTION_PREFIX, PASSTHROUGH_MARKER};

/// Named options: option name (without `--`) to schema node.
///
/// # Examples
///
/// ```
/// use argschema::OptionsSchema;
/// use argschema_core::{Schema, UnknownKeys};
///
/// let options = OptionsSchema::new()
///     .with_option("verbose", Schema::boolean().default(false))
///     .with_option("port", Schema::number().int())
///     .passthrough();
///
/// assert!(options.get("port").is_some());
/// assert_eq!(options.unknown_keys(), UnknownKeys::Passthrough);
/// ```
#[derive(Debug, Clone)]
pub struct OptionsSchema<N = Schema> {
    shape: BTreeMap<String, N>,
    unknown_keys: UnknownKeys,
}

impl<N> Default for OptionsSchema<N> {
    fn default() -> Self {
        Self {
            shape: BTreeMap::new(),
            unknown_keys: UnknownKeys::Strict,
        }
    }
}

impl<N> OptionsSchema<N> {
    /// Creates an empty, strict options schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an option.
    pub fn with_option(mut self, name: impl Into<String>, node: N) -> Self {
        self.shape.insert(name.into(), node);
        self
    }

    /// Sets the policy for undeclared options.
    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Rejects undeclared options during validation (the default).
    pub fn strict(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// Keeps undeclared options in the result.
    pub fn passthrough(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Drops undeclared options from the result.
    pub fn strip(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strip)
    }

    pub fn get(&self, name: &str) -> Option<&N> {
        self.shape.get(name)
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &N)> {
        self.shape.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }
}

impl<N, K: Into<String>> FromIterator<(K, N)> for OptionsSchema<N> {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Self {
            shape: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            unknown_keys: UnknownKeys::Strict,
        }
    }
}

/// Complete argument schema: named options plus positionals.
///
/// Either part may be absent. Without an options schema every option
/// token is scanned but dropped from the result; without a positionals
/// schema positionals are dropped.
///
/// # Examples
///
/// ```
/// use argschema::{ArgsSchema, OptionsSchema};
/// use argschema_core::Schema;
///
/// let schema = ArgsSchema::new()
///     .with_options(OptionsSchema::new().with_option("name", Schema::string()))
///     .with_positionals(Schema::array(Schema::string()));
/// assert!(schema.check().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ArgsSchema<N = Schema> {
    pub options: Option<OptionsSchema<N>>,
    pub positionals: Option<N>,
}

impl<N> Default for ArgsSchema<N> {
    fn default() -> Self {
        Self {
            options: None,
            positionals: None,
        }
    }
}

impl<N> ArgsSchema<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: OptionsSchema<N>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_positionals(mut self, positionals: N) -> Self {
        self.positionals = Some(positionals);
        self
    }
}

impl<N: SchemaNode> ArgsSchema<N> {
    /// Resolves every declared node and converts it for validation, so
    /// configuration errors surface before any input is scanned.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found.
    pub fn check(&self) -> Result<(), SchemaError> {
        if let Some(options) = &self.options {
            for (_, node) in options.iter() {
                check_node(node)?;
                node.to_schema()?;
            }
        }
        if let Some(positionals) = &self.positionals {
            check_node(positionals)?;
            positionals.to_schema()?;
        }
        Ok(())
    }
}

/// Validated result of one parse.
///
/// Serializes as `{"options": {...}, "positionals": [...], "--": [...]}`
/// with the `"--"` key present only when a standalone `--` was seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedArgs {
    pub options: Map<String, Value>,
    pub positionals: Vec<Value>,
    #[serde(rename = "--", default, skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<Vec<String>>,
}

impl ParsedArgs {
    /// Looks up one validated option value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Deserializes the options into a typed struct.
    ///
    /// # Examples
    ///
    /// ```
    /// use argschema::{ArgsSchema, OptionsSchema, parse};
    /// use argschema_core::Schema;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Options {
    ///     name: String,
    ///     times: u32,
    /// }
    ///
    /// let schema = ArgsSchema::new().with_options(
    ///     OptionsSchema::new()
    ///         .with_option("name", Schema::string())
    ///         .with_option("times", Schema::number().int().positive()),
    /// );
    /// let parsed = parse(&schema, &["--name=Hunter", "--times", "2"]).unwrap();
    /// let options: Options = parsed.options_as().unwrap();
    /// assert_eq!(options.name, "Hunter");
    /// assert_eq!(options.times, 2);
    /// ```
    pub fn options_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.options.clone()))
    }

    /// Deserializes the positionals into a typed value (e.g., a tuple).
    pub fn positionals_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Array(self.positionals.clone()))
    }

    /// Re-serializes the result into tokens that parse back to an equal
    /// result under `schema`.
    ///
    /// Positionals come first so a trailing variadic tuple cannot absorb
    /// them; options follow as `--name=value` (arrays repeat the option,
    /// tuples put their remaining elements in the following tokens, an empty
    /// tuple and an undeclared `true` flag are written bare); the
    /// passthrough tail, if any, comes last after `--`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if a declared option's kind cannot be
    /// resolved.
    pub fn to_tokens<N: SchemaNode>(&self, schema: &ArgsSchema<N>) -> Result<Vec<String>, SchemaError> {
        let mut tokens: Vec<String> = self.positionals.iter().map(render).collect();

        for (name, value) in &self.options {
            let node = schema.options.as_ref().and_then(|options| options.get(name));
            let kind = node.map(resolve_kind).transpose()?;
            match (kind, value) {
                (Some(Kind::Array), Value::Array(elements)) => {
                    for element in elements {
                        tokens.push(format!("{OPTION_PREFIX}{name}={}", render(element)));
                    }
                }
                (Some(Kind::Tuple), Value::Array(elements)) => {
                    let mut elements = elements.iter();
                    match elements.next() {
                        Some(first) => {
                            tokens.push(format!("{OPTION_PREFIX}{name}={}", render(first)))
                        }
                        None => tokens.push(format!("{OPTION_PREFIX}{name}")),
                    }
                    tokens.extend(elements.map(render));
                }
                // Undeclared bare flags scan back to `true`.
                (None, Value::Bool(true)) => tokens.push(format!("{OPTION_PREFIX}{name}")),
                _ => tokens.push(format!("{OPTION_PREFIX}{name}={}", render(value))),
            }
        }

        if let Some(tail) = &self.passthrough {
            tokens.push(PASSTHROUGH_MARKER.to_string());
            tokens.extend(tail.iter().cloned());
        }
        Ok(tokens)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
