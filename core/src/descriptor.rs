//! Serializable schema descriptors for schema documents.
//!
//! Two document formats exist and are mutually incompatible:
//!
//! - [`Descriptor`]: the current format. Lowercase `type` names; optional
//!   and default are attributes of the node itself.
//! - [`LegacyDescriptor`]: the legacy format. PascalCase `kind` names;
//!   optional and default are explicit wrapper nodes around an `inner`
//!   descriptor.
//!
//! Both implement [`SchemaNode`] and convert to a native [`Schema`] for
//! validation. Type names are kept as plain strings so an unknown name
//! deserializes fine and surfaces as [`SchemaError::UnsupportedKind`] at
//! resolution time.
//!
//! # Example
//!
//! ```
//! use argschema_core::{Descriptor, Kind, LegacyDescriptor, resolve_kind};
//!
//! let current: Descriptor =
//!     serde_json::from_str(r#"{"type": "number", "optional": true}"#).unwrap();
//! assert_eq!(resolve_kind(&current).unwrap(), Kind::Number);
//!
//! let legacy: LegacyDescriptor = serde_json::from_str(
//!     r#"{"kind": "Optional", "inner": {"kind": "Number"}}"#,
//! ).unwrap();
//! assert_eq!(resolve_kind(&legacy).unwrap(), Kind::Number);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::kind::{Kind, SchemaNode};
use crate::types::{Check, Schema};

/// Schema node in the current document format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Type name (`boolean`, `string`, `number`, `array`, `tuple`, `enum`,
    /// `literal`, `any`).
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Array element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<Descriptor>>,
    /// Tuple fixed items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Descriptor>,
    /// Tuple variadic rest element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<Box<Descriptor>>,
    /// Enum members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Literal value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub coerce: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub int: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub positive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Descriptor {
    /// Creates a bare descriptor of the given type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    fn checks(&self) -> Vec<Check> {
        let mut checks = Vec::new();
        if self.int {
            checks.push(Check::Int);
        }
        if self.positive {
            checks.push(Check::Positive);
        }
        if let Some(min) = self.min {
            checks.push(Check::Min(min));
        }
        if let Some(max) = self.max {
            checks.push(Check::Max(max));
        }
        if let Some(len) = self.min_length {
            checks.push(Check::MinLength(len));
        }
        if let Some(len) = self.max_length {
            checks.push(Check::MaxLength(len));
        }
        if let Some(prefix) = &self.starts_with {
            checks.push(Check::StartsWith(prefix.clone()));
        }
        if let Some(suffix) = &self.ends_with {
            checks.push(Check::EndsWith(suffix.clone()));
        }
        checks
    }
}

impl SchemaNode for Descriptor {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn unwrap_layer(&self) -> Option<&Self> {
        None
    }

    fn kind_for(type_name: &str) -> Option<Kind> {
        match type_name {
            "boolean" => Some(Kind::Boolean),
            "string" => Some(Kind::String),
            "number" => Some(Kind::Number),
            "array" => Some(Kind::Array),
            "tuple" => Some(Kind::Tuple),
            "enum" => Some(Kind::Enum),
            "literal" => Some(Kind::Literal),
            "any" | "unknown" => Some(Kind::Other),
            _ => None,
        }
    }

    fn element(&self) -> Option<&Self> {
        self.element.as_deref()
    }

    fn items(&self) -> &[Self] {
        &self.items
    }

    fn rest(&self) -> Option<&Self> {
        self.rest.as_deref()
    }

    fn to_schema(&self) -> Result<Schema> {
        let kind =
            Self::kind_for(&self.type_name).ok_or_else(|| SchemaError::unsupported(&self.type_name))?;

        let mut schema = match kind {
            Kind::Boolean => Schema::boolean(),
            Kind::String => Schema::string(),
            Kind::Number => Schema::number(),
            Kind::Other => Schema::any(),
            Kind::Array => {
                let element = self.element.as_deref().ok_or_else(|| {
                    SchemaError::InvalidDescriptor("array descriptor requires an element".into())
                })?;
                Schema::array(element.to_schema()?)
            }
            Kind::Tuple => {
                let items = self
                    .items
                    .iter()
                    .map(Descriptor::to_schema)
                    .collect::<Result<Vec<_>>>()?;
                let tuple = Schema::tuple(items);
                match &self.rest {
                    Some(rest) => tuple.rest(rest.to_schema()?),
                    None => tuple,
                }
            }
            Kind::Enum => {
                if self.values.is_empty() {
                    return Err(SchemaError::InvalidDescriptor(
                        "enum descriptor requires at least one value".into(),
                    ));
                }
                Schema::enumeration(self.values.iter().cloned())
            }
            Kind::Literal => {
                let value = self.value.clone().ok_or_else(|| {
                    SchemaError::InvalidDescriptor("literal descriptor requires a value".into())
                })?;
                Schema::literal(value)
            }
        };

        for check in self.checks() {
            schema = schema.check(check);
        }
        if self.coerce {
            schema = schema.coerce();
        }
        if let Some(description) = &self.description {
            schema = schema.describe(description.clone());
        }
        if let Some(default) = &self.default {
            schema = schema.default(default.clone());
        } else if self.optional {
            schema = schema.optional();
        }
        Ok(schema)
    }
}

/// Schema node in the legacy document format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyDescriptor {
    /// Kind name (`Boolean`, `String`, `Number`, `Array`, `Tuple`, `Enum`,
    /// `Literal`, `Any`) or wrapper name (`Optional`, `Default`).
    pub kind: String,
    /// Wrapped node of an `Optional` or `Default` layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<Box<LegacyDescriptor>>,
    /// Array element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of: Option<Box<LegacyDescriptor>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LegacyDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<Box<LegacyDescriptor>>,
    /// Enum members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Literal value, or the default value of a `Default` layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<Check>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub coerce: bool,
}

const LEGACY_OPTIONAL: &str = "Optional";
const LEGACY_DEFAULT: &str = "Default";

impl LegacyDescriptor {
    /// Creates a bare descriptor of the given kind name.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Wraps `inner` in an `Optional` layer.
    pub fn optional(inner: LegacyDescriptor) -> Self {
        Self {
            kind: LEGACY_OPTIONAL.to_string(),
            inner: Some(Box::new(inner)),
            ..Default::default()
        }
    }

    /// Wraps `inner` in a `Default` layer carrying `value`.
    pub fn with_default(inner: LegacyDescriptor, value: impl Into<Value>) -> Self {
        Self {
            kind: LEGACY_DEFAULT.to_string(),
            inner: Some(Box::new(inner)),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    fn is_wrapper(&self) -> bool {
        self.kind == LEGACY_OPTIONAL || self.kind == LEGACY_DEFAULT
    }

    /// Attaches this layer's checks and coercion flag.
    fn decorate(&self, mut schema: Schema) -> Schema {
        for check in &self.checks {
            schema = schema.check(check.clone());
        }
        if self.coerce {
            schema = schema.coerce();
        }
        schema
    }

    fn wrapped(&self) -> Result<&LegacyDescriptor> {
        self.inner.as_deref().ok_or_else(|| {
            SchemaError::InvalidDescriptor(format!("{} layer requires an inner node", self.kind))
        })
    }
}

impl SchemaNode for LegacyDescriptor {
    fn type_name(&self) -> &str {
        &self.kind
    }

    fn unwrap_layer(&self) -> Option<&Self> {
        if self.is_wrapper() {
            self.inner.as_deref()
        } else {
            None
        }
    }

    fn kind_for(type_name: &str) -> Option<Kind> {
        match type_name {
            "Boolean" => Some(Kind::Boolean),
            "String" => Some(Kind::String),
            "Number" => Some(Kind::Number),
            "Array" => Some(Kind::Array),
            "Tuple" => Some(Kind::Tuple),
            "Enum" => Some(Kind::Enum),
            "Literal" => Some(Kind::Literal),
            "Any" => Some(Kind::Other),
            _ => None,
        }
    }

    fn element(&self) -> Option<&Self> {
        self.of.as_deref()
    }

    fn items(&self) -> &[Self] {
        &self.items
    }

    fn rest(&self) -> Option<&Self> {
        self.rest.as_deref()
    }

    fn to_schema(&self) -> Result<Schema> {
        if self.kind == LEGACY_OPTIONAL {
            return Ok(self.decorate(self.wrapped()?.to_schema()?.optional()));
        }
        if self.kind == LEGACY_DEFAULT {
            let value = self.value.clone().ok_or_else(|| {
                SchemaError::InvalidDescriptor("Default layer requires a value".into())
            })?;
            return Ok(self.decorate(self.wrapped()?.to_schema()?.default(value)));
        }

        let kind = Self::kind_for(&self.kind).ok_or_else(|| SchemaError::unsupported(&self.kind))?;
        let schema = match kind {
            Kind::Boolean => Schema::boolean(),
            Kind::String => Schema::string(),
            Kind::Number => Schema::number(),
            Kind::Other => Schema::any(),
            Kind::Array => {
                let element = self.of.as_deref().ok_or_else(|| {
                    SchemaError::InvalidDescriptor("Array requires an `of` node".into())
                })?;
                Schema::array(element.to_schema()?)
            }
            Kind::Tuple => {
                let items = self
                    .items
                    .iter()
                    .map(LegacyDescriptor::to_schema)
                    .collect::<Result<Vec<_>>>()?;
                let tuple = Schema::tuple(items);
                match &self.rest {
                    Some(rest) => tuple.rest(rest.to_schema()?),
                    None => tuple,
                }
            }
            Kind::Enum => {
                if self.options.is_empty() {
                    return Err(SchemaError::InvalidDescriptor(
                        "Enum requires at least one option".into(),
                    ));
                }
                Schema::enumeration(self.options.iter().cloned())
            }
            Kind::Literal => {
                let value = self.value.clone().ok_or_else(|| {
                    SchemaError::InvalidDescriptor("Literal requires a value".into())
                })?;
                Schema::literal(value)
            }
        };
        Ok(self.decorate(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{check_node, resolve, resolve_kind};
    use crate::types::SchemaDef;

    #[test]
    fn test_descriptor_from_yaml() {
        let yaml = r#"
type: tuple
items:
  - type: number
  - type: number
rest:
  type: string
"#;
        let descriptor: Descriptor = serde_yaml::from_str(yaml).unwrap();
        let resolved = resolve(&descriptor).unwrap();
        assert_eq!(resolved.kind, Kind::Tuple);
        assert_eq!(resolved.node.items().len(), 2);
        assert_eq!(
            resolve_kind(resolved.node.rest().unwrap()).unwrap(),
            Kind::String
        );
    }

    #[test]
    fn test_descriptor_unknown_type_is_unsupported() {
        let descriptor = Descriptor::new("date");
        assert_eq!(
            resolve_kind(&descriptor).unwrap_err(),
            SchemaError::unsupported("date")
        );
        assert_eq!(
            descriptor.to_schema().unwrap_err(),
            SchemaError::unsupported("date")
        );
    }

    #[test]
    fn test_descriptor_default_wraps_schema() {
        let descriptor: Descriptor =
            serde_json::from_str(r#"{"type": "boolean", "default": true}"#).unwrap();
        let schema = descriptor.to_schema().unwrap();
        match schema.def() {
            SchemaDef::Default { value, .. } => assert_eq!(value, &Value::Bool(true)),
            other => panic!("expected default wrapper, got {other:?}"),
        }
    }

    #[test]
    fn test_descriptor_array_without_element_is_invalid() {
        let descriptor = Descriptor::new("array");
        assert!(matches!(
            check_node(&descriptor),
            Err(SchemaError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            descriptor.to_schema(),
            Err(SchemaError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_descriptor_checks_carry_over() {
        let descriptor: Descriptor =
            serde_json::from_str(r#"{"type": "number", "int": true, "min": 1000, "max": 65535}"#)
                .unwrap();
        let schema = descriptor.to_schema().unwrap();
        assert_eq!(
            schema.checks(),
            &[Check::Int, Check::Min(1000.0), Check::Max(65535.0)]
        );
    }

    #[test]
    fn test_legacy_wrappers_are_transparent() {
        let legacy = LegacyDescriptor::optional(LegacyDescriptor::with_default(
            LegacyDescriptor::new("Boolean"),
            false,
        ));
        assert_eq!(resolve_kind(&legacy).unwrap(), Kind::Boolean);

        let schema = legacy.to_schema().unwrap();
        assert!(matches!(schema.def(), SchemaDef::Optional(_)));
    }

    #[test]
    fn test_legacy_lowercase_kind_is_unsupported() {
        let legacy = LegacyDescriptor::new("string");
        assert_eq!(
            resolve_kind(&legacy).unwrap_err(),
            SchemaError::unsupported("string")
        );
    }

    #[test]
    fn test_legacy_checks_from_yaml() {
        let yaml = r#"
kind: Number
coerce: true
checks:
  - check: int
  - check: min
    value: 1
"#;
        let legacy: LegacyDescriptor = serde_yaml::from_str(yaml).unwrap();
        let schema = legacy.to_schema().unwrap();
        assert!(schema.is_coerced());
        assert_eq!(schema.checks(), &[Check::Int, Check::Min(1.0)]);
    }

    #[test]
    fn test_legacy_wrapper_layer_keeps_checks() {
        let yaml = r#"
kind: Default
value: 80
coerce: true
checks:
  - check: int
inner:
  kind: Number
"#;
        let legacy: LegacyDescriptor = serde_yaml::from_str(yaml).unwrap();
        let schema = legacy.to_schema().unwrap();
        assert!(matches!(schema.def(), SchemaDef::Default { .. }));
        assert!(schema.is_coerced());
        assert_eq!(schema.checks(), &[Check::Int]);

        assert_eq!(crate::validate(&schema, &Value::from("8080")).unwrap(), Value::from(8080));
        assert!(crate::validate(&schema, &Value::from("1.5")).is_err());
    }

    #[test]
    fn test_legacy_optional_without_inner_is_invalid() {
        let legacy = LegacyDescriptor::new("Optional");
        // No inner node: the wrapper is treated as terminal and has no mapping.
        assert_eq!(
            resolve_kind(&legacy).unwrap_err(),
            SchemaError::unsupported("Optional")
        );
        assert!(matches!(
            legacy.to_schema(),
            Err(SchemaError::InvalidDescriptor(_))
        ));
    }
}
