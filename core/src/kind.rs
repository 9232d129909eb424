//! Kind resolution across schema flavors.
//!
//! Every schema representation the parser understands implements
//! [`SchemaNode`]. The scanner never inspects a representation directly;
//! it asks [`resolve`] for a normalized [`Kind`] and the terminal node
//! behind any optional/default wrappers, then reads element, item and rest
//! nodes through the trait.
//!
//! Supporting a new representation means adding one `SchemaNode` impl.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::types::{Schema, SchemaDef};

/// Normalized kind tag that drives token consumption.
///
/// # Examples
///
/// ```
/// use argschema_core::{Kind, Schema, resolve_kind};
///
/// assert_eq!(resolve_kind(&Schema::string().optional()).unwrap(), Kind::String);
/// assert_eq!(Kind::Tuple.to_string(), "tuple");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Boolean,
    String,
    Number,
    Array,
    Tuple,
    Enum,
    Literal,
    Other,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Array => "array",
            Kind::Tuple => "tuple",
            Kind::Enum => "enum",
            Kind::Literal => "literal",
            Kind::Other => "other",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the scanner needs from one schema representation.
pub trait SchemaNode {
    /// Library-specific type name of this layer (wrapper or terminal).
    fn type_name(&self) -> &str;

    /// Inner node when this layer is an optional/default wrapper.
    fn unwrap_layer(&self) -> Option<&Self>;

    /// Maps a terminal type name of this flavor to a [`Kind`].
    fn kind_for(type_name: &str) -> Option<Kind>;

    /// Element node of an array.
    fn element(&self) -> Option<&Self>;

    /// Fixed item nodes of a tuple; empty for anything else.
    fn items(&self) -> &[Self]
    where
        Self: Sized;

    /// Variadic rest node of a tuple.
    fn rest(&self) -> Option<&Self>;

    /// Converts the node into a native [`Schema`] for validation.
    fn to_schema(&self) -> Result<Schema>;
}

/// Outcome of resolving a node: its kind and the node behind all wrappers.
#[derive(Debug)]
pub struct Resolved<'a, N> {
    pub kind: Kind,
    pub node: &'a N,
}

// Manual impls so `N` itself need not be `Clone`/`Copy`.
impl<N> Clone for Resolved<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Resolved<'_, N> {}

/// Resolves `node` through its wrapper layers to a [`Kind`].
///
/// # Errors
///
/// Returns [`SchemaError::UnsupportedKind`] when the terminal type name has
/// no mapping in the node's flavor.
pub fn resolve<N: SchemaNode>(node: &N) -> Result<Resolved<'_, N>> {
    match node.unwrap_layer() {
        Some(inner) => resolve(inner),
        None => {
            let type_name = node.type_name();
            let kind = N::kind_for(type_name).ok_or_else(|| SchemaError::unsupported(type_name))?;
            Ok(Resolved { kind, node })
        }
    }
}

/// Resolves only the [`Kind`] of `node`.
pub fn resolve_kind<N: SchemaNode>(node: &N) -> Result<Kind> {
    resolve(node).map(|resolved| resolved.kind)
}

/// Resolves `node` and every nested element, item and rest node.
///
/// Use this at setup time so configuration mistakes surface before any
/// user input is scanned.
///
/// # Examples
///
/// ```
/// use argschema_core::{Schema, check_node};
///
/// let nested = Schema::array(Schema::tuple([Schema::number()]).rest(Schema::string()));
/// assert!(check_node(&nested).is_ok());
/// assert!(check_node(&Schema::object([("a", Schema::string())])).is_err());
/// ```
pub fn check_node<N: SchemaNode>(node: &N) -> Result<()> {
    let resolved = resolve(node)?;
    match resolved.kind {
        Kind::Array => {
            let element = resolved.node.element().ok_or_else(|| {
                SchemaError::InvalidDescriptor("array declares no element".to_string())
            })?;
            check_node(element)
        }
        Kind::Tuple => {
            for item in resolved.node.items() {
                check_node(item)?;
            }
            match resolved.node.rest() {
                Some(rest) => check_node(rest),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

impl SchemaNode for Schema {
    fn type_name(&self) -> &str {
        match self.def() {
            SchemaDef::Boolean => "boolean",
            SchemaDef::String => "string",
            SchemaDef::Number => "number",
            SchemaDef::Any => "any",
            SchemaDef::Array(_) => "array",
            SchemaDef::Tuple { .. } => "tuple",
            SchemaDef::Enum(_) => "enum",
            SchemaDef::Literal(_) => "literal",
            SchemaDef::Optional(_) => "optional",
            SchemaDef::Default { .. } => "default",
            SchemaDef::Object { .. } => "object",
        }
    }

    fn unwrap_layer(&self) -> Option<&Self> {
        match self.def() {
            SchemaDef::Optional(inner) | SchemaDef::Default { inner, .. } => Some(&**inner),
            _ => None,
        }
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
            "any" => Some(Kind::Other),
            _ => None,
        }
    }

    fn element(&self) -> Option<&Self> {
        match self.def() {
            SchemaDef::Array(element) => Some(&**element),
            _ => None,
        }
    }

    fn items(&self) -> &[Self] {
        match self.def() {
            SchemaDef::Tuple { items, .. } => items,
            _ => &[],
        }
    }

    fn rest(&self) -> Option<&Self> {
        match self.def() {
            SchemaDef::Tuple { rest, .. } => rest.as_deref(),
            _ => None,
        }
    }

    fn to_schema(&self) -> Result<Schema> {
        Ok(self.clone())
    }
}
