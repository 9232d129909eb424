//! Schema documents: argument schemas declared in YAML or JSON files.
//!
//! The document `version` selects the descriptor format: major version `1`
//! uses [`LegacyDescriptor`] nodes, major version `2` uses [`Descriptor`]
//! nodes. JSON files load through the same YAML reader.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "2"
//! unknown_options: strict
//! options:
//!   verbose: { type: boolean, default: false }
//!   port: { type: number, int: true, min: 1, max: 65535 }
//!   file: { type: array, element: { type: string }, default: [] }
//! positionals:
//!   type: array
//!   element: { type: string }
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use argschema_core::{Descriptor, LegacyDescriptor, SchemaError, UnknownKeys};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::args::{ArgsSchema, OptionsSchema, ParsedArgs};
use crate::parse::parse;

/// Errors raised while loading or saving a schema document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML/JSON parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The document has no `version` field.
    #[error("schema document is missing a version")]
    MissingVersion,

    /// The document's major version is not supported.
    #[error("unsupported schema document version: {0}")]
    UnsupportedVersion(String),
}

/// Convenience alias for results with [`DocumentError`].
pub type Result<T> = std::result::Result<T, DocumentError>;

/// A schema document with nodes of one descriptor flavor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<N> {
    /// Document format version (e.g., `"2"`).
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Policy for options the document does not declare.
    #[serde(default)]
    pub unknown_options: UnknownKeys,
    /// Declared options; absent means options are not expected.
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, N>>,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub positionals: Option<N>,
}

// Avoids serde's implied `N: Default` bound on `#[serde(default)]`.
fn none<T>() -> Option<T> {
    None
}

impl<N: Clone> Document<N> {
    /// Builds the [`ArgsSchema`] the document declares.
    pub fn args_schema(&self) -> ArgsSchema<N> {
        ArgsSchema {
            options: self.options.as_ref().map(|options| {
                options
                    .iter()
                    .map(|(name, node)| (name.clone(), node.clone()))
                    .collect::<OptionsSchema<N>>()
                    .with_unknown_keys(self.unknown_options)
            }),
            positionals: self.positionals.clone(),
        }
    }
}

/// A loaded schema document in either format.
///
/// # Examples
///
/// ```
/// use argschema::SchemaDocument;
///
/// let doc = SchemaDocument::from_yaml_str(r#"
/// version: "1"
/// options:
///   times: { kind: Number, checks: [{ check: int }] }
///   enable: { kind: Default, inner: { kind: Boolean }, value: false }
/// "#).unwrap();
///
/// let parsed = doc.parse(&["--times", "3"]).unwrap();
/// assert_eq!(parsed.options["times"], 3);
/// assert_eq!(parsed.options["enable"], false);
/// ```
#[derive(Debug, Clone)]
pub enum SchemaDocument {
    Legacy(Document<LegacyDescriptor>),
    Current(Document<Descriptor>),
}

impl SchemaDocument {
    /// Loads a document from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DocumentError::IoError) if the file cannot be
    /// read, [`YamlError`](DocumentError::YamlError) if parsing fails, or a
    /// version error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let value: serde_yaml::Value = serde_yaml::from_reader(BufReader::new(file))?;
        debug!(path = %path.as_ref().display(), "loaded schema document");
        Self::from_value(value)
    }

    /// Parses a document from YAML (or JSON) text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_value(serde_yaml::from_str(text)?)
    }

    fn from_value(mut value: serde_yaml::Value) -> Result<Self> {
        let version = match value.get("version") {
            Some(serde_yaml::Value::String(version)) => version.clone(),
            Some(serde_yaml::Value::Number(version)) => version.to_string(),
            _ => return Err(DocumentError::MissingVersion),
        };
        // Numeric versions (`version: 2`) are stored as text.
        if let serde_yaml::Value::Mapping(mapping) = &mut value {
            mapping.insert("version".into(), version.clone().into());
        }

        match version.split('.').next().unwrap_or_default() {
            "1" => Ok(Self::Legacy(serde_yaml::from_value(value)?)),
            "2" => Ok(Self::Current(serde_yaml::from_value(value)?)),
            _ => Err(DocumentError::UnsupportedVersion(version)),
        }
    }

    /// Saves the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DocumentError::IoError) if the file cannot be
    /// written, or [`YamlError`](DocumentError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        match self {
            Self::Legacy(document) => serde_yaml::to_writer(writer, document)?,
            Self::Current(document) => serde_yaml::to_writer(writer, document)?,
        }
        Ok(())
    }

    pub fn version(&self) -> &str {
        match self {
            Self::Legacy(document) => &document.version,
            Self::Current(document) => &document.version,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Legacy(document) => document.description.as_deref(),
            Self::Current(document) => document.description.as_deref(),
        }
    }

    /// Resolves every node in the document.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found.
    pub fn check(&self) -> std::result::Result<(), SchemaError> {
        match self {
            Self::Legacy(document) => document.args_schema().check(),
            Self::Current(document) => document.args_schema().check(),
        }
    }

    /// Names of the declared options, sorted.
    pub fn option_names(&self) -> Vec<&str> {
        fn names<N>(document: &Document<N>) -> Vec<&str> {
            document
                .options
                .iter()
                .flat_map(|options| options.keys().map(String::as_str))
                .collect()
        }
        match self {
            Self::Legacy(document) => names(document),
            Self::Current(document) => names(document),
        }
    }

    /// Parses `tokens` against the document.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> crate::Result<ParsedArgs> {
        match self {
            Self::Legacy(document) => parse(&document.args_schema(), tokens),
            Self::Current(document) => parse(&document.args_schema(), tokens),
        }
    }

    /// Re-serializes `parsed` into tokens under this document's schema.
    pub fn to_tokens(&self, parsed: &ParsedArgs) -> std::result::Result<Vec<String>, SchemaError> {
        match self {
            Self::Legacy(document) => parsed.to_tokens(&document.args_schema()),
            Self::Current(document) => parsed.to_tokens(&document.args_schema()),
        }
    }
}
