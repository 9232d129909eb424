//! Configuration errors raised while interpreting a schema.
//!
//! These indicate a mistake by the tool author (an unsupported kind, a
//! descriptor missing a required part) rather than bad user input.

use thiserror::Error;

/// Errors raised when a schema node cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The node declares a type name the resolver has no kind for.
    #[error("unsupported schema kind: \"{type_name}\"")]
    UnsupportedKind {
        /// Library-specific type name that failed to map.
        type_name: String,
    },

    /// The node declares a known kind but is structurally incomplete
    /// (e.g., an array without an element).
    #[error("invalid schema descriptor: {0}")]
    InvalidDescriptor(String),
}

impl SchemaError {
    /// Builds an [`UnsupportedKind`](SchemaError::UnsupportedKind) error.
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedKind {
            type_name: type_name.into(),
        }
    }
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
