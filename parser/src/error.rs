//! Error types for argument parsing.
//!
//! Failures split into configuration mistakes by the tool author
//! ([`ParseError::Schema`]) and mistakes in user input
//! ([`ParseError::Decode`], [`ParseError::Validation`]). Use
//! [`ParseError::is_user_error`] to decide whether re-prompting can help.

use argschema_core::{SchemaError, ValidationError};
use thiserror::Error;

/// Why a raw token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeReason {
    /// Boolean text other than `true`, `false`, `1` or `0`.
    #[error("expected true, false, 1 or 0, received '{0}'")]
    InvalidBoolean(String),
    /// Text that does not parse as a finite number.
    #[error("expected a number, received '{0}'")]
    InvalidNumber(String),
    /// A valued option (or tuple position) ran out of tokens.
    #[error("missing value")]
    MissingValue,
}

/// A raw token could not be converted to the kind its option declares.
///
/// # Examples
///
/// ```
/// use argschema::{DecodeError, DecodeReason};
///
/// let err = DecodeError::new("count", DecodeReason::MissingValue);
/// assert_eq!(err.to_string(), "option '--count': missing value");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("option '--{option}': {reason}")]
pub struct DecodeError {
    /// Option name without the `--` prefix.
    pub option: String,
    pub reason: DecodeReason,
}

impl DecodeError {
    pub fn new(option: impl Into<String>, reason: DecodeReason) -> Self {
        Self {
            option: option.into(),
            reason,
        }
    }
}

/// Errors returned by [`parse`](crate::parse).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The schema itself is unusable.
    #[error("schema configuration error: {0}")]
    Schema(#[from] SchemaError),

    /// A token could not be decoded during the scan.
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// The scanned values failed schema validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl ParseError {
    /// Returns `true` for failures caused by the end user's input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, ParseError::Decode(_) | ParseError::Validation(_))
    }
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
