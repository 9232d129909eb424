//! Schema-driven command-line argument parsing.
//!
//! A token array is scanned once, left to right. Each `--option` is
//! matched against the declared [`OptionsSchema`], consumes the tokens
//! its kind requires, and has its raw text decoded (booleans and numbers
//! only). Everything else is collected as a positional, and a standalone
//! `--` ends scanning. The scanned options and positionals are then
//! validated together against the schema, so a single [`ParseError`]
//! reports every failure.
//!
//! # Main entry points
//!
//! - [`parse`]: parse a token slice against an [`ArgsSchema`].
//! - [`parse_env`]: parse the current process arguments.
//! - [`scan`]: the scanner alone, returning unvalidated [`RawArgs`].
//! - [`SchemaDocument`]: load an argument schema from a YAML or JSON file.
//!
//! Schemas can be built from any [`SchemaNode`](argschema_core::SchemaNode)
//! flavor: the native [`Schema`](argschema_core::Schema) builder, or the
//! serializable [`Descriptor`](argschema_core::Descriptor) and
//! [`LegacyDescriptor`](argschema_core::LegacyDescriptor) nodes.
//!
//! # Example
//!
//! ```
//! use argschema::{ArgsSchema, OptionsSchema, parse};
//! use argschema_core::Schema;
//! use serde_json::json;
//!
//! let schema = ArgsSchema::new()
//!     .with_options(
//!         OptionsSchema::new()
//!             .with_option("verbose", Schema::boolean().default(false))
//!             .with_option("include", Schema::array(Schema::string()).default(json!([]))),
//!     )
//!     .with_positionals(Schema::array(Schema::string()));
//!
//! let parsed = parse(
//!     &schema,
//!     &["src", "--include", "*.rs", "--include=*.toml", "--", "--not-an-option"],
//! )
//! .unwrap();
//!
//! assert_eq!(parsed.options["verbose"], json!(false));
//! assert_eq!(parsed.options["include"], json!(["*.rs", "*.toml"]));
//! assert_eq!(parsed.positionals, vec![json!("src")]);
//! assert_eq!(parsed.passthrough, Some(vec!["--not-an-option".to_string()]));
//! ```

mod args;
pub mod decode;
pub mod document;
mod error;
mod parse;
mod scanner;

pub use args::{ArgsSchema, OptionsSchema, ParsedArgs};
pub use document::{Document, DocumentError, SchemaDocument};
pub use error::{DecodeError, DecodeReason, ParseError, Result};
pub use parse::{parse, parse_env};
pub use scanner::{NEGATION_PREFIX, OPTION_PREFIX, PASSTHROUGH_MARKER, RawArgs, scan};
