//! Core schema types, kind resolution and validation for typed
//! command-line arguments.
//!
//! This crate defines the collaborator the argument scanner relies on:
//!
//! - [`Schema`]: native builder-style schema for one value (boolean,
//!   string, number, array, tuple with rest, enum, literal, object) with
//!   optional/default wrappers, coercion, checks and refinements.
//! - [`Descriptor`] / [`LegacyDescriptor`]: serializable schema nodes for
//!   the current and legacy document formats.
//! - [`SchemaNode`]: the capability trait all three flavors implement,
//!   and [`resolve`] which maps any node to a normalized [`Kind`].
//! - [`validate`]: coerces and checks a [`serde_json::Value`], reporting
//!   every failure in one [`ValidationError`].
//!
//! # Example
//!
//! ```
//! use argschema_core::*;
//! use serde_json::json;
//!
//! let files = Schema::array(Schema::string()).default(json!([]));
//! assert_eq!(resolve_kind(&files).unwrap(), Kind::Array);
//!
//! let out = validate(&files, &json!(["a.txt", "b.txt"])).unwrap();
//! assert_eq!(out, json!(["a.txt", "b.txt"]));
//! ```

mod descriptor;
mod error;
mod kind;
mod types;
mod validate;

pub use descriptor::{Descriptor, LegacyDescriptor};
pub use error::{Result, SchemaError};
pub use kind::{Kind, Resolved, SchemaNode, check_node, resolve, resolve_kind};
pub use types::*;
pub use validate::{Issue, IssueCode, PathSegment, ValidationError, parse_number, validate};
