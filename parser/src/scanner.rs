//! Single-pass token scanner.
//!
//! The scanner walks the token array once with a forward-only cursor,
//! classifies each token, consumes as many following tokens as the
//! option's kind requires, and accumulates a [`RawArgs`] value. No
//! validation happens here beyond primitive boolean/number decoding.

use argschema_core::{Kind, SchemaError, SchemaNode, resolve, resolve_kind};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::args::OptionsSchema;
use crate::decode;
use crate::error::{DecodeError, DecodeReason, Result};

/// Prefix that marks an option token.
pub const OPTION_PREFIX: &str = "--";
/// Prefix that negates a boolean option (`--no-verbose`).
pub const NEGATION_PREFIX: &str = "no-";
/// Standalone token that starts the passthrough tail.
pub const PASSTHROUGH_MARKER: &str = "--";

/// Shaped but unvalidated output of a scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArgs {
    /// Decoded option values keyed by option name.
    pub options: Map<String, Value>,
    /// Positional tokens in encounter order.
    pub positionals: Vec<String>,
    /// Tokens after the first standalone `--`, verbatim.
    pub passthrough: Option<Vec<String>>,
}

/// Scans `tokens` against `options`.
///
/// # Errors
///
/// Returns [`ParseError::Schema`](crate::ParseError::Schema) when a matched
/// option's kind cannot be resolved, and
/// [`ParseError::Decode`](crate::ParseError::Decode) when a value cannot be
/// decoded or is missing.
///
/// # Examples
///
/// ```
/// use argschema::{OptionsSchema, scan};
/// use argschema_core::Schema;
/// use serde_json::json;
///
/// let options = OptionsSchema::new().with_option("flag", Schema::boolean());
/// let raw = scan(Some(&options), &["p1", "--flag", "p2", "--", "x"]).unwrap();
/// assert_eq!(raw.options["flag"], json!(true));
/// assert_eq!(raw.positionals, vec!["p1", "p2"]);
/// assert_eq!(raw.passthrough, Some(vec!["x".to_string()]));
/// ```
pub fn scan<N, S>(options: Option<&OptionsSchema<N>>, tokens: &[S]) -> Result<RawArgs>
where
    N: SchemaNode,
    S: AsRef<str>,
{
    Scanner {
        options,
        tokens,
        cursor: 0,
        raw: RawArgs::default(),
    }
    .run()
}

struct Scanner<'a, N, S> {
    options: Option<&'a OptionsSchema<N>>,
    tokens: &'a [S],
    cursor: usize,
    raw: RawArgs,
}

impl<'a, N, S> Scanner<'a, N, S>
where
    N: SchemaNode,
    S: AsRef<str>,
{
    fn run(mut self) -> Result<RawArgs> {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.cursor).map(AsRef::as_ref) {
            trace!(cursor = self.cursor, token, "scanning token");

            if token == PASSTHROUGH_MARKER {
                let tail: Vec<String> = tokens[self.cursor + 1..]
                    .iter()
                    .map(|t| t.as_ref().to_string())
                    .collect();
                debug!(len = tail.len(), "passthrough marker; stopping scan");
                self.raw.passthrough = Some(tail);
                break;
            }

            match token.strip_prefix(OPTION_PREFIX) {
                Some(body) => self.option(body)?,
                None => self.raw.positionals.push(token.to_string()),
            }
            self.cursor += 1;
        }
        Ok(self.raw)
    }

    fn option(&mut self, body: &'a str) -> Result<()> {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let base_name = name.strip_prefix(NEGATION_PREFIX);

        let lookup = self.options.and_then(|options| {
            options.get(name).map(|node| (node, None)).or_else(|| {
                base_name.and_then(|base| options.get(base).map(|node| (node, Some(base))))
            })
        });
        let Some((node, negated_base)) = lookup else {
            self.undeclared(name, inline);
            return Ok(());
        };

        let resolved = resolve(node)?;
        match resolved.kind {
            Kind::Boolean => {
                let value = match inline {
                    Some(raw) => decode::boolean(name, raw)?,
                    None => true,
                };
                match negated_base {
                    Some(base) => self.store(base, Value::Bool(!value)),
                    None => self.store(name, Value::Bool(value)),
                }
            }
            Kind::Array => {
                let element = resolved.node.element().ok_or_else(|| {
                    SchemaError::InvalidDescriptor(format!("array option '{name}' declares no element"))
                })?;
                let kind = resolve_kind(element)?;
                let raw = self.value(name, inline)?;
                let value = decode::value(name, raw, kind)?;
                self.append(name, value);
            }
            Kind::Tuple => {
                let value = self.tuple(name, resolved.node, inline)?;
                self.store(name, value);
            }
            kind => {
                let raw = self.value(name, inline)?;
                let value = decode::value(name, raw, kind)?;
                self.store(name, value);
            }
        }
        Ok(())
    }

    /// Undeclared option: keep its inline value, else the next token when
    /// it is not itself an option, else a bare `true`.
    fn undeclared(&mut self, name: &str, inline: Option<&str>) {
        let value = match inline {
            Some(raw) => Value::String(raw.to_string()),
            None => match self.peek() {
                Some(next) if !next.starts_with(OPTION_PREFIX) => {
                    self.cursor += 1;
                    Value::String(next.to_string())
                }
                _ => Value::Bool(true),
            },
        };
        debug!(option = name, "undeclared option");
        self.store(name, value);
    }

    fn tuple(&mut self, name: &str, node: &N, inline: Option<&'a str>) -> Result<Value> {
        let mut pending = inline;
        let mut values = Vec::new();

        for item in node.items() {
            let kind = resolve_kind(item)?;
            let raw = match pending.take() {
                Some(raw) => raw,
                None => self.next(name)?,
            };
            values.push(decode::value(name, raw, kind)?);
        }

        if let Some(rest) = node.rest() {
            let kind = resolve_kind(rest)?;
            if let Some(raw) = pending.take() {
                values.push(decode::value(name, raw, kind)?);
            }
            while let Some(next) = self.peek() {
                if next.starts_with(OPTION_PREFIX) {
                    break;
                }
                self.cursor += 1;
                values.push(decode::value(name, next, kind)?);
            }
        }

        if pending.is_some() {
            debug!(option = name, "inline value ignored by empty tuple");
        }
        Ok(Value::Array(values))
    }

    /// Inline value if present, else the next token.
    fn value(&mut self, name: &str, inline: Option<&'a str>) -> Result<&'a str> {
        match inline {
            Some(raw) => Ok(raw),
            None => self.next(name),
        }
    }

    /// Consumes the next token regardless of its shape.
    fn next(&mut self, name: &str) -> Result<&'a str> {
        let next = self
            .peek()
            .ok_or_else(|| DecodeError::new(name, DecodeReason::MissingValue))?;
        self.cursor += 1;
        Ok(next)
    }

    fn peek(&self) -> Option<&'a str> {
        let tokens = self.tokens;
        tokens.get(self.cursor + 1).map(AsRef::as_ref)
    }

    fn store(&mut self, name: &str, value: Value) {
        self.raw.options.insert(name.to_string(), value);
    }

    fn append(&mut self, name: &str, value: Value) {
        match self.raw.options.get_mut(name) {
            Some(Value::Array(values)) => values.push(value),
            _ => self.store(name, Value::Array(vec![value])),
        }
    }
}
