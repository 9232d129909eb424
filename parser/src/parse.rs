//! Parse entry points and the validation handoff.

use std::collections::BTreeMap;

use argschema_core::{Schema, SchemaError, SchemaNode, validate};
use serde_json::{Map, Value};
use tracing::debug;

use crate::args::{ArgsSchema, ParsedArgs};
use crate::error::Result;
use crate::scanner::{RawArgs, scan};

const OPTIONS_KEY: &str = "options";
const POSITIONALS_KEY: &str = "positionals";

/// Parses `tokens` against `schema`.
///
/// The tokens are scanned once, then options and positionals are validated
/// together so every failure is reported in one error.
///
/// # Errors
///
/// - [`ParseError::Schema`](crate::ParseError::Schema) for unusable schema nodes.
/// - [`ParseError::Decode`](crate::ParseError::Decode) for undecodable or missing values.
/// - [`ParseError::Validation`](crate::ParseError::Validation) when validation fails.
///
/// # Examples
///
/// ```
/// use argschema::{ArgsSchema, OptionsSchema, parse};
/// use argschema_core::Schema;
/// use serde_json::json;
///
/// let schema = ArgsSchema::new()
///     .with_options(
///         OptionsSchema::new()
///             .with_option("foo", Schema::boolean())
///             .with_option("bar", Schema::boolean())
///             .with_option("baz", Schema::boolean().default(true))
///             .with_option("string", Schema::string())
///             .with_option("number", Schema::number().int().positive()),
///     )
///     .with_positionals(Schema::tuple([Schema::string(), Schema::number().coerce()]));
///
/// let parsed = parse(
///     &schema,
///     &["--foo", "--no-bar", "--string", "hello", "positional1", "--number", "1", "2"],
/// )
/// .unwrap();
///
/// assert_eq!(
///     serde_json::to_value(&parsed).unwrap(),
///     json!({
///         "options": {"bar": false, "baz": true, "foo": true, "number": 1, "string": "hello"},
///         "positionals": ["positional1", 2],
///     })
/// );
/// ```
pub fn parse<N, S>(schema: &ArgsSchema<N>, tokens: &[S]) -> Result<ParsedArgs>
where
    N: SchemaNode,
    S: AsRef<str>,
{
    let raw = scan(schema.options.as_ref(), tokens)?;
    debug!(
        options = raw.options.len(),
        positionals = raw.positionals.len(),
        passthrough = raw.passthrough.is_some(),
        "scan complete"
    );
    handoff(schema, raw)
}

/// Parses the current process arguments, excluding the program name.
///
/// Arguments that are not valid Unicode are converted lossily.
pub fn parse_env<N: SchemaNode>(schema: &ArgsSchema<N>) -> Result<ParsedArgs> {
    let tokens: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    parse(schema, &tokens)
}

/// Validates raw scan output as one `{options, positionals}` structure.
fn handoff<N: SchemaNode>(schema: &ArgsSchema<N>, raw: RawArgs) -> Result<ParsedArgs> {
    let mut shape = BTreeMap::new();
    let mut input = Map::new();

    match &schema.options {
        Some(options) => {
            let fields = options
                .iter()
                .map(|(name, node)| node.to_schema().map(|schema| (name.to_string(), schema)))
                .collect::<std::result::Result<BTreeMap<_, _>, SchemaError>>()?;
            shape.insert(
                OPTIONS_KEY.to_string(),
                Schema::object(fields).unknown_keys(options.unknown_keys()),
            );
            input.insert(OPTIONS_KEY.to_string(), Value::Object(raw.options));
        }
        None if !raw.options.is_empty() => {
            debug!(count = raw.options.len(), "no options schema; dropping scanned options");
        }
        None => {}
    }

    match &schema.positionals {
        Some(positionals) => {
            shape.insert(POSITIONALS_KEY.to_string(), positionals.to_schema()?);
            input.insert(
                POSITIONALS_KEY.to_string(),
                Value::Array(raw.positionals.into_iter().map(Value::String).collect()),
            );
        }
        None if !raw.positionals.is_empty() => {
            debug!(
                count = raw.positionals.len(),
                "no positionals schema; dropping positionals"
            );
        }
        None => {}
    }

    let validated = validate(&Schema::object(shape), &Value::Object(input))?;
    let mut fields = match validated {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };

    let options = match fields.remove(OPTIONS_KEY) {
        Some(Value::Object(options)) => options,
        _ => Map::new(),
    };
    let positionals = match fields.remove(POSITIONALS_KEY) {
        Some(Value::Array(positionals)) => positionals,
        Some(Value::Null) | None => Vec::new(),
        // A positionals schema that is not sequence-shaped yields a single value.
        Some(other) => vec![other],
    };

    Ok(ParsedArgs {
        options,
        positionals,
        passthrough: raw.passthrough,
    })
}

#[cfg(test)]
mod tests {
    use argschema_core::{IssueCode, SchemaError};
    use serde_json::json;

    use super::*;
    use crate::args::OptionsSchema;
    use crate::error::ParseError;

    #[test]
    fn test_validation_errors_from_both_parts_are_aggregated() {
        let schema = ArgsSchema::new()
            .with_options(OptionsSchema::new().with_option("port", Schema::number().int()))
            .with_positionals(Schema::tuple([Schema::string()]));

        let err = parse(&schema, &["--port", "1.5", "a", "b"]).unwrap_err();
        let ParseError::Validation(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        let paths: Vec<_> = err.issues.iter().map(|i| i.path_string()).collect();
        assert_eq!(paths, vec!["options.port", "positionals"]);
    }

    #[test]
    fn test_absent_schemas_yield_empty_parts() {
        let schema = ArgsSchema::<Schema>::new();
        let parsed = parse(&schema, &["--flag", "pos"]).unwrap();
        assert!(parsed.options.is_empty());
        assert!(parsed.positionals.is_empty());
        assert!(parsed.passthrough.is_none());
    }

    #[test]
    fn test_strict_options_reject_undeclared() {
        let schema = ArgsSchema::new().with_options(OptionsSchema::<Schema>::new());
        let err = parse(&schema, &["--unknown"]).unwrap_err();
        match err {
            ParseError::Validation(err) => {
                assert_eq!(err.issues[0].code, IssueCode::UnrecognizedKeys);
                assert_eq!(
                    err.to_string(),
                    "Validation error: Unrecognized key(s) in object: 'unknown' at \"options\""
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_strip_options_drop_undeclared() {
        let schema = ArgsSchema::new().with_options(
            OptionsSchema::new()
                .with_option("flag", Schema::boolean())
                .strip(),
        );
        let parsed = parse(&schema, &["--flag", "--mystery", "x"]).unwrap();
        assert_eq!(parsed.options, json!({"flag": true}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_schema_error_in_positionals_conversion() {
        let schema = ArgsSchema::new().with_positionals(argschema_core::Descriptor::new("date"));
        let err = parse(&schema, &["x"]).unwrap_err();
        assert_eq!(err, ParseError::Schema(SchemaError::unsupported("date")));
        assert!(!err.is_user_error());
    }
}
