use std::path::{Path, PathBuf};

use argschema::{ParseError, ParsedArgs, SchemaDocument};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status for input that the schema rejects.
const EXIT_USER_ERROR: i32 = 2;
/// Exit status for configuration and I/O failures.
const EXIT_FAILURE: i32 = 1;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argschema")]
#[command(about = "Decode command-line tokens against a schema document")]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse tokens (given after `--`) against a schema document.
    Parse(ParseArgs),
    /// Load schema documents and report configuration errors.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema document (YAML or JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,
    /// Tokens to parse, verbatim.
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema documents to check.
    #[arg(long = "schema", required = true)]
    schemas: Vec<PathBuf>,
}

/// A failed command and the exit status it maps to.
#[derive(Debug)]
enum Failure {
    /// The tokens were rejected by the schema.
    Input(String),
    Other(String),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Input(_) => EXIT_USER_ERROR,
            Failure::Other(_) => EXIT_FAILURE,
        }
    }

    fn message(&self) -> &str {
        match self {
            Failure::Input(message) | Failure::Other(message) => message,
        }
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Other(message)
    }
}

impl From<ParseError> for Failure {
    fn from(err: ParseError) -> Self {
        if err.is_user_error() {
            Failure::Input(err.to_string())
        } else {
            Failure::Other(err.to_string())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {}", err.message());
        std::process::exit(err.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "argschema=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(path: &Path) -> Result<SchemaDocument, String> {
    SchemaDocument::load(path)
        .map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))
}

fn run_parse(args: ParseArgs) -> Result<(), Failure> {
    let document = load_document(&args.schema)?;
    debug!(
        schema = %args.schema.display(),
        version = document.version(),
        tokens = args.tokens.len(),
        "parsing tokens"
    );

    let parsed = document.parse(&args.tokens)?;
    info!(
        options = parsed.options.len(),
        positionals = parsed.positionals.len(),
        "tokens accepted"
    );

    println!("{}", render(&parsed, args.format, args.compact)?);
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), Failure> {
    for path in &args.schemas {
        let document = load_document(path)?;
        document
            .check()
            .map_err(|err| format!("Invalid schema '{}': {err}", path.display()))?;
        info!(schema = %path.display(), version = document.version(), "schema ok");
    }

    println!("Checked {} schema document(s).", args.schemas.len());
    Ok(())
}

fn render(parsed: &ParsedArgs, format: CliOutputFormat, compact: bool) -> Result<String, String> {
    let rendered = match format {
        CliOutputFormat::Json if compact => serde_json::to_string(parsed).map_err(|e| e.to_string()),
        CliOutputFormat::Json => serde_json::to_string_pretty(parsed).map_err(|e| e.to_string()),
        CliOutputFormat::Yaml => serde_yaml::to_string(parsed)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|e| e.to_string()),
    };
    rendered.map_err(|err| format!("Failed to serialize result: {err}"))
}
