mod error_formatter;
mod formatter;
mod server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use error_formatter::SourcedError;
use formatter::Formatter;
use pricerule::{Definition, Engine, ResourceLimits, RuleError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pricerule")]
#[command(about = "Check, format and apply conditional pricing rules.")]
#[command(
    long_about = "pricerule validates pricing rules such as\n  IF booking_hours >= 4 THEN booking_hours * 10 ELSE booking_hours * 8\nagainst a stored definition, prints their canonical form, and can serve the same checks over HTTP."
)]
#[command(version)]
struct Cli {
    /// Log engine decisions (sets RUST_LOG=pricerule=debug unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Maximum nesting depth of arithmetic expressions
    #[arg(long, global = true, value_name = "DEPTH")]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate rule text and show its canonical form
    ///
    /// Runs the full pipeline (parsing, type checks, contradiction and
    /// duplicate detection) without changing any file.
    Check {
        /// Rule text, e.g. "IF booking_hours > 4 THEN booking_hours * 10"
        text: String,
        /// Stored definition JSON providing the variables (default: reserved variables only)
        #[arg(short = 'd', long = "definition")]
        definition: Option<PathBuf>,
    },
    /// Evaluate an arithmetic expression
    ///
    /// Examples:
    ///   pricerule eval "2 + 3 * 4"
    ///   pricerule eval "booking_hours * rate" booking_hours=3 rate=12.5
    Eval {
        /// Expression using + - * / and parentheses
        expression: String,
        /// Variable values (format: key=number)
        values: Vec<String>,
    },
    /// Print the canonical rule text of a stored definition
    Format {
        /// Stored definition JSON
        #[arg(short = 'd', long = "definition")]
        definition: PathBuf,
    },
    /// Apply rule text to a stored definition and print the result as JSON
    Apply {
        /// Rule text to apply
        text: String,
        /// Stored definition JSON
        #[arg(short = 'd', long = "definition")]
        definition: PathBuf,
        /// Write the updated definition back to the file instead of printing it
        #[arg(short, long)]
        write: bool,
    },
    /// Start HTTP REST API server (default: localhost:3000)
    ///
    /// API: GET /health, POST /validate with {text, definition?},
    /// POST /evaluate with {expression, variables}
    Server {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port number to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, matches!(cli.command, Commands::Server { .. }));

    let mut limits = ResourceLimits::default();
    if let Some(depth) = cli.max_depth {
        limits.max_expression_depth = depth;
    }
    let engine = Engine::with_limits(limits);

    let result = match &cli.command {
        Commands::Check { text, definition } => check_command(&engine, text, definition.as_deref()),
        Commands::Eval { expression, values } => eval_command(&engine, expression, values),
        Commands::Format { definition } => format_command(&engine, definition),
        Commands::Apply {
            text,
            definition,
            write,
        } => apply_command(&engine, text, definition, *write),
        Commands::Server { host, port } => server_command(engine, host, *port),
    };

    if let Err(e) = result {
        if let Some(sourced) = e.downcast_ref::<SourcedError>() {
            eprintln!("{}", error_formatter::format_sourced(sourced));
        } else if let Some(rule_err) = e.downcast_ref::<RuleError>() {
            eprintln!("{}", error_formatter::format_error(rule_err));
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, server: bool) {
    let default_filter = match (verbose, server) {
        (true, true) => "pricerule=debug,tower_http=debug",
        (true, false) => "pricerule=debug",
        (false, true) => "pricerule=info,tower_http=info",
        (false, false) => "pricerule=info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn check_command(engine: &Engine, text: &str, definition: Option<&Path>) -> Result<()> {
    let base = match definition {
        Some(path) => load_definition(engine, path)?,
        None => Definition::with_reserved(),
    };

    let updated = engine
        .apply_expression(&base, text)
        .map_err(|e| SourcedError::new(e, "<rule>", text))?;

    let formatter = Formatter::default();
    print!("{}", formatter.format_definition(&updated, &engine.serialize(&updated)));
    Ok(())
}

fn eval_command(engine: &Engine, expression: &str, values: &[String]) -> Result<()> {
    let variables = parse_values(values)?;
    let value = engine
        .evaluate(expression, &variables)
        .map_err(|e| SourcedError::new(e, "<expression>", expression))?;
    println!("{}", Formatter::default().format_number(value));
    Ok(())
}

fn format_command(engine: &Engine, path: &Path) -> Result<()> {
    let definition = load_definition(engine, path)?;
    println!("{}", engine.serialize(&definition));
    Ok(())
}

fn apply_command(engine: &Engine, text: &str, path: &Path, write: bool) -> Result<()> {
    let definition = load_definition(engine, path)?;
    let updated = engine
        .apply_expression(&definition, text)
        .map_err(|e| SourcedError::new(e, "<rule>", text))?;
    let json = engine.to_json(&updated)?;

    if write {
        fs::write(path, format!("{}\n", json))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Updated {}", path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn server_command(engine: Engine, host: &str, port: u16) -> Result<()> {
    #[cfg(feature = "server")]
    {
        use tokio::runtime::Runtime;
        let rt = Runtime::new()?;
        return rt.block_on(server::http::start_server(engine, host, port));
    }

    #[cfg(not(feature = "server"))]
    {
        let _ = (engine, host, port);
        anyhow::bail!("Server feature not enabled. Recompile with: cargo build --features server");
    }
}

/// Read and validate a stored definition
fn load_definition(engine: &Engine, path: &Path) -> Result<Definition> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read definition {}", path.display()))?;
    Ok(engine.from_json(&json)?)
}

/// Parse `key=number` pairs
fn parse_values(values: &[String]) -> Result<HashMap<String, f64>> {
    values
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("Expected key=number, got '{}'", pair))?;
            let number: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("'{}' is not a number", value.trim()))?;
            Ok((key.trim().to_string(), number))
        })
        .collect()
}
