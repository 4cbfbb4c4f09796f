//! sqlcell: inspect column types and cell values
//!
//! # Usage
//!
//! ```bash
//! # Show how a column type parses
//! sqlcell parse-type "Array(Tuple(Int32, Nullable(String)))"
//!
//! # Decode one cell
//! sqlcell decode "Array(Nullable(Int32))" "[1,NULL,3]" --json
//!
//! # Encode a JSON value as a SQL literal
//! sqlcell encode '["a", "it'"'"'s", null]'
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use sqlcell::encoder::encode_with_depth;
use sqlcell::prelude::*;
use sqlcell::types::parse_type_with_depth;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlcell")]
#[command(version)]
#[command(about = "Column type grammar and cell value codec", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlcell parse-type 'Nullable(DateTime64(3, \\'Asia/Tokyo\\'))'
    sqlcell decode 'Array(String)' \"['a','b,c']\"
    sqlcell encode '[[1, 2], [3]]'")]
struct Cli {
    /// Config file (defaults to <config dir>/sqlcell/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Default time zone for sub-second timestamps
    #[arg(long, global = true, env = "SQLCELL_TIMEZONE")]
    timezone: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a column type and print its structure
    ParseType {
        /// Column type text, e.g. "Array(Nullable(Int32))"
        type_text: String,
    },
    /// Decode one cell under a column type
    Decode {
        /// Column type text
        type_text: String,
        /// Cell text as received from the server
        cell: String,
        /// Print the value as JSON
        #[arg(long)]
        json: bool,
    },
    /// Encode a JSON value as a SQL literal
    Encode {
        /// JSON value: null, bool, number, string, or nested arrays
        json: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SQLCELL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<CodecConfig> {
    let mut config = match &cli.config {
        Some(path) => CodecConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => CodecConfig::load_default()?,
    };
    if let Some(tz) = &cli.timezone {
        config.default_timezone = tz.clone();
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let options = config.decode_options()?;

    match &cli.command {
        Commands::ParseType { type_text } => {
            let ty = parse_type_with_depth(type_text, options.max_depth);
            if cli.verbose {
                println!("{} {}", "Canonical:".dimmed(), ty.to_string().yellow());
            }
            print_tree(&ty, "", true, true);
        }
        Commands::Decode {
            type_text,
            cell,
            json,
        } => {
            let ty = parse_type_with_depth(type_text, options.max_depth);
            let value = decode_cell(cell, &ty, &options)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", value);
            }
        }
        Commands::Encode { json } => {
            let input: serde_json::Value =
                serde_json::from_str(json).context("input is not valid JSON")?;
            let value = from_json(&input)?;
            println!("{}", encode_with_depth(&value, options.max_depth)?);
        }
    }
    Ok(())
}

fn print_tree(ty: &Type, prefix: &str, last: bool, root: bool) {
    let branch = match (root, last) {
        (true, _) => "",
        (false, true) => "└── ",
        (false, false) => "├── ",
    };
    let nullable = if ty.is_nullable() { " (nullable)".dimmed().to_string() } else { String::new() };

    let (label, children): (String, Vec<&Type>) = match ty {
        Type::Scalar(s) if s.kind == Kind::Unknown => (s.to_string().red().to_string(), vec![]),
        Type::Scalar(s) => {
            let tz = s
                .timezone
                .map(|tz| format!(" tz={}", tz.name()).cyan().to_string())
                .unwrap_or_default();
            (format!("{}{}", s.to_string().green(), tz), vec![])
        }
        Type::Array { element, .. } => ("Array".bold().to_string(), vec![element.as_ref()]),
        Type::Tuple { elements, .. } => ("Tuple".bold().to_string(), elements.iter().collect()),
    };
    println!("{}{}{}{}", prefix, branch, label, nullable);

    let child_prefix = match (root, last) {
        (true, _) => prefix.to_string(),
        (false, true) => format!("{}    ", prefix),
        (false, false) => format!("{}│   ", prefix),
    };
    for (i, child) in children.iter().enumerate() {
        print_tree(child, &child_prefix, i + 1 == children.len(), false);
    }
}

fn from_json(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::from(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else if let Some(f) = n.as_f64() {
                Value::from(f)
            } else {
                bail!("unsupported number {}", n)
            }
        }
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.iter().map(from_json).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(_) => bail!("objects have no SQL literal form"),
    })
}
