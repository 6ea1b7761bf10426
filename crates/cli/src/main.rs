mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{cmd_body, cmd_query, cmd_tag};
use crate::output::{OutputFormat, print_error};

/// parambind - bind URL parameters into typed, validated records
#[derive(Parser)]
#[command(name = "parambind")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Fields of the record to bind into.
#[derive(Args)]
pub struct RecordArgs {
  /// Field declaration `Name:type[:annotation]` (type: string, bytes, int32, int64)
  #[arg(short, long = "field", value_name = "SPEC")]
  pub fields: Vec<String>,

  /// JSON file with an array of `{ "name", "type", "tag" }` declarations
  #[arg(short, long, value_name = "FILE")]
  pub schema: Option<PathBuf>,

  /// Output format
  #[arg(long, value_enum, default_value_t)]
  pub format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
  /// Bind a URL query string
  Query {
    /// Query string, with or without the leading `?`
    query: String,

    #[command(flatten)]
    record: RecordArgs,
  },

  /// Bind a URL-encoded request body
  Body {
    /// Body file, or `-` for stdin
    #[arg(default_value = "-")]
    file: PathBuf,

    #[command(flatten)]
    record: RecordArgs,
  },

  /// Parse a field annotation and show its directives
  Tag {
    /// Annotation string, e.g. `omitempty,range[1:]`
    #[arg(allow_hyphen_values = true)]
    annotation: String,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli.command) {
    print_error(&format!("{e:#}"));
    std::process::exit(1);
  }
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Query { query, record } => cmd_query(&query, &record),
    Commands::Body { file, record } => cmd_body(&file, &record),
    Commands::Tag { annotation, format } => cmd_tag(&annotation, format),
  }
}
