//! gantry: a meta-build tool.
//!
//! `BUILD.rs` files across the workspace declare build targets; gantry stages
//! them into a synthesized driver project, runs it to materialize the action
//! graph, and hands the graph to Ninja for incremental execution.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

mod cmd;
mod output;

#[derive(Parser)]
#[command(name = "gantry")]
#[command(author, version, about = "Meta-build tool: BUILD.rs files in, Ninja builds out", long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the given targets
  Build {
    /// Target labels (`...` wildcard supported) and `name=value` build flags;
    /// with no targets, prints the available targets and flags
    args: Vec<String>,

    /// Output format for the no-target listing
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Print completion suggestions for a partial build argument
  Complete {
    /// The partial argument being completed
    #[arg(default_value = "")]
    prefix: String,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_filter = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .without_time()
    .with_writer(std::io::stderr)
    .init();

  let result = match cli.command {
    Commands::Build { args, format } => cmd::cmd_build(&args, format, cli.verbose),
    Commands::Complete { prefix } => cmd::cmd_complete(&prefix),
  };

  if let Err(err) = result {
    output::print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}
