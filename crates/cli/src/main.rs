mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::ResolveTarget;
use crate::output::{Line, OutputFormat, emit};

/// xcsettings - resolve xcconfig build settings for pod and aggregate targets
#[derive(Parser)]
#[command(name = "xcsettings")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the settings of one target
  Resolve {
    /// Path to the project description (.json, .yaml or .yml)
    project: PathBuf,

    /// Pod target to resolve
    #[arg(long, conflicts_with = "aggregate", required_unless_present = "aggregate")]
    pod: Option<String>,

    /// Resolve the pod's test product
    #[arg(long, requires = "pod")]
    test: bool,

    /// Aggregate target to resolve
    #[arg(long, requires = "configuration")]
    aggregate: Option<String>,

    /// Build configuration of the aggregate target
    #[arg(long)]
    configuration: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Write the xcconfig of every target
  Write {
    /// Path to the project description (.json, .yaml or .yml)
    project: PathBuf,

    /// Directory the `Target Support Files` tree is written to
    #[arg(short, long, default_value = "Pods")]
    out: PathBuf,
  },

  /// Show targets and their dependencies
  Info {
    /// Path to the project description (.json, .yaml or .yml)
    project: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
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

  if let Err(err) = run(cli) {
    emit(Line::Failure, &format!("error: {:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Resolve {
      project,
      pod,
      test,
      aggregate,
      configuration,
      format,
    } => {
      let target = match (pod, aggregate, configuration) {
        (Some(name), _, _) => ResolveTarget::Pod { name, test },
        (None, Some(name), Some(configuration)) => ResolveTarget::Aggregate { name, configuration },
        _ => anyhow::bail!("either --pod or --aggregate with --configuration is required"),
      };
      cmd::cmd_resolve(&project, &target, format)
    }
    Commands::Write { project, out } => cmd::cmd_write(&project, &out),
    Commands::Info { project, format } => cmd::cmd_info(&project, format),
  }
}
