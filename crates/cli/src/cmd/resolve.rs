//! Implementation of the `xcsettings resolve` command.

use std::path::Path;

use anyhow::{Context, Result};

use crate::output::{OutputFormat, print_json};

/// Which resolver to print.
pub enum ResolveTarget {
  Pod { name: String, test: bool },
  Aggregate { name: String, configuration: String },
}

pub fn cmd_resolve(path: &Path, target: &ResolveTarget, format: OutputFormat) -> Result<()> {
  let arena = super::load_arena(path)?;

  let key = match target {
    ResolveTarget::Pod { name, test } => arena.pod(name, *test)?.key(),
    ResolveTarget::Aggregate { name, configuration } => arena.aggregate(name, configuration)?.key(),
  };
  let resolution = arena
    .resolve(&key)
    .with_context(|| format!("Failed to resolve {}", arena.label(&key)))?;

  if format.is_json() {
    print_json(&resolution)?;
  } else {
    print!("{}", resolution.xcconfig.render());
    super::report_conflicts(&resolution.diagnostics);
  }
  Ok(())
}
