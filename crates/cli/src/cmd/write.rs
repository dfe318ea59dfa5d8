//! Implementation of the `xcsettings write` command.
//!
//! Every resolver the project defines is generated and saved under
//! `<out>/Target Support Files/`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::output::{Line, emit};

pub fn cmd_write(path: &Path, out: &Path) -> Result<()> {
  let arena = super::load_arena(path)?;

  let keys = arena.keys();
  for key in &keys {
    let resolution = arena
      .generate(key)
      .with_context(|| format!("Failed to resolve {}", arena.label(key)))?;
    let destination = out.join(arena.xcconfig_path(key)?);
    resolution
      .xcconfig
      .save_as(&destination)
      .with_context(|| format!("Failed to write {}", destination.display()))?;
    emit(Line::Wrote, &destination.display().to_string());
    super::report_conflicts(&resolution.diagnostics);
  }

  emit(Line::Done, &format!("Wrote {} xcconfig file(s)", keys.len()));
  Ok(())
}
