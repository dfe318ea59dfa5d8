mod info;
mod resolve;
mod write;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use xcsettings_lib::project::Project;
use xcsettings_lib::settings::{Diagnostic, SettingsArena};

use crate::output::{Line, emit};

pub use info::cmd_info;
pub use resolve::{ResolveTarget, cmd_resolve};
pub use write::cmd_write;

/// Loads and validates a project description.
fn load_arena(path: &Path) -> Result<SettingsArena> {
  let project = Project::from_path(path).with_context(|| format!("Failed to load project: {}", path.display()))?;
  let arena = SettingsArena::new(project).with_context(|| format!("Invalid project: {}", path.display()))?;
  debug!(project = %path.display(), resolvers = arena.keys().len(), "project loaded");
  Ok(arena)
}

/// Reports the override keys a resolver dropped.
fn report_conflicts(diagnostics: &[Diagnostic]) {
  for diagnostic in diagnostics {
    emit(Line::Conflict, &diagnostic.to_string());
  }
}
