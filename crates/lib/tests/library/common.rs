//! Shared helpers for library integration tests.

use std::path::PathBuf;

use xcsettings_lib::project::Project;
use xcsettings_lib::settings::SettingsArena;

/// Path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Loads and validates a fixture project.
pub fn fixture_arena(name: &str) -> SettingsArena {
  let project = Project::from_path(&fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e));
  SettingsArena::new(project).unwrap()
}
