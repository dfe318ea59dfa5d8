//! Reading project descriptions from disk.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::error::ProjectError;
use super::types::Project;

impl Project {
  /// Loads a project description, picking the format from the extension.
  ///
  /// The result is parsed but not validated; see
  /// [`TargetGraph::new`](super::TargetGraph::new).
  pub fn from_path(path: &Path) -> Result<Self, ProjectError> {
    let contents = fs::read_to_string(path).map_err(|source| ProjectError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let extension = path
      .extension()
      .map(|e| e.to_string_lossy().to_ascii_lowercase())
      .unwrap_or_default();
    let project = match extension.as_str() {
      "json" => Self::from_json_str(&contents)?,
      "yaml" | "yml" => Self::from_yaml_str(&contents)?,
      _ => return Err(ProjectError::UnsupportedFormat(path.to_path_buf())),
    };

    debug!(
      path = %path.display(),
      pod_targets = project.pod_targets.len(),
      aggregate_targets = project.aggregate_targets.len(),
      "loaded project"
    );
    Ok(project)
  }

  pub fn from_json_str(contents: &str) -> Result<Self, ProjectError> {
    Ok(serde_json::from_str(contents)?)
  }

  pub fn from_yaml_str(contents: &str) -> Result<Self, ProjectError> {
    Ok(serde_yaml::from_str(contents)?)
  }
}
