//! Errors raised while loading and validating a project description.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
  /// The project file could not be read.
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid JSON project description: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid YAML project description: {0}")]
  Yaml(#[from] serde_yaml::Error),

  /// The file extension is neither `.json` nor `.yaml`/`.yml`.
  #[error("unsupported project file format: {0}")]
  UnsupportedFormat(PathBuf),

  #[error("duplicate {kind} target: {name}")]
  DuplicateTarget { kind: &'static str, name: String },

  #[error("target '{from}' references unknown pod target '{name}'")]
  UnknownPodTarget { from: String, name: String },

  #[error("aggregate target '{from}' references unknown aggregate target '{name}'")]
  UnknownAggregateTarget { from: String, name: String },

  /// Pod targets depend on each other in a cycle.
  #[error("dependency cycle involving pod target '{0}'")]
  DependencyCycle(String),

  /// Aggregates inherit search paths from each other in a cycle.
  #[error("search paths cycle involving aggregate target '{0}'")]
  SearchPathsCycle(String),

  #[error("aggregate target '{target}' has no build configuration '{configuration}'")]
  UnknownConfiguration { target: String, configuration: String },

  /// A search-paths aggregate does not declare a configuration its
  /// inheritor builds.
  #[error(
    "aggregate target '{target}' inherits search paths from '{inherited}', which has no build configuration '{configuration}'"
  )]
  MissingConfiguration {
    target: String,
    inherited: String,
    configuration: String,
  },

  #[error("aggregate target '{target}' declares invalid swift version '{version}'")]
  InvalidSwiftVersion { target: String, version: String },
}
