//! The rendered build configuration: an ordered `KEY = value` mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::settings::is_plural;

#[derive(Debug, Error)]
pub enum XcconfigError {
  #[error("failed to write {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A build configuration file's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Xcconfig {
  attributes: BTreeMap<String, String>,
}

impl Xcconfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.attributes.get(key).map(String::as_str)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.attributes.insert(key.into(), value.into());
  }

  pub fn len(&self) -> usize {
    self.attributes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.attributes.is_empty()
  }

  /// Merges `overrides` on top of this configuration.
  ///
  /// Singular keys are replaced. For plural keys the existing value is kept
  /// when it already contains every override token or starts with them, the
  /// override is kept when it extends the existing value, and otherwise the
  /// two are joined.
  pub fn merge(&mut self, overrides: &BTreeMap<String, String>) {
    for (key, value) in overrides {
      let merged = match self.attributes.get(key) {
        Some(existing) if is_plural(key) => merge_plural(existing, value),
        _ => value.trim().to_string(),
      };
      self.attributes.insert(key.clone(), merged);
    }
  }

  /// `KEY = value` lines sorted by key, newline terminated.
  pub fn render(&self) -> String {
    let mut out = String::new();
    for (key, value) in &self.attributes {
      out.push_str(key);
      out.push_str(" = ");
      out.push_str(value);
      out.push('\n');
    }
    out
  }

  /// Writes the rendered configuration, creating parent directories.
  pub fn save_as(&self, path: &Path) -> Result<(), XcconfigError> {
    let io_err = |source| XcconfigError::Io {
      path: path.to_path_buf(),
      source,
    };
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, self.render()).map_err(io_err)?;
    debug!(path = %path.display(), settings = self.len(), "wrote xcconfig");
    Ok(())
  }
}

impl From<BTreeMap<String, String>> for Xcconfig {
  fn from(attributes: BTreeMap<String, String>) -> Self {
    Self { attributes }
  }
}

fn merge_plural(existing: &str, value: &str) -> String {
  let existing = existing.trim();
  let value = value.trim();
  let existing_tokens: Vec<&str> = existing.split_whitespace().collect();
  let value_tokens: Vec<&str> = value.split_whitespace().collect();

  let contained = value_tokens.iter().all(|t| existing_tokens.contains(t));
  if contained || existing_tokens.starts_with(&value_tokens) {
    existing.to_string()
  } else if value_tokens.starts_with(&existing_tokens) {
    value.to_string()
  } else {
    format!("{} {}", existing, value)
  }
}
