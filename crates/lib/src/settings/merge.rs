//! Merging xcconfig overrides declared by several specification consumers.
//!
//! Consumers of different libraries may set the same key. Boolean and
//! singular keys only survive when every consumer agrees; plural keys are
//! concatenated.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::registry::is_plural;

/// Which consumer attribute an override came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideSource {
  /// Settings a library applies to its own target.
  PodTargetXcconfig,
  /// Settings a library pushes onto the user targets integrating it.
  UserTargetXcconfig,
}

impl OverrideSource {
  pub const fn as_str(&self) -> &'static str {
    match self {
      OverrideSource::PodTargetXcconfig => "pod_target_xcconfig",
      OverrideSource::UserTargetXcconfig => "user_target_xcconfig",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
  Boolean,
  Singular,
}

impl ConflictKind {
  pub const fn as_str(&self) -> &'static str {
    match self {
      ConflictKind::Boolean => "Boolean",
      ConflictKind::Singular => "Singular",
    }
  }
}

/// A key dropped from the merged overrides because consumers disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub source: OverrideSource,
  pub key: String,
  pub kind: ConflictKind,
  /// Consumers that declared the key, in declaration order.
  pub consumers: Vec<String>,
  /// The distinct conflicting values.
  pub values: Vec<String>,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Can't merge {} for pod targets: {:?}. {} build setting {} has different values.",
      self.source.as_str(),
      self.consumers,
      self.kind.as_str(),
      self.key
    )
  }
}

/// Result of merging overrides: the agreed settings plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedOverrides {
  pub settings: BTreeMap<String, String>,
  pub diagnostics: Vec<Diagnostic>,
}

/// Collects override values grouped by key, then by consumer.
#[derive(Debug)]
pub struct OverrideCollector {
  source: OverrideSource,
  by_key: BTreeMap<String, Vec<(String, String)>>,
}

impl OverrideCollector {
  pub fn new(source: OverrideSource) -> Self {
    Self {
      source,
      by_key: BTreeMap::new(),
    }
  }

  /// Records every key/value pair a consumer declares.
  pub fn add(&mut self, consumer: &str, values: &BTreeMap<String, String>) {
    for (key, value) in values {
      self
        .by_key
        .entry(key.clone())
        .or_default()
        .push((consumer.to_string(), value.clone()));
    }
  }

  pub fn merge(self) -> MergedOverrides {
    let mut merged = MergedOverrides::default();

    for (key, values_by_consumer) in self.by_key {
      let mut distinct: Vec<&str> = Vec::new();
      for (_, value) in &values_by_consumer {
        if !distinct.contains(&value.as_str()) {
          distinct.push(value);
        }
      }

      let kind = if distinct.iter().all(|v| is_boolean(v)) {
        ConflictKind::Boolean
      } else if is_plural(&key) {
        merged.settings.insert(key, distinct.join(" "));
        continue;
      } else {
        ConflictKind::Singular
      };

      if distinct.len() > 1 {
        let diagnostic = Diagnostic {
          source: self.source,
          key: key.clone(),
          kind,
          consumers: values_by_consumer.iter().map(|(consumer, _)| consumer.clone()).collect(),
          values: distinct.iter().map(|v| v.to_string()).collect(),
        };
        warn!(key = %key, source = self.source.as_str(), "{}", diagnostic);
        merged.diagnostics.push(diagnostic);
      } else if let Some(value) = distinct.first() {
        merged.settings.insert(key, value.to_string());
      }
    }

    merged
  }
}

/// Matches `YES`/`NO` in any case.
fn is_boolean(value: &str) -> bool {
  value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("no")
}
