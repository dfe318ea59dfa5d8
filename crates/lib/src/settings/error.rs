//! Errors raised while resolving build settings.

use thiserror::Error;

use super::registry::SettingValue;

/// Fatal resolution errors.
///
/// The plural/singular mismatches are programming errors in a resolver: a
/// list computed for a singular setting or a string for a plural one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
  #[error("{key} is a plural setting, cannot have {value} as its value")]
  PluralMismatch { key: String, value: SettingValue },

  #[error("{key} is not a plural setting, cannot have {value} as its value")]
  SingularMismatch { key: String, value: SettingValue },

  #[error("unknown pod target: {0}")]
  UnknownPodTarget(String),

  #[error("unknown aggregate target: {0}")]
  UnknownAggregateTarget(String),

  #[error("aggregate target '{target}' has no build configuration '{configuration}'")]
  UnknownConfiguration { target: String, configuration: String },
}
