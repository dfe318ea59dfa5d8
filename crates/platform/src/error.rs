//! Error types for xcsettings-platform

use thiserror::Error;

/// Errors that can occur in platform operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
  #[error("unknown platform '{0}' (expected one of: ios, osx, tvos, watchos)")]
  Unknown(String),
}
