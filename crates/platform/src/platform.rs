//! Platform identification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlatformError;

/// Platform a target is built for
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  #[default]
  Ios,
  Osx,
  Tvos,
  Watchos,
}

impl Platform {
  /// All known platforms, in declaration order
  pub const ALL: [Platform; 4] = [Platform::Ios, Platform::Osx, Platform::Tvos, Platform::Watchos];

  /// Returns the symbolic name as used in project descriptions (e.g. "osx")
  pub const fn symbolic_name(&self) -> &'static str {
    match self {
      Platform::Ios => "ios",
      Platform::Osx => "osx",
      Platform::Tvos => "tvos",
      Platform::Watchos => "watchos",
    }
  }

  /// Returns the human readable name (e.g. "macOS")
  pub const fn display_name(&self) -> &'static str {
    match self {
      Platform::Ios => "iOS",
      Platform::Osx => "macOS",
      Platform::Tvos => "tvOS",
      Platform::Watchos => "watchOS",
    }
  }

  /// Whether this is the desktop platform.
  ///
  /// Desktop bundles keep their frameworks in `Contents/Frameworks`, one
  /// level above the executable, which changes the runtime search paths.
  pub const fn is_desktop(&self) -> bool {
    matches!(self, Platform::Osx)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.symbolic_name())
  }
}

impl FromStr for Platform {
  type Err = PlatformError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "ios" => Ok(Platform::Ios),
      "osx" | "macos" => Ok(Platform::Osx),
      "tvos" => Ok(Platform::Tvos),
      "watchos" => Ok(Platform::Watchos),
      _ => Err(PlatformError::Unknown(s.to_string())),
    }
  }
}
