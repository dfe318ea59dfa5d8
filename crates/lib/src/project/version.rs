//! Lenient version parsing for `SWIFT_VERSION` values.

use semver::Version;

/// Parses a version that may omit its minor and patch components.
///
/// `"4"` reads as `4.0.0` and `"2.3"` as `2.3.0`.
pub fn parse_version(raw: &str) -> Result<Version, semver::Error> {
  let trimmed = raw.trim();
  let padded = match trimmed.split('.').count() {
    1 => format!("{}.0.0", trimmed),
    2 => format!("{}.0", trimmed),
    _ => trimmed.to_string(),
  };
  Version::parse(&padded)
}
