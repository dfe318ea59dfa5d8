//! Quoting plural values and folding in `$(inherited)`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::error::SettingsError;
use super::registry::{SettingValue, is_plural};
use crate::consts::INHERITED;

static KEY_VALUE_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_-]+?)=(.+)$").expect("key=value pattern is valid"));

/// Joins a plural value into one space separated string, quoting each
/// element as the xcconfig format requires.
///
/// * `KEY=VALUE`: only `VALUE` is quoted, and only when it contains a
///   character other than a letter, digit or `_`.
/// * anything containing `$`, `[`, `]` or a space is wrapped whole.
/// * everything else, including elements that already carry quotes, is
///   emitted as-is.
pub fn quote_array<S: AsRef<str>>(array: &[S]) -> String {
  array
    .iter()
    .map(|element| quote_element(element.as_ref()))
    .collect::<Vec<_>>()
    .join(" ")
}

fn quote_element(element: &str) -> String {
  if element.contains('"') {
    return element.to_string();
  }

  if let Some(captures) = KEY_VALUE_REGEX.captures(element) {
    let key = &captures[1];
    let value = &captures[2];
    if value.chars().any(|c| !(c.is_alphanumeric() || c == '_')) {
      return format!("{}=\"{}\"", key, value);
    }
    return format!("{}={}", key, value);
  }

  if element.contains(['$', '[', ']', ' ']) {
    format!("\"{}\"", element)
  } else {
    element.to_string()
  }
}

/// Renders a resolved mapping into xcconfig strings.
///
/// Empty values become `$(inherited)`. Plural settings must hold a list and
/// render as `$(inherited)` followed by the quoted list; singular settings
/// must hold a string and are used verbatim.
pub fn add_inherited_to_plural(
  settings: BTreeMap<String, SettingValue>,
) -> Result<BTreeMap<String, String>, SettingsError> {
  settings
    .into_iter()
    .map(|(key, value)| {
      let rendered = render_setting(&key, value)?;
      Ok((key, rendered))
    })
    .collect()
}

fn render_setting(key: &str, value: SettingValue) -> Result<String, SettingsError> {
  if value.is_empty() {
    return Ok(INHERITED.to_string());
  }

  match (is_plural(key), value) {
    (true, SettingValue::List(values)) => Ok(format!("{} {}", INHERITED, quote_array(&values))),
    (false, SettingValue::Scalar(value)) => Ok(value),
    (true, value) => Err(SettingsError::PluralMismatch {
      key: key.to_string(),
      value,
    }),
    (false, value) => Err(SettingsError::SingularMismatch {
      key: key.to_string(),
      value,
    }),
  }
}
