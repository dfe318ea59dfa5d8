//! The attribute registry: which settings each resolver kind emits.
//!
//! Every resolver type declares a static, ordered list of [`Setting`]s, each
//! pairing an uppercase build setting name with the accessor that computes
//! it. Derived resolvers start from [`base_settings`] and [`compose`] their
//! own entries on top.

use std::fmt;

use super::base::BuildSettings;

/// Settings whose value is a list of tokens rather than a single string.
///
/// Sorted so membership can be tested with a binary search.
pub const PLURAL_SETTINGS: &[&str] = &[
  "ALTERNATE_PERMISSIONS_FILES",
  "ARCHS",
  "BUILD_VARIANTS",
  "EXCLUDED_SOURCE_FILE_NAMES",
  "FRAMEWORK_SEARCH_PATHS",
  "GCC_PREPROCESSOR_DEFINITIONS",
  "GCC_PREPROCESSOR_DEFINITIONS_NOT_USED_IN_PRECOMPS",
  "HEADER_SEARCH_PATHS",
  "INFOPLIST_PREPROCESSOR_DEFINITIONS",
  "LD_RUNPATH_SEARCH_PATHS",
  "LIBRARY_SEARCH_PATHS",
  "OTHER_CFLAGS",
  "OTHER_CPLUSPLUSFLAGS",
  "OTHER_LDFLAGS",
  "OTHER_SWIFT_FLAGS",
  "REZ_SEARCH_PATHS",
  "SECTORDER_FLAGS",
  "SWIFT_ACTIVE_COMPILATION_CONDITIONS",
  "SWIFT_INCLUDE_PATHS",
  "WARNING_CFLAGS",
  "WARNING_LDFLAGS",
];

pub fn is_plural(name: &str) -> bool {
  PLURAL_SETTINGS.binary_search(&name).is_ok()
}

/// A computed setting value before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
  /// No value; rendered as `$(inherited)`.
  Unset,
  Scalar(String),
  List(Vec<String>),
}

impl SettingValue {
  /// Whether the value carries nothing and should inherit instead.
  ///
  /// An empty scalar is a real value (e.g. an empty `CODE_SIGN_IDENTITY`).
  pub fn is_empty(&self) -> bool {
    match self {
      SettingValue::Unset => true,
      SettingValue::Scalar(_) => false,
      SettingValue::List(values) => values.is_empty(),
    }
  }
}

impl fmt::Display for SettingValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SettingValue::Unset => write!(f, "nil"),
      SettingValue::Scalar(value) => write!(f, "{:?}", value),
      SettingValue::List(values) => write!(f, "{:?}", values),
    }
  }
}

impl From<Vec<String>> for SettingValue {
  fn from(values: Vec<String>) -> Self {
    SettingValue::List(values)
  }
}

impl From<Option<Vec<String>>> for SettingValue {
  fn from(values: Option<Vec<String>>) -> Self {
    values.map_or(SettingValue::Unset, SettingValue::List)
  }
}

impl From<String> for SettingValue {
  fn from(value: String) -> Self {
    SettingValue::Scalar(value)
  }
}

impl From<&str> for SettingValue {
  fn from(value: &str) -> Self {
    SettingValue::Scalar(value.to_string())
  }
}

impl From<Option<String>> for SettingValue {
  fn from(value: Option<String>) -> Self {
    value.map_or(SettingValue::Unset, SettingValue::Scalar)
  }
}

/// One registry entry: a build setting and the accessor computing it.
pub struct Setting<R> {
  /// Uppercase build setting name, e.g. `OTHER_LDFLAGS`.
  pub name: String,
  pub accessor: fn(&R) -> SettingValue,
}

impl<R> Setting<R> {
  /// Registers `accessor` under the uppercased accessor name.
  pub fn new(accessor_name: &str, accessor: fn(&R) -> SettingValue) -> Self {
    Self {
      name: accessor_name.to_ascii_uppercase(),
      accessor,
    }
  }

  pub fn resolve(&self, resolver: &R) -> SettingValue {
    (self.accessor)(resolver)
  }
}

impl<R> Clone for Setting<R> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      accessor: self.accessor,
    }
  }
}

impl<R> fmt::Debug for Setting<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Setting").field("name", &self.name).finish()
  }
}

/// Builds a [`Setting`] for resolver type `$resolver` from a method name.
macro_rules! setting {
  ($resolver:ty, $method:ident) => {
    $crate::settings::registry::Setting::new(stringify!($method), |resolver: &$resolver| {
      resolver.$method().into()
    })
  };
}

pub(crate) use setting;

/// Settings every resolver emits.
pub fn base_settings<R: BuildSettings>() -> Vec<Setting<R>> {
  vec![
    setting!(R, gcc_preprocessor_definitions),
    setting!(R, header_search_paths),
    setting!(R, library_search_paths),
    setting!(R, framework_search_paths),
    setting!(R, other_cflags),
    setting!(R, other_ldflags),
    setting!(R, other_swift_flags),
    setting!(R, swift_active_compilation_conditions),
    setting!(R, swift_include_paths),
    setting!(R, pods_build_dir),
    setting!(R, code_sign_identity),
    setting!(R, pods_configuration_build_dir),
  ]
}

/// Appends `own` to `base`. A name registered again replaces the earlier
/// entry in place, so ancestor order is kept and the last registration wins.
pub fn compose<R>(base: Vec<Setting<R>>, own: Vec<Setting<R>>) -> Vec<Setting<R>> {
  let mut settings = base;
  for setting in own {
    match settings.iter_mut().find(|s| s.name == setting.name) {
      Some(existing) => *existing = setting,
      None => settings.push(setting),
    }
  }
  settings
}
