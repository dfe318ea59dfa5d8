//! Settings shared by every resolver.
//!
//! [`BuildSettings`] carries the default accessors. Pod and aggregate
//! resolvers override the accessors whose policy differs; an override that
//! needs the default value calls the matching free function in this module.

use std::collections::BTreeMap;

use xcsettings_platform::Platform;

use super::error::SettingsError;
use super::memo::Memo;
use super::merge::{Diagnostic, MergedOverrides};
use super::quote::add_inherited_to_plural;
use super::registry::{Setting, SettingValue};
use crate::consts::{
  BUILD_IDENTIFIER_DEFINITION, DEVELOPER_FRAMEWORKS, DEVELOPER_FRAMEWORKS_SEARCH_PATH, FOBJC_ARC_LINKER_FLAG,
  OBJC_LINKER_FLAG,
};
use crate::xcconfig::Xcconfig;

/// A resolver computing the build settings of one target.
pub trait BuildSettings: Sized {
  /// Cache backing the memoized accessors.
  fn memo(&self) -> &Memo;

  /// Settings this resolver emits, in registration order.
  fn registry() -> Vec<Setting<Self>>;

  fn platform(&self) -> Platform;

  /// Whether the target packages as a framework bundle.
  fn requires_frameworks(&self) -> bool;

  fn uses_swift(&self) -> bool;

  fn gcc_preprocessor_definitions(&self) -> Vec<String> {
    vec![BUILD_IDENTIFIER_DEFINITION.to_string()]
  }

  fn header_search_paths(&self) -> Vec<String> {
    Vec::new()
  }

  fn library_search_paths(&self) -> Vec<String> {
    Vec::new()
  }

  fn framework_search_paths(&self) -> Vec<String> {
    developer_framework_search_paths(&self.frameworks())
  }

  fn other_cflags(&self) -> Vec<String> {
    self
      .memo()
      .get_or_insert_with("other_cflags", || module_map_cflags(&self.module_map_files()))
  }

  fn module_map_files(&self) -> Vec<String> {
    Vec::new()
  }

  fn frameworks(&self) -> Vec<String> {
    Vec::new()
  }

  fn weak_frameworks(&self) -> Vec<String> {
    Vec::new()
  }

  fn libraries(&self) -> Vec<String> {
    Vec::new()
  }

  /// Whether `-ObjC` must force-load every class and category.
  fn requires_objc_linker_flag(&self) -> bool {
    false
  }

  fn requires_fobjc_arc(&self) -> bool {
    false
  }

  fn other_ldflags(&self) -> Vec<String> {
    self.memo().get_or_insert_with("other_ldflags", || {
      assemble_ldflags(
        self.requires_objc_linker_flag(),
        self.requires_fobjc_arc(),
        &self.libraries(),
        &self.frameworks(),
        &self.weak_frameworks(),
      )
    })
  }

  fn other_swift_flags(&self) -> Option<Vec<String>> {
    self.memo().get_or_insert_with("other_swift_flags", || {
      self.uses_swift().then(|| swift_flags(&self.module_map_files()))
    })
  }

  fn swift_active_compilation_conditions(&self) -> Vec<String> {
    Vec::new()
  }

  fn swift_include_paths(&self) -> Vec<String> {
    Vec::new()
  }

  fn pods_build_dir(&self) -> String {
    "${BUILD_DIR}".to_string()
  }

  /// Desktop frameworks are not signed at build time.
  fn code_sign_identity(&self) -> Option<String> {
    (self.requires_frameworks() && self.platform().is_desktop()).then(String::new)
  }

  fn pods_configuration_build_dir(&self) -> String {
    "${PODS_BUILD_DIR}/$(CONFIGURATION)$(EFFECTIVE_PLATFORM_NAME)".to_string()
  }

  /// Overrides merged on top of the computed settings.
  fn overrides(&self) -> MergedOverrides {
    MergedOverrides::default()
  }

  /// Computes every registered setting.
  fn to_h(&self) -> BTreeMap<String, SettingValue> {
    Self::registry()
      .into_iter()
      .map(|setting| {
        let value = setting.resolve(self);
        (setting.name, value)
      })
      .collect()
  }

  /// The rendered configuration: every registered setting with
  /// `$(inherited)` folded in, then the overrides.
  fn xcconfig(&self) -> Result<Xcconfig, SettingsError> {
    self.memo().get_or_insert_with("xcconfig", || {
      let mut xcconfig = Xcconfig::from(add_inherited_to_plural(self.to_h())?);
      xcconfig.merge(&self.overrides().settings);
      Ok(xcconfig)
    })
  }

  /// Override conflicts found while merging.
  fn diagnostics(&self) -> Vec<Diagnostic> {
    self.overrides().diagnostics
  }
}

/// `$(PLATFORM_DIR)/Developer/Library/Frameworks` when a developer testing
/// framework is linked.
pub fn developer_framework_search_paths(frameworks: &[String]) -> Vec<String> {
  if frameworks.iter().any(|f| DEVELOPER_FRAMEWORKS.contains(&f.as_str())) {
    vec![DEVELOPER_FRAMEWORKS_SEARCH_PATH.to_string()]
  } else {
    Vec::new()
  }
}

pub fn module_map_cflags(module_map_files: &[String]) -> Vec<String> {
  module_map_files
    .iter()
    .map(|f| format!("-fmodule-map-file={}", f))
    .collect()
}

/// `-D COCOAPODS` followed by an `-Xcc -fmodule-map-file=` pair per module map.
pub fn swift_flags(module_map_files: &[String]) -> Vec<String> {
  let mut flags = vec!["-D".to_string(), "COCOAPODS".to_string()];
  for file in module_map_files {
    flags.push("-Xcc".to_string());
    flags.push(format!("-fmodule-map-file={}", file));
  }
  flags
}

/// Assembles linker flags: `-ObjC`, `-fobjc-arc`, then libraries, frameworks
/// and weak frameworks, each group in input order.
pub fn assemble_ldflags(
  force_load: bool,
  fobjc_arc: bool,
  libraries: &[String],
  frameworks: &[String],
  weak_frameworks: &[String],
) -> Vec<String> {
  let mut flags = Vec::new();
  if force_load {
    flags.push(OBJC_LINKER_FLAG.to_string());
  }
  if fobjc_arc {
    flags.push(FOBJC_ARC_LINKER_FLAG.to_string());
  }
  for library in libraries {
    flags.push(format!("-l\"{}\"", library));
  }
  for framework in frameworks {
    flags.push("-framework".to_string());
    flags.push(format!("\"{}\"", framework));
  }
  for framework in weak_frameworks {
    flags.push("-weak_framework".to_string());
    flags.push(format!("\"{}\"", framework));
  }
  flags
}

/// Runtime search paths for the platform.
///
/// Desktop bundles keep frameworks beside the executable's parent; test
/// bundles load them relative to themselves.
pub fn runpath_search_paths(platform: Platform, requires_host_target: bool, test_bundle: bool) -> Vec<String> {
  if platform.is_desktop() {
    let loader = if test_bundle {
      "'@loader_path/../Frameworks'"
    } else {
      "'@loader_path/Frameworks'"
    };
    vec!["'@executable_path/../Frameworks'".to_string(), loader.to_string()]
  } else {
    let mut paths = vec![
      "'@executable_path/Frameworks'".to_string(),
      "'@loader_path/Frameworks'".to_string(),
    ];
    if requires_host_target {
      paths.push("'@executable_path/../../Frameworks'".to_string());
    }
    paths
  }
}

/// Sorts and removes duplicates.
pub(crate) fn sort_uniq(mut values: Vec<String>) -> Vec<String> {
  values.sort();
  values.dedup();
  values
}

/// Removes later duplicates, keeping first occurrences in place.
pub(crate) fn uniq(values: Vec<String>) -> Vec<String> {
  let mut seen = std::collections::HashSet::new();
  values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}
