//! Project description types.
//!
//! These mirror what the dependency resolver and the sandbox hand to the
//! settings resolvers: which targets exist, how they package, what their
//! specifications declare and which binaries they vendor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xcsettings_platform::Platform;

use crate::consts::{
  DEFAULT_BUILD_CONFIGURATIONS, DEFAULT_PODFILE_DIR_PATH, DEFAULT_RELATIVE_PODS_ROOT, DEFAULT_SANDBOX_ROOT,
  PODS_ROOT_VARIABLE,
};
use crate::util::paths::c99ext_identifier;

fn default_true() -> bool {
  true
}

fn default_sandbox_root() -> PathBuf {
  PathBuf::from(DEFAULT_SANDBOX_ROOT)
}

fn default_relative_pods_root() -> String {
  DEFAULT_RELATIVE_PODS_ROOT.to_string()
}

fn default_podfile_dir_path() -> String {
  DEFAULT_PODFILE_DIR_PATH.to_string()
}

fn default_build_configurations() -> Vec<String> {
  DEFAULT_BUILD_CONFIGURATIONS.iter().map(|c| c.to_string()).collect()
}

/// How a leaf target packages its product.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildType {
  /// A static archive (`lib<name>.a`).
  #[default]
  StaticLibrary,
  /// A dynamically linked framework bundle.
  DynamicFramework,
  /// A framework bundle wrapping a static archive.
  StaticFramework,
}

impl BuildType {
  /// Whether the product is a framework bundle.
  pub const fn requires_frameworks(&self) -> bool {
    matches!(self, BuildType::DynamicFramework | BuildType::StaticFramework)
  }

  pub const fn is_static_framework(&self) -> bool {
    matches!(self, BuildType::StaticFramework)
  }

  pub const fn as_str(&self) -> &'static str {
    match self {
      BuildType::StaticLibrary => "static library",
      BuildType::DynamicFramework => "dynamic framework",
      BuildType::StaticFramework => "static framework",
    }
  }
}

/// Product type of a user target an aggregate is integrated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
  Application,
  AppExtension,
  Bundle,
  CommandLineTool,
  DynamicLibrary,
  Framework,
  MessagesExtension,
  OctestBundle,
  StaticLibrary,
  TvExtension,
  UiTestBundle,
  UnitTestBundle,
  WatchApp,
  Watch2App,
  Watch2Extension,
}

impl ProductType {
  /// Whether the product is loaded into a host process as a test bundle.
  pub const fn is_test_bundle(&self) -> bool {
    matches!(
      self,
      ProductType::OctestBundle | ProductType::UnitTestBundle | ProductType::UiTestBundle
    )
  }
}

/// Global switches of the umbrella project.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Podfile {
  /// Link with `-fobjc-arc` when a library requires ARC.
  #[serde(default)]
  pub set_arc_compatibility_flag: bool,
}

/// What one specification of a library declares for the platform being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecConsumer {
  /// Specification name, e.g. `BananaLib` or `BananaLib/Tests`.
  pub name: String,

  /// Whether this is a test specification.
  #[serde(default)]
  pub test_specification: bool,

  #[serde(default)]
  pub libraries: Vec<String>,

  #[serde(default)]
  pub frameworks: Vec<String>,

  #[serde(default)]
  pub weak_frameworks: Vec<String>,

  #[serde(default = "default_true")]
  pub requires_arc: bool,

  /// Settings applied to the library's own target.
  #[serde(default)]
  pub pod_target_xcconfig: BTreeMap<String, String>,

  /// Settings propagated to every user target integrating the library.
  #[serde(default)]
  pub user_target_xcconfig: BTreeMap<String, String>,
}

impl SpecConsumer {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      test_specification: false,
      libraries: Vec::new(),
      frameworks: Vec::new(),
      weak_frameworks: Vec::new(),
      requires_arc: true,
      pod_target_xcconfig: BTreeMap::new(),
      user_target_xcconfig: BTreeMap::new(),
    }
  }
}

/// Vendored binaries of one specification.
///
/// Relative paths are relative to the sandbox root. Absolute paths are made
/// relative to an absolute sandbox root, with `..` when they lie outside it,
/// and are used as given against a relative root.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAccessor {
  #[serde(default)]
  pub vendored_static_libraries: Vec<PathBuf>,

  #[serde(default)]
  pub vendored_dynamic_libraries: Vec<PathBuf>,

  #[serde(default)]
  pub vendored_static_frameworks: Vec<PathBuf>,

  #[serde(default)]
  pub vendored_dynamic_frameworks: Vec<PathBuf>,
}

impl FileAccessor {
  /// Static and dynamic frameworks, static first.
  pub fn vendored_frameworks(&self) -> impl Iterator<Item = &PathBuf> {
    self.vendored_static_frameworks.iter().chain(&self.vendored_dynamic_frameworks)
  }

  pub fn vendored_static_artifacts(&self) -> impl Iterator<Item = &PathBuf> {
    self.vendored_static_libraries.iter().chain(&self.vendored_static_frameworks)
  }

  pub fn vendored_dynamic_artifacts(&self) -> impl Iterator<Item = &PathBuf> {
    self.vendored_dynamic_libraries.iter().chain(&self.vendored_dynamic_frameworks)
  }
}

/// A specification entry of a leaf target: its consumer plus file accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSpec {
  #[serde(flatten)]
  pub consumer: SpecConsumer,

  #[serde(flatten)]
  pub file_accessor: FileAccessor,
}

impl PodSpec {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      consumer: SpecConsumer::new(name),
      file_accessor: FileAccessor::default(),
    }
  }

  pub fn is_test(&self) -> bool {
    self.consumer.test_specification
  }
}

/// One independently compiled library unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PodTarget {
  /// Unique label of the target.
  pub name: String,

  /// Name of the built product without extension (defaults to `name`).
  #[serde(default)]
  pub product_basename: Option<String>,

  /// Module name (defaults to `product_basename` as a C identifier).
  #[serde(default)]
  pub product_module_name: Option<String>,

  #[serde(default)]
  pub platform: Platform,

  #[serde(default)]
  pub build_type: BuildType,

  /// Whether the target has sources and produces a product at all.
  #[serde(default = "default_true")]
  pub should_build: bool,

  #[serde(default)]
  pub defines_module: bool,

  #[serde(default)]
  pub uses_swift: bool,

  #[serde(default)]
  pub inhibit_warnings: bool,

  /// Module map location, absolute or relative to the sandbox root.
  #[serde(default)]
  pub module_map_path: Option<PathBuf>,

  #[serde(default)]
  pub header_search_paths: Vec<String>,

  /// Extra header search paths for the test product.
  #[serde(default)]
  pub test_header_search_paths: Vec<String>,

  /// Defaults to `${PODS_ROOT}/<name>`.
  #[serde(default)]
  pub pod_target_srcroot: Option<String>,

  /// Names of the pod targets this one links against.
  #[serde(default)]
  pub dependencies: Vec<String>,

  /// Names of the pod targets only the test product links against.
  #[serde(default)]
  pub test_dependencies: Vec<String>,

  #[serde(default)]
  pub specs: Vec<PodSpec>,
}

impl PodTarget {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      product_basename: None,
      product_module_name: None,
      platform: Platform::default(),
      build_type: BuildType::default(),
      should_build: true,
      defines_module: false,
      uses_swift: false,
      inhibit_warnings: false,
      module_map_path: None,
      header_search_paths: Vec::new(),
      test_header_search_paths: Vec::new(),
      pod_target_srcroot: None,
      dependencies: Vec::new(),
      test_dependencies: Vec::new(),
      specs: Vec::new(),
    }
  }

  pub fn product_basename(&self) -> &str {
    self.product_basename.as_deref().unwrap_or(&self.name)
  }

  pub fn product_module_name(&self) -> String {
    match &self.product_module_name {
      Some(name) => name.clone(),
      None => c99ext_identifier(self.product_basename()),
    }
  }

  pub fn requires_frameworks(&self) -> bool {
    self.build_type.requires_frameworks()
  }

  pub fn is_static_framework(&self) -> bool {
    self.build_type.is_static_framework()
  }

  /// `<dir>/<name>`, where `dir` is usually `${PODS_CONFIGURATION_BUILD_DIR}`.
  pub fn configuration_build_dir(&self, dir: &str) -> String {
    format!("{}/{}", dir, self.name)
  }

  /// Location of the built framework bundle.
  pub fn build_product_path(&self, dir: &str) -> String {
    format!("{}/{}.framework", self.configuration_build_dir(dir), self.product_basename())
  }

  pub fn pod_target_srcroot(&self) -> String {
    match &self.pod_target_srcroot {
      Some(srcroot) => srcroot.clone(),
      None => format!("{}/{}", PODS_ROOT_VARIABLE, self.name),
    }
  }

  /// Declared module map, or the one generated into the support files.
  pub fn module_map_path(&self) -> PathBuf {
    match &self.module_map_path {
      Some(path) => path.clone(),
      None => support_files_dir(&self.name).join(format!("{}.modulemap", self.name)),
    }
  }

  /// Header search paths of the product, or of the test product.
  pub fn header_search_paths(&self, test: bool) -> Vec<String> {
    let mut paths = self.header_search_paths.clone();
    if test {
      paths.extend(self.test_header_search_paths.iter().cloned());
    }
    paths
  }

  /// Specification entries that apply to the product (`test == false`) or
  /// to the test product.
  pub fn specs_for(&self, test: bool) -> impl Iterator<Item = &PodSpec> {
    self.specs.iter().filter(move |spec| spec.is_test() == test)
  }

  pub fn has_test_specs(&self) -> bool {
    self.specs.iter().any(PodSpec::is_test)
  }
}

/// A user-facing product that links a set of leaf targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateTarget {
  pub name: String,

  #[serde(default)]
  pub platform: Platform,

  /// Whether every pod target of the umbrella is packaged as a framework.
  #[serde(default)]
  pub requires_frameworks: bool,

  /// Whether the product is embedded in a host target (extensions, tests).
  #[serde(default)]
  pub requires_host_target: bool,

  /// `SWIFT_VERSION` of the user target; blank counts as absent.
  #[serde(default)]
  pub swift_version: Option<String>,

  #[serde(default)]
  pub user_target_types: Vec<ProductType>,

  #[serde(default = "default_relative_pods_root")]
  pub relative_pods_root: String,

  #[serde(default = "default_podfile_dir_path")]
  pub podfile_dir_path: String,

  #[serde(default)]
  pub public_header_search_paths: Vec<String>,

  #[serde(default = "default_build_configurations")]
  pub build_configurations: Vec<String>,

  /// Names of the pod targets linked into the product.
  #[serde(default)]
  pub pod_targets: Vec<String>,

  /// Restricts a pod target to the listed configurations.
  #[serde(default)]
  pub pod_target_configurations: BTreeMap<String, Vec<String>>,

  /// Aggregates whose search paths this one inherits without linking them.
  #[serde(default)]
  pub search_paths_aggregate_targets: Vec<String>,
}

impl AggregateTarget {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      platform: Platform::default(),
      requires_frameworks: false,
      requires_host_target: false,
      swift_version: None,
      user_target_types: Vec::new(),
      relative_pods_root: default_relative_pods_root(),
      podfile_dir_path: default_podfile_dir_path(),
      public_header_search_paths: Vec::new(),
      build_configurations: default_build_configurations(),
      pod_targets: Vec::new(),
      pod_target_configurations: BTreeMap::new(),
      search_paths_aggregate_targets: Vec::new(),
    }
  }

  pub fn swift_version(&self) -> Option<&str> {
    self.swift_version.as_deref().map(str::trim).filter(|v| !v.is_empty())
  }

  pub fn declares_configuration(&self, configuration: &str) -> bool {
    self.build_configurations.iter().any(|c| c == configuration)
  }
}

/// Everything the settings resolvers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
  /// Root of the sandbox vendored paths are expressed relative to.
  #[serde(default = "default_sandbox_root")]
  pub sandbox_root: PathBuf,

  #[serde(default)]
  pub podfile: Podfile,

  #[serde(default)]
  pub pod_targets: Vec<PodTarget>,

  #[serde(default)]
  pub aggregate_targets: Vec<AggregateTarget>,
}

impl Default for Project {
  fn default() -> Self {
    Self {
      sandbox_root: default_sandbox_root(),
      podfile: Podfile::default(),
      pod_targets: Vec::new(),
      aggregate_targets: Vec::new(),
    }
  }
}

/// Directory generated files of a target live in, relative to the sandbox.
pub fn support_files_dir(target: &str) -> PathBuf {
  Path::new("Target Support Files").join(target)
}
