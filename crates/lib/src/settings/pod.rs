//! Settings of a pod (leaf) target.
//!
//! A pod target has two resolvers: one for its product and one for its test
//! product. Besides the emitted settings, each resolver exposes what the
//! target *exports*: the artifacts, search paths and module maps a dependent
//! needs to import when it links against this target without rebuilding it.
//! Static and dynamic artifacts travel on separate export lists so a
//! dependent links each of them exactly once.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use xcsettings_platform::Platform;

use super::arena::{ResolverKey, SettingsArena};
use super::base::{BuildSettings, developer_framework_search_paths, runpath_search_paths, sort_uniq, swift_flags, uniq};
use super::memo::Memo;
use super::merge::{MergedOverrides, OverrideCollector, OverrideSource};
use super::registry::{Setting, base_settings, compose, setting};
use crate::consts::CONFIGURATION_BUILD_DIR_VARIABLE;
use crate::project::{FileAccessor, PodTarget, PodTargetId, SpecConsumer};
use crate::util::paths::{framework_basename, library_basename, pods_root_path, pods_root_search_path};

/// Step applied to a resolver's own `frameworks` and `libraries`.
///
/// Chosen once when the resolver is created: a test product must also link
/// everything the product under test exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportDecorator {
  Identity,
  /// Prepend the product resolver's export list, keeping first occurrences.
  PrependSiblingImports,
}

impl ImportDecorator {
  pub fn for_variant(test: bool) -> Self {
    if test {
      ImportDecorator::PrependSiblingImports
    } else {
      ImportDecorator::Identity
    }
  }

  pub fn apply(self, value: Vec<String>, imports: impl FnOnce() -> Vec<String>) -> Vec<String> {
    match self {
      ImportDecorator::Identity => value,
      ImportDecorator::PrependSiblingImports => {
        let mut combined = imports();
        combined.extend(value);
        uniq(combined)
      }
    }
  }
}

/// Resolver of one pod target variant.
pub struct PodSettings<'a> {
  arena: &'a SettingsArena,
  id: PodTargetId,
  target: &'a PodTarget,
  test: bool,
  decorator: ImportDecorator,
  memo: Rc<Memo>,
}

impl<'a> PodSettings<'a> {
  pub(crate) fn new(arena: &'a SettingsArena, id: PodTargetId, test: bool, memo: Rc<Memo>) -> Self {
    Self {
      arena,
      id,
      target: &arena.project().pod_targets[id.0],
      test,
      decorator: ImportDecorator::for_variant(test),
      memo,
    }
  }

  pub fn target(&self) -> &'a PodTarget {
    self.target
  }

  pub fn key(&self) -> ResolverKey {
    ResolverKey::Pod {
      target: self.id,
      test: self.test,
    }
  }

  /// Whether this resolver describes the test product.
  pub fn is_test(&self) -> bool {
    self.test
  }

  fn sandbox_root(&self) -> &'a Path {
    &self.arena.project().sandbox_root
  }

  fn own_build_dir(&self) -> String {
    self.target.configuration_build_dir(CONFIGURATION_BUILD_DIR_VARIABLE)
  }

  /// Product resolvers of the targets this variant links against.
  pub fn dependent_targets(&self) -> Vec<PodSettings<'a>> {
    let graph = self.arena.graph();
    let ids = if self.test {
      graph.all_dependent_targets(self.id)
    } else {
      graph.recursive_dependent_targets(self.id)
    };
    ids.iter().map(|&id| self.arena.pod_by_id(id, false)).collect()
  }

  pub fn file_accessors(&self) -> Vec<&'a FileAccessor> {
    self.target.specs_for(self.test).map(|spec| &spec.file_accessor).collect()
  }

  pub fn spec_consumers(&self) -> Vec<&'a SpecConsumer> {
    self.target.specs_for(self.test).map(|spec| &spec.consumer).collect()
  }

  fn vendored<F>(&self, select: F) -> Vec<&'a PathBuf>
  where
    F: Fn(&'a FileAccessor) -> &'a Vec<PathBuf>,
  {
    self.file_accessors().into_iter().flat_map(select).collect()
  }

  fn search_paths<'p>(&self, artifacts: impl IntoIterator<Item = &'p PathBuf>) -> Vec<String> {
    let root = self.sandbox_root();
    artifacts
      .into_iter()
      .map(|artifact| pods_root_search_path(artifact, root))
      .collect()
  }

  /// Whether the variant links its own vendored artifacts and dependencies'
  /// exports. Static products leave linking to whatever consumes them.
  fn links_own_artifacts(&self) -> bool {
    self.test || (self.target.requires_frameworks() && !self.target.is_static_framework())
  }

  fn consumer_values(&self, select: impl Fn(&'a SpecConsumer) -> &'a Vec<String>) -> Vec<String> {
    self.spec_consumers().into_iter().flat_map(select).cloned().collect()
  }

  pub fn static_libraries_to_import(&self) -> Vec<String> {
    self.memo.get_or_insert_with("static_libraries_to_import", || {
      let mut libraries: Vec<String> = self
        .vendored(|fa| &fa.vendored_static_libraries)
        .into_iter()
        .map(|path| library_basename(path))
        .collect();
      if self.target.should_build && !self.target.requires_frameworks() {
        libraries.push(self.target.product_basename().to_string());
      }
      libraries
    })
  }

  pub fn dynamic_libraries_to_import(&self) -> Vec<String> {
    self.memo.get_or_insert_with("dynamic_libraries_to_import", || {
      let mut libraries: Vec<String> = self
        .vendored(|fa| &fa.vendored_dynamic_libraries)
        .into_iter()
        .map(|path| library_basename(path))
        .collect();
      libraries.extend(self.consumer_values(|c| &c.libraries));
      libraries
    })
  }

  pub fn static_frameworks_to_import(&self) -> Vec<String> {
    self.memo.get_or_insert_with("static_frameworks_to_import", || {
      let mut frameworks: Vec<String> = self
        .vendored(|fa| &fa.vendored_static_frameworks)
        .into_iter()
        .map(|path| framework_basename(path))
        .collect();
      if self.target.should_build && self.target.is_static_framework() {
        frameworks.push(self.target.product_basename().to_string());
      }
      frameworks
    })
  }

  pub fn dynamic_frameworks_to_import(&self) -> Vec<String> {
    self.memo.get_or_insert_with("dynamic_frameworks_to_import", || {
      let mut frameworks: Vec<String> = self
        .vendored(|fa| &fa.vendored_dynamic_frameworks)
        .into_iter()
        .map(|path| framework_basename(path))
        .collect();
      if self.target.should_build && self.target.requires_frameworks() && !self.target.is_static_framework() {
        frameworks.push(self.target.product_basename().to_string());
      }
      frameworks.extend(self.consumer_values(|c| &c.frameworks));
      frameworks
    })
  }

  pub fn weak_frameworks_to_import(&self) -> Vec<String> {
    self
      .memo
      .get_or_insert_with("weak_frameworks_to_import", || self.consumer_values(|c| &c.weak_frameworks))
  }

  pub fn libraries_to_import(&self) -> Vec<String> {
    let mut libraries = self.static_libraries_to_import();
    libraries.extend(self.dynamic_libraries_to_import());
    libraries
  }

  pub fn frameworks_to_import(&self) -> Vec<String> {
    let mut frameworks = self.static_frameworks_to_import();
    frameworks.extend(self.dynamic_frameworks_to_import());
    frameworks
  }

  /// Module map a dependent must load to import this target as a module.
  ///
  /// Framework products carry their own module map; Swift targets get one
  /// copied next to their build product.
  pub fn module_map_file_to_import(&self) -> Option<String> {
    self.memo.get_or_insert_with("module_map_file_to_import", || {
      if self.target.requires_frameworks() || !self.target.defines_module {
        return None;
      }
      if self.target.uses_swift {
        Some(format!(
          "{}/{}.modulemap",
          self.own_build_dir(),
          self.target.product_module_name()
        ))
      } else {
        Some(pods_root_path(&self.target.module_map_path(), self.sandbox_root()))
      }
    })
  }

  pub fn vendored_static_library_search_paths(&self) -> Vec<String> {
    self.search_paths(self.vendored(|fa| &fa.vendored_static_libraries))
  }

  pub fn vendored_dynamic_library_search_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("vendored_dynamic_library_search_paths", || {
      self.search_paths(self.vendored(|fa| &fa.vendored_dynamic_libraries))
    })
  }

  pub fn vendored_framework_search_paths(&self) -> Vec<String> {
    let frameworks: Vec<&PathBuf> = self
      .file_accessors()
      .into_iter()
      .flat_map(FileAccessor::vendored_frameworks)
      .collect();
    self.search_paths(frameworks)
  }

  pub fn library_search_paths_to_import(&self) -> Vec<String> {
    self.memo.get_or_insert_with("library_search_paths_to_import", || {
      let mut paths = self.vendored_static_library_search_paths();
      paths.extend(self.vendored_dynamic_library_search_paths());
      if !self.target.requires_frameworks() && self.target.should_build {
        paths.push(self.own_build_dir());
      }
      paths
    })
  }

  pub fn framework_search_paths_to_import(&self) -> Vec<String> {
    self.memo.get_or_insert_with("framework_search_paths_to_import", || {
      let mut paths = self.vendored_framework_search_paths();
      if self.target.requires_frameworks() && self.target.should_build {
        paths.push(self.own_build_dir());
      }
      paths
    })
  }

  pub fn swift_include_paths_to_import(&self) -> Vec<String> {
    if self.target.uses_swift && !self.target.requires_frameworks() {
      vec![self.own_build_dir()]
    } else {
      Vec::new()
    }
  }

  pub fn pods_root(&self) -> String {
    "${SRCROOT}".to_string()
  }

  pub fn pods_target_srcroot(&self) -> String {
    self.target.pod_target_srcroot()
  }

  pub fn skip_install(&self) -> String {
    "YES".to_string()
  }

  pub fn product_bundle_identifier(&self) -> String {
    "org.cocoapods.${PRODUCT_NAME:rfc1034identifier}".to_string()
  }

  /// Only the product is built into its own directory.
  pub fn configuration_build_dir(&self) -> Option<String> {
    (!self.test).then(|| self.own_build_dir())
  }

  pub fn ld_runpath_search_paths(&self) -> Option<Vec<String>> {
    self
      .test
      .then(|| runpath_search_paths(self.target.platform, false, true))
  }

  /// Merged `pod_target_xcconfig` of the applicable consumers.
  pub fn pod_target_xcconfig(&self) -> MergedOverrides {
    self.memo.get_or_insert_with("pod_target_xcconfig", || {
      let mut collector = OverrideCollector::new(OverrideSource::PodTargetXcconfig);
      for consumer in self.spec_consumers() {
        collector.add(&consumer.name, &consumer.pod_target_xcconfig);
      }
      collector.merge()
    })
  }
}

impl BuildSettings for PodSettings<'_> {
  fn memo(&self) -> &Memo {
    &self.memo
  }

  fn registry() -> Vec<Setting<Self>> {
    compose(
      base_settings(),
      vec![
        setting!(Self, pods_root),
        setting!(Self, pods_target_srcroot),
        setting!(Self, skip_install),
        setting!(Self, product_bundle_identifier),
        setting!(Self, configuration_build_dir),
        setting!(Self, ld_runpath_search_paths),
      ],
    )
  }

  fn platform(&self) -> Platform {
    self.target.platform
  }

  fn requires_frameworks(&self) -> bool {
    self.target.requires_frameworks()
  }

  fn uses_swift(&self) -> bool {
    self.target.uses_swift
  }

  fn frameworks(&self) -> Vec<String> {
    self.memo.get_or_insert_with("frameworks", || {
      if !self.links_own_artifacts() {
        return Vec::new();
      }
      let mut frameworks: Vec<String> = self
        .vendored(|fa| &fa.vendored_static_frameworks)
        .into_iter()
        .chain(self.vendored(|fa| &fa.vendored_dynamic_frameworks))
        .map(|path| framework_basename(path))
        .collect();
      frameworks.extend(self.consumer_values(|c| &c.frameworks));
      for dep in self.dependent_targets() {
        frameworks.extend(dep.dynamic_frameworks_to_import());
        if self.test {
          frameworks.extend(dep.static_frameworks_to_import());
        }
      }
      let frameworks = sort_uniq(frameworks);
      self
        .decorator
        .apply(frameworks, || self.arena.pod_by_id(self.id, false).frameworks_to_import())
    })
  }

  fn libraries(&self) -> Vec<String> {
    self.memo.get_or_insert_with("libraries", || {
      if !self.links_own_artifacts() {
        return Vec::new();
      }
      let mut libraries: Vec<String> = self
        .vendored(|fa| &fa.vendored_static_libraries)
        .into_iter()
        .chain(self.vendored(|fa| &fa.vendored_dynamic_libraries))
        .map(|path| library_basename(path))
        .collect();
      libraries.extend(self.consumer_values(|c| &c.libraries));
      for dep in self.dependent_targets() {
        libraries.extend(dep.dynamic_libraries_to_import());
        if self.test {
          libraries.extend(dep.static_libraries_to_import());
        }
      }
      let libraries = sort_uniq(libraries);
      self
        .decorator
        .apply(libraries, || self.arena.pod_by_id(self.id, false).libraries_to_import())
    })
  }

  fn weak_frameworks(&self) -> Vec<String> {
    self.memo.get_or_insert_with("weak_frameworks", || {
      if !self.links_own_artifacts() {
        return Vec::new();
      }
      let mut frameworks = self.consumer_values(|c| &c.weak_frameworks);
      for dep in self.dependent_targets() {
        frameworks.extend(dep.weak_frameworks_to_import());
      }
      sort_uniq(frameworks)
    })
  }

  fn module_map_files(&self) -> Vec<String> {
    self.memo.get_or_insert_with("module_map_files", || {
      let files = self
        .dependent_targets()
        .iter()
        .filter_map(PodSettings::module_map_file_to_import)
        .collect();
      sort_uniq(files)
    })
  }

  fn header_search_paths(&self) -> Vec<String> {
    sort_uniq(self.target.header_search_paths(self.test))
  }

  /// Vendored dynamic library directories of this target and its
  /// dependencies. The test product also sees every imported directory,
  /// including the product's own build directory, which the product itself
  /// must not link against.
  fn library_search_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("library_search_paths", || {
      let dependents = self.dependent_targets();
      let mut paths = self.vendored_dynamic_library_search_paths();
      if self.links_own_artifacts() {
        paths.extend(self.vendored_static_library_search_paths());
      }
      for dep in &dependents {
        paths.extend(dep.vendored_dynamic_library_search_paths());
      }
      if self.test {
        for dep in &dependents {
          paths.extend(dep.library_search_paths_to_import());
        }
        paths.extend(self.library_search_paths_to_import());
      } else {
        let own = self.own_build_dir();
        paths.retain(|p| *p != own);
      }
      sort_uniq(paths)
    })
  }

  fn framework_search_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("framework_search_paths", || {
      let mut paths = developer_framework_search_paths(&self.frameworks());
      for dep in self.dependent_targets() {
        paths.extend(dep.framework_search_paths_to_import());
      }
      if self.test {
        paths.extend(self.framework_search_paths_to_import());
      } else {
        let own = self.own_build_dir();
        paths.retain(|p| *p != own);
      }
      paths.extend(self.vendored_framework_search_paths());
      sort_uniq(paths)
    })
  }

  fn other_swift_flags(&self) -> Option<Vec<String>> {
    self.memo.get_or_insert_with("other_swift_flags", || {
      if !self.target.uses_swift {
        return None;
      }
      let mut flags = swift_flags(&self.module_map_files());
      if self.target.inhibit_warnings {
        flags.push("-suppress-warnings".to_string());
      }
      if !self.target.requires_frameworks() && self.target.defines_module && !self.test {
        flags.extend(
          [
            "-import-underlying-module",
            "-Xcc",
            "-fmodule-map-file=${SRCROOT}/${MODULEMAP_FILE}",
          ]
          .map(String::from),
        );
      }
      Some(flags)
    })
  }

  fn swift_include_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("swift_include_paths", || {
      self
        .dependent_targets()
        .iter()
        .flat_map(PodSettings::swift_include_paths_to_import)
        .collect()
    })
  }

  /// Test bundles always force-load to avoid missing category symbols.
  fn requires_objc_linker_flag(&self) -> bool {
    self.test
  }

  fn requires_fobjc_arc(&self) -> bool {
    self.arena.project().podfile.set_arc_compatibility_flag && self.spec_consumers().iter().any(|c| c.requires_arc)
  }

  fn overrides(&self) -> MergedOverrides {
    self.pod_target_xcconfig()
  }
}
