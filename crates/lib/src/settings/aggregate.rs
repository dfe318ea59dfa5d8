//! Settings of an aggregate (umbrella) target in one build configuration.
//!
//! Most values reduce over the pod targets active in the configuration: each
//! pod's own value plus what it exports, flattened, de-duplicated and sorted.
//! Search-path style values additionally inherit from the aggregate's
//! search-paths aggregates.

use std::rc::Rc;

use semver::Version;
use xcsettings_platform::Platform;

use super::arena::{ResolverKey, SettingsArena};
use super::base::{BuildSettings, module_map_cflags, runpath_search_paths, sort_uniq};
use super::memo::Memo;
use super::merge::{MergedOverrides, OverrideCollector, OverrideSource};
use super::pod::PodSettings;
use super::registry::{Setting, base_settings, compose, setting};
use crate::consts::{CONFIGURATION_BUILD_DIR_VARIABLE, EMBED_STANDARD_LIBRARIES_MINIMUM_VERSION};
use crate::project::{AggregateTarget, AggregateTargetId, parse_version};

/// Resolver of one aggregate target in one build configuration.
pub struct AggregateSettings<'a> {
  arena: &'a SettingsArena,
  id: AggregateTargetId,
  target: &'a AggregateTarget,
  configuration: String,
  memo: Rc<Memo>,
}

impl<'a> AggregateSettings<'a> {
  pub(crate) fn new(arena: &'a SettingsArena, id: AggregateTargetId, configuration: &str, memo: Rc<Memo>) -> Self {
    Self {
      arena,
      id,
      target: &arena.project().aggregate_targets[id.0],
      configuration: configuration.to_string(),
      memo,
    }
  }

  pub fn target(&self) -> &'a AggregateTarget {
    self.target
  }

  pub fn configuration(&self) -> &str {
    &self.configuration
  }

  pub fn key(&self) -> ResolverKey {
    ResolverKey::Aggregate {
      target: self.id,
      configuration: self.configuration.clone(),
    }
  }

  /// Product resolvers of the pod targets active in this configuration.
  pub fn pod_targets(&self) -> Vec<PodSettings<'a>> {
    self
      .arena
      .graph()
      .pod_targets_for_build_configuration(self.id, &self.configuration)
      .into_iter()
      .map(|id| self.arena.pod_by_id(id, false))
      .collect()
  }

  /// Resolvers of the search-paths aggregates, in the same configuration.
  pub fn search_paths_aggregate_targets(&self) -> Vec<AggregateSettings<'a>> {
    self
      .arena
      .graph()
      .search_paths_aggregate_targets(self.id)
      .iter()
      .map(|&id| self.arena.aggregate_by_id(id, &self.configuration))
      .collect()
  }

  /// Each active pod's exported value followed by its own value, flattened,
  /// de-duplicated and sorted.
  fn from_pod_targets(
    &self,
    to_import: impl Fn(&PodSettings<'a>) -> Vec<String>,
    own: impl Fn(&PodSettings<'a>) -> Vec<String>,
  ) -> Vec<String> {
    let values = self
      .pod_targets()
      .iter()
      .flat_map(|pod| {
        let mut value = to_import(pod);
        value.extend(own(pod));
        value
      })
      .collect();
    sort_uniq(values)
  }

  /// Unions `value` with the same setting of every search-paths aggregate.
  fn with_search_paths_aggregates(
    &self,
    mut value: Vec<String>,
    inherited: impl Fn(&AggregateSettings<'a>) -> Vec<String>,
  ) -> Vec<String> {
    for aggregate in self.search_paths_aggregate_targets() {
      value.extend(inherited(&aggregate));
    }
    sort_uniq(value)
  }

  /// `-iquote` header directories of built framework pods.
  pub fn framework_header_paths_for_iquote(&self) -> Vec<String> {
    self.memo.get_or_insert_with("framework_header_paths_for_iquote", || {
      let paths = self
        .pod_targets()
        .iter()
        .map(PodSettings::target)
        .filter(|pod| pod.should_build && pod.requires_frameworks())
        .map(|pod| format!("{}/Headers", pod.build_product_path(CONFIGURATION_BUILD_DIR_VARIABLE)))
        .collect();
      self.with_search_paths_aggregates(paths, AggregateSettings::framework_header_paths_for_iquote)
    })
  }

  pub fn pods_podfile_dir_path(&self) -> String {
    self.target.podfile_dir_path.clone()
  }

  pub fn pods_root(&self) -> String {
    self.target.relative_pods_root.clone()
  }

  /// Present once anything dynamic is embedded: framework pods or vendored
  /// dynamic artifacts.
  pub fn ld_runpath_search_paths(&self) -> Option<Vec<String>> {
    self.memo.get_or_insert_with("ld_runpath_search_paths", || {
      if !self.target.requires_frameworks && !self.has_vendored_dynamic_artifacts() {
        return None;
      }
      let test_bundle = self
        .target
        .user_target_types
        .first()
        .is_some_and(|product_type| product_type.is_test_bundle());
      Some(runpath_search_paths(
        self.target.platform,
        self.target.requires_host_target,
        test_bundle,
      ))
    })
  }

  fn has_vendored_dynamic_artifacts(&self) -> bool {
    self.pod_targets().iter().any(|pod| {
      pod
        .file_accessors()
        .iter()
        .any(|fa| fa.vendored_dynamic_artifacts().next().is_some())
    })
  }

  fn must_embed_swift(&self) -> bool {
    !self.target.requires_host_target && self.pod_targets().iter().any(|pod| pod.target().uses_swift)
  }

  /// Declared `SWIFT_VERSION`, `0.0.0` when absent.
  pub fn target_swift_version(&self) -> Version {
    self
      .target
      .swift_version()
      .and_then(|version| parse_version(version).ok())
      .unwrap_or_else(|| Version::new(0, 0, 0))
  }

  pub fn always_embed_swift_standard_libraries(&self) -> Option<String> {
    (self.must_embed_swift() && self.target_swift_version() >= EMBED_STANDARD_LIBRARIES_MINIMUM_VERSION)
      .then(|| "YES".to_string())
  }

  pub fn embedded_content_contains_swift(&self) -> Option<String> {
    (self.must_embed_swift() && self.target_swift_version() < EMBED_STANDARD_LIBRARIES_MINIMUM_VERSION)
      .then(|| "YES".to_string())
  }

  /// `user_target_xcconfig` of every active pod's consumers, merged.
  ///
  /// Keys the consumers disagree on are dropped and reported.
  pub fn merged_user_target_xcconfigs(&self) -> MergedOverrides {
    self.memo.get_or_insert_with("merged_user_target_xcconfigs", || {
      let mut collector = OverrideCollector::new(OverrideSource::UserTargetXcconfig);
      for pod in self.pod_targets() {
        for consumer in pod.spec_consumers() {
          collector.add(&consumer.name, &consumer.user_target_xcconfig);
        }
      }
      collector.merge()
    })
  }
}

impl BuildSettings for AggregateSettings<'_> {
  fn memo(&self) -> &Memo {
    &self.memo
  }

  fn registry() -> Vec<Setting<Self>> {
    compose(
      base_settings(),
      vec![
        setting!(Self, pods_podfile_dir_path),
        setting!(Self, pods_root),
        setting!(Self, ld_runpath_search_paths),
        setting!(Self, always_embed_swift_standard_libraries),
        setting!(Self, embedded_content_contains_swift),
      ],
    )
  }

  fn platform(&self) -> Platform {
    self.target.platform
  }

  fn requires_frameworks(&self) -> bool {
    self.target.requires_frameworks
  }

  fn uses_swift(&self) -> bool {
    self.pod_targets().iter().any(|pod| pod.target().uses_swift)
  }

  fn libraries(&self) -> Vec<String> {
    self.memo.get_or_insert_with("libraries", || {
      self.from_pod_targets(PodSettings::libraries_to_import, |pod| pod.libraries())
    })
  }

  fn library_search_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("library_search_paths", || {
      let paths = self.from_pod_targets(PodSettings::library_search_paths_to_import, |pod| {
        pod.library_search_paths()
      });
      self.with_search_paths_aggregates(paths, |aggregate| aggregate.library_search_paths())
    })
  }

  fn frameworks(&self) -> Vec<String> {
    self.memo.get_or_insert_with("frameworks", || {
      let frameworks = self.from_pod_targets(PodSettings::frameworks_to_import, |pod| pod.frameworks());
      self.with_search_paths_aggregates(frameworks, |aggregate| aggregate.frameworks())
    })
  }

  fn weak_frameworks(&self) -> Vec<String> {
    self.memo.get_or_insert_with("weak_frameworks", || {
      let frameworks = self.from_pod_targets(PodSettings::weak_frameworks_to_import, |pod| pod.weak_frameworks());
      self.with_search_paths_aggregates(frameworks, |aggregate| aggregate.weak_frameworks())
    })
  }

  fn framework_search_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("framework_search_paths", || {
      let paths = self.from_pod_targets(PodSettings::framework_search_paths_to_import, |pod| {
        pod.framework_search_paths()
      });
      self.with_search_paths_aggregates(paths, |aggregate| aggregate.framework_search_paths())
    })
  }

  fn swift_include_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("swift_include_paths", || {
      let paths = self.from_pod_targets(PodSettings::swift_include_paths_to_import, |pod| {
        pod.swift_include_paths()
      });
      self.with_search_paths_aggregates(paths, |aggregate| aggregate.swift_include_paths())
    })
  }

  /// Public headers, unless every pod is a built framework carrying its own.
  fn header_search_paths(&self) -> Vec<String> {
    self.memo.get_or_insert_with("header_search_paths", || {
      let all_built = self.pod_targets().iter().all(|pod| pod.target().should_build);
      let paths = if self.target.requires_frameworks && all_built {
        Vec::new()
      } else {
        self.target.public_header_search_paths.clone()
      };
      self.with_search_paths_aggregates(paths, |aggregate| aggregate.header_search_paths())
    })
  }

  fn module_map_files(&self) -> Vec<String> {
    self.memo.get_or_insert_with("module_map_files", || {
      let files = self
        .pod_targets()
        .iter()
        .filter_map(PodSettings::module_map_file_to_import)
        .collect();
      self.with_search_paths_aggregates(sort_uniq(files), |aggregate| aggregate.module_map_files())
    })
  }

  /// Module maps, then public headers as system includes, then framework
  /// headers as quote includes.
  fn other_cflags(&self) -> Vec<String> {
    self.memo.get_or_insert_with("other_cflags", || {
      let mut flags = module_map_cflags(&self.module_map_files());
      for path in self.header_search_paths() {
        flags.push("-isystem".to_string());
        flags.push(path);
      }
      for path in self.framework_header_paths_for_iquote() {
        flags.push("-iquote".to_string());
        flags.push(path);
      }
      flags
    })
  }

  /// Static archives need every Objective-C class and category loaded.
  fn requires_objc_linker_flag(&self) -> bool {
    self.memo.get_or_insert_with("requires_objc_linker_flag", || {
      !self.target.requires_frameworks
        || self.pod_targets().iter().any(|pod| {
          pod
            .file_accessors()
            .iter()
            .any(|fa| fa.vendored_static_artifacts().next().is_some())
        })
    })
  }

  fn requires_fobjc_arc(&self) -> bool {
    if !self.arena.project().podfile.set_arc_compatibility_flag {
      return false;
    }
    let project = self.arena.project();
    self
      .arena
      .graph()
      .aggregate_pod_targets(self.id)
      .iter()
      .flat_map(|id| &project.pod_targets[id.0].specs)
      .any(|spec| spec.consumer.requires_arc)
  }

  fn overrides(&self) -> MergedOverrides {
    self.merged_user_target_xcconfigs()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::{BuildType, ProductType};
  use crate::util::testutil::{aggregate_target, arena, pod_target, spec, test_spec};
  use std::path::PathBuf;

  #[test]
  fn test_static_library_pod_is_linked_once() {
    let mut banana = pod_target("BananaLib", BuildType::StaticLibrary);
    banana.specs = vec![spec("BananaLib")];
    let arena = arena(vec![banana], vec![aggregate_target("Pods-App", &["BananaLib"])]);

    let settings = arena.aggregate("Pods-App", "Debug").unwrap();
    assert_eq!(settings.libraries(), vec!["BananaLib"]);
    assert!(settings.frameworks().is_empty());
    assert_eq!(
      settings.xcconfig().unwrap().get("OTHER_LDFLAGS"),
      Some("$(inherited) -ObjC -l\"BananaLib\"")
    );
    assert_eq!(
      settings.library_search_paths(),
      vec!["${PODS_CONFIGURATION_BUILD_DIR}/BananaLib"]
    );
  }

  #[test]
  fn test_test_specification_does_not_propagate() {
    let mut banana = pod_target("BananaLib", BuildType::DynamicFramework);
    banana.should_build = false;
    let mut tests = test_spec("BananaLib/Tests");
    tests.consumer.libraries = vec!["xml2".to_string()];
    tests.consumer.frameworks = vec!["XCTest".to_string()];
    tests.file_accessor.vendored_dynamic_frameworks = vec![PathBuf::from("VendoredFramework.framework")];
    banana.specs = vec![tests];
    let mut app = aggregate_target("Pods-App", &["BananaLib"]);
    app.requires_frameworks = true;
    let arena = arena(vec![banana], vec![app]);

    let ldflags = arena.aggregate("Pods-App", "Debug").unwrap().other_ldflags();
    assert!(!ldflags.contains(&"-framework".to_string()));
    assert!(ldflags.is_empty());
  }

  #[test]
  fn test_other_cflags_include_headers_and_framework_headers() {
    let mut framework = pod_target("OrangeFramework", BuildType::DynamicFramework);
    framework.specs = vec![spec("OrangeFramework")];
    let mut library = pod_target("BananaLib", BuildType::StaticLibrary);
    library.should_build = false;
    let mut app = aggregate_target("Pods-App", &["OrangeFramework", "BananaLib"]);
    app.requires_frameworks = true;
    app.public_header_search_paths = vec!["${PODS_ROOT}/Headers/Public".to_string()];
    let arena = arena(vec![framework, library], vec![app]);

    let settings = arena.aggregate("Pods-App", "Release").unwrap();
    assert_eq!(
      settings.other_cflags(),
      vec![
        "-isystem",
        "${PODS_ROOT}/Headers/Public",
        "-iquote",
        "${PODS_CONFIGURATION_BUILD_DIR}/OrangeFramework/OrangeFramework.framework/Headers",
      ]
    );
  }

  #[test]
  fn test_header_search_paths_empty_when_all_frameworks_built() {
    let mut app = aggregate_target("Pods-App", &["OrangeFramework"]);
    app.requires_frameworks = true;
    app.public_header_search_paths = vec!["${PODS_ROOT}/Headers/Public".to_string()];
    let arena = arena(
      vec![pod_target("OrangeFramework", BuildType::DynamicFramework)],
      vec![app],
    );
    assert!(arena.aggregate("Pods-App", "Debug").unwrap().header_search_paths().is_empty());
  }

  #[test]
  fn test_swift_embedding_threshold() {
    let mut swift = pod_target("SwiftLib", BuildType::DynamicFramework);
    swift.uses_swift = true;
    let mut app = aggregate_target("Pods-App", &["SwiftLib"]);
    app.requires_frameworks = true;
    app.swift_version = Some("2.2".to_string());
    let mut modern = aggregate_target("Pods-Modern", &["SwiftLib"]);
    modern.requires_frameworks = true;
    modern.swift_version = Some("2.3".to_string());
    let mut extension = aggregate_target("Pods-Extension", &["SwiftLib"]);
    extension.requires_host_target = true;
    extension.swift_version = Some("4.0".to_string());
    let arena = arena(vec![swift], vec![app, modern, extension]);

    let old = arena.aggregate("Pods-App", "Debug").unwrap();
    assert_eq!(old.embedded_content_contains_swift(), Some("YES".to_string()));
    assert_eq!(old.always_embed_swift_standard_libraries(), None);

    let new = arena.aggregate("Pods-Modern", "Debug").unwrap();
    assert_eq!(new.embedded_content_contains_swift(), None);
    assert_eq!(new.always_embed_swift_standard_libraries(), Some("YES".to_string()));

    let hosted = arena.aggregate("Pods-Extension", "Debug").unwrap();
    assert_eq!(hosted.embedded_content_contains_swift(), None);
    assert_eq!(hosted.always_embed_swift_standard_libraries(), None);
  }

  #[test]
  fn test_missing_swift_version_counts_as_zero() {
    let mut swift = pod_target("SwiftLib", BuildType::DynamicFramework);
    swift.uses_swift = true;
    let arena = arena(vec![swift], vec![aggregate_target("Pods-App", &["SwiftLib"])]);
    let settings = arena.aggregate("Pods-App", "Debug").unwrap();
    assert_eq!(settings.target_swift_version(), Version::new(0, 0, 0));
    assert_eq!(settings.embedded_content_contains_swift(), Some("YES".to_string()));
  }

  #[test]
  fn test_runpath_search_paths_for_test_bundle_on_desktop() {
    let mut framework = pod_target("OrangeFramework", BuildType::DynamicFramework);
    framework.platform = Platform::Osx;
    let mut tests = aggregate_target("Pods-AppTests", &["OrangeFramework"]);
    tests.platform = Platform::Osx;
    tests.requires_frameworks = true;
    tests.user_target_types = vec![ProductType::UnitTestBundle];
    let arena = arena(vec![framework], vec![tests]);

    let settings = arena.aggregate("Pods-AppTests", "Debug").unwrap();
    assert_eq!(
      settings.ld_runpath_search_paths(),
      Some(vec![
        "'@executable_path/../Frameworks'".to_string(),
        "'@loader_path/../Frameworks'".to_string()
      ])
    );
    assert_eq!(settings.code_sign_identity(), Some(String::new()));
  }

  #[test]
  fn test_no_runpath_search_paths_for_static_products() {
    let arena = arena(
      vec![pod_target("BananaLib", BuildType::StaticLibrary)],
      vec![aggregate_target("Pods-App", &["BananaLib"])],
    );
    let settings = arena.aggregate("Pods-App", "Debug").unwrap();
    assert_eq!(settings.ld_runpath_search_paths(), None);
    assert_eq!(settings.xcconfig().unwrap().get("LD_RUNPATH_SEARCH_PATHS"), Some("$(inherited)"));
  }

  #[test]
  fn test_aggregate_only_settings() {
    let arena = arena(vec![], vec![aggregate_target("Pods-App", &[])]);
    let xcconfig = arena.aggregate("Pods-App", "Debug").unwrap().xcconfig().unwrap();
    assert_eq!(xcconfig.get("PODS_ROOT"), Some("${SRCROOT}/Pods"));
    assert_eq!(xcconfig.get("PODS_PODFILE_DIR_PATH"), Some("${SRCROOT}/."));
    assert_eq!(xcconfig.get("PODS_BUILD_DIR"), Some("${BUILD_DIR}"));
    assert_eq!(xcconfig.get("SKIP_INSTALL"), None);
  }

  #[test]
  fn test_user_target_xcconfig_merge_drops_conflicts() {
    let mut a = pod_target("PodA", BuildType::StaticLibrary);
    let mut a_spec = spec("PodA");
    a_spec
      .consumer
      .user_target_xcconfig
      .insert("OTHER_LDFLAGS".to_string(), "-lz".to_string());
    a_spec
      .consumer
      .user_target_xcconfig
      .insert("ENABLE_BITCODE".to_string(), "YES".to_string());
    a.specs = vec![a_spec];
    let mut b = pod_target("PodB", BuildType::StaticLibrary);
    let mut b_spec = spec("PodB");
    b_spec
      .consumer
      .user_target_xcconfig
      .insert("ENABLE_BITCODE".to_string(), "NO".to_string());
    b.specs = vec![b_spec];
    let arena = arena(vec![a, b], vec![aggregate_target("Pods-App", &["PodA", "PodB"])]);

    let settings = arena.aggregate("Pods-App", "Debug").unwrap();
    let xcconfig = settings.xcconfig().unwrap();
    assert_eq!(xcconfig.get("ENABLE_BITCODE"), None);
    assert_eq!(
      xcconfig.get("OTHER_LDFLAGS"),
      Some("$(inherited) -ObjC -l\"PodA\" -l\"PodB\" -lz")
    );
    assert_eq!(settings.diagnostics().len(), 1);
  }
}
