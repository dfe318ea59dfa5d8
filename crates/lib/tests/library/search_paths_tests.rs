use xcsettings_lib::settings::BuildSettings;

use super::common::fixture_arena;

#[test]
fn whitelisted_pod_only_links_in_its_configuration() {
  let arena = fixture_arena("vendoring.yaml");
  let debug = arena.aggregate("Pods-App", "Debug").unwrap().frameworks();
  let release = arena.aggregate("Pods-App", "Release").unwrap().frameworks();

  assert!(debug.contains(&"DebugLib".to_string()));
  assert!(!release.contains(&"DebugLib".to_string()));
}

#[test]
fn nested_aggregate_inherits_frameworks_without_linking_pods() {
  let arena = fixture_arena("vendoring.yaml");
  let tests = arena.aggregate("Pods-AppTests", "Debug").unwrap();

  assert!(tests.pod_targets().is_empty());
  let xcconfig = tests.xcconfig().unwrap();
  let ldflags = xcconfig.get("OTHER_LDFLAGS").unwrap();
  assert!(ldflags.contains("-framework \"BananaLib\""));
  assert!(ldflags.contains("-framework \"MonkeyLib\""));
  assert!(
    xcconfig
      .get("FRAMEWORK_SEARCH_PATHS")
      .unwrap()
      .contains("\"${PODS_CONFIGURATION_BUILD_DIR}/BananaLib\"")
  );
  assert_eq!(xcconfig.get("LD_RUNPATH_SEARCH_PATHS").map(|v| v.contains("../../Frameworks")), Some(true));
}

#[test]
fn aggregate_links_static_artifacts_with_objc_flag() {
  let arena = fixture_arena("vendoring.yaml");
  let xcconfig = arena.aggregate("Pods-App", "Release").unwrap().xcconfig().unwrap();
  assert_eq!(
    xcconfig.get("OTHER_LDFLAGS"),
    Some(
      "$(inherited) -ObjC -l\"StaticLibrary\" -l\"VendoredDyld\" -l\"xml2\" -framework \"BananaLib\" -framework \"MonkeyLib\" -framework \"StaticFramework\" -framework \"VendoredFramework\" -lc++"
    )
  );
  assert_eq!(xcconfig.get("ALWAYS_EMBED_SWIFT_STANDARD_LIBRARIES"), Some("$(inherited)"));
  assert_eq!(xcconfig.get("ENABLE_BITCODE"), None);
  assert_eq!(xcconfig.get("PODS_ROOT"), Some("${SRCROOT}/Pods"));
}

#[test]
fn nested_aggregate_is_invalidated_with_its_owner() {
  let arena = fixture_arena("vendoring.yaml");
  let app = arena.aggregate("Pods-App", "Debug").unwrap().key();
  let tests = arena.aggregate("Pods-AppTests", "Debug").unwrap().key();
  arena.resolve(&tests).unwrap();
  assert!(arena.is_cached(&app));

  arena.invalidate(&tests);
  assert!(!arena.is_cached(&tests));
  assert!(!arena.is_cached(&app));
}
