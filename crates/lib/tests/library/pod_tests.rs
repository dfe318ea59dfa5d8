use xcsettings_lib::settings::BuildSettings;

use super::common::fixture_arena;

#[test]
fn dynamic_framework_links_every_vendored_artifact() {
  let arena = fixture_arena("vendoring.yaml");
  let xcconfig = arena.pod("BananaLib", false).unwrap().xcconfig().unwrap();

  assert_eq!(
    xcconfig.get("OTHER_LDFLAGS"),
    Some(
      "$(inherited) -l\"StaticLibrary\" -l\"VendoredDyld\" -l\"xml2\" -framework \"MonkeyLib\" -framework \"StaticFramework\" -framework \"VendoredFramework\""
    )
  );
  assert_eq!(
    xcconfig.get("FRAMEWORK_SEARCH_PATHS"),
    Some("$(inherited) \"${PODS_CONFIGURATION_BUILD_DIR}/MonkeyLib\" \"${PODS_ROOT}/BananaLib\"")
  );
  assert_eq!(
    xcconfig.get("CONFIGURATION_BUILD_DIR"),
    Some("${PODS_CONFIGURATION_BUILD_DIR}/BananaLib")
  );
  assert_eq!(xcconfig.get("SKIP_INSTALL"), Some("YES"));
}

#[test]
fn test_product_links_the_product_and_developer_frameworks() {
  let arena = fixture_arena("vendoring.yaml");
  let settings = arena.pod("BananaLib", true).unwrap();
  let xcconfig = settings.xcconfig().unwrap();

  let ldflags = xcconfig.get("OTHER_LDFLAGS").unwrap();
  assert!(ldflags.starts_with("$(inherited) -ObjC"));
  assert!(ldflags.contains("-framework \"BananaLib\""));
  assert!(ldflags.contains("-framework \"XCTest\""));
  assert!(
    xcconfig
      .get("FRAMEWORK_SEARCH_PATHS")
      .unwrap()
      .contains("\"$(PLATFORM_DIR)/Developer/Library/Frameworks\"")
  );
  assert_eq!(xcconfig.get("CONFIGURATION_BUILD_DIR"), Some("$(inherited)"));
  assert_eq!(
    xcconfig.get("LD_RUNPATH_SEARCH_PATHS"),
    Some("$(inherited) '@executable_path/Frameworks' '@loader_path/Frameworks'")
  );
}

#[test]
fn pod_without_specs_still_resolves() {
  let arena = fixture_arena("vendoring.yaml");
  let xcconfig = arena.pod("DebugLib", false).unwrap().xcconfig().unwrap();
  assert_eq!(xcconfig.get("OTHER_LDFLAGS"), Some("$(inherited)"));
  assert_eq!(xcconfig.get("PODS_TARGET_SRCROOT"), Some("${PODS_ROOT}/DebugLib"));
}
