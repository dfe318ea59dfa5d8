use xcsettings_lib::settings::{BuildSettings, ConflictKind, OverrideSource};

use super::common::fixture_arena;

#[test]
fn conflicting_user_target_values_are_dropped_and_reported() {
  let arena = fixture_arena("vendoring.yaml");
  let settings = arena.aggregate("Pods-App", "Debug").unwrap();

  let diagnostics = settings.diagnostics();
  assert_eq!(diagnostics.len(), 1);
  let diagnostic = &diagnostics[0];
  assert_eq!(diagnostic.source, OverrideSource::UserTargetXcconfig);
  assert_eq!(diagnostic.kind, ConflictKind::Boolean);
  assert_eq!(diagnostic.key, "ENABLE_BITCODE");
  assert_eq!(diagnostic.consumers, vec!["BananaLib", "MonkeyLib"]);
  assert_eq!(
    diagnostic.to_string(),
    "Can't merge user_target_xcconfig for pod targets: [\"BananaLib\", \"MonkeyLib\"]. Boolean build setting ENABLE_BITCODE has different values."
  );
}

#[test]
fn resolution_carries_label_and_diagnostics() {
  let arena = fixture_arena("vendoring.yaml");
  let key = arena.aggregate("Pods-App", "Release").unwrap().key();
  let resolution = arena.generate(&key).unwrap();

  assert_eq!(resolution.label, "Pods-App (Release)");
  assert_eq!(resolution.diagnostics.len(), 1);
  assert_eq!(resolution.xcconfig.get("ENABLE_BITCODE"), None);
}

#[test]
fn nested_aggregate_does_not_inherit_user_overrides() {
  let arena = fixture_arena("vendoring.yaml");
  let settings = arena.aggregate("Pods-AppTests", "Debug").unwrap();
  assert!(settings.diagnostics().is_empty());
  assert!(!settings.xcconfig().unwrap().get("OTHER_LDFLAGS").unwrap().contains("-lc++"));
}
