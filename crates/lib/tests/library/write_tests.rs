use tempfile::TempDir;
use xcsettings_lib::settings::BuildSettings;

use super::common::fixture_arena;

#[test]
fn every_resolver_renders_and_saves() {
  let arena = fixture_arena("vendoring.yaml");
  let temp = TempDir::new().unwrap();

  for key in arena.keys() {
    let resolution = arena.resolve(&key).unwrap();
    let path = temp
      .path()
      .join("Target Support Files")
      .join(format!("{}.xcconfig", resolution.label));
    resolution.xcconfig.save_as(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, resolution.xcconfig.render());
    assert!(written.contains("GCC_PREPROCESSOR_DEFINITIONS = $(inherited) COCOAPODS=1\n"));
  }
}

#[test]
fn rendered_keys_are_sorted() {
  let arena = fixture_arena("vendoring.yaml");
  let rendered = arena.aggregate("Pods-App", "Debug").unwrap().xcconfig().unwrap().render();
  let keys: Vec<&str> = rendered.lines().filter_map(|line| line.split(" = ").next()).collect();
  let mut sorted = keys.clone();
  sorted.sort();
  assert_eq!(keys, sorted);
}
