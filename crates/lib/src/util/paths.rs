//! Naming rules for vendored artifacts.
//!
//! Vendored libraries and frameworks are referenced on the command line by
//! their bare name (`-l"Sample Lib"`, `-framework "Foo"`) and located through
//! search paths expressed relative to `${PODS_ROOT}`.

use std::path::{Component, Path, PathBuf};

use crate::consts::PODS_ROOT_VARIABLE;

/// Returns the name a vendored library is linked by.
///
/// The extension and a leading `lib` are stripped: `libSample Lib.a` becomes
/// `Sample Lib`, `VendoredDyld.dyld` stays `VendoredDyld`.
pub fn library_basename(path: &Path) -> String {
  let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
  match stem.strip_prefix("lib") {
    Some(stripped) => stripped.to_string(),
    None => stem,
  }
}

/// Returns the name a vendored framework is linked by (`Foo.framework` -> `Foo`).
pub fn framework_basename(path: &Path) -> String {
  let name = path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
  match name.strip_suffix(".framework") {
    Some(stripped) => stripped.to_string(),
    None => name,
  }
}

/// Expresses `path` relative to the sandbox `root`.
///
/// A relative path is already sandbox-relative and is returned as is. An
/// absolute path is made relative to an absolute root, climbing out with `..`
/// when it lies outside it. An absolute path cannot be anchored to a relative
/// root, so `None` is returned and the caller uses it as given.
fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
  if !path.is_absolute() {
    return Some(path.components().filter(|c| *c != Component::CurDir).collect());
  }
  if !root.is_absolute() {
    return None;
  }

  let path_components: Vec<Component<'_>> = path.components().filter(|c| *c != Component::CurDir).collect();
  let root_components: Vec<Component<'_>> = root.components().filter(|c| *c != Component::CurDir).collect();
  let common = path_components
    .iter()
    .zip(&root_components)
    .take_while(|(a, b)| a == b)
    .count();

  let mut relative = PathBuf::new();
  for _ in common..root_components.len() {
    relative.push("..");
  }
  for component in &path_components[common..] {
    relative.push(component.as_os_str());
  }
  Some(relative)
}

/// Search path of the directory containing a vendored artifact, rooted at
/// `${PODS_ROOT}`.
pub fn pods_root_search_path(artifact: &Path, sandbox_root: &Path) -> String {
  let parent = artifact.parent().unwrap_or_else(|| Path::new(""));
  pods_root_path(parent, sandbox_root)
}

/// `${PODS_ROOT}/<path relative to the sandbox root>`, with `.` standing in
/// for the root itself.
pub fn pods_root_path(path: &Path, sandbox_root: &Path) -> String {
  match relative_to(path, sandbox_root) {
    Some(relative) if relative.as_os_str().is_empty() => format!("{}/.", PODS_ROOT_VARIABLE),
    Some(relative) => format!("{}/{}", PODS_ROOT_VARIABLE, to_slash(&relative)),
    None => path.to_string_lossy().into_owned(),
  }
}

/// Renders a path with forward slashes regardless of host separator.
fn to_slash(path: &Path) -> String {
  path
    .components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect::<Vec<_>>()
    .join("/")
}

/// Turns a product name into a valid C99 extended identifier.
///
/// Every character that is not alphanumeric or `_` becomes `_`, and a
/// leading digit is prefixed with `_`.
pub fn c99ext_identifier(name: &str) -> String {
  let mut identifier: String = name
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect();
  if identifier.starts_with(|c: char| c.is_ascii_digit()) {
    identifier.insert(0, '_');
  }
  identifier
}
