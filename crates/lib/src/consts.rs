//! Well-known build setting values and variable references.

use semver::Version;

/// Placeholder meaning "start from the parent configuration's value".
pub const INHERITED: &str = "$(inherited)";

/// Variable the per-target configuration build directories hang off.
pub const CONFIGURATION_BUILD_DIR_VARIABLE: &str = "${PODS_CONFIGURATION_BUILD_DIR}";

/// Variable vendored artifact search paths are expressed relative to.
pub const PODS_ROOT_VARIABLE: &str = "${PODS_ROOT}";

/// Preprocessor definition every target is compiled with.
pub const BUILD_IDENTIFIER_DEFINITION: &str = "COCOAPODS=1";

/// Search path added when a target links a developer testing framework.
pub const DEVELOPER_FRAMEWORKS_SEARCH_PATH: &str = "$(PLATFORM_DIR)/Developer/Library/Frameworks";

/// Frameworks that live under [`DEVELOPER_FRAMEWORKS_SEARCH_PATH`].
pub const DEVELOPER_FRAMEWORKS: &[&str] = &["XCTest", "SenTestingKit"];

/// Linker flag forcing every Objective-C class and category to be loaded.
pub const OBJC_LINKER_FLAG: &str = "-ObjC";

/// Linker flag requesting ARC compatibility.
pub const FOBJC_ARC_LINKER_FLAG: &str = "-fobjc-arc";

/// Swift versions below this embed via `EMBEDDED_CONTENT_CONTAINS_SWIFT`,
/// at or above via `ALWAYS_EMBED_SWIFT_STANDARD_LIBRARIES`.
pub const EMBED_STANDARD_LIBRARIES_MINIMUM_VERSION: Version = Version::new(2, 3, 0);

/// Default location of the sandbox, relative to the project description.
pub const DEFAULT_SANDBOX_ROOT: &str = "Pods";

/// Default `PODS_ROOT` of an aggregate target.
pub const DEFAULT_RELATIVE_PODS_ROOT: &str = "${SRCROOT}/Pods";

/// Default `PODS_PODFILE_DIR_PATH` of an aggregate target.
pub const DEFAULT_PODFILE_DIR_PATH: &str = "${SRCROOT}/.";

/// Build configurations an aggregate target declares unless told otherwise.
pub const DEFAULT_BUILD_CONFIGURATIONS: &[&str] = &["Debug", "Release"];
