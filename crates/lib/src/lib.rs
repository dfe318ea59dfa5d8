//! xcsettings-lib: build settings for separately compiled library targets
//!
//! This crate computes the xcconfig build settings of:
//! - pod targets: one library or framework per vendored dependency, plus an
//!   optional test bundle
//! - aggregate targets: the umbrella product an application links, resolved
//!   per build configuration
//!
//! Projects are loaded from JSON or YAML descriptions (see [`project`]) and
//! resolved through a [`settings::SettingsArena`].

pub mod consts;
pub mod project;
pub mod settings;
pub mod util;
pub mod xcconfig;
