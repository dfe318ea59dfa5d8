//! Build settings resolution.
//!
//! A [`SettingsArena`] owns the project and hands out resolvers: one
//! [`PodSettings`] per pod target variant and one [`AggregateSettings`] per
//! aggregate target and build configuration. Resolvers memoize their values;
//! the arena invalidates a resolver together with every resolver that reads
//! from it.

mod aggregate;
mod arena;
mod base;
mod error;
mod memo;
mod merge;
mod pod;
mod quote;
mod registry;

pub use aggregate::AggregateSettings;
pub use arena::{Resolution, ResolverKey, SettingsArena};
pub use base::{BuildSettings, assemble_ldflags, runpath_search_paths};
pub use error::SettingsError;
pub use memo::Memo;
pub use merge::{ConflictKind, Diagnostic, MergedOverrides, OverrideCollector, OverrideSource};
pub use pod::{ImportDecorator, PodSettings};
pub use quote::{add_inherited_to_plural, quote_array};
pub use registry::{PLURAL_SETTINGS, Setting, SettingValue, is_plural};
