//! The project model the settings resolvers consume.
//!
//! A [`Project`] is a plain description of pod (leaf) targets and aggregate
//! (umbrella) targets. [`TargetGraph`] validates it and answers dependency
//! queries by stable id.

mod error;
mod graph;
mod load;
mod types;
mod version;

pub use error::ProjectError;
pub use graph::{AggregateTargetId, PodTargetId, TargetGraph};
pub use types::{
  AggregateTarget, BuildType, FileAccessor, PodSpec, PodTarget, Podfile, ProductType, Project, SpecConsumer,
  support_files_dir,
};
pub use version::parse_version;
