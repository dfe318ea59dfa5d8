//! Fixtures for resolver tests.

use crate::project::{AggregateTarget, BuildType, PodSpec, PodTarget, Project};
use crate::settings::SettingsArena;

/// An arena over the given targets with default podfile and sandbox.
pub fn arena(pod_targets: Vec<PodTarget>, aggregate_targets: Vec<AggregateTarget>) -> SettingsArena {
  let project = Project {
    pod_targets,
    aggregate_targets,
    ..Project::default()
  };
  SettingsArena::new(project).expect("fixture project is valid")
}

pub fn pod_target(name: &str, build_type: BuildType) -> PodTarget {
  let mut target = PodTarget::new(name);
  target.build_type = build_type;
  target
}

pub fn aggregate_target(name: &str, pods: &[&str]) -> AggregateTarget {
  let mut target = AggregateTarget::new(name);
  target.pod_targets = pods.iter().map(|pod| pod.to_string()).collect();
  target
}

pub fn spec(name: &str) -> PodSpec {
  PodSpec::new(name)
}

/// A spec marked as a test specification.
pub fn test_spec(name: &str) -> PodSpec {
  let mut spec = PodSpec::new(name);
  spec.consumer.test_specification = true;
  spec
}
