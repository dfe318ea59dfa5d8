//! Target dependency graph.
//!
//! Resolves target names to stable ids, validates references and cycles, and
//! answers the closure queries the resolvers depend on.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use tracing::debug;

use super::error::ProjectError;
use super::types::Project;
use super::version::parse_version;

/// Index of a pod target in [`Project::pod_targets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PodTargetId(pub usize);

/// Index of an aggregate target in [`Project::aggregate_targets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregateTargetId(pub usize);

/// Validated view of the relationships between the targets of a project.
#[derive(Debug, Clone)]
pub struct TargetGraph {
  pod_ids: HashMap<String, PodTargetId>,
  aggregate_ids: HashMap<String, AggregateTargetId>,

  /// Direct dependencies, in declaration order.
  dependencies: Vec<Vec<PodTargetId>>,

  /// Transitive closure of `dependencies`.
  recursive: Vec<Vec<PodTargetId>>,

  /// Transitive closure of `dependencies` and `test_dependencies`.
  all: Vec<Vec<PodTargetId>>,

  /// Pod targets of each aggregate, in declaration order.
  aggregate_pods: Vec<Vec<PodTargetId>>,

  /// Configuration whitelists of each aggregate's pod targets.
  whitelists: Vec<HashMap<PodTargetId, Vec<String>>>,

  search_paths: Vec<Vec<AggregateTargetId>>,
}

impl TargetGraph {
  /// Builds the graph, failing on the first invalid reference or cycle.
  pub fn new(project: &Project) -> Result<Self, ProjectError> {
    let mut pod_ids = HashMap::new();
    for (index, target) in project.pod_targets.iter().enumerate() {
      if pod_ids.insert(target.name.clone(), PodTargetId(index)).is_some() {
        return Err(ProjectError::DuplicateTarget {
          kind: "pod",
          name: target.name.clone(),
        });
      }
    }

    let mut aggregate_ids = HashMap::new();
    for (index, target) in project.aggregate_targets.iter().enumerate() {
      if aggregate_ids.insert(target.name.clone(), AggregateTargetId(index)).is_some() {
        return Err(ProjectError::DuplicateTarget {
          kind: "aggregate",
          name: target.name.clone(),
        });
      }
    }

    let lookup_pod = |from: &str, name: &str| {
      pod_ids.get(name).copied().ok_or_else(|| ProjectError::UnknownPodTarget {
        from: from.to_string(),
        name: name.to_string(),
      })
    };

    let mut dependencies = Vec::with_capacity(project.pod_targets.len());
    let mut test_dependencies = Vec::with_capacity(project.pod_targets.len());
    for target in &project.pod_targets {
      let deps = target
        .dependencies
        .iter()
        .map(|name| lookup_pod(&target.name, name))
        .collect::<Result<Vec<_>, _>>()?;
      let test_deps = target
        .test_dependencies
        .iter()
        .map(|name| lookup_pod(&target.name, name))
        .collect::<Result<Vec<_>, _>>()?;
      dependencies.push(deps);
      test_dependencies.push(test_deps);
    }

    // Edge from target to dependency. Test dependencies may point back at
    // the target, so only regular dependencies must be acyclic.
    let mut pod_graph = DiGraph::<usize, ()>::new();
    let pod_nodes: Vec<_> = (0..project.pod_targets.len()).map(|i| pod_graph.add_node(i)).collect();
    for (index, deps) in dependencies.iter().enumerate() {
      for dep in deps {
        pod_graph.add_edge(pod_nodes[index], pod_nodes[dep.0], ());
      }
    }
    toposort(&pod_graph, None).map_err(|cycle| {
      ProjectError::DependencyCycle(project.pod_targets[pod_graph[cycle.node_id()]].name.clone())
    })?;

    let mut aggregate_pods = Vec::with_capacity(project.aggregate_targets.len());
    let mut whitelists = Vec::with_capacity(project.aggregate_targets.len());
    let mut search_paths = Vec::with_capacity(project.aggregate_targets.len());
    for target in &project.aggregate_targets {
      let pods = target
        .pod_targets
        .iter()
        .map(|name| lookup_pod(&target.name, name))
        .collect::<Result<Vec<_>, _>>()?;

      let mut whitelist = HashMap::new();
      for (name, configurations) in &target.pod_target_configurations {
        let id = lookup_pod(&target.name, name)?;
        if !pods.contains(&id) {
          return Err(ProjectError::UnknownPodTarget {
            from: target.name.clone(),
            name: name.clone(),
          });
        }
        if let Some(unknown) = configurations
          .iter()
          .find(|c| !target.build_configurations.iter().any(|b| b.eq_ignore_ascii_case(c)))
        {
          return Err(ProjectError::UnknownConfiguration {
            target: target.name.clone(),
            configuration: unknown.clone(),
          });
        }
        whitelist.insert(id, configurations.clone());
      }

      let inherited = target
        .search_paths_aggregate_targets
        .iter()
        .map(|name| {
          aggregate_ids
            .get(name)
            .copied()
            .ok_or_else(|| ProjectError::UnknownAggregateTarget {
              from: target.name.clone(),
              name: name.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

      if let Some(version) = &target.swift_version
        && !version.trim().is_empty()
        && parse_version(version).is_err()
      {
        return Err(ProjectError::InvalidSwiftVersion {
          target: target.name.clone(),
          version: version.clone(),
        });
      }

      aggregate_pods.push(pods);
      whitelists.push(whitelist);
      search_paths.push(inherited);
    }

    let mut aggregate_graph = DiGraph::<usize, ()>::new();
    let aggregate_nodes: Vec<_> = (0..project.aggregate_targets.len())
      .map(|i| aggregate_graph.add_node(i))
      .collect();
    for (index, inherited) in search_paths.iter().enumerate() {
      let target = &project.aggregate_targets[index];
      for id in inherited {
        let other = &project.aggregate_targets[id.0];
        if let Some(missing) = target
          .build_configurations
          .iter()
          .find(|c| !other.declares_configuration(c))
        {
          return Err(ProjectError::MissingConfiguration {
            target: target.name.clone(),
            inherited: other.name.clone(),
            configuration: missing.clone(),
          });
        }
        aggregate_graph.add_edge(aggregate_nodes[index], aggregate_nodes[id.0], ());
      }
    }
    toposort(&aggregate_graph, None).map_err(|cycle| {
      ProjectError::SearchPathsCycle(project.aggregate_targets[aggregate_graph[cycle.node_id()]].name.clone())
    })?;

    let mut graph = Self {
      pod_ids,
      aggregate_ids,
      dependencies,
      recursive: Vec::new(),
      all: Vec::new(),
      aggregate_pods,
      whitelists,
      search_paths,
    };

    graph.recursive = (0..project.pod_targets.len())
      .map(|i| graph.closure(graph.dependencies[i].iter().copied(), PodTargetId(i)))
      .collect();
    graph.all = (0..project.pod_targets.len())
      .map(|i| {
        let seed = graph.dependencies[i].iter().chain(&test_dependencies[i]).copied();
        graph.closure(seed, PodTargetId(i))
      })
      .collect();

    debug!(
      pod_targets = project.pod_targets.len(),
      aggregate_targets = project.aggregate_targets.len(),
      "validated target graph"
    );
    Ok(graph)
  }

  /// Breadth-first closure over regular dependencies, in discovery order.
  fn closure(&self, seed: impl Iterator<Item = PodTargetId>, exclude: PodTargetId) -> Vec<PodTargetId> {
    let mut targets: Vec<PodTargetId> = Vec::new();
    for id in seed {
      if id != exclude && !targets.contains(&id) {
        targets.push(id);
      }
    }

    let mut index = 0;
    while index < targets.len() {
      let current = targets[index];
      for &dep in &self.dependencies[current.0] {
        if dep != exclude && !targets.contains(&dep) {
          targets.push(dep);
        }
      }
      index += 1;
    }
    targets
  }

  pub fn pod_id(&self, name: &str) -> Option<PodTargetId> {
    self.pod_ids.get(name).copied()
  }

  pub fn aggregate_id(&self, name: &str) -> Option<AggregateTargetId> {
    self.aggregate_ids.get(name).copied()
  }

  /// Every target reachable through regular dependencies, excluding `id`.
  pub fn recursive_dependent_targets(&self, id: PodTargetId) -> &[PodTargetId] {
    &self.recursive[id.0]
  }

  /// Like [`Self::recursive_dependent_targets`], seeded with test
  /// dependencies as well.
  pub fn all_dependent_targets(&self, id: PodTargetId) -> &[PodTargetId] {
    &self.all[id.0]
  }

  /// Every pod target the aggregate references, regardless of configuration.
  pub fn aggregate_pod_targets(&self, id: AggregateTargetId) -> &[PodTargetId] {
    &self.aggregate_pods[id.0]
  }

  /// Pod targets of the aggregate that are linked in `configuration`.
  pub fn pod_targets_for_build_configuration(&self, id: AggregateTargetId, configuration: &str) -> Vec<PodTargetId> {
    let whitelist = &self.whitelists[id.0];
    self.aggregate_pods[id.0]
      .iter()
      .copied()
      .filter(|pod| match whitelist.get(pod) {
        Some(configurations) => configurations.iter().any(|c| c.eq_ignore_ascii_case(configuration)),
        None => true,
      })
      .collect()
  }

  pub fn search_paths_aggregate_targets(&self, id: AggregateTargetId) -> &[AggregateTargetId] {
    &self.search_paths[id.0]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::{AggregateTarget, PodTarget};

  fn pod(name: &str, deps: &[&str]) -> PodTarget {
    let mut target = PodTarget::new(name);
    target.dependencies = deps.iter().map(|d| d.to_string()).collect();
    target
  }

  fn project(pods: Vec<PodTarget>, aggregates: Vec<AggregateTarget>) -> Project {
    Project {
      pod_targets: pods,
      aggregate_targets: aggregates,
      ..Project::default()
    }
  }

  #[test]
  fn test_recursive_dependent_targets_in_discovery_order() {
    let graph = TargetGraph::new(&project(
      vec![
        pod("A", &["B", "C"]),
        pod("B", &["D"]),
        pod("C", &["D"]),
        pod("D", &[]),
      ],
      vec![],
    ))
    .unwrap();

    let ids = graph.recursive_dependent_targets(PodTargetId(0));
    assert_eq!(ids, &[PodTargetId(1), PodTargetId(2), PodTargetId(3)]);
    assert!(graph.recursive_dependent_targets(PodTargetId(3)).is_empty());
  }

  #[test]
  fn test_all_dependent_targets_include_test_dependencies_but_not_self() {
    let mut a = pod("A", &["B"]);
    a.test_dependencies = vec!["C".to_string()];
    let graph = TargetGraph::new(&project(vec![a, pod("B", &[]), pod("C", &["A"])], vec![])).unwrap();

    assert_eq!(graph.recursive_dependent_targets(PodTargetId(0)), &[PodTargetId(1)]);
    assert_eq!(graph.all_dependent_targets(PodTargetId(0)), &[PodTargetId(1), PodTargetId(2)]);
  }

  #[test]
  fn test_dependency_cycle_is_rejected() {
    let err = TargetGraph::new(&project(vec![pod("A", &["B"]), pod("B", &["A"])], vec![])).unwrap_err();
    assert!(matches!(err, ProjectError::DependencyCycle(_)));
  }

  #[test]
  fn test_unknown_dependency_is_rejected() {
    let err = TargetGraph::new(&project(vec![pod("A", &["Missing"])], vec![])).unwrap_err();
    assert!(matches!(
      err,
      ProjectError::UnknownPodTarget { ref from, ref name } if from == "A" && name == "Missing"
    ));
  }

  #[test]
  fn test_duplicate_target_is_rejected() {
    let err = TargetGraph::new(&project(vec![pod("A", &[]), pod("A", &[])], vec![])).unwrap_err();
    assert!(matches!(err, ProjectError::DuplicateTarget { kind: "pod", .. }));
  }

  #[test]
  fn test_pod_targets_for_build_configuration_honours_whitelist() {
    let mut app = AggregateTarget::new("Pods-App");
    app.pod_targets = vec!["A".to_string(), "Reveal".to_string()];
    app
      .pod_target_configurations
      .insert("Reveal".to_string(), vec!["Debug".to_string()]);
    let graph = TargetGraph::new(&project(vec![pod("A", &[]), pod("Reveal", &[])], vec![app])).unwrap();

    let id = graph.aggregate_id("Pods-App").unwrap();
    assert_eq!(
      graph.pod_targets_for_build_configuration(id, "Debug"),
      vec![PodTargetId(0), PodTargetId(1)]
    );
    assert_eq!(graph.pod_targets_for_build_configuration(id, "Release"), vec![PodTargetId(0)]);
    assert_eq!(
      graph.pod_targets_for_build_configuration(id, "debug"),
      vec![PodTargetId(0), PodTargetId(1)]
    );
  }

  #[test]
  fn test_whitelist_with_undeclared_configuration_is_rejected() {
    let mut app = AggregateTarget::new("Pods-App");
    app.pod_targets = vec!["A".to_string()];
    app
      .pod_target_configurations
      .insert("A".to_string(), vec!["Beta".to_string()]);
    let err = TargetGraph::new(&project(vec![pod("A", &[])], vec![app])).unwrap_err();
    assert!(matches!(err, ProjectError::UnknownConfiguration { .. }));
  }

  #[test]
  fn test_search_paths_aggregate_must_declare_configurations() {
    let mut host = AggregateTarget::new("Pods-App");
    host.build_configurations = vec!["Debug".to_string()];
    let mut tests = AggregateTarget::new("Pods-AppTests");
    tests.search_paths_aggregate_targets = vec!["Pods-App".to_string()];

    let err = TargetGraph::new(&project(vec![], vec![host, tests])).unwrap_err();
    assert!(matches!(
      err,
      ProjectError::MissingConfiguration { ref configuration, .. } if configuration == "Release"
    ));
  }

  #[test]
  fn test_search_paths_cycle_is_rejected() {
    let mut a = AggregateTarget::new("A");
    a.search_paths_aggregate_targets = vec!["B".to_string()];
    let mut b = AggregateTarget::new("B");
    b.search_paths_aggregate_targets = vec!["A".to_string()];

    let err = TargetGraph::new(&project(vec![], vec![a, b])).unwrap_err();
    assert!(matches!(err, ProjectError::SearchPathsCycle(_)));
  }

  #[test]
  fn test_invalid_swift_version_is_rejected() {
    let mut app = AggregateTarget::new("Pods-App");
    app.swift_version = Some("latest".to_string());
    let err = TargetGraph::new(&project(vec![], vec![app])).unwrap_err();
    assert!(matches!(err, ProjectError::InvalidSwiftVersion { .. }));
  }
}
