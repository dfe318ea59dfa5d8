//! Resolver arena: owns every resolver's cache and walks ownership edges on
//! invalidation.
//!
//! Resolvers are addressed by [`ResolverKey`]. Their memo caches are created
//! lazily on first access and live as long as the arena. A resolver that
//! reads another resolver's results owns it: invalidating the owner clears
//! every resolver reachable through ownership edges.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::Serialize;
use tracing::debug;

use super::aggregate::AggregateSettings;
use super::base::BuildSettings;
use super::error::SettingsError;
use super::memo::Memo;
use super::merge::Diagnostic;
use super::pod::PodSettings;
use crate::project::{AggregateTargetId, PodTargetId, Project, ProjectError, TargetGraph, support_files_dir};
use crate::xcconfig::Xcconfig;

/// Stable address of a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolverKey {
  /// A pod target's product (`test == false`) or its test product.
  Pod { target: PodTargetId, test: bool },
  /// An aggregate target in one build configuration.
  Aggregate {
    target: AggregateTargetId,
    configuration: String,
  },
}

/// Outcome of resolving one resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
  /// Human readable resolver name, e.g. `Pods-App (Debug)`.
  pub label: String,
  pub xcconfig: Xcconfig,
  pub diagnostics: Vec<Diagnostic>,
}

pub struct SettingsArena {
  project: Project,
  graph: TargetGraph,
  ownership: DiGraph<ResolverKey, ()>,
  nodes: HashMap<ResolverKey, NodeIndex>,
  memos: RefCell<HashMap<ResolverKey, Rc<Memo>>>,
}

impl SettingsArena {
  /// Validates the project and prepares an empty arena.
  pub fn new(project: Project) -> Result<Self, ProjectError> {
    let graph = TargetGraph::new(&project)?;
    let (ownership, nodes) = ownership_graph(&project, &graph);
    Ok(Self {
      project,
      graph,
      ownership,
      nodes,
      memos: RefCell::new(HashMap::new()),
    })
  }

  pub fn project(&self) -> &Project {
    &self.project
  }

  pub fn graph(&self) -> &TargetGraph {
    &self.graph
  }

  /// Resolver of a pod target's product, or of its test product.
  pub fn pod(&self, name: &str, test: bool) -> Result<PodSettings<'_>, SettingsError> {
    let id = self
      .graph
      .pod_id(name)
      .ok_or_else(|| SettingsError::UnknownPodTarget(name.to_string()))?;
    Ok(self.pod_by_id(id, test))
  }

  /// Resolver of an aggregate target in `configuration`.
  pub fn aggregate(&self, name: &str, configuration: &str) -> Result<AggregateSettings<'_>, SettingsError> {
    let id = self
      .graph
      .aggregate_id(name)
      .ok_or_else(|| SettingsError::UnknownAggregateTarget(name.to_string()))?;
    if !self.project.aggregate_targets[id.0].declares_configuration(configuration) {
      return Err(SettingsError::UnknownConfiguration {
        target: name.to_string(),
        configuration: configuration.to_string(),
      });
    }
    Ok(self.aggregate_by_id(id, configuration))
  }

  pub(crate) fn pod_by_id(&self, id: PodTargetId, test: bool) -> PodSettings<'_> {
    let memo = self.memo_for(&ResolverKey::Pod { target: id, test });
    PodSettings::new(self, id, test, memo)
  }

  pub(crate) fn aggregate_by_id(&self, id: AggregateTargetId, configuration: &str) -> AggregateSettings<'_> {
    let memo = self.memo_for(&ResolverKey::Aggregate {
      target: id,
      configuration: configuration.to_string(),
    });
    AggregateSettings::new(self, id, configuration, memo)
  }

  fn memo_for(&self, key: &ResolverKey) -> Rc<Memo> {
    if let Some(memo) = self.memos.borrow().get(key) {
      return Rc::clone(memo);
    }
    debug!(resolver = %self.label(key), "creating resolver");
    let memo = Rc::new(Memo::new());
    self.memos.borrow_mut().insert(key.clone(), Rc::clone(&memo));
    memo
  }

  /// Every resolver the project defines: each pod target's product, test
  /// products of pods with test specifications, and each aggregate in each
  /// of its configurations.
  pub fn keys(&self) -> Vec<ResolverKey> {
    let mut keys = Vec::new();
    for (index, target) in self.project.pod_targets.iter().enumerate() {
      keys.push(ResolverKey::Pod {
        target: PodTargetId(index),
        test: false,
      });
      if target.has_test_specs() {
        keys.push(ResolverKey::Pod {
          target: PodTargetId(index),
          test: true,
        });
      }
    }
    for (index, target) in self.project.aggregate_targets.iter().enumerate() {
      for configuration in &target.build_configurations {
        keys.push(ResolverKey::Aggregate {
          target: AggregateTargetId(index),
          configuration: configuration.clone(),
        });
      }
    }
    keys
  }

  fn pod_name(&self, id: PodTargetId) -> Result<&str, SettingsError> {
    self
      .project
      .pod_targets
      .get(id.0)
      .map(|target| target.name.as_str())
      .ok_or_else(|| SettingsError::UnknownPodTarget(format!("#{}", id.0)))
  }

  fn aggregate_name(&self, id: AggregateTargetId) -> Result<&str, SettingsError> {
    self
      .project
      .aggregate_targets
      .get(id.0)
      .map(|target| target.name.as_str())
      .ok_or_else(|| SettingsError::UnknownAggregateTarget(format!("#{}", id.0)))
  }

  /// Rejects keys that no longer address a target of the current project.
  fn check_key(&self, key: &ResolverKey) -> Result<(), SettingsError> {
    match key {
      ResolverKey::Pod { target, .. } => self.pod_name(*target).map(|_| ()),
      ResolverKey::Aggregate { target, configuration } => {
        let name = self.aggregate_name(*target)?;
        if self.project.aggregate_targets[target.0].declares_configuration(configuration) {
          Ok(())
        } else {
          Err(SettingsError::UnknownConfiguration {
            target: name.to_string(),
            configuration: configuration.clone(),
          })
        }
      }
    }
  }

  pub fn label(&self, key: &ResolverKey) -> String {
    match key {
      ResolverKey::Pod { target, test } => {
        let name = self.pod_name(*target).unwrap_or("<unknown pod>");
        if *test { format!("{} (tests)", name) } else { name.to_string() }
      }
      ResolverKey::Aggregate { target, configuration } => {
        let name = self.aggregate_name(*target).unwrap_or("<unknown aggregate>");
        format!("{} ({})", name, configuration)
      }
    }
  }

  /// Where the resolver's xcconfig is written, relative to the sandbox root.
  pub fn xcconfig_path(&self, key: &ResolverKey) -> Result<PathBuf, SettingsError> {
    self.check_key(key)?;
    let path = match key {
      ResolverKey::Pod { target, test } => {
        let name = self.pod_name(*target)?;
        let file = if *test {
          format!("{}.unit-tests.xcconfig", name)
        } else {
          format!("{}.xcconfig", name)
        };
        support_files_dir(name).join(file)
      }
      ResolverKey::Aggregate { target, configuration } => {
        let name = self.aggregate_name(*target)?;
        support_files_dir(name).join(format!("{}.{}.xcconfig", name, configuration.to_lowercase()))
      }
    };
    Ok(path)
  }

  /// Computes the xcconfig of a resolver, reusing cached values.
  pub fn resolve(&self, key: &ResolverKey) -> Result<Resolution, SettingsError> {
    self.check_key(key)?;
    let (xcconfig, diagnostics) = match key {
      ResolverKey::Pod { target, test } => {
        let settings = self.pod_by_id(*target, *test);
        (settings.xcconfig()?, settings.diagnostics())
      }
      ResolverKey::Aggregate { target, configuration } => {
        let settings = self.aggregate_by_id(*target, configuration);
        (settings.xcconfig()?, settings.diagnostics())
      }
    };
    Ok(Resolution {
      label: self.label(key),
      xcconfig,
      diagnostics,
    })
  }

  /// Invalidates the resolver and everything it owns, then recomputes it.
  pub fn generate(&self, key: &ResolverKey) -> Result<Resolution, SettingsError> {
    self.invalidate(key);
    self.resolve(key)
  }

  /// Clears the cache of `key` and of every resolver it transitively owns.
  pub fn invalidate(&self, key: &ResolverKey) {
    let Some(&start) = self.nodes.get(key) else {
      return;
    };

    let memos = self.memos.borrow();
    let mut cleared = 0;
    let mut dfs = Dfs::new(&self.ownership, start);
    while let Some(node) = dfs.next(&self.ownership) {
      if let Some(memo) = memos.get(&self.ownership[node]) {
        memo.clear();
        cleared += 1;
      }
    }
    debug!(resolver = %self.label(key), cleared, "invalidated resolver");
  }

  /// Whether the resolver currently holds cached values.
  pub fn is_cached(&self, key: &ResolverKey) -> bool {
    self.memos.borrow().get(key).is_some_and(|memo| !memo.is_empty())
  }

  /// Applies `update` to the project and revalidates it.
  ///
  /// Cached values are kept, so resolvers return stale results until the
  /// affected keys are invalidated. If the update adds, removes or reorders
  /// targets every cache is dropped, since keys address targets by position.
  /// On a validation error the project is left unchanged.
  pub fn update_project(&mut self, update: impl FnOnce(&mut Project)) -> Result<(), ProjectError> {
    let mut project = self.project.clone();
    update(&mut project);
    let graph = TargetGraph::new(&project)?;

    let same_layout = target_names(&project) == target_names(&self.project);
    let (ownership, nodes) = ownership_graph(&project, &graph);
    self.project = project;
    self.graph = graph;
    self.ownership = ownership;
    self.nodes = nodes;
    if !same_layout {
      debug!("target layout changed, dropping every resolver");
      self.memos.borrow_mut().clear();
    }
    Ok(())
  }
}

fn target_names(project: &Project) -> (Vec<&str>, Vec<&str>) {
  (
    project.pod_targets.iter().map(|t| t.name.as_str()).collect(),
    project.aggregate_targets.iter().map(|t| t.name.as_str()).collect(),
  )
}

/// Ownership edges: a pod's product owns its recursive dependencies and its
/// test product; a test product owns every dependency and its product; an
/// aggregate owns its active pods and its search-paths aggregates.
fn ownership_graph(project: &Project, graph: &TargetGraph) -> (DiGraph<ResolverKey, ()>, HashMap<ResolverKey, NodeIndex>) {
  let mut ownership = DiGraph::new();
  let mut nodes = HashMap::new();

  for index in 0..project.pod_targets.len() {
    for test in [false, true] {
      let key = ResolverKey::Pod {
        target: PodTargetId(index),
        test,
      };
      nodes.insert(key.clone(), ownership.add_node(key));
    }
  }
  for (index, target) in project.aggregate_targets.iter().enumerate() {
    for configuration in &target.build_configurations {
      let key = ResolverKey::Aggregate {
        target: AggregateTargetId(index),
        configuration: configuration.clone(),
      };
      nodes.insert(key.clone(), ownership.add_node(key));
    }
  }

  let pod_node = |id: PodTargetId, test: bool| nodes[&ResolverKey::Pod { target: id, test }];
  let mut edges = Vec::new();

  for index in 0..project.pod_targets.len() {
    let id = PodTargetId(index);
    let product = pod_node(id, false);
    let tests = pod_node(id, true);
    edges.push((product, tests));
    edges.push((tests, product));
    for &dep in graph.recursive_dependent_targets(id) {
      edges.push((product, pod_node(dep, false)));
    }
    for &dep in graph.all_dependent_targets(id) {
      edges.push((tests, pod_node(dep, false)));
    }
  }

  for (index, target) in project.aggregate_targets.iter().enumerate() {
    let id = AggregateTargetId(index);
    for configuration in &target.build_configurations {
      let owner = nodes[&ResolverKey::Aggregate {
        target: id,
        configuration: configuration.clone(),
      }];
      for pod in graph.pod_targets_for_build_configuration(id, configuration) {
        edges.push((owner, pod_node(pod, false)));
      }
      for &inherited in graph.search_paths_aggregate_targets(id) {
        let key = ResolverKey::Aggregate {
          target: inherited,
          configuration: configuration.clone(),
        };
        if let Some(&node) = nodes.get(&key) {
          edges.push((owner, node));
        }
      }
    }
  }

  for (from, to) in edges {
    ownership.add_edge(from, to, ());
  }
  (ownership, nodes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::BuildType;
  use crate::util::testutil::{aggregate_target, arena, pod_target, spec, test_spec};

  fn sample() -> SettingsArena {
    let mut banana = pod_target("BananaLib", BuildType::StaticLibrary);
    banana.dependencies = vec!["MonkeyLib".to_string()];
    banana.specs = vec![spec("BananaLib"), test_spec("BananaLib/Tests")];
    let monkey = pod_target("MonkeyLib", BuildType::StaticLibrary);
    arena(
      vec![banana, monkey],
      vec![aggregate_target("Pods-App", &["BananaLib", "MonkeyLib"])],
    )
  }

  fn pod_key(arena: &SettingsArena, name: &str, test: bool) -> ResolverKey {
    ResolverKey::Pod {
      target: arena.graph().pod_id(name).unwrap(),
      test,
    }
  }

  fn aggregate_key(arena: &SettingsArena, name: &str, configuration: &str) -> ResolverKey {
    ResolverKey::Aggregate {
      target: arena.graph().aggregate_id(name).unwrap(),
      configuration: configuration.to_string(),
    }
  }

  #[test]
  fn test_keys_cover_products_tests_and_configurations() {
    let arena = sample();
    let labels: Vec<String> = arena.keys().iter().map(|key| arena.label(key)).collect();
    assert_eq!(
      labels,
      vec![
        "BananaLib",
        "BananaLib (tests)",
        "MonkeyLib",
        "Pods-App (Debug)",
        "Pods-App (Release)"
      ]
    );
  }

  #[test]
  fn test_xcconfig_paths() {
    let arena = sample();
    assert_eq!(
      arena.xcconfig_path(&pod_key(&arena, "BananaLib", true)),
      Ok(PathBuf::from("Target Support Files/BananaLib/BananaLib.unit-tests.xcconfig"))
    );
    assert_eq!(
      arena.xcconfig_path(&aggregate_key(&arena, "Pods-App", "Release")),
      Ok(PathBuf::from("Target Support Files/Pods-App/Pods-App.release.xcconfig"))
    );
  }

  #[test]
  fn test_unknown_names_are_rejected() {
    let arena = sample();
    assert_eq!(
      arena.pod("Nope", false).err(),
      Some(SettingsError::UnknownPodTarget("Nope".to_string()))
    );
    assert!(matches!(
      arena.aggregate("Pods-App", "Profile"),
      Err(SettingsError::UnknownConfiguration { .. })
    ));
  }

  #[test]
  fn test_resolve_is_idempotent() {
    let arena = sample();
    let key = aggregate_key(&arena, "Pods-App", "Debug");
    let first = arena.resolve(&key).unwrap();
    let second = arena.resolve(&key).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.label, "Pods-App (Debug)");
  }

  #[test]
  fn test_generate_matches_cached_resolution() {
    let mut banana = pod_target("BananaLib", BuildType::DynamicFramework);
    banana.dependencies = vec!["MonkeyLib".to_string()];
    banana.specs = vec![spec("BananaLib"), test_spec("BananaLib/Tests")];
    let monkey = pod_target("MonkeyLib", BuildType::StaticLibrary);
    let mut app = aggregate_target("Pods-App", &["BananaLib"]);
    app.requires_frameworks = true;
    let mut tests = aggregate_target("Pods-AppTests", &["BananaLib", "MonkeyLib"]);
    tests.search_paths_aggregate_targets = vec!["Pods-App".to_string()];
    let arena = arena(vec![banana, monkey], vec![app, tests]);

    for key in [
      pod_key(&arena, "BananaLib", false),
      pod_key(&arena, "BananaLib", true),
      aggregate_key(&arena, "Pods-AppTests", "Debug"),
    ] {
      let cached = arena.resolve(&key).unwrap();
      assert_eq!(arena.generate(&key).unwrap(), cached, "{}", cached.label);
    }
  }

  #[test]
  fn test_stale_keys_are_rejected() {
    let mut arena = arena(
      vec![
        pod_target("BananaLib", BuildType::StaticLibrary),
        pod_target("MonkeyLib", BuildType::StaticLibrary),
      ],
      vec![aggregate_target("Pods-App", &["BananaLib"])],
    );
    let monkey = pod_key(&arena, "MonkeyLib", false);
    let release = aggregate_key(&arena, "Pods-App", "Release");
    arena
      .update_project(|project| {
        project.pod_targets.pop();
        project.aggregate_targets[0].build_configurations = vec!["Debug".to_string()];
      })
      .unwrap();

    assert_eq!(
      arena.resolve(&monkey),
      Err(SettingsError::UnknownPodTarget("#1".to_string()))
    );
    assert_eq!(arena.generate(&monkey), Err(SettingsError::UnknownPodTarget("#1".to_string())));
    assert!(arena.xcconfig_path(&monkey).is_err());
    assert_eq!(arena.label(&monkey), "<unknown pod>");
    assert!(matches!(
      arena.resolve(&release),
      Err(SettingsError::UnknownConfiguration { .. })
    ));

    let stale_aggregate = ResolverKey::Aggregate {
      target: AggregateTargetId(3),
      configuration: "Debug".to_string(),
    };
    assert_eq!(
      arena.resolve(&stale_aggregate),
      Err(SettingsError::UnknownAggregateTarget("#3".to_string()))
    );
  }

  #[test]
  fn test_invalidation_follows_ownership() {
    let arena = sample();
    let aggregate = aggregate_key(&arena, "Pods-App", "Debug");
    let banana = pod_key(&arena, "BananaLib", false);
    let monkey = pod_key(&arena, "MonkeyLib", false);
    arena.resolve(&aggregate).unwrap();
    arena.resolve(&banana).unwrap();
    arena.resolve(&monkey).unwrap();

    arena.invalidate(&banana);
    assert!(!arena.is_cached(&banana));
    assert!(!arena.is_cached(&monkey));
    assert!(arena.is_cached(&aggregate));

    arena.invalidate(&aggregate);
    assert!(!arena.is_cached(&aggregate));
  }

  #[test]
  fn test_invalidating_a_dependency_keeps_its_owner() {
    let arena = sample();
    let banana = pod_key(&arena, "BananaLib", false);
    let monkey = pod_key(&arena, "MonkeyLib", false);
    arena.resolve(&banana).unwrap();
    arena.resolve(&monkey).unwrap();

    arena.invalidate(&monkey);
    assert!(arena.is_cached(&banana));
    assert!(!arena.is_cached(&monkey));
  }

  #[test]
  fn test_update_keeps_stale_values_until_generated() {
    let mut arena = sample();
    let key = pod_key(&arena, "BananaLib", true);
    let before = arena.resolve(&key).unwrap();
    assert_eq!(before.xcconfig.get("OTHER_LDFLAGS"), Some("$(inherited) -ObjC -l\"BananaLib\" -l\"MonkeyLib\""));

    arena
      .update_project(|project| project.pod_targets[0].specs[1].consumer.libraries = vec!["z".to_string()])
      .unwrap();
    assert_eq!(arena.resolve(&key).unwrap(), before);

    let after = arena.generate(&key).unwrap();
    assert_eq!(
      after.xcconfig.get("OTHER_LDFLAGS"),
      Some("$(inherited) -ObjC -l\"BananaLib\" -l\"MonkeyLib\" -l\"z\"")
    );
  }

  #[test]
  fn test_layout_change_drops_every_cache() {
    let mut arena = sample();
    let key = pod_key(&arena, "MonkeyLib", false);
    arena.resolve(&key).unwrap();
    arena
      .update_project(|project| project.pod_targets.push(pod_target("OrangeLib", BuildType::StaticLibrary)))
      .unwrap();
    assert!(!arena.is_cached(&key));
  }

  #[test]
  fn test_invalid_update_leaves_project_unchanged() {
    let mut arena = sample();
    let result = arena.update_project(|project| project.pod_targets[1].dependencies = vec!["BananaLib".to_string()]);
    assert!(matches!(result, Err(ProjectError::DependencyCycle(_))));
    assert!(arena.project().pod_targets[1].dependencies.is_empty());
  }
}
