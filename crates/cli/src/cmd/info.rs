use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde_json::json;

use crate::output::{OutputFormat, print_json};

/// One indented `name: summary` row under a section heading.
fn print_row(name: &str, summary: &str) {
  println!("  {}: {}", name.if_supports_color(Stream::Stdout, |n| n.bold()), summary);
}

pub fn cmd_info(path: &Path, format: OutputFormat) -> Result<()> {
  let arena = super::load_arena(path)?;
  let project = arena.project();
  let graph = arena.graph();

  if format.is_json() {
    let pods: Vec<_> = project
      .pod_targets
      .iter()
      .map(|target| {
        let id = graph.pod_id(&target.name);
        json!({
          "name": target.name,
          "build_type": target.build_type,
          "platform": target.platform,
          "dependencies": id.map_or(0, |id| graph.recursive_dependent_targets(id).len()),
          "test_specs": target.has_test_specs(),
        })
      })
      .collect();
    let aggregates: Vec<_> = project
      .aggregate_targets
      .iter()
      .map(|target| {
        json!({
          "name": target.name,
          "platform": target.platform,
          "requires_frameworks": target.requires_frameworks,
          "build_configurations": target.build_configurations,
          "pod_targets": target.pod_targets,
        })
      })
      .collect();
    return print_json(&json!({ "pod_targets": pods, "aggregate_targets": aggregates }));
  }

  println!("Pod targets: {}", project.pod_targets.len());
  for target in &project.pod_targets {
    let closure = graph
      .pod_id(&target.name)
      .map_or(0, |id| graph.recursive_dependent_targets(id).len());
    print_row(
      &target.name,
      &format!(
        "{} ({}), {} dependencies",
        target.build_type.as_str(),
        target.platform.display_name(),
        closure
      ),
    );
  }

  println!("Aggregate targets: {}", project.aggregate_targets.len());
  for target in &project.aggregate_targets {
    print_row(
      &target.name,
      &format!(
        "{} pod(s), configurations: {}",
        target.pod_targets.len(),
        target.build_configurations.join(", ")
      ),
    );
  }
  Ok(())
}
