//! An in-memory build graph implementing the host-engine extension points.
//!
//! The real host owns scheduling, staleness, and execution; this graph
//! only records declared commands and answers ordering queries. It is the
//! reference [`BuildEngine`] used by the tests and by small embedders that
//! drive the routing layer directly.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::engine::BuildEngine;
use crate::env::Environment;
use crate::resolve::source_name;
use crate::types::{BuildError, SourceRef};

/// A command declared against a target: the literal action line plus the
/// resolved source names, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub action: String,
  pub sources: Vec<String>,
}

/// One artifact node: an input file or a declared command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  pub name: String,
  /// The command producing this artifact; `None` for plain inputs.
  pub command: Option<CommandSpec>,
}

/// Build graph recording declared commands and their dependencies.
#[derive(Default)]
pub struct BuildGraph {
  graph: DiGraph<Artifact, ()>,
  index: HashMap<String, NodeIndex>,
}

impl BuildGraph {
  pub fn new() -> Self {
    Self::default()
  }

  fn intern(&mut self, name: &str) -> NodeIndex {
    if let Some(&idx) = self.index.get(name) {
      return idx;
    }
    let idx = self.graph.add_node(Artifact {
      name: name.to_string(),
      command: None,
    });
    self.index.insert(name.to_string(), idx);
    idx
  }

  /// The command declared for `target`, if any.
  pub fn command_of(&self, target: &str) -> Option<&CommandSpec> {
    let idx = *self.index.get(target)?;
    self.graph[idx].command.as_ref()
  }

  /// The action line declared for `target`, if any.
  pub fn action_of(&self, target: &str) -> Option<&str> {
    self.command_of(target).map(|spec| spec.action.as_str())
  }

  /// The declared source names of `target`, in declaration order.
  pub fn sources_of(&self, target: &str) -> Option<&[String]> {
    self.command_of(target).map(|spec| spec.sources.as_slice())
  }

  /// Number of declared commands.
  pub fn command_count(&self) -> usize {
    self
      .graph
      .node_weights()
      .filter(|artifact| artifact.command.is_some())
      .count()
  }

  /// Targets with declared commands, in an order where every command's
  /// sources come before the command itself.
  pub fn schedule(&self) -> Result<Vec<String>, BuildError> {
    let sorted = toposort(&self.graph, None).map_err(|_| BuildError::CycleDetected)?;
    Ok(
      sorted
        .into_iter()
        .filter(|&idx| self.graph[idx].command.is_some())
        .map(|idx| self.graph[idx].name.clone())
        .collect(),
    )
  }
}

impl BuildEngine for BuildGraph {
  fn command(
    &mut self,
    _env: &Environment,
    target: &str,
    sources: Vec<SourceRef>,
    action: &str,
  ) -> Result<SourceRef, BuildError> {
    let mut names = Vec::with_capacity(sources.len());
    for source in &sources {
      names.push(source_name(source)?);
    }
    let spec = CommandSpec {
      action: action.to_string(),
      sources: names.clone(),
    };

    let target_idx = self.intern(target);
    match &self.graph[target_idx].command {
      // Re-declaring the identical command is a no-op; build scripts are
      // expected to be re-entrant.
      Some(existing) if *existing == spec => return Ok(SourceRef::Name(target.to_string())),
      Some(_) => {
        return Err(BuildError::DuplicateTarget {
          target: target.to_string(),
        });
      }
      None => {}
    }

    debug!(target = %target, action = %action, "declared command");
    self.graph[target_idx].command = Some(spec);
    for name in &names {
      let source_idx = self.intern(name);
      self.graph.add_edge(source_idx, target_idx, ());
    }

    Ok(SourceRef::Name(target.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn env() -> Environment {
    Environment::default()
  }

  #[test]
  fn declared_command_is_queryable() {
    let mut graph = BuildGraph::new();

    let node = graph
      .command(&env(), "out.o", vec!["in.c".into()], "cc -c -o $TARGET $SOURCES")
      .unwrap();

    assert_eq!(node, SourceRef::from("out.o"));
    assert_eq!(graph.action_of("out.o").unwrap(), "cc -c -o $TARGET $SOURCES");
    assert_eq!(graph.sources_of("out.o").unwrap(), ["in.c"]);
    assert_eq!(graph.command_count(), 1);
  }

  #[test]
  fn identical_redeclaration_is_a_no_op() {
    let mut graph = BuildGraph::new();
    let e = env();

    graph
      .command(&e, "out.o", vec!["in.c".into()], "cc -c -o $TARGET $SOURCES")
      .unwrap();
    graph
      .command(&e, "out.o", vec!["in.c".into()], "cc -c -o $TARGET $SOURCES")
      .unwrap();

    assert_eq!(graph.command_count(), 1);
  }

  #[test]
  fn conflicting_redeclaration_is_rejected() {
    let mut graph = BuildGraph::new();
    let e = env();

    graph
      .command(&e, "out.o", vec!["in.c".into()], "cc -c -o $TARGET $SOURCES")
      .unwrap();
    let err = graph
      .command(&e, "out.o", vec!["in.c".into()], "clang -c -o $TARGET $SOURCES")
      .unwrap_err();

    assert!(matches!(err, BuildError::DuplicateTarget { .. }));
  }

  #[test]
  fn schedule_orders_sources_before_targets() {
    let mut graph = BuildGraph::new();
    let e = env();

    // Declared back to front on purpose.
    graph
      .command(&e, "app", vec!["app.o".into()], "cc -o $TARGET $SOURCES")
      .unwrap();
    graph
      .command(&e, "app.o", vec!["app.bc".into()], "llc -o $TARGET $SOURCES")
      .unwrap();
    graph
      .command(
        &e,
        "app.bc",
        vec!["a.o.bc".into(), "b.o.bc".into()],
        "llvm-link -o $TARGET $SOURCES",
      )
      .unwrap();

    let schedule = graph.schedule().unwrap();
    let pos = |name: &str| schedule.iter().position(|n| n == name).unwrap();

    assert!(pos("app.bc") < pos("app.o"));
    assert!(pos("app.o") < pos("app"));
  }

  #[test]
  fn cyclic_declarations_are_detected() {
    let mut graph = BuildGraph::new();
    let e = env();

    graph
      .command(&e, "a", vec!["b".into()], "gen -o $TARGET $SOURCES")
      .unwrap();
    graph
      .command(&e, "b", vec!["a".into()], "gen -o $TARGET $SOURCES")
      .unwrap();

    assert!(matches!(graph.schedule(), Err(BuildError::CycleDetected)));
  }

  #[test]
  fn grouped_sources_are_recorded_by_name() {
    let mut graph = BuildGraph::new();

    let node = graph
      .command(
        &env(),
        "lib.bc",
        vec![SourceRef::Group(vec!["a.o.bc".into()])],
        "llvm-link -o $TARGET $SOURCES",
      )
      .unwrap();

    assert_eq!(node, SourceRef::from("lib.bc"));
    assert_eq!(graph.sources_of("lib.bc").unwrap(), ["a.o.bc"]);
  }
}
