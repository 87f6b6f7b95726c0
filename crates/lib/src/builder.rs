//! Build-action builders and the proxy that lets a replacement stand in
//! for an original builder.
//!
//! The stock builders mirror the host engine's native compile, archive,
//! and link actions: each call registers one or more external commands
//! with the engine and returns the declared outputs. [`Hooked`] is the
//! wrapper the interceptor installs over them.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::consts::{AR, CC, SHLIB_SUFFIX};
use crate::engine::{BuildEngine, render_line};
use crate::env::Environment;
use crate::resolve::source_name;
use crate::types::{BuildError, SourceRef};

/// A build action: called with an optional target and a source list, it
/// registers derived steps with the engine and returns the artifacts the
/// call produced.
///
/// Beyond the call itself the host machinery inspects builder metadata,
/// so wrappers must forward the metadata methods to what they wrap.
pub trait Builder {
  /// Register build steps producing `target` from `sources`.
  ///
  /// When `target` is `None` the builder derives output names from the
  /// sources by its own suffix convention.
  fn build(
    &self,
    engine: &mut dyn BuildEngine,
    env: &mut Environment,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError>;

  /// Output suffix convention, for builders that have a static one.
  fn suffix(&self) -> Option<&str> {
    None
  }

  /// Short name of the underlying action.
  fn action_name(&self) -> &'static str;
}

/// Replacement call signature used by [`Hooked`]. The wrapped original is
/// passed first so a replacement can still delegate to it.
pub type BuildFn = fn(
  &Arc<dyn Builder>,
  &mut dyn BuildEngine,
  &mut Environment,
  Option<&SourceRef>,
  Vec<SourceRef>,
) -> Result<Vec<SourceRef>, BuildError>;

/// A stand-in builder that redirects calls to a replacement while keeping
/// the original's metadata surface reachable.
pub struct Hooked {
  original: Arc<dyn Builder>,
  replacement: BuildFn,
}

impl Hooked {
  pub fn new(original: Arc<dyn Builder>, replacement: BuildFn) -> Self {
    Self { original, replacement }
  }
}

impl Builder for Hooked {
  fn build(
    &self,
    engine: &mut dyn BuildEngine,
    env: &mut Environment,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    (self.replacement)(&self.original, engine, env, target, sources)
  }

  fn suffix(&self) -> Option<&str> {
    self.original.suffix()
  }

  fn action_name(&self) -> &'static str {
    self.original.action_name()
  }
}

/// The four build-action slots of an environment.
#[derive(Clone)]
pub struct BuilderSlots {
  pub object: Arc<dyn Builder>,
  pub static_lib: Arc<dyn Builder>,
  pub shared_lib: Arc<dyn Builder>,
  pub program: Arc<dyn Builder>,
}

impl BuilderSlots {
  /// Stock native builders: compile, archive, shared link, program link.
  pub fn native() -> Self {
    Self {
      object: Arc::new(ObjectBuilder),
      static_lib: Arc::new(ArchiveBuilder),
      shared_lib: Arc::new(SharedLibBuilder),
      program: Arc::new(ProgramBuilder),
    }
  }
}

/// Replace the extension of `name` with `suffix`, keeping any directory
/// part.
fn swap_suffix(name: &str, suffix: &str) -> String {
  let path = Path::new(name);
  match path.extension() {
    Some(_) => format!("{}{}", path.with_extension("").display(), suffix),
    None => format!("{name}{suffix}"),
  }
}

fn compile_line(env: &Environment) -> String {
  render_line(
    [CC, "-c"]
      .into_iter()
      .map(str::to_string)
      .chain(env.cc_flags.iter().cloned())
      .chain(["-o", "$TARGET", "$SOURCES"].into_iter().map(str::to_string)),
  )
}

/// Link command line: driver, mode flags, then link flags and libraries
/// from the environment.
fn link_line(env: &Environment, mode_flags: &[&str]) -> Result<String, BuildError> {
  let mut parts: Vec<String> = vec![CC.to_string()];
  parts.extend(mode_flags.iter().map(|flag| flag.to_string()));
  parts.extend(["-o", "$TARGET", "$SOURCES"].into_iter().map(str::to_string));
  parts.extend(env.link_flags.iter().cloned());
  for lib in &env.libs {
    parts.push(format!("-l{}", source_name(lib)?));
  }
  Ok(render_line(parts))
}

/// Compile action: one object per source, or all sources into one
/// explicitly named object.
pub struct ObjectBuilder;

impl Builder for ObjectBuilder {
  fn build(
    &self,
    engine: &mut dyn BuildEngine,
    env: &mut Environment,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let action = compile_line(env);

    if let Some(target) = target {
      let target = source_name(target)?;
      let object = engine.command(env, &target, sources, &action)?;
      return Ok(vec![object]);
    }

    let mut objects = Vec::with_capacity(sources.len());
    for source in sources {
      let target = swap_suffix(&source_name(&source)?, &env.object_suffix);
      objects.push(engine.command(env, &target, vec![source], &action)?);
    }
    Ok(objects)
  }

  fn action_name(&self) -> &'static str {
    "compile"
  }
}

/// Archive action for static libraries.
pub struct ArchiveBuilder;

impl Builder for ArchiveBuilder {
  fn build(
    &self,
    engine: &mut dyn BuildEngine,
    env: &mut Environment,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let target = match target {
      Some(target) => source_name(target)?,
      None => {
        let first = sources
          .first()
          .ok_or(BuildError::MissingTarget { action: "archive" })?;
        swap_suffix(&source_name(first)?, &env.lib_suffix)
      }
    };

    let action = render_line([AR, "rcs", "$TARGET", "$SOURCES"]);
    let archive = engine.command(env, &target, sources, &action)?;
    Ok(vec![archive])
  }

  fn action_name(&self) -> &'static str {
    "archive"
  }
}

/// Shared-library link action.
pub struct SharedLibBuilder;

impl Builder for SharedLibBuilder {
  fn build(
    &self,
    engine: &mut dyn BuildEngine,
    env: &mut Environment,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let target = match target {
      Some(target) => source_name(target)?,
      None => {
        let first = sources
          .first()
          .ok_or(BuildError::MissingTarget { action: "shared library" })?;
        swap_suffix(&source_name(first)?, SHLIB_SUFFIX)
      }
    };

    let action = link_line(env, &["-shared"])?;
    let library = engine.command(env, &target, sources, &action)?;
    Ok(vec![library])
  }

  fn suffix(&self) -> Option<&str> {
    Some(SHLIB_SUFFIX)
  }

  fn action_name(&self) -> &'static str {
    "shared-link"
  }
}

/// Executable link action.
pub struct ProgramBuilder;

impl Builder for ProgramBuilder {
  fn build(
    &self,
    engine: &mut dyn BuildEngine,
    env: &mut Environment,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let target = target.ok_or(BuildError::MissingTarget { action: "program" })?;
    let target = source_name(target)?;

    let action = link_line(env, &[])?;
    debug!(target = %target, "linking program");
    let program = engine.command(env, &target, sources, &action)?;
    Ok(vec![program])
  }

  fn action_name(&self) -> &'static str {
    "link"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::BuildGraph;

  #[test]
  fn object_builder_derives_one_target_per_source() {
    let mut engine = BuildGraph::new();
    let mut env = Environment::default();

    let objects = env
      .object(&mut engine, None, vec!["src/a.cpp".into(), "b.cpp".into()])
      .unwrap();

    assert_eq!(objects, vec![SourceRef::from("src/a.o"), SourceRef::from("b.o")]);
    assert!(engine.action_of("src/a.o").unwrap().starts_with("cc -c"));
  }

  #[test]
  fn object_builder_honors_an_explicit_target() {
    let mut engine = BuildGraph::new();
    let mut env = Environment::default();
    let target = SourceRef::from("special.o");

    let objects = env
      .object(&mut engine, Some(&target), vec!["a.cpp".into(), "b.cpp".into()])
      .unwrap();

    assert_eq!(objects, vec![SourceRef::from("special.o")]);
    assert_eq!(engine.sources_of("special.o").unwrap(), ["a.cpp", "b.cpp"]);
  }

  #[test]
  fn archive_builder_derives_target_from_first_source() {
    let mut engine = BuildGraph::new();
    let mut env = Environment::default();

    let out = env
      .static_lib(&mut engine, None, vec!["util.o".into(), "extra.o".into()])
      .unwrap();

    assert_eq!(out, vec![SourceRef::from("util.a")]);
    assert!(engine.action_of("util.a").unwrap().starts_with("ar rcs"));
  }

  #[test]
  fn program_builder_includes_link_flags_and_libs() {
    let mut engine = BuildGraph::new();
    let mut env = Environment::default();
    env.link_flags.push("-static".to_string());
    env.libs.push("m".into());
    let target = SourceRef::from("tool");

    env.program(&mut engine, Some(&target), vec!["a.o".into()]).unwrap();

    let action = engine.action_of("tool").unwrap();
    assert!(action.contains("-static"));
    assert!(action.contains("-lm"));
  }

  #[test]
  fn program_builder_requires_a_target() {
    let mut engine = BuildGraph::new();
    let mut env = Environment::default();

    let err = env.program(&mut engine, None, vec!["a.o".into()]).unwrap_err();
    assert!(matches!(err, BuildError::MissingTarget { .. }));
  }

  #[test]
  fn hooked_redirects_calls_and_forwards_metadata() {
    fn reroute(
      _original: &Arc<dyn Builder>,
      _engine: &mut dyn BuildEngine,
      _env: &mut Environment,
      _target: Option<&SourceRef>,
      _sources: Vec<SourceRef>,
    ) -> Result<Vec<SourceRef>, BuildError> {
      Ok(vec![SourceRef::from("rerouted")])
    }

    let hooked = Hooked::new(Arc::new(SharedLibBuilder), reroute);
    assert_eq!(hooked.action_name(), "shared-link");
    assert_eq!(hooked.suffix(), Some(SHLIB_SUFFIX));

    let mut engine = BuildGraph::new();
    let mut env = Environment::default();
    let out = hooked.build(&mut engine, &mut env, None, Vec::new()).unwrap();

    assert_eq!(out, vec![SourceRef::from("rerouted")]);
    assert_eq!(engine.command_count(), 0);
  }

  #[test]
  fn swap_suffix_keeps_directories() {
    assert_eq!(swap_suffix("src/a.cpp", ".o"), "src/a.o");
    assert_eq!(swap_suffix("plain", ".o"), "plain.o");
  }
}
