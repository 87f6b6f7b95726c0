//! Routing the four standard build actions through the IR pipeline.
//!
//! Once installed on an environment, compiles emit IR objects, static
//! libraries become merged IR modules, and shared libraries and programs
//! link native objects lowered from one merged module per link unit.

use std::sync::Arc;

use tracing::{debug, info};

use crate::builder::{Builder, Hooked};
use crate::classify::{is_ir_name, is_source_name};
use crate::consts::{IR_SUFFIX, LLVM_LINK, PIC_FLAG, PROGRAM_LINK_FLAGS, RUNTIME_SUPPORT_LIB};
use crate::engine::{BuildEngine, render_line};
use crate::env::{EmitIrScope, Environment};
use crate::materialize::materialize;
use crate::resolve::source_name;
use crate::types::{BuildError, SourceRef};

/// Wrap the environment's builder slots with the IR routing handlers.
///
/// Installing twice is a no-op: the first installation marks the
/// environment and later calls leave the wrapped slots untouched. Clones
/// made after installation keep the routed slots.
pub fn install(env: &mut Environment) {
  if env.ir_routed {
    debug!("IR routing already installed");
    return;
  }

  let slots = &mut env.builders;
  slots.object = Arc::new(Hooked::new(Arc::clone(&slots.object), route_object));
  slots.static_lib = Arc::new(Hooked::new(Arc::clone(&slots.static_lib), route_library));
  slots.shared_lib = Arc::new(Hooked::new(Arc::clone(&slots.shared_lib), route_shared_lib));
  slots.program = Arc::new(Hooked::new(Arc::clone(&slots.program), route_program));
  env.ir_routed = true;

  info!("routing object, library, shared-library and program builders through IR");
}

/// Compile to an IR object instead of a native one.
fn route_object(
  original: &Arc<dyn Builder>,
  engine: &mut dyn BuildEngine,
  env: &mut Environment,
  target: Option<&SourceRef>,
  sources: Vec<SourceRef>,
) -> Result<Vec<SourceRef>, BuildError> {
  let mut scope = EmitIrScope::enter(env);
  original.build(engine, scope.env(), target, sources)
}

/// Build a static library as one merged IR module.
///
/// Raw sources are compiled individually first, through the routed object
/// action, then everything is merged with the IR linker. The original
/// archive action is never invoked; it is kept only for its metadata.
fn route_library(
  _original: &Arc<dyn Builder>,
  engine: &mut dyn BuildEngine,
  env: &mut Environment,
  target: Option<&SourceRef>,
  sources: Vec<SourceRef>,
) -> Result<Vec<SourceRef>, BuildError> {
  let mut merge_inputs = Vec::with_capacity(sources.len());
  for source in sources {
    let name = source_name(&source)?;
    if is_source_name(&name, &env.source_suffixes) {
      let objects = env.object(engine, None, vec![source])?;
      merge_inputs.extend(objects);
    } else {
      merge_inputs.push(source);
    }
  }

  let target_name = match target {
    // An explicit string name is taken verbatim.
    Some(SourceRef::Name(name)) => name.clone(),
    Some(group) => format!("{}{}{IR_SUFFIX}", source_name(group)?, env.lib_suffix),
    None => return Err(BuildError::MissingTarget { action: "library" }),
  };

  debug!(target = %target_name, "building static library as merged IR");
  let action = render_line([LLVM_LINK, "-o", "$TARGET", "$SOURCES"]);
  let merged = engine.command(env, &target_name, merge_inputs, &action)?;
  Ok(vec![merged])
}

/// Link a shared library from the objects lowered out of one merged
/// module, with position-independent code generation.
fn route_shared_lib(
  original: &Arc<dyn Builder>,
  engine: &mut dyn BuildEngine,
  env: &mut Environment,
  target: Option<&SourceRef>,
  sources: Vec<SourceRef>,
) -> Result<Vec<SourceRef>, BuildError> {
  let target = target.ok_or(BuildError::MissingTarget {
    action: "shared library",
  })?;
  let objects = materialize(engine, env, target, sources, &[PIC_FLAG])?;
  original.build(engine, env, Some(target), objects)
}

/// Link an executable from the objects lowered out of one merged module.
///
/// IR-format libraries were folded into the merge by the materializer and
/// must not reach the native linker a second time, so the link runs on a
/// clone with those entries stripped; the caller's environment is never
/// mutated.
fn route_program(
  original: &Arc<dyn Builder>,
  engine: &mut dyn BuildEngine,
  env: &mut Environment,
  target: Option<&SourceRef>,
  sources: Vec<SourceRef>,
) -> Result<Vec<SourceRef>, BuildError> {
  let target = target.ok_or(BuildError::MissingTarget { action: "program" })?;
  let objects = materialize(engine, env, target, sources, &[])?;

  let mut link_env = env.clone();
  let mut kept = Vec::with_capacity(link_env.libs.len());
  for lib in std::mem::take(&mut link_env.libs) {
    if !is_ir_name(&source_name(&lib)?) {
      kept.push(lib);
    }
  }
  link_env.libs = kept;
  for flag in PROGRAM_LINK_FLAGS {
    link_env.link_flags.push(flag.to_string());
  }
  link_env.libs.push(SourceRef::from(RUNTIME_SUPPORT_LIB));

  original.build(engine, &mut link_env, Some(target), objects)
}
