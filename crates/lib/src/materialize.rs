//! Turning mixed build inputs into a flat native-object list.
//!
//! Raw sources and IR objects of one link unit are merged into a single IR
//! module, the module is lowered to one native object, and prebuilt native
//! objects pass through untouched.

use std::path::Path;

use tracing::debug;

use crate::classify::{classify, is_ir_name};
use crate::consts::{IR_SUFFIX, LLC};
use crate::engine::{BuildEngine, render_line};
use crate::env::Environment;
use crate::resolve::source_name;
use crate::types::{BuildError, SourceRef};

/// Merge and lower the compilable inputs of `unit`, returning the object
/// list ready for conventional linking: untouched native objects first,
/// then the one newly lowered object.
///
/// IR-format entries of the environment's library list join the merge;
/// `lower_flags` are passed to the code generator verbatim. When nothing
/// needs compiling or merging the input objects are returned unchanged.
pub fn materialize(
  engine: &mut dyn BuildEngine,
  env: &mut Environment,
  unit: &SourceRef,
  sources: Vec<SourceRef>,
  lower_flags: &[&str],
) -> Result<Vec<SourceRef>, BuildError> {
  let unit_name = source_name(unit)?;

  let buckets = classify(&sources, &env.source_suffixes)?;
  if buckets.nothing_to_compile() {
    return Ok(buckets.native_objects);
  }

  // IR-format libraries belong in the merge, not on the native link line.
  let mut ir_libs = Vec::new();
  for lib in &env.libs {
    if is_ir_name(&source_name(lib)?) {
      ir_libs.push(lib.clone());
    }
  }

  // A lone source gets its stem folded into the unit name so neighbouring
  // single-file units cannot collide on derived artifact names.
  let derived = if let [only] = buckets.sources.as_slice() {
    let name = source_name(only)?;
    let stem = Path::new(&name)
      .file_stem()
      .and_then(|stem| stem.to_str())
      .unwrap_or(name.as_str());
    format!("{unit_name}.from.{stem}")
  } else {
    unit_name.clone()
  };

  let mut merge_inputs = buckets.sources;
  merge_inputs.extend(buckets.ir_objects);
  merge_inputs.extend(ir_libs);

  let merged_name = format!("{derived}{IR_SUFFIX}");
  debug!(unit = %unit_name, merged = %merged_name, "merging IR for link unit");
  let merged_target = SourceRef::Name(merged_name);
  let merged = env.static_lib(engine, Some(&merged_target), merge_inputs)?;

  let lowered_name = format!("{derived}{}", env.object_suffix);
  let action = render_line(
    [LLC, "-filetype=obj"]
      .into_iter()
      .chain(lower_flags.iter().copied())
      .chain(["-o", "$TARGET", "$SOURCES"]),
  );
  let lowered = engine.command(env, &lowered_name, merged, &action)?;

  let mut objects = buckets.native_objects;
  objects.push(lowered);
  Ok(objects)
}
