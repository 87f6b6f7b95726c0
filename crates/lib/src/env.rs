//! The build environment: mutable configuration carried across one build
//! invocation.
//!
//! The environment is owned by the host engine; the routing layer reads it
//! and only mutates scoped slices of it (see [`EmitIrScope`]) or an
//! explicit [`Clone`].

use std::sync::Arc;

use crate::builder::{Builder, BuilderSlots};
use crate::consts::{EMIT_IR_FLAG, IR_SUFFIX};
use crate::engine::BuildEngine;
use crate::types::{BuildError, SourceRef};

/// Mutable configuration shared by all build actions of one invocation.
#[derive(Clone)]
pub struct Environment {
  /// Suffix for native object files.
  pub object_suffix: String,
  /// Suffix for static libraries.
  pub lib_suffix: String,
  /// Suffixes recognized as uncompiled sources.
  pub source_suffixes: Vec<String>,
  /// Flags passed to the compile action.
  pub cc_flags: Vec<String>,
  /// Flags passed to the link actions.
  pub link_flags: Vec<String>,
  /// Declared library dependencies.
  pub libs: Vec<SourceRef>,
  /// The four build-action slots the host dispatches through.
  pub builders: BuilderSlots,
  /// Set once the IR routing layer has wrapped the builder slots.
  pub(crate) ir_routed: bool,
}

impl Default for Environment {
  fn default() -> Self {
    Self {
      object_suffix: ".o".to_string(),
      lib_suffix: ".a".to_string(),
      source_suffixes: [".c", ".cc", ".cpp", ".cxx"]
        .into_iter()
        .map(str::to_string)
        .collect(),
      cc_flags: Vec::new(),
      link_flags: Vec::new(),
      libs: Vec::new(),
      builders: BuilderSlots::native(),
      ir_routed: false,
    }
  }
}

impl Environment {
  /// Invoke the object (compile) builder slot.
  pub fn object(
    &mut self,
    engine: &mut dyn BuildEngine,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let builder = Arc::clone(&self.builders.object);
    builder.build(engine, self, target, sources)
  }

  /// Invoke the static-library builder slot.
  pub fn static_lib(
    &mut self,
    engine: &mut dyn BuildEngine,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let builder = Arc::clone(&self.builders.static_lib);
    builder.build(engine, self, target, sources)
  }

  /// Invoke the shared-library builder slot.
  pub fn shared_lib(
    &mut self,
    engine: &mut dyn BuildEngine,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let builder = Arc::clone(&self.builders.shared_lib);
    builder.build(engine, self, target, sources)
  }

  /// Invoke the program (executable) builder slot.
  pub fn program(
    &mut self,
    engine: &mut dyn BuildEngine,
    target: Option<&SourceRef>,
    sources: Vec<SourceRef>,
  ) -> Result<Vec<SourceRef>, BuildError> {
    let builder = Arc::clone(&self.builders.program);
    builder.build(engine, self, target, sources)
  }
}

/// Scoped switch of the compile action into IR-emission mode.
///
/// While alive, the object suffix gains the IR suffix and the IR emission
/// flag is appended to the compile flags. Both are restored when the
/// scope drops, on success and on error alike. The native part of the
/// suffix is kept so scripts that set their own object suffix do not
/// produce colliding outputs.
pub struct EmitIrScope<'a> {
  env: &'a mut Environment,
  saved_suffix: String,
}

impl<'a> EmitIrScope<'a> {
  /// Enter IR-emission mode on `env`.
  pub fn enter(env: &'a mut Environment) -> Self {
    let saved_suffix = env.object_suffix.clone();
    env.object_suffix = format!("{saved_suffix}{IR_SUFFIX}");
    env.cc_flags.push(EMIT_IR_FLAG.to_string());
    Self { env, saved_suffix }
  }

  /// The environment with the scoped overrides applied.
  pub fn env(&mut self) -> &mut Environment {
    self.env
  }
}

impl Drop for EmitIrScope<'_> {
  fn drop(&mut self) {
    self.env.object_suffix = std::mem::take(&mut self.saved_suffix);
    if let Some(pos) = self.env.cc_flags.iter().rposition(|flag| flag == EMIT_IR_FLAG) {
      self.env.cc_flags.remove(pos);
    }
  }
}
