//! The extension points this layer consumes from the host build engine.

use crate::env::Environment;
use crate::types::{BuildError, SourceRef};

/// Host-engine surface for declaring derived build steps.
///
/// An implementation registers a future command invocation as a graph node
/// and returns a handle to the declared output; scheduling, staleness, and
/// execution stay with the host. `$TARGET` and `$SOURCES` placeholders in
/// `action` are substituted by the host when the command runs.
pub trait BuildEngine {
  /// Declare an external command producing `target` from `sources`.
  fn command(
    &mut self,
    env: &Environment,
    target: &str,
    sources: Vec<SourceRef>,
    action: &str,
  ) -> Result<SourceRef, BuildError>;
}

/// Join command-line parts with single spaces, skipping empty parts.
pub fn render_line<I, S>(parts: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut line = String::new();
  for part in parts {
    let part = part.as_ref();
    if part.is_empty() {
      continue;
    }
    if !line.is_empty() {
      line.push(' ');
    }
    line.push_str(part);
  }
  line
}
