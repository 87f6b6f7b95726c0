//! Core data model for build inputs and the registration error taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolve::ResolveError;

/// A handle to one build input.
///
/// Inputs arrive either as a plain file or library name, or as an ordered
/// grouping of further references (the host engine hands builder results
/// around as one-element groups). The serialized wire form of a group is a
/// JSON array, so `Name` values beginning with `[` are parsed back into a
/// `Group` during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
  /// A plain file, target, or library name.
  Name(String),
  /// An ordered grouping of references.
  Group(Vec<SourceRef>),
}

impl From<&str> for SourceRef {
  fn from(name: &str) -> Self {
    SourceRef::Name(name.to_string())
  }
}

impl From<String> for SourceRef {
  fn from(name: String) -> Self {
    SourceRef::Name(name)
  }
}

impl fmt::Display for SourceRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceRef::Name(name) => f.write_str(name),
      SourceRef::Group(items) => {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
    }
  }
}

/// Errors raised while registering build steps.
///
/// External tool failures are not represented here: they surface when the
/// host runs the declared commands and are the host's to report.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A source reference could not be reduced to a name.
  #[error(transparent)]
  Resolve(#[from] ResolveError),

  /// A builder that names its output was called without a target.
  #[error("{action} action requires an explicit target name")]
  MissingTarget { action: &'static str },

  /// The same target was declared twice with different commands.
  #[error("target {target} already declared with a different action")]
  DuplicateTarget { target: String },

  /// The declared commands form a dependency cycle.
  #[error("dependency cycle detected")]
  CycleDetected,
}
