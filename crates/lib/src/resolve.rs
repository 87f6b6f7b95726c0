//! Reducing a [`SourceRef`] to the plain name used for classification.
//!
//! References arrive in three shapes: a bare name, a grouping whose first
//! element carries the name, and a JSON-serialized grouping embedded in a
//! string. Resolution unwraps all three to one name so suffix checks never
//! special-case the representation.

use thiserror::Error;

use crate::types::SourceRef;

/// Nesting bound for group unwrapping. Groups in practice are one or two
/// levels deep; the bound turns a malformed self-referential configuration
/// into an error instead of unbounded recursion.
const MAX_GROUP_DEPTH: usize = 32;

/// Errors raised while resolving a source reference to a name.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// A group with no elements has no name to resolve.
  #[error("cannot resolve an empty source group")]
  EmptyGroup,

  /// A string beginning with `[` was not a valid serialized group.
  #[error("malformed group literal {text:?}")]
  MalformedGroup {
    text: String,
    #[source]
    source: serde_json::Error,
  },

  /// Group nesting exceeded the supported depth.
  #[error("source group nested deeper than {} levels", MAX_GROUP_DEPTH)]
  GroupTooDeep,
}

/// Resolve a reference to the single plain name used for classification.
///
/// Only the first element of a group is ever examined.
pub fn source_name(src: &SourceRef) -> Result<String, ResolveError> {
  name_at(src, 0)
}

fn name_at(src: &SourceRef, depth: usize) -> Result<String, ResolveError> {
  if depth >= MAX_GROUP_DEPTH {
    return Err(ResolveError::GroupTooDeep);
  }

  match src {
    SourceRef::Group(items) => {
      let first = items.first().ok_or(ResolveError::EmptyGroup)?;
      name_at(first, depth + 1)
    }
    SourceRef::Name(text) if text.starts_with('[') => {
      let group: SourceRef =
        serde_json::from_str(text).map_err(|source| ResolveError::MalformedGroup {
          text: text.clone(),
          source,
        })?;
      name_at(&group, depth + 1)
    }
    SourceRef::Name(name) => Ok(name.clone()),
  }
}
