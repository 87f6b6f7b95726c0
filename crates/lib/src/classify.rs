//! Partitioning build inputs by what the IR pipeline must do with them.

use tracing::debug;

use crate::consts::IR_SUFFIX;
use crate::resolve::{ResolveError, source_name};
use crate::types::SourceRef;

/// The three-way split of one build action's inputs.
///
/// Order within each bucket preserves input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
  /// Uncompiled sources, matched by the recognized source suffixes.
  pub sources: Vec<SourceRef>,
  /// Already-compiled IR objects and modules.
  pub ir_objects: Vec<SourceRef>,
  /// Everything else: native objects and opaque prebuilt inputs.
  pub native_objects: Vec<SourceRef>,
}

impl Buckets {
  /// True when there is nothing for the IR pipeline to compile or merge.
  pub fn nothing_to_compile(&self) -> bool {
    self.sources.is_empty() && self.ir_objects.is_empty()
  }
}

/// True when `name` carries one of the recognized source suffixes.
pub fn is_source_name(name: &str, source_suffixes: &[String]) -> bool {
  source_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// True when `name` is an IR object or module.
pub fn is_ir_name(name: &str) -> bool {
  name.ends_with(IR_SUFFIX)
}

/// Partition `inputs` into sources, IR objects, and native objects.
pub fn classify(inputs: &[SourceRef], source_suffixes: &[String]) -> Result<Buckets, ResolveError> {
  let mut buckets = Buckets::default();

  for input in inputs {
    let name = source_name(input)?;
    if is_source_name(&name, source_suffixes) {
      buckets.sources.push(input.clone());
    } else if is_ir_name(&name) {
      buckets.ir_objects.push(input.clone());
    } else {
      buckets.native_objects.push(input.clone());
    }
  }

  debug!(
    sources = buckets.sources.len(),
    ir_objects = buckets.ir_objects.len(),
    native_objects = buckets.native_objects.len(),
    "classified build inputs"
  );

  Ok(buckets)
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  fn suffixes() -> Vec<String> {
    vec![".c".into(), ".cc".into(), ".cpp".into(), ".cxx".into()]
  }

  #[test]
  fn mixed_inputs_partition_in_order() {
    let inputs: Vec<SourceRef> = ["main.cpp", "pre.o", "runtime.bc", "util.cc", "ffi.o"]
      .into_iter()
      .map(SourceRef::from)
      .collect();

    let buckets = classify(&inputs, &suffixes()).unwrap();

    assert_eq!(
      buckets.sources,
      vec![SourceRef::from("main.cpp"), SourceRef::from("util.cc")]
    );
    assert_eq!(buckets.ir_objects, vec![SourceRef::from("runtime.bc")]);
    assert_eq!(
      buckets.native_objects,
      vec![SourceRef::from("pre.o"), SourceRef::from("ffi.o")]
    );
  }

  #[test]
  fn grouped_inputs_classify_by_resolved_name() {
    let inputs = vec![
      SourceRef::Group(vec!["gen.cpp".into()]),
      SourceRef::from(r#"["merged.bc"]"#),
    ];

    let buckets = classify(&inputs, &suffixes()).unwrap();

    assert_eq!(buckets.sources.len(), 1);
    assert_eq!(buckets.ir_objects.len(), 1);
    assert!(buckets.native_objects.is_empty());
  }

  #[test]
  fn unknown_suffixes_fall_through_to_native() {
    let inputs = vec![SourceRef::from("libfoo.a"), SourceRef::from("data.txt")];

    let buckets = classify(&inputs, &suffixes()).unwrap();

    assert!(buckets.nothing_to_compile());
    assert_eq!(buckets.native_objects.len(), 2);
  }

  #[test]
  fn resolve_failure_propagates() {
    let inputs = vec![SourceRef::Group(Vec::new())];
    assert!(classify(&inputs, &suffixes()).is_err());
  }

  proptest! {
    #[test]
    fn partition_is_stable_and_complete(
      stems in proptest::collection::vec("[a-z]{1,6}", 1..12),
      picks in proptest::collection::vec(0usize..3, 1..12),
    ) {
      let ext = [".cpp", ".bc", ".o"];
      let inputs: Vec<SourceRef> = stems
        .iter()
        .zip(&picks)
        .map(|(stem, &pick)| SourceRef::Name(format!("{stem}{}", ext[pick])))
        .collect();

      let buckets = classify(&inputs, &suffixes()).unwrap();

      let total = buckets.sources.len() + buckets.ir_objects.len() + buckets.native_objects.len();
      prop_assert_eq!(total, inputs.len());

      // Each bucket is the order-preserving subsequence of its kind.
      let by_suffix = |suffix: &str| -> Vec<SourceRef> {
        inputs
          .iter()
          .filter(|input| source_name(input).unwrap().ends_with(suffix))
          .cloned()
          .collect()
      };
      prop_assert_eq!(&buckets.sources, &by_suffix(".cpp"));
      prop_assert_eq!(&buckets.ir_objects, &by_suffix(".bc"));
      prop_assert_eq!(&buckets.native_objects, &by_suffix(".o"));
    }
  }
}
