//! bclink-lib: IR routing layer for build-engine actions
//!
//! This crate teaches a host build engine to funnel ordinary compiles
//! through an intermediate-representation pipeline: sources compile to IR
//! objects, the IR objects of one link unit merge into a single module,
//! and the module is lowered to native code only at the final link. The
//! host keeps scheduling, staleness, and execution; this layer only
//! rewrites which derived steps get declared.
//!
//! The pieces:
//! - [`types::SourceRef`]: build-input handles and how they resolve to names
//! - [`classify`]: the three-way source / IR-object / native-object split
//! - [`materialize`]: merging and lowering one link unit's inputs
//! - [`intercept`]: wrapping the four builder slots of an [`env::Environment`]
//! - [`graph::BuildGraph`]: in-memory reference engine for tests and embedding
//!
//! # Example
//!
//! ```
//! use bclink_lib::env::Environment;
//! use bclink_lib::graph::BuildGraph;
//! use bclink_lib::intercept;
//! use bclink_lib::types::SourceRef;
//!
//! let mut engine = BuildGraph::new();
//! let mut env = Environment::default();
//! intercept::install(&mut env);
//!
//! let target = SourceRef::from("app");
//! let sources = vec![SourceRef::from("a.cpp"), SourceRef::from("b.cpp")];
//! env.program(&mut engine, Some(&target), sources).unwrap();
//!
//! assert!(engine.action_of("app.bc").unwrap().starts_with("llvm-link"));
//! assert!(engine.action_of("app.o").unwrap().starts_with("llc"));
//! ```

pub mod builder;
pub mod classify;
pub mod consts;
pub mod engine;
pub mod env;
pub mod graph;
pub mod intercept;
pub mod materialize;
pub mod resolve;
pub mod types;
