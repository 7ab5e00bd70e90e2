//! # deptree - dependency graph builder and topological orderings
//!
//! Accumulates "depends-on" edges keyed by opaque string identifiers,
//! validates the resulting graph (referential integrity, acyclicity) and
//! answers flattened ordering queries: ascending (dependencies before
//! dependents, e.g. install order) and descending (the reverse, e.g.
//! teardown order). A typed layer lets callers register their own node
//! types and get them back in the computed order.
//!
//! ```
//! use deptree::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_deps("app", ["lib", "config"]);
//! builder.add_deps("lib", ["config"]);
//! builder.force_integrity(); // declares "config" as a leaf
//! let tree = builder.build().unwrap();
//! assert_eq!(tree.list_asc(&["app"]), ["config", "lib", "app"]);
//! assert_eq!(tree.list_desc(&["app"]), ["app", "lib", "config"]);
//! ```

pub mod error;
pub mod graph;
pub mod node;

pub use error::{IntegrityError, Result};
pub use graph::{DepTree, GraphBuilder};
pub use node::{DynNodeGraph, DynNodeGraphBuilder, Node, NodeGraph, NodeGraphBuilder};
