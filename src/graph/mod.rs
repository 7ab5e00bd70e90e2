//! Graph engine: identifier-keyed edge accumulation, validation and
//! topological ordering queries.

pub mod builder;
pub mod tree;

pub use builder::GraphBuilder;
pub use tree::DepTree;
