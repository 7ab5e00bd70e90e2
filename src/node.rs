use crate::error::Result;
use crate::graph::{DepTree, GraphBuilder};
use std::collections::HashMap;
use std::rc::Rc;

/// Capability for application types that participate in a dependency graph.
///
/// A node knows its own identifier and the identifiers of the nodes it
/// depends on; everything else about the type is opaque to this crate.
pub trait Node {
    /// Identifier this node is registered under. Uniqueness is by equality.
    fn node_id(&self) -> &str;

    /// Identifiers of the nodes this node depends on, in order.
    fn dep_ids(&self) -> Vec<String>;
}

impl<N: Node + ?Sized> Node for Box<N> {
    fn node_id(&self) -> &str {
        (**self).node_id()
    }

    fn dep_ids(&self) -> Vec<String> {
        (**self).dep_ids()
    }
}

impl<N: Node + ?Sized> Node for Rc<N> {
    fn node_id(&self) -> &str {
        (**self).node_id()
    }

    fn dep_ids(&self) -> Vec<String> {
        (**self).dep_ids()
    }
}

/// Builder over typed nodes instead of raw identifiers.
///
/// Thin layer over [`GraphBuilder`]: each added node contributes its
/// identifier and dependency edges, and the node value itself is kept so
/// ordering queries on the built graph can hand it back.
#[derive(Debug, Clone)]
pub struct NodeGraphBuilder<N> {
    nodes: HashMap<String, N>,
    builder: GraphBuilder,
}

impl<N: Node> NodeGraphBuilder<N> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            builder: GraphBuilder::new(),
        }
    }

    /// Registers `node` under its own identifier.
    ///
    /// The first registration wins for the node value; a repeat insert for
    /// the same identifier is ignored, though its dependency edges are
    /// still merged into the underlying builder.
    pub fn add_node(&mut self, node: N) {
        let id = node.node_id().to_string();
        self.builder.add_deps(id.clone(), node.dep_ids());
        self.nodes.entry(id).or_insert(node);
    }

    /// See [`GraphBuilder::force_integrity`]. Leaves synthesized here have
    /// no registered node value and surface as `None` in query results.
    pub fn force_integrity(&mut self) {
        self.builder.force_integrity();
    }
}

impl<N: Node + Clone> NodeGraphBuilder<N> {
    /// Validates and returns a typed graph. Errors are exactly those of
    /// [`GraphBuilder::build`]; the builder stays usable afterwards.
    pub fn build(&self) -> Result<NodeGraph<N>> {
        let tree = self.builder.build()?;
        Ok(NodeGraph {
            nodes: self.nodes.clone(),
            tree,
        })
    }
}

impl<N: Node> Default for NodeGraphBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated dependency graph that answers ordering queries with the
/// originally registered typed nodes.
#[derive(Debug, Clone)]
pub struct NodeGraph<N> {
    nodes: HashMap<String, N>,
    tree: DepTree,
}

impl<N: Node> NodeGraph<N> {
    /// Ascending order (dependencies first) over typed roots.
    ///
    /// `None` marks an identifier with no registered node value, which can
    /// only come from [`NodeGraphBuilder::force_integrity`].
    pub fn list_asc(&self, tops: &[N]) -> Vec<Option<&N>> {
        self.list_asc_ids(&ids_of(tops))
    }

    /// Ascending order over raw identifier roots.
    pub fn list_asc_ids<S: AsRef<str>>(&self, tops: &[S]) -> Vec<Option<&N>> {
        self.resolve(self.tree.list_asc(tops))
    }

    /// Descending order (dependents first) over typed roots.
    pub fn list_desc(&self, tops: &[N]) -> Vec<Option<&N>> {
        self.list_desc_ids(&ids_of(tops))
    }

    /// Descending order over raw identifier roots.
    pub fn list_desc_ids<S: AsRef<str>>(&self, tops: &[S]) -> Vec<Option<&N>> {
        self.resolve(self.tree.list_desc(tops))
    }

    /// The underlying identifier-keyed tree.
    pub fn tree(&self) -> &DepTree {
        &self.tree
    }

    /// The node registered under `id`, if any.
    pub fn node(&self, id: &str) -> Option<&N> {
        self.nodes.get(id)
    }

    fn resolve(&self, ids: Vec<String>) -> Vec<Option<&N>> {
        ids.iter().map(|id| self.nodes.get(id)).collect()
    }
}

fn ids_of<N: Node>(nodes: &[N]) -> Vec<String> {
    nodes.iter().map(|n| n.node_id().to_string()).collect()
}

/// Type-erased builder for mixing node types behind one trait object.
/// Same algorithms as the generic builder; only the node type differs.
pub type DynNodeGraphBuilder = NodeGraphBuilder<Rc<dyn Node>>;

/// Graph built by [`DynNodeGraphBuilder`].
pub type DynNodeGraph = NodeGraph<Rc<dyn Node>>;
