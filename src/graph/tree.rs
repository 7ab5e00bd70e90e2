use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Immutable, validated dependency mapping with topological ordering queries.
///
/// Produced by [`GraphBuilder::build`](crate::GraphBuilder::build). Queries
/// never mutate and never fail, so a tree can be shared freely between
/// readers.
///
/// `DepTree` serializes but deliberately does not deserialize: a mapping
/// coming back from the outside must pass through
/// [`GraphBuilder`](crate::GraphBuilder) so it is re-validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepTree {
    deps: HashMap<String, Vec<String>>,
}

impl DepTree {
    pub(crate) fn new(deps: HashMap<String, Vec<String>>) -> Self {
        Self { deps }
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Whether `id` is a node of the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.deps.contains_key(id)
    }

    /// Lists `tops` and all of their transitive dependencies, dependencies
    /// before dependents.
    ///
    /// Roots are merged left to right into one consistent order; an
    /// identifier shared between roots appears once, positioned by the
    /// dependency-deepest point at which it was reached. Roots not present
    /// in the graph contribute nothing.
    pub fn list_asc<S: AsRef<str>>(&self, tops: &[S]) -> Vec<String> {
        let mut result = Vec::new();
        for top in tops {
            let mut raw = dedup_keep_last(result);
            self.collect_raw(top.as_ref(), &mut raw);
            result = dedup_keep_last(raw);
        }
        result
    }

    /// Dependents before dependencies: the exact element-wise reverse of
    /// [`DepTree::list_asc`] for the same roots.
    pub fn list_desc<S: AsRef<str>>(&self, tops: &[S]) -> Vec<String> {
        let mut result = self.list_asc(tops);
        result.reverse();
        result
    }

    /// Pre-order traversal: the node itself, then the full un-deduplicated
    /// traversal of each dependency in declared order. Recursion depth is
    /// bounded by the longest dependency chain; the mapping is acyclic by
    /// construction.
    fn collect_raw(&self, top: &str, out: &mut Vec<String>) {
        let Some(deps) = self.deps.get(top) else {
            return;
        };
        out.push(top.to_string());
        for dep in deps {
            self.collect_raw(dep, out);
        }
    }
}

/// Keeps only the last occurrence of each identifier by scanning from the
/// end; survivors come out in reverse of their position in `list`. Applied
/// to a raw pre-order list this surfaces leaf-most identifiers first.
fn dedup_keep_last(list: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(list.len());
    let mut result = Vec::with_capacity(list.len());
    for id in list.into_iter().rev() {
        if seen.insert(id.clone()) {
            result.push(id);
        }
    }
    result
}
