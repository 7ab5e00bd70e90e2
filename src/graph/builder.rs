use crate::error::{IntegrityError, Result};
use crate::graph::tree::DepTree;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Accumulates "depends-on" edges keyed by opaque string identifiers.
///
/// Edges may reference identifiers that have not been declared yet;
/// referential integrity is only enforced by [`GraphBuilder::build`].
/// The builder stays usable after a build: add more edges and build again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphBuilder {
    deps: HashMap<String, Vec<String>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `node` with no dependencies.
    pub fn add(&mut self, node: impl Into<String>) {
        self.deps.entry(node.into()).or_default();
    }

    /// Declares `node` and appends `deps` to its dependency list, in order.
    ///
    /// Repeated calls for the same node concatenate; duplicates within a
    /// list are not rejected here. Dependency order matters for the
    /// ordering queries on the built tree, not for validity.
    pub fn add_deps<I>(&mut self, node: impl Into<String>, deps: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let entry = self.deps.entry(node.into()).or_default();
        entry.extend(deps.into_iter().map(Into::into));
    }

    /// Declares an empty entry for every dependency identifier that is not
    /// itself a declared node. Idempotent; has no effect on cycle status.
    ///
    /// Call this before [`GraphBuilder::build`] when leaf nodes are
    /// intentionally omitted.
    pub fn force_integrity(&mut self) {
        let missing: Vec<String> = self
            .deps
            .values()
            .flatten()
            .filter(|dep| !self.deps.contains_key(dep.as_str()))
            .cloned()
            .collect();
        for id in missing {
            trace!(id = %id, "synthesizing leaf node");
            self.deps.entry(id).or_default();
        }
    }

    /// Validates the accumulated mapping and returns an immutable [`DepTree`].
    ///
    /// Fails if a dependency identifier was never declared as a node, or if
    /// any dependency chain returns to its starting node. On success the
    /// tree holds its own copy of the mapping; further mutation of the
    /// builder does not affect it.
    pub fn build(&self) -> Result<DepTree> {
        self.integrity_check()?;
        self.cycle_check()?;
        debug!(nodes = self.deps.len(), "dependency graph validated");
        Ok(DepTree::new(self.deps.clone()))
    }

    // Sorted iteration keeps the reported identifier stable across runs.
    fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.deps.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn integrity_check(&self) -> Result<()> {
        for node in self.sorted_keys() {
            for dep in &self.deps[node] {
                if !self.deps.contains_key(dep.as_str()) {
                    debug!(node, dep = %dep, "missing dependency");
                    return Err(IntegrityError::MissingDependency(dep.clone()));
                }
            }
        }
        Ok(())
    }

    fn cycle_check(&self) -> Result<()> {
        for root in self.sorted_keys() {
            if let Some(chain) = self.trace_cycle(root) {
                debug!(root, "cycle detected");
                return Err(IntegrityError::Cycle { chain });
            }
        }
        Ok(())
    }

    /// Depth-first trace over every dependency branch of `root`, carrying
    /// the path so far on an explicit stack. Returns the chain from `root`
    /// to the node whose edge closes the cycle, if any edge leads back to
    /// `root`.
    fn trace_cycle(&self, root: &str) -> Option<Vec<String>> {
        // Each frame is (node, index of the next dependency to visit).
        let mut frames: Vec<(&str, usize)> = vec![(root, 0)];
        let mut path: Vec<&str> = vec![root];
        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            let Some(deps) = self.deps.get(node) else {
                // Undeclared identifiers act as leaves here; integrity_check
                // rejects them before this runs.
                frames.pop();
                path.pop();
                continue;
            };
            if frame.1 >= deps.len() {
                frames.pop();
                path.pop();
                continue;
            }
            let dep = deps[frame.1].as_str();
            frame.1 += 1;
            if dep == root {
                return Some(path.iter().map(|id| id.to_string()).collect());
            }
            // A node already on the current path is not re-entered; any
            // cycle through it is found when the trace is rooted there.
            if path.contains(&dep) {
                continue;
            }
            frames.push((dep, 0));
            path.push(dep);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deps_to_empty_builder() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b", "c"]);
        builder.add("b");
        builder.add("c");
        let tree = builder.build().unwrap();
        assert_eq!(tree.len(), 3);
        assert!(tree.contains("a"));
    }

    #[test]
    fn test_add_deps_concatenates() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b", "c"]);
        builder.add_deps("a", ["d", "e"]);
        builder.force_integrity();
        let tree = builder.build().unwrap();
        // All four dependencies survive, in declared order.
        assert_eq!(tree.list_desc(&["a"]), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_build_empty() {
        let tree = GraphBuilder::new().build().unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_build_missing_dependency() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b"]);
        let err = builder.build().unwrap_err();
        assert_eq!(err, IntegrityError::MissingDependency("b".to_string()));
        assert!(err.to_string().contains("\"b\""));
    }

    #[test]
    fn test_force_integrity_fixes_missing_dependency() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b"]);
        builder.force_integrity();
        let tree = builder.build().unwrap();
        assert_eq!(tree.list_asc(&["a"]), ["b", "a"]);
    }

    #[test]
    fn test_force_integrity_idempotent() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b", "c"]);
        builder.force_integrity();
        builder.force_integrity();
        let tree = builder.build().unwrap();
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_build_with_cycle() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b", "c"]);
        builder.add("b");
        builder.add_deps("c", ["d"]);
        builder.add_deps("d", ["a"]);
        let err = builder.build().unwrap_err();
        // Roots are checked in sorted order, so the chain starts at "a" and
        // the non-cycle branch "b" is not part of it.
        assert_eq!(
            err,
            IntegrityError::Cycle {
                chain: vec!["a".to_string(), "c".to_string(), "d".to_string()],
            }
        );
    }

    #[test]
    fn test_build_with_self_dependency() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["a"]);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            IntegrityError::Cycle {
                chain: vec!["a".to_string()],
            }
        );
    }

    #[test]
    fn test_cycle_found_from_outside_node() {
        // "x" reaches the cycle but is not on it; the trace rooted at "x"
        // must terminate and the one rooted at a cycle member must fail.
        let mut builder = GraphBuilder::new();
        builder.add_deps("x", ["p"]);
        builder.add_deps("p", ["q"]);
        builder.add_deps("q", ["p"]);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            IntegrityError::Cycle {
                chain: vec!["p".to_string(), "q".to_string()],
            }
        );
    }

    #[test]
    fn test_cycle_detected_on_every_branch() {
        // The cycle sits on the second dependency branch of "a".
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b", "c"]);
        builder.add("b");
        builder.add_deps("c", ["a"]);
        let err = builder.build().unwrap_err();
        assert!(err.chain().is_some());
    }

    #[test]
    fn test_shared_dependency_is_not_a_cycle() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b", "c"]);
        builder.add_deps("b", ["d"]);
        builder.add_deps("c", ["d"]);
        builder.add("d");
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_builder_usable_after_build() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b"]);
        builder.add("b");
        let tree = builder.build().unwrap();

        builder.add_deps("b", ["c"]);
        builder.add("c");
        let bigger = builder.build().unwrap();

        // The first tree is a copy and does not see the new edge.
        assert_eq!(tree.list_asc(&["a"]), ["b", "a"]);
        assert_eq!(bigger.list_asc(&["a"]), ["c", "b", "a"]);
    }

    #[test]
    fn test_rebuild_after_fixing_missing_node() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b"]);
        assert!(builder.build().is_err());
        builder.add("b");
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut builder = GraphBuilder::new();
        builder.add_deps("a", ["b", "c"]);
        builder.force_integrity();
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first.list_asc(&["a"]), second.list_asc(&["a"]));
    }
}
