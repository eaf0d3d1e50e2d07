use log::{debug, trace};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use crate::types::Component;

static NO_EDGES: BTreeSet<PathBuf> = BTreeSet::new();

/// Forward and reverse dependency maps for one analysis run.
///
/// `reverse[b]` contains `a` exactly when `forward[a]` contains `b`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    forward: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    reverse: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
}

impl DependencyGraph {
    /// Single pass over every component's resolved imports.
    ///
    /// Edges to files outside the component set are dropped.
    pub fn build(components: &[Component]) -> Self {
        let known: BTreeSet<&Path> = components.iter().map(|c| c.path.as_path()).collect();
        let mut graph = Self::default();

        for component in components {
            graph.forward.entry(component.path.clone()).or_default();
            graph.reverse.entry(component.path.clone()).or_default();
            for target in &component.imports {
                if !known.contains(target.as_path()) {
                    trace!("Dropping edge to non-component {}", target.display());
                    continue;
                }
                graph.add_edge(&component.path, target);
            }
        }

        debug!("Built dependency graph: {} nodes, {} edges", graph.node_count(), graph.edge_count());
        graph
    }

    pub fn add_edge(&mut self, from: &Path, to: &Path) {
        self.forward.entry(from.to_path_buf()).or_default().insert(to.to_path_buf());
        self.reverse.entry(to.to_path_buf()).or_default().insert(from.to_path_buf());
    }

    /// Files `path` depends on.
    pub fn dependencies(&self, path: &Path) -> &BTreeSet<PathBuf> {
        self.forward.get(path).unwrap_or(&NO_EDGES)
    }

    /// Files depending on `path`.
    pub fn dependents(&self, path: &Path) -> &BTreeSet<PathBuf> {
        self.reverse.get(path).unwrap_or(&NO_EDGES)
    }

    pub fn fan_out(&self, path: &Path) -> usize {
        self.dependencies(path).len()
    }

    pub fn fan_in(&self, path: &Path) -> usize {
        self.dependents(path).len()
    }

    pub fn node_count(&self) -> usize {
        self.forward.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Whether the reverse map is the exact inverse of the forward map.
    pub fn is_symmetric(&self) -> bool {
        let forward_ok = self
            .forward
            .iter()
            .all(|(from, tos)| tos.iter().all(|to| self.dependents(to).contains(from)));
        let reverse_ok = self
            .reverse
            .iter()
            .all(|(to, froms)| froms.iter().all(|from| self.dependencies(from).contains(to)));
        forward_ok && reverse_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn component(path: &str, imports: &[&str]) -> Component {
        Component {
            path: PathBuf::from(path),
            relative: path.trim_start_matches('/').to_string(),
            imports: imports.iter().map(PathBuf::from).collect(),
            exported_symbols: 0,
            responsibilities: BTreeSet::new(),
            lines: 1,
            layer: None,
        }
    }

    fn paths(items: &[&str]) -> BTreeSet<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_simple_cycle() {
        let graph = DependencyGraph::build(&[component("/a", &["/b"]), component("/b", &["/a"])]);
        assert_eq!(graph.dependencies(Path::new("/a")), &paths(&["/b"]));
        assert_eq!(graph.dependencies(Path::new("/b")), &paths(&["/a"]));
        assert_eq!(graph.dependents(Path::new("/a")), &paths(&["/b"]));
        assert_eq!(graph.dependents(Path::new("/b")), &paths(&["/a"]));
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_symmetry_on_fan_shape() {
        let graph = DependencyGraph::build(&[
            component("/hub", &["/a", "/b", "/c"]),
            component("/a", &["/c"]),
            component("/b", &["/c"]),
            component("/c", &[]),
        ]);
        assert!(graph.is_symmetric());
        assert_eq!(graph.fan_out(Path::new("/hub")), 3);
        assert_eq!(graph.fan_in(Path::new("/c")), 3);
        assert_eq!(graph.fan_in(Path::new("/hub")), 0);
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.node_count(), 4);

        for (from, tos) in &graph.forward {
            for to in tos {
                assert!(graph.dependents(to).contains(from));
            }
        }
        for (to, froms) in &graph.reverse {
            for from in froms {
                assert!(graph.dependencies(from).contains(to));
            }
        }
    }

    #[test]
    fn test_self_import_is_kept() {
        let graph = DependencyGraph::build(&[component("/a", &["/a"])]);
        assert_eq!(graph.fan_out(Path::new("/a")), 1);
        assert_eq!(graph.fan_in(Path::new("/a")), 1);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_duplicate_edges_count_once() {
        let mut graph = DependencyGraph::default();
        graph.add_edge(Path::new("/a"), Path::new("/b"));
        graph.add_edge(Path::new("/a"), Path::new("/b"));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.fan_in(Path::new("/b")), 1);
    }

    #[test]
    fn test_edges_to_unknown_files_are_dropped() {
        let graph = DependencyGraph::build(&[component("/a", &["/b", "/outside"]), component("/b", &[])]);
        assert_eq!(graph.dependencies(Path::new("/a")), &paths(&["/b"]));
        assert_eq!(graph.fan_in(Path::new("/outside")), 0);
    }

    #[test]
    fn test_isolated_node_has_no_edges() {
        let graph = DependencyGraph::build(&[component("/lonely", &[])]);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.dependencies(Path::new("/lonely")).is_empty());
        assert!(graph.dependents(Path::new("/lonely")).is_empty());
    }

    #[test]
    fn test_asymmetric_graph_is_detected() {
        let mut graph = DependencyGraph::default();
        graph.forward.entry(PathBuf::from("/a")).or_default().insert(PathBuf::from("/b"));
        assert!(!graph.is_symmetric());
    }
}
