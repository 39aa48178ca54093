//! Leaf-branch and connector pruning.
//!
//! Both pruners only ever remove: nodes for leaf branches, edges for
//! connectors. Degrees are read from the live graph at every step.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::graph::{Graph, NodeId};
use crate::traversal::{connected_components, dfs_edges};

/// Outcome of walking inward from one leaf.
#[derive(Debug, Clone, Default)]
struct BranchWalk {
    visited: HashSet<NodeId>,
    junction: Option<NodeId>,
}

/// FIFO walk from `leaf` through nodes of degree <= 2. The whole walk stops at
/// the first junction popped from the frontier; the junction itself is never
/// added to `visited`.
fn walk_branch(graph: &Graph, leaf: NodeId) -> BranchWalk {
    let mut walk = BranchWalk::default();
    let mut queue: VecDeque<NodeId> = VecDeque::from([leaf]);

    while let Some(node) = queue.pop_front() {
        let neighbors = graph.neighbors(node);
        if neighbors.len() > 2 {
            walk.junction = Some(node);
            break;
        }
        walk.visited.insert(node);
        queue.extend(
            neighbors
                .iter()
                .copied()
                .filter(|nb| !walk.visited.contains(nb)),
        );
    }

    walk
}

/// Remove dead-end branches of at most `min_branch_length` nodes that hang
/// off a junction.
///
/// The leaf set is fixed before any removal and walked in ascending id
/// order; leaves created by a removal are not revisited in the same call.
/// Branches that never reach a junction (leaf-to-leaf paths) are kept.
/// Returns the number of nodes removed.
pub fn prune_short_leaf_branches(graph: &mut Graph, min_branch_length: usize) -> usize {
    let mut removed = 0;

    for leaf in graph.leaves() {
        if !graph.contains(leaf) {
            continue;
        }
        let walk = walk_branch(graph, leaf);
        if let Some(junction) = walk.junction {
            if walk.visited.len() <= min_branch_length {
                debug!(
                    "pruning {}-node branch from leaf {} at junction {}",
                    walk.visited.len(),
                    leaf,
                    junction
                );
                removed += graph.remove_nodes_from(walk.visited);
            }
        }
    }

    removed
}

/// A run of DFS tree edges from one junction to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    /// Directed `(from, to)` edges in DFS order; the first starts at a junction,
    /// the last ends at one.
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Connector {
    /// Length in edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Scan every connected component for junction-to-junction runs.
///
/// Each component is walked depth-first from its smallest leaf. Walking an
/// edge that leaves a junction starts a new run; an edge into a leaf drops
/// the run; an edge into a junction while a run is open completes it.
/// Components without any leaf (pure cycles) are skipped.
pub fn scan_connectors(graph: &Graph) -> Vec<Connector> {
    let mut connectors = Vec::new();

    for component in connected_components(graph) {
        let Some(&start) = component.iter().find(|&&id| graph.degree(id) == 1) else {
            if component.len() > 1 {
                debug!(
                    "skipping {}-node component without leaves (starts at node {})",
                    component.len(),
                    component[0]
                );
            }
            continue;
        };

        let mut tracking = false;
        let mut current: Vec<(NodeId, NodeId)> = Vec::new();

        for (i, j) in dfs_edges(graph, start) {
            if graph.degree(i) > 2 {
                tracking = true;
                current.clear();
                current.push((i, j));
            } else if tracking {
                current.push((i, j));
            }

            let degree_j = graph.degree(j);
            if degree_j == 1 {
                tracking = false;
                current.clear();
            } else if degree_j > 2 && tracking {
                connectors.push(Connector {
                    edges: current.clone(),
                });
            }
        }
    }

    connectors
}

/// Cut junction-to-junction runs shorter than `min_connector_length` edges.
///
/// Marked edges are removed only after the whole scan, so every decision sees
/// the same degrees. Nodes are never removed. Returns the removed edges.
pub fn prune_short_connectors(
    graph: &mut Graph,
    min_connector_length: usize,
) -> Vec<(NodeId, NodeId)> {
    let mut marked: Vec<(NodeId, NodeId)> = Vec::new();
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();

    for connector in scan_connectors(graph) {
        if connector.len() >= min_connector_length {
            continue;
        }
        debug!(
            "cutting {}-edge connector starting at junction {}",
            connector.len(),
            connector.edges[0].0
        );
        for (a, b) in connector.edges {
            if seen.insert((a.min(b), a.max(b))) {
                marked.push((a, b));
            }
        }
    }

    graph.remove_edges_from(marked.iter().copied());
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_chain(n: u64) -> Graph {
        let mut g = Graph::new();
        for i in 0..n - 1 {
            g.add_edge(i, i + 1);
        }
        g
    }

    /// Attach a path of `len` fresh nodes to `anchor`, starting at id `first`.
    fn attach_path(g: &mut Graph, anchor: u64, first: u64, len: u64) {
        let mut prev = anchor;
        for id in first..first + len {
            g.add_edge(prev, id);
            prev = id;
        }
    }

    /// Two junctions joined by a run of `connector` edges, each junction
    /// carrying two long arms.
    fn make_dumbbell(connector: u64) -> Graph {
        let mut g = Graph::new();
        let left = 0;
        let right = connector;
        attach_path(&mut g, left, 1, connector - 1);
        g.add_edge(connector - 1, right);
        attach_path(&mut g, left, 100, 12);
        attach_path(&mut g, left, 200, 12);
        attach_path(&mut g, right, 300, 12);
        attach_path(&mut g, right, 400, 12);
        g
    }

    fn tree_from_parents(parents: &[prop::sample::Index]) -> Graph {
        let mut g = Graph::new();
        g.add_node(0, Default::default());
        for (i, idx) in parents.iter().enumerate() {
            let child = i as u64 + 1;
            let parent = idx.index(i + 1) as u64;
            g.add_edge(parent, child);
        }
        g
    }

    // --- Leaf branch tests ---

    #[test]
    fn test_spur_removed_chain_kept() {
        // spur 0-1 hangs off chain node 7; chain is 2..=13
        let mut g = make_chain(14);
        g.remove_node(0);
        g.remove_node(1);
        g.add_edge(0, 1);
        g.add_edge(1, 7);
        assert_eq!(g.degree(7), 3);

        let removed = prune_short_leaf_branches(&mut g, 5);
        assert_eq!(removed, 2);
        assert_eq!(g.node_count(), 12);
        assert_eq!(g.degree(7), 2);
        assert_eq!(g.leaves(), vec![2, 13]);
    }

    #[test]
    fn test_long_branch_kept() {
        let mut g = make_chain(20);
        attach_path(&mut g, 10, 100, 6);
        let removed = prune_short_leaf_branches(&mut g, 5);
        // arm from 100 has 6 nodes; arms along the chain have 10 and 9
        assert_eq!(removed, 0);
        assert_eq!(g.node_count(), 26);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut g = make_chain(30);
        attach_path(&mut g, 15, 100, 5);
        assert_eq!(prune_short_leaf_branches(&mut g, 5), 5);
        assert!(g.contains(15));
    }

    #[test]
    fn test_path_without_junction_untouched() {
        let mut g = make_chain(4);
        assert_eq!(prune_short_leaf_branches(&mut g, 10), 0);
        assert_eq!(g.node_count(), 4);
    }

    #[test]
    fn test_later_walks_see_live_degrees() {
        // star of three 1-node arms: once arm 1 goes, the centre has degree 2
        // and the walk from 2 runs through it to leaf 3 without a junction
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(0, 3);
        let removed = prune_short_leaf_branches(&mut g, 1);
        assert_eq!(removed, 1);
        assert_eq!(g.sorted_node_ids(), vec![0, 2, 3]);
    }

    #[test]
    fn test_former_junction_absorbed_by_later_walk() {
        // 0 starts as a junction with two 1-node arms and a 2-node run to
        // junction 12; after arm 1 goes, arm 2 reaches 12 through 0
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(0, 10);
        g.add_edge(10, 11);
        g.add_edge(11, 12);
        attach_path(&mut g, 12, 100, 8);
        attach_path(&mut g, 12, 200, 8);

        let removed = prune_short_leaf_branches(&mut g, 5);
        assert_eq!(removed, 5);
        assert!(!g.contains(0));
        assert!(g.contains(12));
        assert_eq!(g.degree(12), 2);
    }

    #[test]
    fn test_junction_never_removed() {
        let mut g = Graph::new();
        for arm in 0..4 {
            attach_path(&mut g, 0, 10 * (arm + 1), 2);
        }
        prune_short_leaf_branches(&mut g, 10);
        assert!(g.contains(0));
    }

    #[test]
    fn test_empty_and_single_node() {
        let mut g = Graph::new();
        assert_eq!(prune_short_leaf_branches(&mut g, 5), 0);
        g.add_node(1, Default::default());
        assert_eq!(prune_short_leaf_branches(&mut g, 5), 0);
        assert_eq!(g.node_count(), 1);
    }

    // --- Connector tests ---

    #[test]
    fn test_connector_at_threshold_kept() {
        let mut g = make_dumbbell(10);
        let removed = prune_short_connectors(&mut g, 10);
        assert!(removed.is_empty());
        assert_eq!(g.edge_count(), g.node_count() - 1);
    }

    #[test]
    fn test_connector_below_threshold_cut() {
        let mut g = make_dumbbell(9);
        let edges_before = g.edge_count();
        let nodes_before = g.node_count();
        let removed = prune_short_connectors(&mut g, 10);
        assert_eq!(removed.len(), 9);
        assert_eq!(g.edge_count(), edges_before - 9);
        assert_eq!(g.node_count(), nodes_before);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(9), 2);
    }

    #[test]
    fn test_leaf_branches_are_not_connectors() {
        let mut g = make_chain(30);
        attach_path(&mut g, 15, 100, 2);
        assert!(scan_connectors(&g).is_empty());
        assert!(prune_short_connectors(&mut g, 100).is_empty());
    }

    #[test]
    fn test_adjacent_junctions_single_edge_connector() {
        let mut g = make_dumbbell(1);
        let connectors = scan_connectors(&g);
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].len(), 1);
        let removed = prune_short_connectors(&mut g, 2);
        assert_eq!(removed.len(), 1);
        assert!(!g.has_edge(0, 1));
    }

    #[test]
    fn test_cycle_component_skipped() {
        let mut g = Graph::new();
        for i in 0..6 {
            g.add_edge(i, (i + 1) % 6);
        }
        g.add_edge(0, 3);
        assert!(scan_connectors(&g).is_empty());
        assert!(prune_short_connectors(&mut g, 10).is_empty());
    }

    #[test]
    fn test_every_component_scanned() {
        let mut g = make_dumbbell(3);
        for (a, b) in make_dumbbell(4).edges() {
            g.add_edge(a + 1000, b + 1000);
        }
        let lengths: Vec<usize> = scan_connectors(&g).iter().map(Connector::len).collect();
        assert_eq!(lengths, vec![3, 4]);
    }

    proptest! {
        #[test]
        fn prop_leaf_pruning_idempotent(
            parents in prop::collection::vec(any::<prop::sample::Index>(), 1..80),
            threshold in 0usize..8,
        ) {
            let mut once = tree_from_parents(&parents);
            prune_short_leaf_branches(&mut once, threshold);
            let mut twice = once.clone();
            prune_short_leaf_branches(&mut twice, threshold);
            prop_assert_eq!(once.sorted_node_ids(), twice.sorted_node_ids());
            prop_assert_eq!(once.edges(), twice.edges());
        }

        #[test]
        fn prop_pruning_monotonic(
            parents in prop::collection::vec(any::<prop::sample::Index>(), 1..80),
            threshold in 0usize..8,
            min_connector in 0usize..8,
        ) {
            let mut g = tree_from_parents(&parents);
            let (nodes, edges) = (g.node_count(), g.edge_count());

            let removed_nodes = prune_short_leaf_branches(&mut g, threshold);
            prop_assert_eq!(g.node_count(), nodes - removed_nodes);
            prop_assert!(g.edge_count() <= edges);

            let (nodes, edges) = (g.node_count(), g.edge_count());
            let removed = prune_short_connectors(&mut g, min_connector);
            prop_assert_eq!(g.node_count(), nodes);
            prop_assert_eq!(g.edge_count(), edges - removed.len());
        }

        #[test]
        fn prop_discovering_junction_survives_its_walk(
            parents in prop::collection::vec(any::<prop::sample::Index>(), 1..80),
        ) {
            let g = tree_from_parents(&parents);
            for leaf in g.leaves() {
                let walk = walk_branch(&g, leaf);
                if let Some(junction) = walk.junction {
                    prop_assert!(g.degree(junction) > 2);
                    prop_assert!(!walk.visited.contains(&junction));
                    prop_assert!(walk.visited.iter().all(|&n| g.degree(n) <= 2));
                }
            }
        }
    }
}
