//! Crossover detection.
//!
//! A genuine branch point has at most three branch tips nearby. A junction
//! with more tips inside its search radius is treated as two structures
//! fused together, and a neighbourhood around it is marked for excision.

use std::collections::HashSet;

use log::debug;

use crate::graph::{Graph, NodeId};
use crate::traversal::dfs_tree;

/// Most branch tips a single-structure junction may show within the radius.
pub const MAX_JUNCTION_BRANCHES: usize = 3;

/// A flagged junction and the neighbourhood chosen to excise it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossover {
    pub junction: NodeId,
    /// Tree leaves within the full search depth.
    pub leaf_count: usize,
    /// Smallest radius reproducing `leaf_count`, or the full depth.
    pub radius: u32,
    /// Nodes of the depth-limited tree at `radius`, in discovery order.
    pub excision: Vec<NodeId>,
}

/// Every crossover in the graph, one per flagged junction, in ascending
/// junction order. Read-only.
pub fn find_crossovers(graph: &Graph, depth: u32) -> Vec<Crossover> {
    let mut crossovers = Vec::new();

    for junction in graph.junctions() {
        let full = dfs_tree(graph, junction, depth);
        let leaf_count = full.leaf_count();
        if leaf_count <= MAX_JUNCTION_BRANCHES {
            continue;
        }

        let (radius, tree) = (1..depth)
            .map(|d| (d, dfs_tree(graph, junction, d)))
            .find(|(_, tree)| tree.leaf_count() == leaf_count)
            .unwrap_or((depth, full));

        debug!(
            "crossover at junction {}: {} tips, excising {} nodes at radius {}",
            junction,
            leaf_count,
            tree.len(),
            radius
        );
        crossovers.push(Crossover {
            junction,
            leaf_count,
            radius,
            excision: tree.into_nodes(),
        });
    }

    crossovers
}

/// Union of the excision sets of every crossover in the graph.
pub fn detect_crossovers(graph: &Graph, depth: u32) -> HashSet<NodeId> {
    find_crossovers(graph, depth)
        .into_iter()
        .flat_map(|c| c.excision)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// `arms` paths of `len` nodes each, meeting at node 0.
    fn make_star(arms: u64, len: u64) -> Graph {
        let mut g = Graph::new();
        for arm in 0..arms {
            let mut prev = 0;
            for step in 1..=len {
                let id = arm * 100 + step;
                g.add_edge(prev, id);
                prev = id;
            }
        }
        g
    }

    fn tree_from_parents(parents: &[prop::sample::Index]) -> Graph {
        let mut g = Graph::new();
        g.add_node(0, Default::default());
        for (i, idx) in parents.iter().enumerate() {
            g.add_edge(idx.index(i + 1) as u64, i as u64 + 1);
        }
        g
    }

    #[test]
    fn test_three_tips_not_flagged() {
        let g = make_star(3, 4);
        assert!(find_crossovers(&g, 10).is_empty());
        assert!(detect_crossovers(&g, 10).is_empty());
    }

    #[test]
    fn test_four_tips_flagged() {
        let g = make_star(4, 4);
        let crossovers = find_crossovers(&g, 10);
        assert_eq!(crossovers.len(), 1);
        assert_eq!(crossovers[0].junction, 0);
        assert_eq!(crossovers[0].leaf_count, 4);
    }

    #[test]
    fn test_star_excises_immediate_ring() {
        let g = make_star(5, 4);
        let crossovers = find_crossovers(&g, 10);
        assert_eq!(crossovers.len(), 1);
        assert_eq!(crossovers[0].radius, 1);

        let excised = detect_crossovers(&g, 10);
        let expected: HashSet<NodeId> = [0, 1, 101, 201, 301, 401].into_iter().collect();
        assert_eq!(excised, expected);
    }

    #[test]
    fn test_falls_back_to_full_depth() {
        // junction 0 with three arms; one arm forks into two at distance 2,
        // so four tips only show up at the full radius of 3
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.add_edge(0, 10);
        g.add_edge(10, 11);
        g.add_edge(11, 12);
        g.add_edge(0, 20);
        g.add_edge(20, 21);
        g.add_edge(21, 22);
        g.add_edge(21, 23);
        g.add_edge(22, 24);
        g.add_edge(23, 25);

        let crossovers = find_crossovers(&g, 3);
        let at_root: Vec<&Crossover> = crossovers.iter().filter(|c| c.junction == 0).collect();
        assert_eq!(at_root.len(), 1);
        assert_eq!(at_root[0].leaf_count, 4);
        assert_eq!(at_root[0].radius, 3);
        assert_eq!(at_root[0].excision.len(), 11);
    }

    #[test]
    fn test_depth_one_uses_full_tree() {
        let g = make_star(4, 2);
        let crossovers = find_crossovers(&g, 1);
        assert_eq!(crossovers.len(), 1);
        assert_eq!(crossovers[0].radius, 1);
        assert_eq!(crossovers[0].excision.len(), 5);
    }

    #[test]
    fn test_no_junctions() {
        let mut g = Graph::new();
        for i in 0..9 {
            g.add_edge(i, i + 1);
        }
        assert!(detect_crossovers(&g, 10).is_empty());
    }

    #[test]
    fn test_graph_untouched() {
        let g = make_star(6, 3);
        let before = g.edges();
        let _ = detect_crossovers(&g, 10);
        assert_eq!(g.edges(), before);
    }

    proptest! {
        #[test]
        fn prop_minimal_excision_within_full_tree(
            parents in prop::collection::vec(any::<prop::sample::Index>(), 1..120),
            depth in 1u32..12,
        ) {
            let g = tree_from_parents(&parents);
            for crossover in find_crossovers(&g, depth) {
                prop_assert!(crossover.leaf_count > MAX_JUNCTION_BRANCHES);
                prop_assert!(crossover.radius <= depth);
                let full: HashSet<NodeId> =
                    dfs_tree(&g, crossover.junction, depth).into_nodes().into_iter().collect();
                for node in &crossover.excision {
                    prop_assert!(full.contains(node));
                }
            }
        }
    }
}
