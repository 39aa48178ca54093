use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::{Graph, NodeId};

/// Depth-limited depth-first tree rooted at one node.
///
/// Only tree edges are kept: a node reached through several paths is
/// attached to whichever parent discovered it first.
#[derive(Debug, Clone)]
pub struct DfsTree {
    pub root: NodeId,
    /// Discovery order, starting with the root.
    order: Vec<NodeId>,
    parents: HashMap<NodeId, NodeId>,
    tree_degree: HashMap<NodeId, usize>,
}

impl DfsTree {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.tree_degree.contains_key(&id)
    }

    /// Tree parent of a node. None for the root and for nodes outside the tree.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes with exactly one incident tree edge, ascending. Includes nodes
    /// cut off by the depth limit, and the root when it has a single child.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves: Vec<NodeId> = self
            .tree_degree
            .iter()
            .filter(|(_, &degree)| degree == 1)
            .map(|(&id, _)| id)
            .collect();
        leaves.sort_unstable();
        leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.tree_degree.values().filter(|&&degree| degree == 1).count()
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        self.order
    }
}

/// Tree edges `(parent, child)` of a depth-first walk from `source`, in
/// discovery order. Neighbors are followed in adjacency order.
pub fn dfs_edges(graph: &Graph, source: NodeId) -> Vec<(NodeId, NodeId)> {
    depth_first(graph, source, None)
}

/// Depth-first tree of everything reachable from `source` along DFS paths
/// of at most `depth_limit` edges. `depth_limit == 0` yields the root alone.
/// An unknown `source` yields an empty tree.
pub fn dfs_tree(graph: &Graph, source: NodeId, depth_limit: u32) -> DfsTree {
    let mut tree = DfsTree {
        root: source,
        order: Vec::new(),
        parents: HashMap::new(),
        tree_degree: HashMap::new(),
    };
    if !graph.contains(source) {
        return tree;
    }

    tree.order.push(source);
    tree.tree_degree.insert(source, 0);
    for (parent, child) in depth_first(graph, source, Some(depth_limit)) {
        tree.order.push(child);
        tree.parents.insert(child, parent);
        *tree.tree_degree.entry(parent).or_default() += 1;
        *tree.tree_degree.entry(child).or_default() += 1;
    }
    tree
}

/// Iterative DFS. Each stack frame holds a node, a cursor into its adjacency
/// list, and the remaining depth budget (None = unlimited).
fn depth_first(graph: &Graph, source: NodeId, limit: Option<u32>) -> Vec<(NodeId, NodeId)> {
    let mut edges = Vec::new();
    if !graph.contains(source) || limit == Some(0) {
        return edges;
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<(NodeId, usize, Option<u32>)> = Vec::new();
    visited.insert(source);
    stack.push((source, 0, limit));

    while let Some(frame) = stack.last_mut() {
        let (node, cursor, remaining) = *frame;
        let neighbors = graph.neighbors(node);
        if cursor >= neighbors.len() {
            stack.pop();
            continue;
        }
        frame.1 += 1;

        let next = neighbors[cursor];
        if visited.insert(next) {
            edges.push((node, next));
            let child_budget = remaining.map(|r| r - 1);
            if child_budget != Some(0) {
                stack.push((next, 0, child_budget));
            }
        }
    }

    edges
}

/// Breadth-first parent assignment from `root`: `(parent, node)` pairs in
/// visit order, the root paired with None. Each node appears once, at its
/// minimum hop distance.
pub fn bfs_parents(graph: &Graph, root: NodeId) -> Vec<(Option<NodeId>, NodeId)> {
    if !graph.contains(root) {
        return Vec::new();
    }

    let mut order = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<(Option<NodeId>, NodeId)> = VecDeque::new();

    visited.insert(root);
    queue.push_back((None, root));

    while let Some((parent, current)) = queue.pop_front() {
        order.push((parent, current));
        for &next in graph.neighbors(current) {
            if visited.insert(next) {
                queue.push_back((Some(current), next));
            }
        }
    }

    order
}

/// Connected components as ascending node-id lists, ordered by their
/// smallest member.
pub fn connected_components(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut seen: HashSet<NodeId> = HashSet::with_capacity(graph.node_count());
    let mut components = Vec::new();

    for start in graph.sorted_node_ids() {
        if !seen.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut queue: VecDeque<NodeId> = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &next in graph.neighbors(current) {
                if seen.insert(next) {
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    components
}

/// Split a graph into independent per-component graphs.
pub fn split_components(graph: &Graph) -> Vec<Graph> {
    connected_components(graph)
        .iter()
        .map(|component| graph.subgraph(component))
        .collect()
}
