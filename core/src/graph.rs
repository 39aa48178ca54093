use std::collections::HashMap;

use serde::Serialize;

/// Node identifier. Unique within one graph, not across graphs.
pub type NodeId = u64;

/// Integer lattice coordinate `[x, y, z]` inside a volume.
pub type Voxel = [usize; 3];

/// Attributes carried by every node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeInfo {
    /// Physical-space coordinates `(x, y, z)`.
    pub position: [f64; 3],
    /// Lattice coordinates, derived from `position` by clamping to a volume.
    pub voxel_index: Voxel,
}

impl NodeInfo {
    pub fn new(position: [f64; 3], voxel_index: Voxel) -> Self {
        Self {
            position,
            voxel_index,
        }
    }

    /// Attributes for a physical position, quantized into a volume of `shape`.
    pub fn from_position(position: [f64; 3], shape: [usize; 3]) -> Self {
        Self {
            position,
            voxel_index: voxel_from_position(position, shape),
        }
    }

    /// Attributes for a node sitting exactly on a voxel.
    pub fn from_voxel(voxel: Voxel) -> Self {
        Self {
            position: [voxel[0] as f64, voxel[1] as f64, voxel[2] as f64],
            voxel_index: voxel,
        }
    }
}

/// Round each coordinate (ties to even) and clamp it into
/// `[0, shape[axis] - 1]`.
pub fn voxel_from_position(position: [f64; 3], shape: [usize; 3]) -> Voxel {
    let mut voxel = [0usize; 3];
    for axis in 0..3 {
        let max = shape[axis].saturating_sub(1) as f64;
        voxel[axis] = position[axis].round_ties_even().clamp(0.0, max) as usize;
    }
    voxel
}

/// Topological role of a node, read off its current degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Isolated,
    Leaf,
    Interior,
    Junction,
}

impl NodeRole {
    pub fn from_degree(degree: usize) -> Self {
        match degree {
            0 => NodeRole::Isolated,
            1 => NodeRole::Leaf,
            2 => NodeRole::Interior,
            _ => NodeRole::Junction,
        }
    }
}

/// Node counts per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DegreeSummary {
    pub isolated: usize,
    pub leaves: usize,
    pub interior: usize,
    pub junctions: usize,
}

/// Undirected attributed graph: adjacency lists + node attributes.
///
/// Every node has an adjacency entry (possibly empty). Edges are stored in
/// both endpoints' lists. Self-loops and parallel edges are never stored.
/// Adjacency order follows insertion order but is not guaranteed to survive
/// removals.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    nodes: HashMap<NodeId, NodeInfo>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            adjacency: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    /// Pre-allocate for a known node count.
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            adjacency: HashMap::with_capacity(node_count),
            nodes: HashMap::with_capacity(node_count),
        }
    }

    /// Insert a node, or overwrite the attributes of an existing one.
    pub fn add_node(&mut self, id: NodeId, info: NodeInfo) {
        self.nodes.insert(id, info);
        self.adjacency.entry(id).or_default();
    }

    /// Add an undirected edge. Missing endpoints are created with default
    /// attributes. Returns false for self-loops and edges already present.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        self.nodes.entry(a).or_default();
        self.nodes.entry(b).or_default();
        if self.has_edge(a, b) {
            return false;
        }
        self.adjacency.entry(a).or_default().push(b);
        self.adjacency.entry(b).or_default().push(a);
        true
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|neighbors| neighbors.contains(&b))
    }

    /// Remove an edge. Returns false if it was not present.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if !self.has_edge(a, b) {
            return false;
        }
        if let Some(neighbors) = self.adjacency.get_mut(&a) {
            neighbors.retain(|&n| n != b);
        }
        if let Some(neighbors) = self.adjacency.get_mut(&b) {
            neighbors.retain(|&n| n != a);
        }
        true
    }

    /// Remove every listed edge that exists. Returns how many were removed.
    pub fn remove_edges_from<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        edges
            .into_iter()
            .filter(|&(a, b)| self.remove_edge(a, b))
            .count()
    }

    /// Remove a node and all its incident edges.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeInfo> {
        let info = self.nodes.remove(&id)?;
        for neighbor in self.adjacency.remove(&id).unwrap_or_default() {
            if let Some(list) = self.adjacency.get_mut(&neighbor) {
                list.retain(|&n| n != id);
            }
        }
        Some(info)
    }

    /// Remove every listed node that exists. Returns how many were removed.
    pub fn remove_nodes_from<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = NodeId>,
    {
        ids.into_iter()
            .filter(|&id| self.remove_node(id).is_some())
            .count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get node attributes.
    pub fn node(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(&id)
    }

    /// Current neighbors of a node (empty for unknown nodes).
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency
            .get(&id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.contains(id)
            .then(|| NodeRole::from_degree(self.degree(id)))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn nodes_iter(&self) -> impl Iterator<Item = (&NodeId, &NodeInfo)> {
        self.nodes.iter()
    }

    /// Node ids in ascending order.
    pub fn sorted_node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Every edge once, as `(low, high)`, in ascending order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges: Vec<(NodeId, NodeId)> = self
            .adjacency
            .iter()
            .flat_map(|(&a, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |&&b| a < b)
                    .map(move |&b| (a, b))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Degree-1 nodes in ascending id order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes_with(|degree| degree == 1)
    }

    /// Degree > 2 nodes in ascending id order.
    pub fn junctions(&self) -> Vec<NodeId> {
        self.nodes_with(|degree| degree > 2)
    }

    fn nodes_with(&self, pred: impl Fn(usize) -> bool) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .node_ids()
            .filter(|&id| pred(self.degree(id)))
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn degree_summary(&self) -> DegreeSummary {
        let mut summary = DegreeSummary::default();
        for id in self.node_ids() {
            match NodeRole::from_degree(self.degree(id)) {
                NodeRole::Isolated => summary.isolated += 1,
                NodeRole::Leaf => summary.leaves += 1,
                NodeRole::Interior => summary.interior += 1,
                NodeRole::Junction => summary.junctions += 1,
            }
        }
        summary
    }

    /// Independent copy of the subgraph induced on `ids`. Unknown ids are ignored.
    pub fn subgraph(&self, ids: &[NodeId]) -> Graph {
        let mut sub = Graph::with_capacity(ids.len());
        for &id in ids {
            if let Some(&info) = self.node(id) {
                sub.nodes.insert(id, info);
            }
        }
        for &id in ids {
            if !sub.contains(id) {
                continue;
            }
            let kept: Vec<NodeId> = self
                .neighbors(id)
                .iter()
                .copied()
                .filter(|n| sub.nodes.contains_key(n))
                .collect();
            sub.adjacency.insert(id, kept);
        }
        sub
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|v| v.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let nodes_mem = self.nodes.len() * (size_of::<NodeId>() + size_of::<NodeInfo>() + 16);
        let adjacency_mem: usize = self
            .adjacency
            .values()
            .map(|v| size_of::<Vec<NodeId>>() + v.capacity() * size_of::<NodeId>())
            .sum();

        nodes_mem + adjacency_mem
    }
}
