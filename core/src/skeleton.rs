//! Skeleton voxels to graphs.
//!
//! Input is an already-skeletonized volume; thinning a dense segmentation is
//! left to the caller.

use std::collections::{BTreeSet, VecDeque};

use log::debug;

use crate::graph::{Graph, NodeId, NodeInfo, Voxel};
use crate::prune::prune_short_leaf_branches;
use crate::volume::Volume;

/// Voxel neighbourhood used when growing a graph over skeleton voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    Six,
    Eighteen,
    #[default]
    TwentySix,
}

/// Offsets from a voxel to its neighbours: faces, then edges, then corners.
pub fn neighborhood_offsets(connectivity: Connectivity) -> Vec<[i64; 3]> {
    let mut offsets = Vec::with_capacity(26);
    for dz in -1i64..=1 {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nonzero = [dx, dy, dz].iter().filter(|&&d| d != 0).count();
                let keep = match connectivity {
                    Connectivity::Six => nonzero == 1,
                    Connectivity::Eighteen => (1..=2).contains(&nonzero),
                    Connectivity::TwentySix => nonzero >= 1,
                };
                if keep {
                    offsets.push([dx, dy, dz]);
                }
            }
        }
    }
    offsets.sort_by_key(|o| o.iter().filter(|&&d| d != 0).count());
    offsets
}

fn offset_voxel(voxel: Voxel, offset: [i64; 3]) -> Option<Voxel> {
    let mut out = [0usize; 3];
    for axis in 0..3 {
        let v = voxel[axis] as i64 + offset[axis];
        if v < 0 {
            return None;
        }
        out[axis] = v as usize;
    }
    Some(out)
}

/// Grow a spanning forest over skeleton voxels.
///
/// Starting from the smallest unclaimed voxel, a breadth-first walk claims
/// each neighbouring voxel once and links it to the node that discovered it.
/// Nodes are numbered 1, 2, … in discovery order. Repeats until every voxel
/// is claimed.
pub fn skeleton_to_graph<I>(voxels: I, connectivity: Connectivity) -> Graph
where
    I: IntoIterator<Item = Voxel>,
{
    let mut unclaimed: BTreeSet<Voxel> = voxels.into_iter().collect();
    let offsets = neighborhood_offsets(connectivity);
    let mut graph = Graph::with_capacity(unclaimed.len());
    let mut queue: VecDeque<(Option<NodeId>, Voxel)> = VecDeque::new();

    while let Some(seed) = unclaimed.pop_first() {
        queue.push_back((None, seed));
        while let Some((parent, voxel)) = queue.pop_front() {
            let id = graph.node_count() as NodeId + 1;
            graph.add_node(id, NodeInfo::from_voxel(voxel));
            if let Some(parent) = parent {
                graph.add_edge(parent, id);
            }
            for &offset in &offsets {
                if let Some(next) = offset_voxel(voxel, offset) {
                    if unclaimed.remove(&next) {
                        queue.push_back((Some(id), next));
                    }
                }
            }
        }
    }

    graph
}

/// One graph per non-zero label of a labeled skeleton volume, in ascending
/// label order, each with leaf branches of up to `spurious_branch_length`
/// nodes pruned (see [`RefineConfig::spurious_branch_length`], default 5).
///
/// [`RefineConfig::spurious_branch_length`]: crate::RefineConfig::spurious_branch_length
pub fn labeled_skeleton_to_graphs(volume: &Volume, spurious_branch_length: usize) -> Vec<Graph> {
    volume
        .labels()
        .into_iter()
        .map(|label| {
            let mut graph = skeleton_to_graph(volume.voxels_with(label), Connectivity::default());
            let removed = prune_short_leaf_branches(&mut graph, spurious_branch_length);
            debug!(
                "label {}: {} nodes after pruning {} spur node(s)",
                label,
                graph.node_count(),
                removed
            );
            graph
        })
        .collect()
}
