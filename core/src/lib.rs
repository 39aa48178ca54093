//! neurograph-core: topology refinement for skeleton graphs.
//!
//! Graphs traced from 3-D skeletons of tubular structures carry artifacts:
//! short spurious branches, short bridges between junctions, and
//! "crossover" junctions where two independent structures touch. This crate
//! holds an in-memory undirected graph model and the passes that remove
//! those artifacts, plus SWC file I/O, skeleton import and rasterization
//! back into a label volume.
//!
//! Every pass is single-threaded and owns the graph it works on, so a
//! collection of graphs can be split across threads by the caller.

mod config;
mod crossover;
mod error;
mod graph;
mod prune;
mod refine;
mod skeleton;
mod swc;
mod traversal;
mod volume;

pub use config::{
    RefineConfig, DEFAULT_CROSSOVER_DEPTH, DEFAULT_MIN_BRANCH_LENGTH,
    DEFAULT_MIN_CONNECTOR_LENGTH, DEFAULT_SPURIOUS_BRANCH_LENGTH, MIN_COMPONENT_NODES,
};
pub use crossover::{detect_crossovers, find_crossovers, Crossover, MAX_JUNCTION_BRANCHES};
pub use error::{Error, Result};
pub use graph::{voxel_from_position, DegreeSummary, Graph, NodeId, NodeInfo, NodeRole, Voxel};
pub use prune::{prune_short_connectors, prune_short_leaf_branches, scan_connectors, Connector};
pub use refine::{
    branch_length_statistics, branch_length_statistics_with, refine, refine_crossovers,
    refine_pruning, refine_pruning_with,
};
pub use skeleton::{labeled_skeleton_to_graphs, neighborhood_offsets, skeleton_to_graph, Connectivity};
pub use swc::{
    read_swc, read_swc_dir, read_swc_file, swc_entries, write_swc, write_swc_file, SwcEntry,
    EXPORT_RADIUS,
};
pub use traversal::{
    bfs_parents, connected_components, dfs_edges, dfs_tree, split_components, DfsTree,
};
pub use volume::{embed_graph, rasterize, Volume, DILATION_PASSES};
