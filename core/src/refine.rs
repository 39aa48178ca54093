//! End-to-end refinement passes over a collection of graphs.
//!
//! Each graph is processed on its own: it is owned by the pass, mutated in
//! place, split into connected components, and only components with more
//! than [`MIN_COMPONENT_NODES`] nodes are returned.

use log::{debug, info};

use crate::config::{
    RefineConfig, DEFAULT_MIN_BRANCH_LENGTH, DEFAULT_SPURIOUS_BRANCH_LENGTH, MIN_COMPONENT_NODES,
};
use crate::crossover::detect_crossovers;
use crate::graph::Graph;
use crate::prune::{prune_short_connectors, prune_short_leaf_branches, scan_connectors};
use crate::traversal::split_components;

/// Append the components of `graph` that are large enough to keep.
fn keep_large_components(graph: &Graph, out: &mut Vec<Graph>) {
    for component in split_components(graph) {
        if component.node_count() > MIN_COMPONENT_NODES {
            out.push(component);
        } else {
            debug!("dropping {}-node component", component.node_count());
        }
    }
}

/// Leaf-branch pruning at `spurious_branch_length`, then connector pruning.
/// Returns None when the graph is too small to continue.
fn prune_graph(
    mut graph: Graph,
    spurious_branch_length: usize,
    min_connector_length: usize,
) -> Option<Graph> {
    prune_short_leaf_branches(&mut graph, spurious_branch_length);
    if graph.node_count() <= 1 {
        debug!("skipping graph reduced to {} node(s)", graph.node_count());
        return None;
    }
    if graph.node_count() <= 3 {
        debug!("skipping {}-node graph before connector pruning", graph.node_count());
        return None;
    }
    prune_short_connectors(&mut graph, min_connector_length);
    Some(graph)
}

/// Prune short leaf branches (threshold 5) and short connectors, then keep
/// components with more than 10 nodes.
pub fn refine_pruning(graphs: Vec<Graph>, min_connector_length: usize) -> Vec<Graph> {
    refine_pruning_with(graphs, DEFAULT_SPURIOUS_BRANCH_LENGTH, min_connector_length)
}

/// [`refine_pruning`] with an explicit leaf-branch threshold.
pub fn refine_pruning_with(
    graphs: Vec<Graph>,
    spurious_branch_length: usize,
    min_connector_length: usize,
) -> Vec<Graph> {
    let input = graphs.len();
    let mut kept = Vec::new();

    for graph in graphs {
        if let Some(pruned) = prune_graph(graph, spurious_branch_length, min_connector_length) {
            keep_large_components(&pruned, &mut kept);
        }
    }

    info!("pruning pass: {} graph(s) in, {} component(s) out", input, kept.len());
    kept
}

/// Excise every detected crossover, then keep components with more than
/// 10 nodes.
pub fn refine_crossovers(graphs: Vec<Graph>, depth: u32) -> Vec<Graph> {
    let input = graphs.len();
    let mut kept = Vec::new();

    for mut graph in graphs {
        let excision = detect_crossovers(&graph, depth);
        if !excision.is_empty() {
            debug!("excising {} crossover node(s)", excision.len());
        }
        graph.remove_nodes_from(excision);
        keep_large_components(&graph, &mut kept);
    }

    info!("crossover pass: {} graph(s) in, {} component(s) out", input, kept.len());
    kept
}

/// Crossover excision followed by pruning, both driven by `config`.
pub fn refine(graphs: Vec<Graph>, config: &RefineConfig) -> Vec<Graph> {
    let separated = refine_crossovers(graphs, config.crossover_depth);
    refine_pruning_with(
        separated,
        config.spurious_branch_length,
        config.min_connector_length,
    )
}

/// Junction-to-junction run lengths (in edges) across all graphs, in scan
/// order, after pruning leaf branches of up to 10 nodes. Inputs are not
/// modified.
pub fn branch_length_statistics(graphs: &[Graph]) -> Vec<usize> {
    branch_length_statistics_with(graphs, DEFAULT_MIN_BRANCH_LENGTH)
}

/// [`branch_length_statistics`] with an explicit leaf-branch threshold.
pub fn branch_length_statistics_with(graphs: &[Graph], min_branch_length: usize) -> Vec<usize> {
    let mut lengths = Vec::new();

    for graph in graphs {
        let mut graph = graph.clone();
        prune_short_leaf_branches(&mut graph, min_branch_length);
        if graph.node_count() <= 1 {
            continue;
        }
        lengths.extend(scan_connectors(&graph).iter().map(|c| c.len()));
    }

    lengths
}
