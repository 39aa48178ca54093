//! SWC tree files: one node per line, `id type z y x radius parent`.
//!
//! Coordinates are stored in `z y x` column order and scaled to physical
//! units by per-axis factors given as `[x, y, z]`.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, NodeInfo};
use crate::traversal::{bfs_parents, connected_components};

/// Radius written for every exported node.
pub const EXPORT_RADIUS: u32 = 2;

const HEADER: &str = "# id, type, z, y, x, r, pid";

/// One exported SWC line. `parent` is -1 for roots.
#[derive(Debug, Clone, PartialEq)]
pub struct SwcEntry {
    pub id: u64,
    pub zyx: [f64; 3],
    pub parent: i64,
}

fn check_scaling(scaling: [f64; 3]) -> Result<()> {
    if scaling.iter().all(|s| s.is_finite() && *s > 0.0) {
        Ok(())
    } else {
        Err(Error::InvalidScaling(scaling))
    }
}

/// Parse SWC text into a graph. `name` is only used in error messages.
///
/// Every non-root line adds an edge to its parent; a parent id that no line
/// declares is an error. Positions are divided by `scaling` and quantized
/// into `shape`.
pub fn read_swc<R: BufRead>(
    reader: R,
    name: &str,
    shape: [usize; 3],
    scaling: [f64; 3],
) -> Result<Graph> {
    check_scaling(scaling)?;

    let parse_err = |line: usize, message: String| Error::SwcParse {
        file: name.to_string(),
        line,
        message,
    };

    let mut graph = Graph::new();
    let mut links: Vec<(NodeId, NodeId)> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| Error::io(name, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() < 7 {
            return Err(parse_err(
                line_no,
                format!("expected 7 columns, found {}", parts.len()),
            ));
        }

        let id: NodeId = parts[0]
            .parse()
            .map_err(|_| parse_err(line_no, format!("invalid node id '{}'", parts[0])))?;
        let parent: i64 = parts[parts.len() - 1].parse().map_err(|_| {
            parse_err(
                line_no,
                format!("invalid parent id '{}'", parts[parts.len() - 1]),
            )
        })?;

        let mut zyx = [0.0f64; 3];
        for (axis, raw) in parts[2..5].iter().enumerate() {
            zyx[axis] = raw
                .parse()
                .map_err(|_| parse_err(line_no, format!("invalid coordinate '{}'", raw)))?;
        }
        let position = [
            zyx[2] / scaling[0],
            zyx[1] / scaling[1],
            zyx[0] / scaling[2],
        ];
        graph.add_node(id, NodeInfo::from_position(position, shape));

        if parent >= 0 {
            links.push((id, parent as NodeId));
        } else if parent != -1 {
            return Err(parse_err(line_no, format!("invalid parent id '{}'", parent)));
        }
    }

    for (node, parent) in links {
        if !graph.contains(parent) {
            return Err(Error::UnknownParent {
                file: name.to_string(),
                node,
                parent,
            });
        }
        graph.add_edge(node, parent);
    }

    Ok(graph)
}

pub fn read_swc_file(path: impl AsRef<Path>, shape: [usize; 3], scaling: [f64; 3]) -> Result<Graph> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
    read_swc(
        BufReader::new(file),
        &path.display().to_string(),
        shape,
        scaling,
    )
}

/// Load every file whose name contains `swc`, in file-name order.
pub fn read_swc_dir(dir: impl AsRef<Path>, shape: [usize; 3], scaling: [f64; 3]) -> Result<Vec<Graph>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let is_swc = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains("swc"));
        if is_swc && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let graphs = paths
        .iter()
        .map(|p| read_swc_file(p, shape, scaling))
        .collect::<Result<Vec<_>>>()?;
    debug!("read {} swc file(s) from {}", graphs.len(), dir.display());
    Ok(graphs)
}

/// Lay a graph out as SWC entries.
///
/// Parents come from a breadth-first walk from `root`; nodes are renumbered
/// 1..n in visit order. Nodes not reachable from `root` follow as further
/// trees, each rooted at its smallest node id.
pub fn swc_entries(graph: &Graph, root: NodeId, scaling: [f64; 3]) -> Result<Vec<SwcEntry>> {
    if !graph.contains(root) {
        return Err(Error::MissingRoot(root));
    }
    check_scaling(scaling)?;

    let mut roots = vec![root];
    roots.extend(
        connected_components(graph)
            .into_iter()
            .filter(|c| c.binary_search(&root).is_err())
            .map(|c| c[0]),
    );

    let mut reindex: HashMap<NodeId, u64> = HashMap::with_capacity(graph.node_count());
    let mut entries = Vec::with_capacity(graph.node_count());

    for tree_root in roots {
        for (parent, node) in bfs_parents(graph, tree_root) {
            let id = entries.len() as u64 + 1;
            reindex.insert(node, id);
            let parent = match parent {
                Some(p) => reindex[&p] as i64,
                None => -1,
            };
            let position = graph.node(node).map(|n| n.position).unwrap_or_default();
            entries.push(SwcEntry {
                id,
                zyx: [
                    position[2] * scaling[2],
                    position[1] * scaling[1],
                    position[0] * scaling[0],
                ],
                parent,
            });
        }
    }

    Ok(entries)
}

pub fn write_swc<W: Write>(mut writer: W, entries: &[SwcEntry]) -> Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for entry in entries {
        writeln!(
            writer,
            "{} 0 {} {} {} {} {}",
            entry.id, entry.zyx[0], entry.zyx[1], entry.zyx[2], EXPORT_RADIUS, entry.parent
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_swc_file(
    path: impl AsRef<Path>,
    graph: &Graph,
    root: NodeId,
    scaling: [f64; 3],
) -> Result<()> {
    let path = path.as_ref();
    let entries = swc_entries(graph, root, scaling)?;
    let file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_swc(BufWriter::new(file), &entries).map_err(|e| match e {
        Error::Write(source) => Error::io(path, source),
        other => other,
    })
}
