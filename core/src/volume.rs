//! Labeled voxel volumes and graph rasterization.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::graph::{Graph, Voxel};

/// Number of 3x3x3 dilations applied after embedding node voxels.
pub const DILATION_PASSES: usize = 3;

/// Dense `u32` label volume, shape `[x, y, z]`, x fastest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    shape: [usize; 3],
    data: Vec<u32>,
}

/// Voxel count of `shape`. Zero axes and overflowing products are invalid.
fn voxel_count(shape: [usize; 3]) -> Result<usize> {
    if shape.contains(&0) {
        return Err(Error::InvalidShape(shape));
    }
    shape[0]
        .checked_mul(shape[1])
        .and_then(|n| n.checked_mul(shape[2]))
        .ok_or(Error::InvalidShape(shape))
}

impl Volume {
    /// Zero-filled volume.
    pub fn new(shape: [usize; 3]) -> Result<Self> {
        let len = voxel_count(shape)?;
        Ok(Self {
            shape,
            data: vec![0; len],
        })
    }

    pub fn from_vec(shape: [usize; 3], data: Vec<u32>) -> Result<Self> {
        let expected = voxel_count(shape)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    fn index(&self, voxel: Voxel) -> Option<usize> {
        let [sx, sy, sz] = self.shape;
        let [x, y, z] = voxel;
        (x < sx && y < sy && z < sz).then(|| x + sx * (y + sy * z))
    }

    fn voxel_at(&self, index: usize) -> Voxel {
        let [sx, sy, _] = self.shape;
        [index % sx, (index / sx) % sy, index / (sx * sy)]
    }

    pub fn get(&self, voxel: Voxel) -> Option<u32> {
        self.index(voxel).map(|i| self.data[i])
    }

    pub fn set(&mut self, voxel: Voxel, label: u32) -> Result<()> {
        let i = self.index(voxel).ok_or(Error::OutOfBounds {
            voxel,
            shape: self.shape,
        })?;
        self.data[i] = label;
        Ok(())
    }

    /// Non-zero labels, ascending.
    pub fn labels(&self) -> BTreeSet<u32> {
        self.data.iter().copied().filter(|&v| v != 0).collect()
    }

    /// Voxels carrying `label`, in storage order.
    pub fn voxels_with(&self, label: u32) -> Vec<Voxel> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == label)
            .map(|(i, _)| self.voxel_at(i))
            .collect()
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Non-zero voxels keyed by position.
    pub fn to_sparse(&self) -> HashMap<Voxel, u32> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(i, &v)| (self.voxel_at(i), v))
            .collect()
    }

    /// Grey dilation with a flat 3x3x3 element: every voxel takes the
    /// maximum label of its neighbourhood. Outside the volume counts as 0.
    pub fn dilate3x3x3(&self) -> Volume {
        let [sx, sy, sz] = self.shape;
        let mut out = vec![0u32; self.data.len()];

        for z in 0..sz {
            for y in 0..sy {
                for x in 0..sx {
                    let mut max = 0u32;
                    for dz in -1isize..=1 {
                        let nz = z as isize + dz;
                        if nz < 0 || nz >= sz as isize {
                            continue;
                        }
                        for dy in -1isize..=1 {
                            let ny = y as isize + dy;
                            if ny < 0 || ny >= sy as isize {
                                continue;
                            }
                            for dx in -1isize..=1 {
                                let nx = x as isize + dx;
                                if nx < 0 || nx >= sx as isize {
                                    continue;
                                }
                                let v = self.data
                                    [nx as usize + sx * (ny as usize + sy * nz as usize)];
                                max = max.max(v);
                            }
                        }
                    }
                    out[x + sx * (y + sy * z)] = max;
                }
            }
        }

        Volume {
            shape: self.shape,
            data: out,
        }
    }
}

/// Write `label` at the voxel of every node of `graph`.
pub fn embed_graph(volume: &mut Volume, graph: &Graph, label: u32) -> Result<()> {
    for (_, info) in graph.nodes_iter() {
        volume.set(info.voxel_index, label)?;
    }
    Ok(())
}

/// Rasterize graphs into a label volume: graph `i` is written with label
/// `i + 1`, later graphs overwrite earlier ones, then the volume is
/// thickened by [`DILATION_PASSES`] 3x3x3 dilations.
pub fn rasterize(graphs: &[Graph], shape: [usize; 3]) -> Result<Volume> {
    let mut volume = Volume::new(shape)?;
    for (i, graph) in graphs.iter().enumerate() {
        embed_graph(&mut volume, graph, i as u32 + 1)?;
    }
    for _ in 0..DILATION_PASSES {
        volume = volume.dilate3x3x3();
    }
    Ok(volume)
}
