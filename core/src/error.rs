use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::{NodeId, Voxel};

/// Errors from the fallible edges of the engine: file I/O, parsing and
/// configuration. The refinement passes themselves never fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Write(#[from] io::Error),

    #[error("{file}:{line}: {message}")]
    SwcParse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{file}: node {node} references unknown parent {parent}")]
    UnknownParent {
        file: String,
        node: NodeId,
        parent: NodeId,
    },

    #[error("root node {0} is not in the graph")]
    MissingRoot(NodeId),

    #[error("invalid volume shape {0:?}: axes must be non-zero and their product must fit in usize")]
    InvalidShape([usize; 3]),

    #[error("volume data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid scaling factors {0:?}: every factor must be finite and positive")]
    InvalidScaling([f64; 3]),

    #[error("voxel {voxel:?} is outside volume shape {shape:?}")]
    OutOfBounds { voxel: Voxel, shape: [usize; 3] },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
