use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_MIN_BRANCH_LENGTH: usize = 10;
pub const DEFAULT_SPURIOUS_BRANCH_LENGTH: usize = 5;
pub const DEFAULT_MIN_CONNECTOR_LENGTH: usize = 10;
pub const DEFAULT_CROSSOVER_DEPTH: u32 = 10;

/// Components must have strictly more nodes than this to survive a pass.
pub const MIN_COMPONENT_NODES: usize = 10;

/// Tunable thresholds for the refinement passes.
///
/// Every field has a default, so a config file only needs the keys it
/// changes. Unknown keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefineConfig {
    /// Leaf branches of at most this many nodes that end at a junction are
    /// removed before branch-length statistics are taken. Default 10, any
    /// value >= 0.
    pub min_branch_length: usize,

    /// Leaf-branch threshold used before connector pruning and passed to
    /// skeleton import. Default 5, any value >= 0.
    pub spurious_branch_length: usize,

    /// Junction-to-junction runs shorter than this (in edges) are cut.
    /// Default 10, any value >= 0.
    pub min_connector_length: usize,

    /// Search radius (in hops) around each junction when looking for
    /// crossovers. Default 10, range 1..=u32::MAX.
    pub crossover_depth: u32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            min_branch_length: DEFAULT_MIN_BRANCH_LENGTH,
            spurious_branch_length: DEFAULT_SPURIOUS_BRANCH_LENGTH,
            min_connector_length: DEFAULT_MIN_CONNECTOR_LENGTH,
            crossover_depth: DEFAULT_CROSSOVER_DEPTH,
        }
    }
}

impl RefineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RefineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.crossover_depth == 0 {
            return Err(Error::InvalidConfig {
                field: "crossover_depth",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
