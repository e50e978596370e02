//! Seed source boundary adapter (spec §4.G, §6): yields a `seed_id`
//! and an ordered, read-once command sequence. File format is JSON —
//! a concrete choice this crate makes; spec.md leaves the format out
//! of the core's scope.

use std::path::Path;

use serde::Deserialize;

use crate::command::Command;
use crate::error::SeedError;

/// A loaded seed workload.
#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    pub seed_id: String,
    pub commands: Vec<Command>,
}

impl Seed {
    /// Loads a seed from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let text = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
