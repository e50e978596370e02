//! Matrix config boundary adapter (spec §6 "logical schema only"):
//! loads the Cartesian-product sweep definition and expands it into
//! individual `RunConfig` cells.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::MatrixConfigError;
use crate::run::{FaultMode, RunConfig, SubmitWindow};
use crate::scheduler::{BoundK, Policy};

/// The on-disk shape of a matrix config (SPEC_FULL §2.3). Field names
/// match the TOML schema exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixConfig {
    pub seeds: Vec<PathBuf>,
    pub policies: Vec<String>,
    pub bounds: Vec<String>,
    pub faults: Vec<String>,
    pub schedule_seeds: ScheduleSeedRange,
    #[serde(default = "default_scheduler_version")]
    pub scheduler_version: String,
    #[serde(default = "default_git_commit")]
    pub git_commit: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScheduleSeedRange {
    pub start: u64,
    pub end: u64,
}

fn default_scheduler_version() -> String {
    "v1.0".to_string()
}

fn default_git_commit() -> String {
    "auto".to_string()
}

/// One expanded cell: a seed path plus the `RunConfig` to run it under.
#[derive(Debug, Clone)]
pub struct MatrixCell {
    pub seed_path: PathBuf,
    pub config: RunConfig,
}

impl MatrixConfig {
    /// Loads a matrix config from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, MatrixConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| MatrixConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config: MatrixConfig =
            toml::from_str(&text).map_err(|source| MatrixConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), MatrixConfigError> {
        if self.seeds.is_empty() {
            return Err(MatrixConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "seeds must not be empty".to_string(),
            });
        }
        if self.policies.is_empty() || self.bounds.is_empty() || self.faults.is_empty() {
            return Err(MatrixConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "policies, bounds, and faults must each have at least one entry"
                    .to_string(),
            });
        }
        if self.schedule_seeds.start > self.schedule_seeds.end {
            return Err(MatrixConfigError::Invalid {
                path: path.to_path_buf(),
                reason: format!(
                    "schedule_seeds.start ({}) must not exceed schedule_seeds.end ({})",
                    self.schedule_seeds.start, self.schedule_seeds.end
                ),
            });
        }
        for policy in &self.policies {
            policy
                .parse::<Policy>()
                .map_err(|reason| MatrixConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason,
                })?;
        }
        for bound in &self.bounds {
            bound
                .parse::<BoundK>()
                .map_err(|reason| MatrixConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason,
                })?;
        }
        for fault in &self.faults {
            fault
                .parse::<FaultMode>()
                .map_err(|reason| MatrixConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Expands the Cartesian product `seeds x policies x bounds x
    /// faults x schedule_seeds` into individual run cells. `seed_id`
    /// for each cell defaults to the seed file's stem; the real
    /// `seed_id` used in `run_id()` comes from the loaded seed file
    /// itself (spec.md §3) — this is only a placeholder until the
    /// cell's seed is loaded.
    ///
    /// `submit_window` is shared across every cell (spec.md §6: the CLI
    /// may override it for the whole matrix; the schema has no
    /// per-cell variant).
    pub fn expand(&self, submit_window: SubmitWindow) -> Vec<MatrixCell> {
        let mut cells = Vec::new();
        for seed_path in &self.seeds {
            for policy in &self.policies {
                let policy: Policy = policy.parse().expect("validated at load time");
                for bound in &self.bounds {
                    let bound_k: BoundK = bound.parse().expect("validated at load time");
                    for fault in &self.faults {
                        let fault_mode: FaultMode = fault.parse().expect("validated at load time");
                        for schedule_seed in self.schedule_seeds.start..=self.schedule_seeds.end {
                            cells.push(MatrixCell {
                                seed_path: seed_path.clone(),
                                config: RunConfig {
                                    seed_id: seed_stem(seed_path),
                                    schedule_seed,
                                    policy,
                                    bound_k,
                                    fault_mode,
                                    submit_window,
                                    scheduler_version: self.scheduler_version.clone(),
                                    git_commit: self.git_commit.clone(),
                                },
                            });
                        }
                    }
                }
            }
        }
        cells
    }
}

fn seed_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
