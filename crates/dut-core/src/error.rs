//! Typed errors at the three external boundaries the core consumes
//! (spec §4.G, §7): seed loading, matrix config loading, and trace
//! sink writes. Semantic errors from the model itself (out-of-range
//! access) are never represented here — they are `Status::Err` trace
//! output, not a Rust error path (spec §7).

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or parse a seed workload file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse seed JSON at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failure to load or parse a matrix config file.
#[derive(Debug, Error)]
pub enum MatrixConfigError {
    #[error("failed to read matrix config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse matrix config TOML at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid matrix config at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Failure to flush a run's trace to its sink (spec §7 "Sink errors").
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to write trace to {path}: {source}")]
    SinkWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
