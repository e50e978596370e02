//! Deterministic NVMe-lite DUT simulator core.
//!
//! This crate owns the interacting triad a reproducible storage-DUT
//! simulation needs: the [`storage`] model (what a command means), the
//! [`scheduler`] (when pending commands complete), and the [`run`]
//! driver (how the two interleave into a single observable trace,
//! including injected faults). Everything here is deterministic given
//! a `(schedule_seed, policy, bound_k, fault_mode)` tuple and a seed
//! workload: no wall-clock time, no thread interleaving, no OS
//! randomness crosses into a run's outcome.
//!
//! Boundary adapters ([`seed`], [`matrix`]) parse the on-disk seed and
//! matrix-config formats into the types the triad consumes; [`trace`]
//! renders a run's observable events into the canonical wire grammar a
//! downstream oracle diffs against another implementation's output.

pub mod command;
pub mod error;
pub mod matrix;
pub mod rng;
pub mod run;
pub mod scheduler;
pub mod seed;
pub mod storage;
pub mod trace;

pub use command::{Command, CommandResult, PendingCommand, Status};
pub use error::{MatrixConfigError, RunError, SeedError};
pub use matrix::{MatrixCell, MatrixConfig, ScheduleSeedRange};
pub use rng::Splitmix64;
pub use run::{execute, FaultMode, RunConfig, RunOutcome, SubmitWindow};
pub use scheduler::{BoundK, Decision, Policy, Scheduler};
pub use seed::Seed;
pub use storage::StorageModel;
pub use trace::{TraceEmitter, TraceEvent};
