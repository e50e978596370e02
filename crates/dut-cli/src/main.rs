//! `nvme-lite-dut` — CLI front-end for the deterministic NVMe-lite DUT
//! simulator core ([`dut_core`]).
//!
//! Two verbs: `run-one` executes a single seed under a single
//! scheduling configuration; `run-matrix` expands a config file's
//! Cartesian product of seeds/policies/bounds/faults/schedule-seeds
//! and runs every cell. Argument parsing, filesystem plumbing, and
//! process exit codes live here, never in `dut-core`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nvme-lite-dut")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a single seed under a single scheduling configuration.
    RunOne {
        /// Path to the JSON seed file.
        #[arg(long)]
        seed_file: std::path::PathBuf,

        /// 64-bit PRNG seed driving the scheduler's interleaving.
        #[arg(long)]
        schedule_seed: u64,

        /// FIFO | RANDOM | ADVERSARIAL | BATCHED.
        #[arg(long)]
        policy: String,

        /// Reorder bound: a non-negative integer, or "inf".
        #[arg(long)]
        bound_k: String,

        /// Path to write the trace file to.
        #[arg(long)]
        out_log: std::path::PathBuf,

        /// NONE | TIMEOUT | RESET.
        #[arg(long, default_value = "NONE")]
        fault_mode: String,

        /// Max pending commands allowed at submit time, or "inf".
        #[arg(long, default_value = "inf")]
        submit_window: String,

        /// Scheduler version string recorded in the trace header.
        #[arg(long, default_value = "v1.0")]
        scheduler_version: String,

        /// Git commit recorded in the trace header. "auto" resolves it
        /// via `git rev-parse HEAD`.
        #[arg(long, default_value = "auto")]
        git_commit: String,
    },

    /// Execute every cell of a matrix config's Cartesian product.
    RunMatrix {
        /// Path to the TOML matrix config.
        #[arg(long)]
        config: std::path::PathBuf,

        /// Directory to write one `{run_id}.log` trace per cell into.
        #[arg(long)]
        out_dir: std::path::PathBuf,

        /// Overrides the config's `schedule_seeds` range, e.g. "0-99".
        #[arg(long)]
        schedule_seeds: Option<String>,

        /// Max pending commands allowed at submit time, or "inf".
        /// Applies to every cell in the matrix.
        #[arg(long, default_value = "inf")]
        submit_window: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunOne {
            seed_file,
            schedule_seed,
            policy,
            bound_k,
            out_log,
            fault_mode,
            submit_window,
            scheduler_version,
            git_commit,
        } => commands::run_one::run(commands::run_one::Args {
            seed_file,
            schedule_seed,
            policy,
            bound_k,
            out_log,
            fault_mode,
            submit_window,
            scheduler_version,
            git_commit,
        }),
        Commands::RunMatrix {
            config,
            out_dir,
            schedule_seeds,
            submit_window,
        } => commands::run_matrix::run(commands::run_matrix::Args {
            config,
            out_dir,
            schedule_seeds,
            submit_window,
        }),
    }
}
