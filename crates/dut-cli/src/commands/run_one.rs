//! `run-one`: executes a single seed under a single scheduling
//! configuration and writes one trace file (spec.md §6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use dut_core::{execute, BoundK, FaultMode, Policy, RunConfig, Seed, SubmitWindow};

use super::git;

pub struct Args {
    pub seed_file: PathBuf,
    pub schedule_seed: u64,
    pub policy: String,
    pub bound_k: String,
    pub out_log: PathBuf,
    pub fault_mode: String,
    pub submit_window: String,
    pub scheduler_version: String,
    pub git_commit: String,
}

pub fn run(args: Args) -> Result<()> {
    let policy: Policy = args
        .policy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --policy")?;
    let bound_k: BoundK = args
        .bound_k
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --bound-k")?;
    let fault_mode: FaultMode = args
        .fault_mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --fault-mode")?;
    let submit_window: SubmitWindow = args
        .submit_window
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --submit-window")?;

    let seed = Seed::load(&args.seed_file)
        .with_context(|| format!("failed to load seed file {}", args.seed_file.display()))?;

    if let Some(parent) = args.out_log.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let config = RunConfig {
        seed_id: seed.seed_id.clone(),
        schedule_seed: args.schedule_seed,
        policy,
        bound_k,
        fault_mode,
        submit_window,
        scheduler_version: args.scheduler_version,
        git_commit: git::resolve(&args.git_commit),
    };

    tracing::info!(run_id = %config.run_id(), seed_file = %args.seed_file.display(), "starting run");

    let outcome = execute(&seed, &config);
    outcome
        .write_trace(&args.out_log)
        .with_context(|| format!("failed to write trace to {}", args.out_log.display()))?;

    tracing::info!(
        run_id = %outcome.run_id,
        pending_left = outcome.pending_left,
        pending_peak = outcome.pending_peak,
        "run completed"
    );
    if outcome.had_reset {
        tracing::info!(commands_lost = outcome.commands_lost, "reset occurred during run");
    }

    println!("Run completed: {}", outcome.run_id);
    println!("  pending_left: {}", outcome.pending_left);
    println!("  pending_peak: {}", outcome.pending_peak);
    if outcome.had_reset {
        println!("  commands_lost: {}", outcome.commands_lost);
    }

    Ok(())
}
