//! `run-matrix`: expands a TOML matrix config's Cartesian product of
//! seeds x policies x bounds x faults x schedule-seeds and executes
//! every cell, writing one `{run_id}.log` trace per cell (spec.md §6).
//!
//! Cells run concurrently via `rayon`: each cell owns its own
//! `StorageModel`/`Scheduler`/`TraceEmitter` (spec.md §5, §9), so
//! nothing is shared across cells beyond the already-loaded, read-only
//! `Seed` each cell's workload comes from.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use rayon::prelude::*;

use dut_core::{execute, MatrixCell, MatrixConfig, ScheduleSeedRange, Seed, SubmitWindow};

use super::git;

pub struct Args {
    pub config: PathBuf,
    pub out_dir: PathBuf,
    pub schedule_seeds: Option<String>,
    pub submit_window: String,
}

pub fn run(args: Args) -> Result<()> {
    let submit_window: SubmitWindow = args
        .submit_window
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --submit-window")?;

    let mut config = MatrixConfig::load(&args.config)
        .with_context(|| format!("failed to load matrix config {}", args.config.display()))?;

    if let Some(range) = &args.schedule_seeds {
        config.schedule_seeds = parse_schedule_seed_range(range)
            .with_context(|| format!("invalid --schedule-seeds '{range}'"))?;
    }
    config.git_commit = git::resolve(&config.git_commit);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {}", args.out_dir.display()))?;

    let cells = config.expand(submit_window);
    let total = cells.len();

    tracing::info!(
        total,
        seeds = config.seeds.len(),
        policies = config.policies.len(),
        bounds = config.bounds.len(),
        faults = config.faults.len(),
        schedule_seed_start = config.schedule_seeds.start,
        schedule_seed_end = config.schedule_seeds.end,
        submit_window = %args.submit_window,
        "running matrix"
    );

    let seeds = load_distinct_seeds(&config.seeds);
    let mut load_errors = 0usize;
    for (path, result) in &seeds {
        if let Err(err) = result {
            tracing::error!(seed_file = %path.display(), error = %err, "failed to load seed");
            load_errors += 1;
        }
    }

    let completed = AtomicUsize::new(0);
    let errors = AtomicUsize::new(load_errors);

    let runnable: Vec<&MatrixCell> = cells
        .iter()
        .filter(|cell| matches!(seeds.get(&cell.seed_path), Some(Ok(_))))
        .collect();

    runnable.par_iter().for_each(|cell| {
        let seed = seeds[&cell.seed_path].as_ref().expect("filtered to Ok above");
        let mut cell_config = cell.config.clone();
        cell_config.seed_id = seed.seed_id.clone();

        let outcome = execute(seed, &cell_config);
        let out_path = args.out_dir.join(format!("{}.log", outcome.run_id));

        match outcome.write_trace(&out_path) {
            Ok(()) => {
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 100 == 0 {
                    tracing::info!(completed = done, total, "progress");
                }
            }
            Err(err) => {
                tracing::error!(run_id = %outcome.run_id, error = %err, "failed to write trace");
                errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    });

    let completed = completed.load(Ordering::Relaxed);
    let errors = errors.load(Ordering::Relaxed);

    println!("Completed: {completed}/{total}");
    if errors > 0 {
        println!("Errors: {errors}");
    }
    tracing::info!(completed, total, errors, "matrix finished");

    if errors > 0 {
        anyhow::bail!("{errors} of {total} matrix cells failed");
    }
    Ok(())
}

/// Loads each distinct seed path exactly once, regardless of how many
/// matrix cells reference it.
fn load_distinct_seeds(paths: &[PathBuf]) -> HashMap<PathBuf, Result<Seed, dut_core::SeedError>> {
    let mut loaded = HashMap::new();
    for path in paths {
        loaded
            .entry(path.clone())
            .or_insert_with(|| Seed::load(path));
    }
    loaded
}

/// Parses a `--schedule-seeds` override: either a single value ("42")
/// or an inclusive range ("0-99"), matching the original C DUT's
/// `parse_schedule_seed_range`.
fn parse_schedule_seed_range(text: &str) -> Result<ScheduleSeedRange> {
    if let Some((start, end)) = text.split_once('-') {
        let start: u64 = start.trim().parse().context("invalid range start")?;
        let end: u64 = end.trim().parse().context("invalid range end")?;
        anyhow::ensure!(start <= end, "range start must not exceed end");
        Ok(ScheduleSeedRange { start, end })
    } else {
        let value: u64 = text.trim().parse().context("invalid schedule seed")?;
        Ok(ScheduleSeedRange {
            start: value,
            end: value,
        })
    }
}
