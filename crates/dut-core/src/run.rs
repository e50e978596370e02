//! The run driver: composes the storage model, scheduler, and fault
//! injection into the deterministic interleaving loop that produces a
//! trace (spec §4.E).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::command::Status;
use crate::error::RunError;
use crate::scheduler::{BoundK, Policy, Scheduler, BATCH_SIZE};
use crate::seed::Seed;
use crate::storage::StorageModel;
use crate::trace::{TraceEmitter, TraceEvent};

/// Fault mode injected partway through a run (spec §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultMode {
    None,
    Timeout,
    Reset,
}

impl FaultMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FaultMode::None => "NONE",
            FaultMode::Timeout => "TIMEOUT",
            FaultMode::Reset => "RESET",
        }
    }
}

impl fmt::Display for FaultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(FaultMode::None),
            "TIMEOUT" => Ok(FaultMode::Timeout),
            "RESET" => Ok(FaultMode::Reset),
            other => Err(format!("unknown fault_mode '{other}'")),
        }
    }
}

/// The submit-side bound on `|pending|` (spec §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitWindow {
    Inf,
    Finite(usize),
}

impl SubmitWindow {
    /// The comparison value used by `|pending| < submit_window`.
    /// `Inf` returns `usize::MAX`, which a finite `|pending|` is
    /// always strictly less than.
    pub fn value(self) -> usize {
        match self {
            SubmitWindow::Inf => usize::MAX,
            SubmitWindow::Finite(n) => n,
        }
    }

    pub fn to_string_token(self) -> String {
        match self {
            SubmitWindow::Inf => "inf".to_string(),
            SubmitWindow::Finite(n) => n.to_string(),
        }
    }
}

impl FromStr for SubmitWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("inf") {
            return Ok(SubmitWindow::Inf);
        }
        s.parse::<usize>()
            .map(SubmitWindow::Finite)
            .map_err(|_| format!("invalid submit_window '{s}'"))
    }
}

/// Everything that identifies and parameterizes one run (spec §3, §6).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub seed_id: String,
    pub schedule_seed: u64,
    pub policy: Policy,
    pub bound_k: BoundK,
    pub fault_mode: FaultMode,
    pub submit_window: SubmitWindow,
    pub scheduler_version: String,
    pub git_commit: String,
}

impl RunConfig {
    /// The stable run identity string (spec §4.E): the key a
    /// downstream oracle uses to match runs across implementations.
    pub fn run_id(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.seed_id,
            self.policy,
            self.bound_k.to_string_token(),
            self.schedule_seed,
            self.fault_mode,
        )
    }
}

/// The result of a completed run: its trace plus the summary fields a
/// caller (e.g. `dut-cli`'s `run-one` output) reports.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: String,
    pub trace: TraceEmitter,
    pub pending_left: u32,
    pub pending_peak: u32,
    pub had_reset: bool,
    pub commands_lost: u32,
}

impl RunOutcome {
    /// Flushes the trace to `path`, one event per line, atomically
    /// (a single buffered write) so a failure never leaves a
    /// partially-written trace (spec §4.D, §7).
    pub fn write_trace(&self, path: &Path) -> Result<(), RunError> {
        let file = std::fs::File::create(path).map_err(|source| RunError::SinkWrite {
            path: path.to_path_buf(),
            source,
        })?;
        self.trace
            .flush_to(std::io::BufWriter::new(file))
            .map_err(|source| RunError::SinkWrite {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Executes `seed` under `config` and returns the resulting trace and
/// summary. Pure compute — no filesystem I/O (spec §5: "no operation
/// suspends"; the sink flush is a separate, explicit step).
pub fn execute(seed: &Seed, config: &RunConfig) -> RunOutcome {
    let mut model = StorageModel::new();
    let mut scheduler = Scheduler::new(config.policy, config.bound_k, config.schedule_seed);
    let mut trace = TraceEmitter::new();

    let n_cmds = seed.commands.len();
    let run_id = config.run_id();

    trace.push(TraceEvent::RunHeader {
        run_id: run_id.clone(),
        seed_id: config.seed_id.clone(),
        schedule_seed: config.schedule_seed,
        policy: config.policy,
        bound_k: config.bound_k,
        fault_mode: config.fault_mode.as_str(),
        n_cmds,
        submit_window: config.submit_window.to_string_token(),
        scheduler_version: config.scheduler_version.clone(),
        git_commit: config.git_commit.clone(),
    });

    let submit_window = config.submit_window.value();

    let mut next_cmd_idx = 0usize;
    let mut step_count: usize = 0;
    let fault_step = if config.fault_mode == FaultMode::None {
        usize::MAX
    } else {
        n_cmds / 2
    };
    let mut fault_injected = false;
    let mut stop_submits = false;
    let mut batch_remaining: u32 = 0;
    let mut observed_peak: u32 = 0;

    'driver: loop {
        let pending_count = model.pending_count();
        #[cfg(feature = "canary-submit-window-inclusive")]
        // INJECT_BUG_ID 1: allows one extra submission past the window.
        let submit_ok = !stop_submits && next_cmd_idx < n_cmds && pending_count <= submit_window;
        #[cfg(not(feature = "canary-submit-window-inclusive"))]
        let submit_ok = !stop_submits && next_cmd_idx < n_cmds && pending_count < submit_window;
        let complete_ok = pending_count > 0;

        if !submit_ok && !complete_ok {
            break;
        }

        let do_complete = if config.policy == Policy::Batched && batch_remaining > 0 && complete_ok
        {
            true
        } else if submit_ok && complete_ok {
            scheduler.next_bit() == 1
        } else {
            complete_ok
        };

        if do_complete {
            if !fault_injected && step_count >= fault_step {
                match config.fault_mode {
                    FaultMode::Timeout => {
                        let pending_sorted = model.pending_canonical();
                        if let Some(&timeout_id) = pending_sorted.first() {
                            if let Some(result) = model.complete(timeout_id, Some(Status::Timeout))
                            {
                                trace.push(TraceEvent::Complete {
                                    cmd_id: result.cmd_id,
                                    status: result.status,
                                    out: result.output,
                                });
                            }
                        }
                        fault_injected = true;
                        stop_submits = true;
                        step_count += 1;
                        continue 'driver;
                    }
                    FaultMode::Reset => {
                        let pending_before = model.reset();
                        trace.push(TraceEvent::Reset {
                            reason: "INJECTED",
                            pending_before,
                        });
                        fault_injected = true;
                        break 'driver;
                    }
                    FaultMode::None => unreachable!("fault_step is usize::MAX when None"),
                }
            }

            let pending_sorted = model.pending_canonical();
            if config.policy == Policy::Batched && batch_remaining == 0 {
                batch_remaining = BATCH_SIZE.min(pending_sorted.len() as u32);
            }

            if let Some(decision) = scheduler.pick_next(&pending_sorted) {
                if let Some(result) = model.complete(decision.cmd_id, None) {
                    trace.push(TraceEvent::Complete {
                        cmd_id: result.cmd_id,
                        status: result.status,
                        out: result.output,
                    });
                    if config.policy == Policy::Batched && batch_remaining > 0 {
                        batch_remaining -= 1;
                    }
                }
            }
            step_count += 1;
        } else {
            let command = seed.commands[next_cmd_idx];
            let (cmd_id, fence_id) = model.submit(command);
            trace.push(TraceEvent::Submit {
                cmd_id,
                cmd_type: command.type_name(),
            });
            if let Some(fence_id) = fence_id {
                trace.push(TraceEvent::Fence { fence_id });
            }
            next_cmd_idx += 1;

            let current = model.pending_count() as u32;
            if current > observed_peak {
                observed_peak = current;
            }
        }
    }

    let pending_left = model.pending_count() as u32;
    let pending_peak = observed_peak.max(model.pending_peak());

    trace.push(TraceEvent::RunEnd {
        pending_left,
        pending_peak,
    });

    RunOutcome {
        run_id,
        trace,
        pending_left,
        pending_peak,
        had_reset: model.had_reset(),
        commands_lost: model.commands_lost_to_reset(),
    }
}
