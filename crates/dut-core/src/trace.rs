//! The canonical trace grammar (spec §4.D, §6) and a buffered emitter
//! that flushes atomically at run end.

use std::fmt;
use std::io::Write;

use crate::command::Status;
use crate::scheduler::{BoundK, Policy};

/// One observable event in a run's trace. `Display` renders it in the
/// exact wire format downstream oracles parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    RunHeader {
        run_id: String,
        seed_id: String,
        schedule_seed: u64,
        policy: Policy,
        bound_k: BoundK,
        fault_mode: &'static str,
        n_cmds: usize,
        submit_window: String,
        scheduler_version: String,
        git_commit: String,
    },
    Submit {
        cmd_id: u32,
        cmd_type: &'static str,
    },
    Fence {
        fence_id: u32,
    },
    Complete {
        cmd_id: u32,
        status: Status,
        out: u32,
    },
    Reset {
        reason: &'static str,
        pending_before: u32,
    },
    RunEnd {
        pending_left: u32,
        pending_peak: u32,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::RunHeader {
                run_id,
                seed_id,
                schedule_seed,
                policy,
                bound_k,
                fault_mode,
                n_cmds,
                submit_window,
                scheduler_version,
                git_commit,
            } => write!(
                f,
                "RUN_HEADER(run_id={run_id}, seed_id={seed_id}, schedule_seed={schedule_seed}, \
                 policy={policy}, bound_k={bound_k}, fault_mode={fault_mode}, n_cmds={n_cmds}, \
                 submit_window={submit_window}, scheduler_version={scheduler_version}, \
                 git_commit={git_commit})",
                bound_k = bound_k.to_string_token(),
            ),
            TraceEvent::Submit { cmd_id, cmd_type } => {
                write!(f, "SUBMIT(cmd_id={cmd_id}, cmd_type={cmd_type})")
            }
            TraceEvent::Fence { fence_id } => write!(f, "FENCE(fence_id={fence_id})"),
            TraceEvent::Complete {
                cmd_id,
                status,
                out,
            } => write!(
                f,
                "COMPLETE(cmd_id={cmd_id}, status={status}, out={out})",
                status = status.as_str()
            ),
            TraceEvent::Reset {
                reason,
                pending_before,
            } => write!(f, "RESET(reason={reason}, pending_before={pending_before})"),
            TraceEvent::RunEnd {
                pending_left,
                pending_peak,
            } => write!(
                f,
                "RUN_END(pending_left={pending_left}, pending_peak={pending_peak})"
            ),
        }
    }
}

/// Buffers trace lines in emission order and flushes them as a single
/// write at run end, so a crash or panic mid-run never leaves a
/// partially-written trace file on disk (spec §4.D, §5).
#[derive(Debug, Default)]
pub struct TraceEmitter {
    lines: Vec<String>,
}

impl TraceEmitter {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.lines.push(event.to_string());
    }

    /// The buffered lines in emission order, for callers that want to
    /// inspect or re-parse the trace without touching a filesystem.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Writes every buffered line to `writer`, UTF-8 text with Unix
    /// line endings, each line newline-terminated. A trace with zero
    /// lines writes zero bytes.
    pub fn flush_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        let mut buf = String::new();
        for line in &self.lines {
            buf.push_str(line);
            buf.push('\n');
        }
        writer.write_all(buf.as_bytes())?;
        writer.flush()
    }
}
