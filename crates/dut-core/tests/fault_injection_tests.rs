//! Fault injection laws (spec.md §8, properties 9-10; scenarios
//! S5-S6): TIMEOUT stops submission after exactly one forced
//! completion, and RESET is the last event before RUN_END.

mod support;

use dut_core::{execute, BoundK, Command, FaultMode, Policy, RunConfig};
use proptest::prelude::*;
use support::{arb_bound_k, arb_commands, arb_policy, field_value, seed};

fn config_with_fault(
    policy: Policy,
    bound_k: BoundK,
    fault_mode: FaultMode,
    schedule_seed: u64,
) -> RunConfig {
    RunConfig {
        seed_id: "prop".to_string(),
        schedule_seed,
        policy,
        bound_k,
        fault_mode,
        submit_window: dut_core::SubmitWindow::Inf,
        scheduler_version: "v1.0".to_string(),
        git_commit: String::new(),
    }
}

proptest! {
    /// Property 9: at most one COMPLETE has `status=TIMEOUT`; no
    /// SUBMIT line appears after it.
    #[test]
    fn timeout_fault_stops_submission_exactly_once(
        commands in arb_commands(60),
        policy in arb_policy(),
        bound_k in arb_bound_k(),
        schedule_seed in any::<u64>(),
    ) {
        let cfg = config_with_fault(policy, bound_k, FaultMode::Timeout, schedule_seed);
        let outcome = execute(&seed(commands), &cfg);
        let lines = outcome.trace.lines();

        let timeout_count = lines
            .iter()
            .filter(|l| l.starts_with("COMPLETE") && l.contains("status=TIMEOUT"))
            .count();
        prop_assert!(timeout_count <= 1);

        if let Some(pos) = lines.iter().position(|l| l.contains("status=TIMEOUT")) {
            prop_assert!(
                lines[pos..].iter().all(|l| !l.starts_with("SUBMIT")),
                "SUBMIT observed after injected TIMEOUT"
            );
        }
    }

    /// Property 10: at most one RESET line; if present, it is the
    /// last event before RUN_END, and no COMPLETE follows it.
    #[test]
    fn reset_fault_is_last_event_before_run_end(
        commands in arb_commands(60),
        policy in arb_policy(),
        bound_k in arb_bound_k(),
        schedule_seed in any::<u64>(),
    ) {
        let cfg = config_with_fault(policy, bound_k, FaultMode::Reset, schedule_seed);
        let outcome = execute(&seed(commands), &cfg);
        let lines = outcome.trace.lines();

        let reset_count = lines.iter().filter(|l| l.starts_with("RESET")).count();
        prop_assert!(reset_count <= 1);

        if let Some(pos) = lines.iter().position(|l| l.starts_with("RESET")) {
            prop_assert_eq!(pos, lines.len() - 2, "RESET must precede RUN_END directly");
            prop_assert!(lines[lines.len() - 1].starts_with("RUN_END"));
            prop_assert!(
                !lines[pos + 1..].iter().any(|l| l.starts_with("COMPLETE")),
                "COMPLETE observed after RESET"
            );
        }
    }
}

/// Scenario S5: a 10-command workload under TIMEOUT fault mode.
#[test]
fn scenario_s5_timeout_reports_correct_pending_left() {
    let commands: Vec<Command> = (0..10)
        .map(|i| Command::Write {
            lba: i,
            len: 1,
            pattern: i as u32,
        })
        .collect();
    let cfg = config_with_fault(Policy::Fifo, BoundK::Inf, FaultMode::Timeout, 7);
    let outcome = execute(&seed(commands), &cfg);
    let lines = outcome.trace.lines();

    let submits = lines.iter().filter(|l| l.starts_with("SUBMIT")).count() as u32;
    let completes = lines.iter().filter(|l| l.starts_with("COMPLETE")).count() as u32;
    assert_eq!(outcome.pending_left, submits - completes);
}

/// Scenario S6: `pending_before` on the RESET line equals submits
/// minus completes observed strictly before that point.
#[test]
fn scenario_s6_reset_pending_before_matches_submit_minus_complete() {
    let commands: Vec<Command> = (0..10)
        .map(|i| Command::Write {
            lba: i,
            len: 1,
            pattern: i as u32,
        })
        .collect();
    let cfg = config_with_fault(Policy::Fifo, BoundK::Inf, FaultMode::Reset, 3);
    let outcome = execute(&seed(commands), &cfg);
    let lines = outcome.trace.lines();

    let reset_pos = lines.iter().position(|l| l.starts_with("RESET")).unwrap();
    let submits_before = lines[..reset_pos]
        .iter()
        .filter(|l| l.starts_with("SUBMIT"))
        .count() as u64;
    let completes_before = lines[..reset_pos]
        .iter()
        .filter(|l| l.starts_with("COMPLETE"))
        .count() as u64;
    let pending_before = field_value(&lines[reset_pos], "pending_before");

    assert_eq!(pending_before, submits_before - completes_before);
}

/// `submit_window = 0` is a valid degenerate case (spec.md §9): it
/// forbids submission entirely and the run halts immediately with no
/// SUBMIT/COMPLETE lines at all.
#[test]
fn submit_window_zero_halts_immediately() {
    let cfg = RunConfig {
        submit_window: dut_core::SubmitWindow::Finite(0),
        ..config_with_fault(Policy::Fifo, BoundK::Inf, FaultMode::None, 0)
    };
    let outcome = execute(&seed(vec![Command::Fence, Command::Fence]), &cfg);
    let lines = outcome.trace.lines();
    assert!(lines.iter().all(|l| !l.starts_with("SUBMIT") && !l.starts_with("COMPLETE")));
    assert_eq!(lines.len(), 2, "only RUN_HEADER and RUN_END");
}
