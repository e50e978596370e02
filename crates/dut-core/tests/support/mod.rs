//! Shared scaffolding for the scenario/property integration tests
//! (spec.md §8): an arbitrary-command `proptest` strategy and small
//! builders so each test file only states what it's checking.
//!
//! Not every test binary that includes this module uses every
//! function in it.
#![allow(dead_code)]

use dut_core::{BoundK, Command, FaultMode, Policy, RunConfig, Seed, SubmitWindow};
use proptest::prelude::*;

/// A `proptest` strategy generating one arbitrary [`Command`], biased
/// toward small `lba`/`len` so most generated ranges land inside
/// `STORAGE_SIZE` (1024 words) rather than tripping the out-of-range
/// `ERR` path on almost every draw.
pub fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0u64..1000, 1u32..20, any::<u32>())
            .prop_map(|(lba, len, pattern)| Command::Write { lba, len, pattern }),
        (0u64..1000, 1u32..20).prop_map(|(lba, len)| Command::Read { lba, len }),
        Just(Command::Fence),
        (0u64..1000, 1u32..20).prop_map(|(lba, len)| Command::WriteVisible { lba, len }),
    ]
}

/// A sequence of 1..=`max_len` arbitrary commands.
pub fn arb_commands(max_len: usize) -> impl Strategy<Value = Vec<Command>> {
    prop::collection::vec(arb_command(), 1..=max_len)
}

/// A `proptest` strategy over the four scheduling policies.
pub fn arb_policy() -> impl Strategy<Value = Policy> {
    prop_oneof![
        Just(Policy::Fifo),
        Just(Policy::Random),
        Just(Policy::Adversarial),
        Just(Policy::Batched),
    ]
}

/// A `proptest` strategy over `BoundK`, weighted toward finite bounds
/// since those are where reordering rules are actually exercised.
pub fn arb_bound_k() -> impl Strategy<Value = BoundK> {
    prop_oneof![
        1 => Just(BoundK::Inf),
        4 => (0u32..6).prop_map(BoundK::Finite),
    ]
}

pub fn seed(commands: Vec<Command>) -> Seed {
    Seed {
        seed_id: "prop".to_string(),
        commands,
    }
}

pub fn config(policy: Policy, bound_k: BoundK, schedule_seed: u64) -> RunConfig {
    RunConfig {
        seed_id: "prop".to_string(),
        schedule_seed,
        policy,
        bound_k,
        fault_mode: FaultMode::None,
        submit_window: SubmitWindow::Inf,
        scheduler_version: "v1.0".to_string(),
        git_commit: String::new(),
    }
}

/// Extracts the decimal value of a `field=value` token from a trace
/// line, e.g. `field_value(line, "cmd_id")` on
/// `"COMPLETE(cmd_id=3, status=OK, out=0)"` returns `3`.
pub fn field_value(line: &str, field: &str) -> u64 {
    let needle = format!("{field}=");
    let start = line.find(&needle).unwrap_or_else(|| {
        panic!("field '{field}' not found in line '{line}'");
    }) + needle.len();
    let rest = &line[start..];
    let end = rest
        .find(|c: char| c == ',' || c == ')')
        .unwrap_or(rest.len());
    rest[..end].parse().unwrap_or_else(|_| {
        panic!("field '{field}' in line '{line}' is not a decimal integer");
    })
}
