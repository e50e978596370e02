//! The scheduler: chooses submit-vs-complete interleaving (via the
//! driver calling `next_bit`) and which pending command to complete
//! next under a bounded-reordering policy.

use std::fmt;
use std::str::FromStr;

use crate::rng::Splitmix64;

/// Scheduling policy governing which pending `cmd_id` is chosen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fifo,
    Random,
    Adversarial,
    Batched,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Fifo => "FIFO",
            Policy::Random => "RANDOM",
            Policy::Adversarial => "ADVERSARIAL",
            Policy::Batched => "BATCHED",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIFO" => Ok(Policy::Fifo),
            "RANDOM" => Ok(Policy::Random),
            "ADVERSARIAL" => Ok(Policy::Adversarial),
            "BATCHED" => Ok(Policy::Batched),
            other => Err(format!("unknown policy '{other}'")),
        }
    }
}

/// The reorder bound: either unbounded (`Inf`) or a finite window of
/// `k` positions past the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundK {
    Inf,
    Finite(u32),
}

impl BoundK {
    pub fn to_string_token(self) -> String {
        match self {
            BoundK::Inf => "inf".to_string(),
            BoundK::Finite(k) => k.to_string(),
        }
    }
}

impl FromStr for BoundK {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("inf") {
            return Ok(BoundK::Inf);
        }
        s.parse::<u32>()
            .map(BoundK::Finite)
            .map_err(|_| format!("invalid bound_k '{s}'"))
    }
}

/// A scheduling decision: which index in the candidate window was
/// picked, and the `cmd_id` that index resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub pick_index: usize,
    pub cmd_id: u32,
}

/// Owns the PRNG stream for one run; every decision advances it, so
/// the stream is canonical per `schedule_seed`.
#[derive(Debug)]
pub struct Scheduler {
    policy: Policy,
    bound_k: BoundK,
    rng: Splitmix64,
}

/// Fixed burst length for the `Batched` policy (spec §4.C).
pub const BATCH_SIZE: u32 = 4;

impl Scheduler {
    pub fn new(policy: Policy, bound_k: BoundK, schedule_seed: u64) -> Self {
        Self {
            policy,
            bound_k,
            rng: Splitmix64::new(schedule_seed),
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Advances the RNG and returns its low bit; this is the only
    /// place the driver consults the scheduler for submit-vs-complete
    /// interleaving (spec §4.E step 4).
    pub fn next_bit(&mut self) -> u64 {
        self.rng.next_bit()
    }

    /// The size of the head window of candidates the scheduler may
    /// choose from, given `pending_count` commands pending.
    pub fn candidates_count(&self, pending_count: usize) -> usize {
        if pending_count == 0 {
            return 0;
        }
        match self.bound_k {
            BoundK::Inf => pending_count,
            BoundK::Finite(k) => {
                #[cfg(feature = "canary-bound-off-by-one")]
                {
                    // INJECT_BUG_ID 3: allows k + 1 positions of reorder
                    // instead of k.
                    let max_idx = if (k as usize) + 1 < pending_count {
                        (k as usize) + 1
                    } else {
                        pending_count - 1
                    };
                    return max_idx + 1;
                }
                #[cfg(not(feature = "canary-bound-off-by-one"))]
                {
                    let max_idx = (k as usize).min(pending_count - 1);
                    max_idx + 1
                }
            }
        }
    }

    /// Picks the next pending command to complete. `pending_sorted`
    /// must be in ascending `cmd_id` order (spec §4.C).
    ///
    /// Returns `None` if `pending_sorted` is empty.
    pub fn pick_next(&mut self, pending_sorted: &[u32]) -> Option<Decision> {
        let n = self.candidates_count(pending_sorted.len());
        if n == 0 {
            return None;
        }

        let pick_index = match self.policy {
            Policy::Fifo => 0,
            Policy::Adversarial => n - 1,
            Policy::Random | Policy::Batched => self.rng.range(n as u64) as usize,
        };

        Some(Decision {
            pick_index,
            cmd_id: pending_sorted[pick_index],
        })
    }
}
