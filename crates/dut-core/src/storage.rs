//! The storage/command model: dual host/device visibility, the
//! pending-command set, and command execution.
//!
//! This is the half of the DUT that defines what a command *means*.
//! The scheduler and run driver only decide *when* things happen; this
//! module decides *what happens* when a command executes.

use std::collections::BTreeMap;

use crate::command::{Command, CommandResult, PendingCommand, Status};

/// Storage size in 32-bit words (spec §3).
pub const STORAGE_SIZE: usize = 1024;

/// The NVMe-lite storage model, owned exclusively by one run.
#[derive(Debug)]
pub struct StorageModel {
    host_storage: [u32; STORAGE_SIZE],
    dev_storage: [u32; STORAGE_SIZE],
    pending: BTreeMap<u32, PendingCommand>,
    next_cmd_id: u32,
    next_fence_id: u32,
    pending_peak: u32,
    had_reset: bool,
    commands_lost_to_reset: u32,
}

impl Default for StorageModel {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageModel {
    /// Creates a model with zeroed storage and an empty pending set.
    pub fn new() -> Self {
        Self {
            host_storage: [0; STORAGE_SIZE],
            dev_storage: [0; STORAGE_SIZE],
            pending: BTreeMap::new(),
            next_cmd_id: 0,
            next_fence_id: 0,
            pending_peak: 0,
            had_reset: false,
            commands_lost_to_reset: 0,
        }
    }

    /// Submits `command`, assigning it a fresh, strictly-increasing
    /// `cmd_id`. Never fails. Returns the assigned id and, for a
    /// `Fence`, its freshly-allocated `fence_id`.
    pub fn submit(&mut self, command: Command) -> (u32, Option<u32>) {
        let cmd_id = self.next_cmd_id;
        self.next_cmd_id += 1;

        let fence_id = if command.is_fence() {
            let id = self.next_fence_id;
            self.next_fence_id += 1;
            Some(id)
        } else {
            None
        };

        self.pending.insert(
            cmd_id,
            PendingCommand {
                cmd_id,
                command,
                fence_id,
            },
        );

        let pending_count = self.pending.len() as u32;
        if pending_count > self.pending_peak {
            self.pending_peak = pending_count;
        }

        (cmd_id, fence_id)
    }

    /// The pending set's `cmd_id`s in canonical (ascending) order.
    pub fn pending_canonical(&self) -> Vec<u32> {
        self.pending.keys().copied().collect()
    }

    /// The number of commands currently pending.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The highest `|pending|` ever observed by this model.
    pub fn pending_peak(&self) -> u32 {
        self.pending_peak
    }

    pub fn had_reset(&self) -> bool {
        self.had_reset
    }

    pub fn commands_lost_to_reset(&self) -> u32 {
        self.commands_lost_to_reset
    }

    /// Completes `cmd_id`. If `force_status` is given, the command is
    /// completed with that status and no storage mutation occurs
    /// (spec §4.B — used for injected TIMEOUT faults). Otherwise the
    /// command is executed against storage.
    ///
    /// Returns `None` if `cmd_id` is not pending (already completed,
    /// never submitted, or discarded by a prior `reset`).
    pub fn complete(&mut self, cmd_id: u32, force_status: Option<Status>) -> Option<CommandResult> {
        #[cfg(feature = "canary-complete-wrong-id")]
        let cmd_id = {
            // INJECT_BUG_ID 5: complete cmd_id + 1 instead, if present.
            let bumped = cmd_id + 1;
            if self.pending.contains_key(&bumped) {
                bumped
            } else {
                cmd_id
            }
        };

        let pending = self.pending.remove(&cmd_id)?;

        let (status, output) = match force_status {
            Some(status) => (status, 0),
            None => self.execute(pending.command),
        };

        Some(CommandResult {
            cmd_id,
            status,
            output,
        })
    }

    /// Resets the model: discards every pending command. Storage
    /// arrays and the `next_cmd_id`/`next_fence_id` counters are left
    /// untouched (spec §4.B — a reset is not a restart).
    pub fn reset(&mut self) -> u32 {
        let pending_before = self.pending.len() as u32;

        #[cfg(feature = "canary-reset-undercounts")]
        {
            // INJECT_BUG_ID 4: undercount commands lost by one.
            self.commands_lost_to_reset = pending_before.saturating_sub(1);
        }
        #[cfg(not(feature = "canary-reset-undercounts"))]
        {
            self.commands_lost_to_reset = pending_before;
        }

        self.pending.clear();
        self.had_reset = true;
        pending_before
    }

    fn execute(&mut self, command: Command) -> (Status, u32) {
        match command {
            Command::Write { lba, len, pattern } => {
                let Some(range) = word_range(lba, len) else {
                    return (Status::Err, 0);
                };
                for i in range {
                    self.host_storage[i] = pattern;
                    #[cfg(feature = "canary-write-visible-immediately")]
                    {
                        // INJECT_BUG_ID 101: WRITE becomes immediately visible.
                        self.dev_storage[i] = pattern;
                    }
                }
                (Status::Ok, 0)
            }
            Command::Read { lba, len } => {
                let Some(range) = word_range(lba, len) else {
                    return (Status::Err, 0);
                };
                let mut hash: u32 = 0;
                for i in range {
                    hash = hash.wrapping_mul(31).wrapping_add(self.dev_storage[i]);
                }
                (Status::Ok, hash)
            }
            Command::Fence => {
                #[cfg(feature = "canary-fence-returns-err")]
                {
                    // INJECT_BUG_ID 2: fence returns ERR instead of OK.
                    return (Status::Err, 0);
                }
                #[cfg(not(feature = "canary-fence-returns-err"))]
                (Status::Ok, 0)
            }
            Command::WriteVisible { lba, len } => {
                let Some(range) = word_range(lba, len) else {
                    return (Status::Err, 0);
                };

                #[cfg(feature = "canary-partial-flush")]
                {
                    // INJECT_BUG_ID 102: flushes len - 1 words instead of len.
                    let end = range.end.saturating_sub(1).max(range.start);
                    for i in range.start..end {
                        self.dev_storage[i] = self.host_storage[i];
                    }
                }
                #[cfg(feature = "canary-partial-flush-alternate")]
                {
                    // INJECT_BUG_ID 103: flushes only every other word.
                    for i in range.step_by(2) {
                        self.dev_storage[i] = self.host_storage[i];
                    }
                }
                #[cfg(not(any(
                    feature = "canary-partial-flush",
                    feature = "canary-partial-flush-alternate"
                )))]
                {
                    for i in range {
                        self.dev_storage[i] = self.host_storage[i];
                    }
                }
                (Status::Ok, 0)
            }
        }
    }
}

/// Validates `lba..lba+len` against `STORAGE_SIZE`, returning the
/// usable `usize` range or `None` on out-of-range access (spec §3, §4.B).
fn word_range(lba: u64, len: u32) -> Option<std::ops::Range<usize>> {
    let start = usize::try_from(lba).ok()?;
    let end = start.checked_add(len as usize)?;
    if end > STORAGE_SIZE {
        return None;
    }
    Some(start..end)
}
