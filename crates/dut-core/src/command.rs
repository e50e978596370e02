//! Command, status, and pending-command types shared by the storage
//! model, scheduler, and run driver.

use serde::Deserialize;

/// A single storage command from a seed workload.
///
/// Tagged variants rather than a flag-plus-payload struct: there is no
/// sentinel value standing in for "this field doesn't apply to this
/// command type".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "WRITE")]
    Write { lba: u64, len: u32, pattern: u32 },
    #[serde(rename = "READ")]
    Read { lba: u64, len: u32 },
    #[serde(rename = "FENCE")]
    Fence,
    #[serde(rename = "WRITE_VISIBLE")]
    WriteVisible { lba: u64, len: u32 },
}

impl Command {
    /// The trace grammar's `cmd_type` token for this command (spec §4.D).
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::Write { .. } => "WRITE",
            Command::Read { .. } => "READ",
            Command::Fence => "FENCE",
            Command::WriteVisible { .. } => "WRITE_VISIBLE",
        }
    }

    pub fn is_fence(&self) -> bool {
        matches!(self, Command::Fence)
    }
}

/// Terminal status of a completed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Err,
    Timeout,
}

impl Status {
    /// The trace grammar's `status` token (spec §4.D).
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Err => "ERR",
            Status::Timeout => "TIMEOUT",
        }
    }
}

/// A command that has been submitted but not yet completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    pub cmd_id: u32,
    pub command: Command,
    pub fence_id: Option<u32>,
}

/// The outcome of executing (or force-completing) a pending command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    pub cmd_id: u32,
    pub status: Status,
    pub output: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_write() {
        let json = r#"{"type":"WRITE","lba":0,"len":2,"pattern":170}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            Command::Write {
                lba: 0,
                len: 2,
                pattern: 170
            }
        );
        assert_eq!(cmd.type_name(), "WRITE");
    }

    #[test]
    fn deserializes_fence() {
        let json = r#"{"type":"FENCE"}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(cmd, Command::Fence);
        assert!(cmd.is_fence());
    }

    #[test]
    fn status_strings_match_trace_grammar() {
        assert_eq!(Status::Ok.as_str(), "OK");
        assert_eq!(Status::Err.as_str(), "ERR");
        assert_eq!(Status::Timeout.as_str(), "TIMEOUT");
    }
}
