//! Resolves `git_commit = "auto"` by shelling out to `git rev-parse
//! HEAD`, the same way the original C DUT's `config.c` used
//! `popen("git rev-parse HEAD ...")`. This belongs to the CLI's
//! filesystem/process plumbing, never to `dut-core` (spec.md §9).

use std::process::Command;

/// Resolves `value` to a concrete commit hash if it is the literal
/// `"auto"` sentinel; otherwise returns it unchanged. Falls back to an
/// empty string if `git` is unavailable or the working directory isn't
/// a repository — a missing commit hash is cosmetic, not fatal.
pub fn resolve(value: &str) -> String {
    if value != "auto" {
        return value.to_string();
    }

    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
