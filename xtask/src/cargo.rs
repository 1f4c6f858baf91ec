//! Thin wrapper over `cargo` subprocesses shared by every task.

use anyhow::{Context, Result};
use std::process::Command;
use std::time::{Duration, Instant};

/// Captured result of one `cargo` invocation.
pub struct Outcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Run `cargo <args>` to completion, capturing its output.
pub fn run(args: &[&str]) -> Result<Outcome> {
    let start = Instant::now();
    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("failed to spawn `cargo {}`", args.join(" ")))?;
    Ok(Outcome {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        elapsed: start.elapsed(),
    })
}

/// Features that switch the library crates to their host build.
pub const HOST_FEATURES: &str = "platform/std,controls/std";

/// Library crates of the workspace.
pub const LIBRARY_CRATES: [&str; 2] = ["platform", "controls"];
