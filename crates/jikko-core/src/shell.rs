//! Subprocess invocation for handlers.
//!
//! Handlers shell out to `git`, `docker`, `ssh`, `scp`, `wrangler` and
//! `flarectl`. Every call goes through this module so arguments are always
//! passed as argv (no shell interpolation) and each invocation is traced.
//!
//! - [`run`] inherits stdio and fails on non-zero exit.
//! - [`run_quiet`] discards output and fails on non-zero exit.
//! - [`quiet`] discards output and reports success as a bool.
//! - [`capture`] returns stdout, failing on non-zero exit.
//! - [`capture_lossy`] returns stdout whatever the exit status.
//!
//! The `*_in` variants set the working directory.

use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

use crate::error::{JikkoError, Result};

/// Ensure `program` is on PATH before invoking it.
pub fn require(program: &str) -> Result<()> {
    which::which(program)
        .map(|_| ())
        .map_err(|_| JikkoError::ToolNotFound(program.to_string()))
}

pub fn run(program: &str, args: &[&str]) -> Result<()> {
    let exit = build(None, program, args).status()?;
    if !exit.success() {
        return Err(failed(program, args, exit.code()));
    }
    Ok(())
}

pub fn run_quiet(program: &str, args: &[&str]) -> Result<()> {
    run_quiet_at(None, program, args)
}

pub fn run_quiet_in(dir: &Path, program: &str, args: &[&str]) -> Result<()> {
    run_quiet_at(Some(dir), program, args)
}

/// Run with stdout and stderr discarded; only success matters.
pub fn quiet(program: &str, args: &[&str]) -> Result<bool> {
    Ok(silent_status(None, program, args)?.success())
}

pub fn capture(program: &str, args: &[&str]) -> Result<String> {
    let output = spawn_captured(None, program, args)?;
    if !output.status.success() {
        return Err(failed(program, args, output.status.code()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Stdout regardless of exit status; stderr is dropped. A program that
/// cannot be spawned yields an empty string.
pub fn capture_lossy(program: &str, args: &[&str]) -> String {
    capture_lossy_at(None, program, args)
}

pub fn capture_lossy_in(dir: &Path, program: &str, args: &[&str]) -> String {
    capture_lossy_at(Some(dir), program, args)
}

/// Stdout followed by stderr. The exit status is ignored.
pub fn capture_combined(program: &str, args: &[&str]) -> Result<String> {
    let output = build(None, program, args).stdin(Stdio::null()).output()?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(text)
}

/// Run a command on `host` over ssh. The remote command is one argument.
pub fn ssh_capture(host: &str, remote: &str) -> String {
    capture_lossy(
        "ssh",
        &["-o", "ConnectTimeout=5", "-o", "BatchMode=yes", host, remote],
    )
}

pub fn ssh_reachable(host: &str) -> Result<bool> {
    quiet(
        "ssh",
        &["-o", "ConnectTimeout=5", "-o", "BatchMode=yes", host, "echo ok"],
    )
}

/// Quote a value for inclusion in a remote shell command.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn build(dir: Option<&Path>, program: &str, args: &[&str]) -> Command {
    tracing::debug!(program, ?args, dir = ?dir, "spawning");
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd
}

fn silent_status(dir: Option<&Path>, program: &str, args: &[&str]) -> Result<ExitStatus> {
    Ok(build(dir, program, args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?)
}

fn run_quiet_at(dir: Option<&Path>, program: &str, args: &[&str]) -> Result<()> {
    let exit = silent_status(dir, program, args)?;
    if !exit.success() {
        return Err(failed(program, args, exit.code()));
    }
    Ok(())
}

fn capture_lossy_at(dir: Option<&Path>, program: &str, args: &[&str]) -> String {
    match spawn_captured(dir, program, args) {
        Ok(output) => String::from_utf8_lossy(&output.stdout).into_owned(),
        Err(e) => {
            tracing::debug!(program, error = %e, "spawn failed");
            String::new()
        }
    }
}

fn spawn_captured(dir: Option<&Path>, program: &str, args: &[&str]) -> Result<Output> {
    Ok(build(dir, program, args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?)
}

fn failed(program: &str, args: &[&str], code: Option<i32>) -> JikkoError {
    let mut command = program.to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    JikkoError::CommandFailed {
        command,
        // Killed by signal has no code.
        code: code.unwrap_or(-1),
    }
}
