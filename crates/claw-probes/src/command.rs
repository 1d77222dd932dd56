//! Bounded external command execution.
//!
//! Every probe subprocess runs with a hard timeout. Expiry kills the child
//! and is reported as `CommandOutcome::TimedOut`, never as an error.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;
use wait_timeout::ChildExt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `CommandOutput` captured from a finished process.
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn status_label(&self) -> String {
        self.code
            .map(|value| value.to_string())
            .unwrap_or_else(|| "terminated_by_signal".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `CommandOutcome` values.
pub enum CommandOutcome {
    Completed(CommandOutput),
    TimedOut,
}

impl CommandOutcome {
    /// Trimmed stdout of a successful run.
    pub fn success_stdout(&self) -> Option<String> {
        match self {
            CommandOutcome::Completed(output) if output.success => {
                Some(output.stdout.trim().to_string())
            }
            _ => None,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, CommandOutcome::Completed(output) if output.success)
    }
}

fn drain<R: Read + Send + 'static>(source: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut source) = source {
            let _ = source.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).to_string()
    })
}

fn render_command(program: &Path, args: &[&str]) -> String {
    let mut parts = Vec::with_capacity(args.len().saturating_add(1));
    parts.push(program.display().to_string());
    parts.extend(args.iter().map(|arg| arg.to_string()));
    parts.join(" ")
}

/// Runs `program args...` with stdin closed and output captured.
///
/// Returns `Err` only when the process cannot be spawned or waited on.
pub fn run_bounded(program: &Path, args: &[&str], timeout: Duration) -> Result<CommandOutcome> {
    let command_str = render_command(program, args);
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn {command_str}"))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let timeout = timeout.max(Duration::from_millis(1));
    let status = match child
        .wait_timeout(timeout)
        .with_context(|| format!("failed while waiting for {command_str}"))?
    {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            debug!(command = %command_str, timeout_ms = timeout.as_millis() as u64, "command timed out");
            return Ok(CommandOutcome::TimedOut);
        }
    };

    let output = CommandOutput {
        success: status.success(),
        code: status.code(),
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    };
    debug!(command = %command_str, status = %output.status_label(), "command finished");
    Ok(CommandOutcome::Completed(output))
}

/// Like `run_bounded`, folding spawn failures into `None` for absence checks.
pub fn probe_command(program: &Path, args: &[&str], timeout: Duration) -> Option<CommandOutcome> {
    match run_bounded(program, args, timeout) {
        Ok(outcome) => Some(outcome),
        Err(error) => {
            debug!(error = %format!("{error:#}"), "command unavailable");
            None
        }
    }
}
