use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use claw_cli::{
    build_probe_environment, build_probe_registry, render_shell_completion, Cli, CliCommand,
    CliOutputFormat,
};
use claw_diagnostics::{DoctorError, Orchestrator, PassOptions, ProbeRegistry};
use serde_json::Value;
use tracing::debug;

use crate::progress::ProgressObserver;
use crate::report::{
    render_listing_json, render_listing_text, render_pass_json, render_pass_text,
    render_single_json, render_single_text, render_unknown_check,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Process-level verdict of one invocation.
pub(crate) enum RunStatus {
    Healthy,
    Failed,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Healthy => ExitCode::SUCCESS,
            RunStatus::Failed => ExitCode::from(1),
        }
    }
}

pub(crate) fn run_cli(cli: &Cli) -> Result<RunStatus> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut err = stderr.lock();

    if let CliCommand::Completions { shell } = cli.resolved_command() {
        render_shell_completion(shell, &mut out)
            .with_context(|| format!("failed to write {} completion script", shell.as_str()))?;
        return Ok(RunStatus::Healthy);
    }

    let env = Arc::new(build_probe_environment(&cli.environment)?);
    debug!(environment = ?env, "resolved probe environment");
    let registry = build_probe_registry(&cli.environment, env);
    execute_command(cli, &registry, &mut out, &mut err)
}

/// Dispatches a parsed command against `registry`, writing reports to `out`
/// and progress or lookup errors to `err`.
pub(crate) fn execute_command(
    cli: &Cli,
    registry: &ProbeRegistry,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<RunStatus> {
    let format = cli.output_format();
    let options = PassOptions {
        attempt_fixes: cli.output.fix,
    };
    let show_progress = cli.output.verbose && format == CliOutputFormat::Text;

    match cli.resolved_command() {
        CliCommand::Doctor => {
            let report = {
                let mut observer = ProgressObserver::new(err, show_progress);
                Orchestrator::new(registry).run_pass_with_observer(options, &mut observer)
            };
            match format {
                CliOutputFormat::Json => write_json(out, &render_pass_json(&report)?)?,
                CliOutputFormat::Text => {
                    write!(out, "{}", render_pass_text(&report, cli.output.verbose))?
                }
            }
            Ok(status_for(report.has_failures()))
        }
        CliCommand::Check { name } => {
            let outcome = {
                let mut observer = ProgressObserver::new(err, show_progress);
                Orchestrator::new(registry).run_single_with_observer(&name, options, &mut observer)
            };
            let report = match outcome {
                Ok(report) => report,
                Err(DoctorError::UnknownProbe { name, .. }) => {
                    write!(err, "{}", render_unknown_check(&name, &registry.listing()))?;
                    return Ok(RunStatus::Failed);
                }
            };
            match format {
                CliOutputFormat::Json => {
                    write_json(out, &render_single_json(&report, options.attempt_fixes)?)?
                }
                CliOutputFormat::Text => {
                    write!(out, "{}", render_single_text(&report, cli.output.verbose))?
                }
            }
            Ok(status_for(report.has_failure()))
        }
        CliCommand::List => {
            let listing = registry.listing();
            match format {
                CliOutputFormat::Json => write_json(out, &render_listing_json(&listing))?,
                CliOutputFormat::Text => write!(out, "{}", render_listing_text(&listing))?,
            }
            Ok(RunStatus::Healthy)
        }
        CliCommand::Completions { shell } => {
            render_shell_completion(shell, out)?;
            Ok(RunStatus::Healthy)
        }
    }
}

fn status_for(failed: bool) -> RunStatus {
    if failed {
        RunStatus::Failed
    } else {
        RunStatus::Healthy
    }
}

fn write_json(out: &mut dyn Write, value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode JSON report")?;
    writeln!(out, "{rendered}")?;
    Ok(())
}
