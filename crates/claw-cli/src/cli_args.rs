use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{CliOutputFormat, CliShellCompletion};
use claw_probes::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_INSTALL_TIMEOUT_MS, DEFAULT_NETWORK_TIMEOUT_MS,
    DEFAULT_STARTER_TIMEOUT_MS,
};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "claw-doctor",
    about = "Diagnose and repair an OpenClaw installation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    #[command(flatten)]
    pub output: OutputFlags,

    #[command(flatten)]
    pub environment: EnvironmentFlags,
}

impl Cli {
    /// Bare `claw-doctor` behaves like `claw-doctor doctor`.
    pub fn resolved_command(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Doctor)
    }

    pub fn output_format(&self) -> CliOutputFormat {
        if self.output.json {
            CliOutputFormat::Json
        } else {
            CliOutputFormat::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Run every check (default).
    Doctor,
    /// Run one check by name or alias, e.g. `node` or `api-keys`.
    Check {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// List available checks.
    #[command(alias = "list-checks")]
    List,
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: CliShellCompletion,
    },
}

#[derive(Debug, Clone, Args)]
pub struct OutputFlags {
    #[arg(
        short = 'f',
        long = "fix",
        env = "CLAW_DOCTOR_FIX",
        global = true,
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Attempt to fix issues that support automatic remediation"
    )]
    pub fix: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        env = "CLAW_DOCTOR_VERBOSE",
        global = true,
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Show details and progress for every check"
    )]
    pub verbose: bool,

    #[arg(
        short = 'j',
        long = "json",
        env = "CLAW_DOCTOR_JSON",
        global = true,
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Emit results as pretty JSON on stdout"
    )]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EnvironmentFlags {
    #[arg(
        long = "extended",
        env = "CLAW_DOCTOR_EXTENDED",
        global = true,
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Also run the folder layout and log scan checks"
    )]
    pub extended: bool,

    #[arg(
        long = "offline",
        env = "CLAW_DOCTOR_OFFLINE",
        global = true,
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Skip network reachability checks"
    )]
    pub offline: bool,

    #[arg(
        long = "home",
        env = "CLAW_DOCTOR_HOME",
        global = true,
        value_name = "DIR",
        help = "Home directory to inspect instead of the current user's"
    )]
    pub home: Option<PathBuf>,

    #[arg(
        long = "command-timeout-ms",
        env = "CLAW_DOCTOR_COMMAND_TIMEOUT_MS",
        global = true,
        default_value_t = DEFAULT_COMMAND_TIMEOUT_MS,
        value_parser = parse_positive_u64,
        help = "Timeout for version and status commands in milliseconds"
    )]
    pub command_timeout_ms: u64,

    #[arg(
        long = "starter-timeout-ms",
        env = "CLAW_DOCTOR_STARTER_TIMEOUT_MS",
        global = true,
        default_value_t = DEFAULT_STARTER_TIMEOUT_MS,
        value_parser = parse_positive_u64,
        help = "Timeout for daemon starters run by --fix in milliseconds"
    )]
    pub starter_timeout_ms: u64,

    #[arg(
        long = "install-timeout-ms",
        env = "CLAW_DOCTOR_INSTALL_TIMEOUT_MS",
        global = true,
        default_value_t = DEFAULT_INSTALL_TIMEOUT_MS,
        value_parser = parse_positive_u64,
        help = "Timeout for installers run by --fix in milliseconds"
    )]
    pub install_timeout_ms: u64,

    #[arg(
        long = "network-timeout-ms",
        env = "CLAW_DOCTOR_NETWORK_TIMEOUT_MS",
        global = true,
        default_value_t = DEFAULT_NETWORK_TIMEOUT_MS,
        value_parser = parse_positive_u64,
        help = "Timeout for each provider reachability request in milliseconds"
    )]
    pub network_timeout_ms: u64,
}
