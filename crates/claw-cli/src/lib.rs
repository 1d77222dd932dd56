//! CLI argument model for the `claw-doctor` binary.
//!
//! Exposes the clap-backed command and flag types plus the conversion from
//! parsed flags into the probe environment and registry a run uses.

pub mod cli_args;
pub mod cli_types;
pub mod probe_environment;
pub mod shell_completion;

pub use cli_args::*;
pub use cli_types::*;
pub use probe_environment::*;
pub use shell_completion::*;
