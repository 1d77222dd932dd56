//! The concrete probes.

pub mod api_keys;
pub mod config;
pub mod docker;
pub mod folders;
pub mod logs;
pub mod network;
pub mod node;
pub mod openclaw;
pub mod system;

pub use api_keys::ApiKeysProbe;
pub use config::ConfigProbe;
pub use docker::DockerProbe;
pub use folders::FoldersProbe;
pub use logs::LogsProbe;
pub use network::NetworkProbe;
pub use node::NodeProbe;
pub use openclaw::OpenClawProbe;
pub use system::SystemProbe;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{find_executable, probe_command, ProbeEnvironment};

/// Resolves `executable` against the environment's search path.
pub(crate) fn locate(env: &ProbeEnvironment, executable: &str) -> Option<PathBuf> {
    find_executable(executable, env.search_path.as_deref())
}

/// Trimmed stdout of `program args...`, or `None` on spawn failure,
/// non-zero exit or timeout.
pub(crate) fn query_stdout(program: &Path, args: &[&str], timeout: Duration) -> Option<String> {
    probe_command(program, args, timeout).and_then(|outcome| outcome.success_stdout())
}

/// Emits manual remediation steps from an informational fix.
pub(crate) fn log_guidance(probe: &str, title: &str, steps: &[String]) {
    for step in steps {
        tracing::info!(probe, title, step = %step, "manual remediation");
    }
}
