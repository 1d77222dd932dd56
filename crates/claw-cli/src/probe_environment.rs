use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use claw_diagnostics::ProbeRegistry;
use claw_probes::{default_registry, extended_registry, ProbeEnvironment, ProbeTimeouts};

use crate::EnvironmentFlags;

pub fn probe_timeouts_from_flags(flags: &EnvironmentFlags) -> ProbeTimeouts {
    ProbeTimeouts {
        command: Duration::from_millis(flags.command_timeout_ms),
        starter: Duration::from_millis(flags.starter_timeout_ms),
        installer: Duration::from_millis(flags.install_timeout_ms),
        network: Duration::from_millis(flags.network_timeout_ms),
    }
}

/// Applies the flag overrides on top of an already detected environment.
pub fn apply_environment_flags(mut env: ProbeEnvironment, flags: &EnvironmentFlags) -> ProbeEnvironment {
    if let Some(home) = flags.home.as_ref() {
        env.home_dir = home.clone();
    }
    env.offline = flags.offline;
    env.timeouts = probe_timeouts_from_flags(flags);
    env
}

/// Detects the live machine and applies the flag overrides.
pub fn build_probe_environment(flags: &EnvironmentFlags) -> Result<ProbeEnvironment> {
    let detected = ProbeEnvironment::detect(flags.home.clone())?;
    Ok(apply_environment_flags(detected, flags))
}

pub fn build_probe_registry(flags: &EnvironmentFlags, env: Arc<ProbeEnvironment>) -> ProbeRegistry {
    if flags.extended {
        extended_registry(env)
    } else {
        default_registry(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    #[test]
    fn functional_flags_override_detected_environment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let home = temp.path().to_str().expect("utf8 path").to_string();
        let cli = Cli::try_parse_from([
            "claw-doctor",
            "--offline",
            "--home",
            home.as_str(),
            "--network-timeout-ms",
            "250",
        ])
        .expect("parse");
        let base = ProbeEnvironment::isolated(std::path::Path::new("/nonexistent"));
        let env = apply_environment_flags(base, &cli.environment);
        assert!(env.offline);
        assert_eq!(env.home_dir, temp.path());
        assert_eq!(env.timeouts.network, Duration::from_millis(250));
        assert_eq!(env.timeouts.installer, Duration::from_millis(120_000));
    }

    #[test]
    fn functional_extended_flag_selects_registry() {
        let temp = tempfile::tempdir().expect("tempdir");
        let env = Arc::new(ProbeEnvironment::isolated(temp.path()));
        let cli = Cli::try_parse_from(["claw-doctor"]).expect("parse");
        assert_eq!(build_probe_registry(&cli.environment, Arc::clone(&env)).len(), 7);
        let cli = Cli::try_parse_from(["claw-doctor", "--extended"]).expect("parse");
        assert_eq!(build_probe_registry(&cli.environment, env).len(), 9);
    }
}
