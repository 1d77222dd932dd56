use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use claw_diagnostics::{CheckResult, Probe};
use tracing::{info, warn};

use super::{locate, log_guidance, query_stdout};
use crate::{probe_command, Platform, ProbeEnvironment};

pub const NAME: &str = "Docker";
pub const DESCRIPTION: &str = "Validates Docker & Compose setup (optional)";

/// `Docker version 24.0.7, build afdd53b` → `24.0.7`.
pub fn parse_docker_version(raw: &str) -> Option<String> {
    let head = raw.trim().split(',').next().unwrap_or_default();
    let version = head.trim().strip_prefix("Docker version")?.trim();
    (!version.is_empty()).then(|| version.to_string())
}

/// `Docker Compose version v2.23.0` → `v2.23.0`.
pub fn parse_compose_plugin_version(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let version = raw.rsplit("version").next().unwrap_or(raw).trim();
    (!version.is_empty()).then(|| version.to_string())
}

/// `docker-compose version 1.29.2, build 5becea4c` → `1.29.2`.
pub fn parse_standalone_compose_version(raw: &str) -> Option<String> {
    let head = raw.trim().split(',').next().unwrap_or_default();
    let version = head.replace("docker-compose version", "");
    let version = version.trim();
    (!version.is_empty()).then(|| version.to_string())
}

fn install_suggestions(platform: Platform) -> Vec<String> {
    let steps: &[&str] = match platform {
        Platform::MacOs => &[
            "Install Docker Desktop: https://www.docker.com/products/docker-desktop/",
            "Or via Homebrew: brew install --cask docker",
        ],
        Platform::Windows => &[
            "Install Docker Desktop: https://www.docker.com/products/docker-desktop/",
            "Or via winget: winget install Docker.DockerDesktop",
        ],
        Platform::Linux => &[
            "Install Docker: https://docs.docker.com/engine/install/",
            "For Ubuntu: sudo apt install docker.io docker-compose-v2",
            "Then: sudo systemctl enable --now docker",
        ],
    };
    steps.iter().map(|step| step.to_string()).collect()
}

fn manual_start_steps() -> Vec<String> {
    vec![
        "On macOS: Open Docker Desktop application".to_string(),
        "On Linux: sudo systemctl start docker".to_string(),
        "On Windows: Start Docker Desktop from Start Menu".to_string(),
    ]
}

/// Optional container runtime check. Docker is only needed for server
/// deployments, so absence is a warning.
pub struct DockerProbe {
    env: Arc<ProbeEnvironment>,
    docker_path: Option<PathBuf>,
    docker_version: Option<String>,
    compose_version: Option<String>,
    running: bool,
}

impl DockerProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            docker_path: None,
            docker_version: None,
            compose_version: None,
            running: false,
        }
    }

    fn detect_compose(&self) -> Option<String> {
        let timeout = self.env.timeouts.command;
        if let Some(docker) = self.docker_path.as_deref() {
            if let Some(version) = query_stdout(docker, &["compose", "version"], timeout)
                .and_then(|raw| parse_compose_plugin_version(&raw))
            {
                return Some(version);
            }
        }
        let standalone = locate(&self.env, "docker-compose")?;
        query_stdout(&standalone, &["--version"], timeout)
            .and_then(|raw| parse_standalone_compose_version(&raw))
    }

    fn start_daemon(&self) -> bool {
        let (program, args): (&str, &[&str]) = match self.env.platform {
            Platform::MacOs => ("open", &["-a", "Docker"]),
            Platform::Linux => ("sudo", &["-n", "systemctl", "start", "docker"]),
            Platform::Windows => return false,
        };
        let Some(program_path) = locate(&self.env, program) else {
            return false;
        };
        info!(probe = NAME, starter = program, "attempting to start Docker");
        match probe_command(&program_path, args, self.env.timeouts.starter) {
            Some(outcome) if outcome.succeeded() => {
                info!(probe = NAME, "Docker start requested");
                true
            }
            _ => {
                warn!(probe = NAME, starter = program, "Docker starter did not succeed");
                false
            }
        }
    }
}

impl Probe for DockerProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        let timeout = self.env.timeouts.command;
        self.docker_path = locate(&self.env, "docker");
        self.docker_version = self.docker_path.as_deref().and_then(|docker| {
            query_stdout(docker, &["--version"], timeout).and_then(|raw| parse_docker_version(&raw))
        });
        self.running = self.docker_path.as_deref().is_some_and(|docker| {
            probe_command(docker, &["info"], timeout).is_some_and(|outcome| outcome.succeeded())
        });
        self.compose_version = self.detect_compose();

        let Some(version) = self.docker_version.as_ref() else {
            return Ok(
                CheckResult::warn(NAME, "Docker is not installed (optional for desktop use)")?
                    .with_details("Docker is only required for server deployments")
                    .with_suggestions(install_suggestions(self.env.platform)),
            );
        };
        if !self.running {
            return Ok(CheckResult::warn(
                NAME,
                format!("Docker {version} installed but not running"),
            )?
            .with_auto_fix()
            .with_suggestions(["Start Docker Desktop or the Docker daemon"]));
        }

        let details = match self.compose_version.as_ref() {
            Some(compose) => format!("Docker {version}, Compose {compose}"),
            None => format!("Docker {version} (Compose not found)"),
        };
        Ok(CheckResult::pass(NAME, format!("Docker {version} running"))?.with_details(details))
    }

    fn fix(&mut self) -> bool {
        if self.docker_version.is_none() {
            log_guidance(NAME, "Install Docker", &install_suggestions(self.env.platform));
            return false;
        }
        if self.running {
            return true;
        }
        if self.start_daemon() {
            return true;
        }
        log_guidance(NAME, "Start Docker Manually", &manual_start_steps());
        false
    }
}
