use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use claw_diagnostics::{CheckResult, Probe};
use tracing::{debug, info, warn};

use super::{locate, log_guidance, query_stdout};
use crate::{run_bounded, CommandOutcome, Platform, ProbeEnvironment};

pub const NAME: &str = "OpenClaw";
pub const DESCRIPTION: &str = "Checks OpenClaw CLI installation";
pub const OPENCLAW_EXECUTABLES: &[&str] = &["openclaw", "oc", "claw"];
pub const OPENCLAW_REPOSITORY_URL: &str = "https://github.com/openclaw/openclaw";

/// Normalizes `openclaw --version` output: drops a leading `openclaw` and `v`.
pub fn clean_openclaw_version(raw: &str) -> Option<String> {
    let mut version = raw.trim();
    if let Some(rest) = version.strip_prefix("openclaw") {
        version = rest.trim();
    }
    if let Some(rest) = version.strip_prefix('v') {
        version = rest;
    }
    (!version.is_empty()).then(|| version.to_string())
}

pub fn installer_command(installer_url: &str) -> String {
    format!("curl -fsSL {installer_url} | bash")
}

fn windows_install_steps() -> Vec<String> {
    vec![
        "Open PowerShell as Administrator".to_string(),
        "Run: iwr -useb https://openclawd.ai/install.ps1 | iex".to_string(),
        format!("Or download from: {OPENCLAW_REPOSITORY_URL}/releases"),
    ]
}

/// Locates the OpenClaw CLI and its home directory; fixes by running the
/// installer script.
pub struct OpenClawProbe {
    env: Arc<ProbeEnvironment>,
    path: Option<PathBuf>,
    version: Option<String>,
    home: Option<PathBuf>,
    ran: bool,
}

impl OpenClawProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            path: None,
            version: None,
            home: None,
            ran: false,
        }
    }

    fn install_suggestions(&self) -> Vec<String> {
        if self.env.platform == Platform::Windows {
            return windows_install_steps();
        }
        vec![
            "Run the OpenClaw installer:".to_string(),
            installer_command(&self.env.installer_url),
            format!("Or visit: {OPENCLAW_REPOSITORY_URL}"),
        ]
    }

    fn run_installer(&self) -> Result<bool> {
        let Some(bash) = locate(&self.env, "bash") else {
            log_guidance(NAME, "Install OpenClaw", &self.install_suggestions());
            return Ok(false);
        };
        let script = installer_command(&self.env.installer_url);
        info!(probe = NAME, command = %script, "running OpenClaw installer");
        match run_bounded(&bash, &["-c", &script], self.env.timeouts.installer)? {
            CommandOutcome::Completed(output) if output.success => {
                info!(probe = NAME, "OpenClaw installed");
                Ok(true)
            }
            CommandOutcome::Completed(output) => {
                warn!(
                    probe = NAME,
                    status = %output.status_label(),
                    stderr = %output.stderr.trim(),
                    "OpenClaw installer failed"
                );
                log_guidance(
                    NAME,
                    "Manual Installation",
                    &[
                        format!("Visit: {OPENCLAW_REPOSITORY_URL}"),
                        "Follow the installation instructions for your OS".to_string(),
                    ],
                );
                Ok(false)
            }
            CommandOutcome::TimedOut => {
                warn!(probe = NAME, "OpenClaw installer timed out");
                Ok(false)
            }
        }
    }
}

impl Probe for OpenClawProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        self.ran = true;
        self.path = OPENCLAW_EXECUTABLES
            .iter()
            .find_map(|executable| locate(&self.env, executable));
        self.version = self.path.as_deref().and_then(|path| {
            query_stdout(path, &["--version"], self.env.timeouts.command)
                .and_then(|raw| clean_openclaw_version(&raw))
        });
        self.home = self.env.find_openclaw_home();

        let Some(path) = self.path.as_ref() else {
            return Ok(CheckResult::fail(NAME, "OpenClaw CLI is not installed")?
                .with_auto_fix()
                .with_suggestions(self.install_suggestions()));
        };
        let Some(version) = self.version.as_ref() else {
            return Ok(
                CheckResult::warn(NAME, "OpenClaw found but version could not be determined")?
                    .with_details(format!("Path: {}", path.display()))
                    .with_suggestions(["Try running 'openclaw --version' manually"]),
            );
        };

        let mut details = format!("Path: {}", path.display());
        if let Some(home) = self.home.as_ref() {
            details.push_str(&format!("\nHome: {}", home.display()));
        }
        Ok(CheckResult::pass(NAME, format!("OpenClaw v{version} installed"))?.with_details(details))
    }

    fn fix(&mut self) -> bool {
        if !self.ran {
            debug!(probe = NAME, "fix requested before inspection; nothing to do");
            return false;
        }
        if self.path.is_some() {
            return true;
        }
        if self.env.platform == Platform::Windows {
            log_guidance(NAME, "Install OpenClaw on Windows", &windows_install_steps());
            return false;
        }
        match self.run_installer() {
            Ok(installed) => installed,
            Err(error) => {
                warn!(probe = NAME, error = %format!("{error:#}"), "OpenClaw installer could not start");
                log_guidance(NAME, "Install OpenClaw", &self.install_suggestions());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_diagnostics::CheckStatus;

    #[test]
    fn unit_clean_openclaw_version_strips_prefixes() {
        assert_eq!(
            clean_openclaw_version("openclaw v1.4.2\n").as_deref(),
            Some("1.4.2")
        );
        assert_eq!(clean_openclaw_version("v0.9.0").as_deref(), Some("0.9.0"));
        assert_eq!(clean_openclaw_version("2.0.0").as_deref(), Some("2.0.0"));
        assert_eq!(clean_openclaw_version("openclaw"), None);
        assert_eq!(clean_openclaw_version("  "), None);
    }

    #[test]
    fn functional_absent_cli_fails_with_installer_guidance() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut probe = OpenClawProbe::new(Arc::new(ProbeEnvironment::isolated(temp.path())));
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Fail);
        assert!(result.can_auto_fix());
        if cfg!(not(windows)) {
            assert!(result
                .fix_suggestions()
                .contains(&"curl -fsSL https://openclawd.ai/install.sh | bash".to_string()));
        }
    }

    #[cfg(unix)]
    mod with_fake_cli {
        use super::*;
        use crate::probes::test_support::write_fake_tool;

        fn env_with_tool(
            temp: &tempfile::TempDir,
            name: &str,
            body: &str,
        ) -> Arc<ProbeEnvironment> {
            let bin = temp.path().join("bin");
            std::fs::create_dir_all(&bin).expect("bin dir");
            write_fake_tool(&bin, name, body);
            let mut env = ProbeEnvironment::isolated(temp.path());
            env.search_path = Some(bin.into_os_string());
            Arc::new(env)
        }

        #[test]
        fn functional_installed_cli_passes_with_home_details() {
            let temp = tempfile::tempdir().expect("tempdir");
            let env = env_with_tool(&temp, "openclaw", "echo 'openclaw v1.2.3'");
            std::fs::create_dir_all(env.openclaw_home()).expect("home");
            let mut probe = OpenClawProbe::new(env);
            let result = probe.run();
            assert_eq!(result.status(), CheckStatus::Pass);
            assert_eq!(result.message(), "OpenClaw v1.2.3 installed");
            assert!(result.details().unwrap_or_default().contains("\nHome: "));
            assert!(probe.fix());
        }

        #[test]
        fn functional_alternative_executable_name_is_found() {
            let temp = tempfile::tempdir().expect("tempdir");
            let env = env_with_tool(&temp, "claw", "echo 0.3.1");
            let result = OpenClawProbe::new(env).run();
            assert_eq!(result.status(), CheckStatus::Pass);
            assert_eq!(result.message(), "OpenClaw v0.3.1 installed");
        }

        #[test]
        fn regression_silent_version_output_warns() {
            let temp = tempfile::tempdir().expect("tempdir");
            let env = env_with_tool(&temp, "oc", "exit 0");
            let result = OpenClawProbe::new(env).run();
            assert_eq!(result.status(), CheckStatus::Warn);
        }

        #[test]
        fn integration_fix_runs_installer_through_bash() {
            let temp = tempfile::tempdir().expect("tempdir");
            let bin = temp.path().join("bin");
            std::fs::create_dir_all(&bin).expect("bin dir");
            let marker = temp.path().join("installed");
            write_fake_tool(
                &bin,
                "bash",
                &format!("touch '{}'; exit 0", marker.display()),
            );
            let mut env = ProbeEnvironment::isolated(temp.path());
            env.search_path = Some(bin.into_os_string());
            let mut probe = OpenClawProbe::new(Arc::new(env));
            assert_eq!(probe.run().status(), CheckStatus::Fail);
            assert!(probe.fix());
            assert!(marker.exists());
        }

        #[test]
        fn regression_fix_before_inspection_skips_installer() {
            let temp = tempfile::tempdir().expect("tempdir");
            let bin = temp.path().join("bin");
            std::fs::create_dir_all(&bin).expect("bin dir");
            let marker = temp.path().join("installed");
            write_fake_tool(
                &bin,
                "bash",
                &format!("touch '{}'; exit 0", marker.display()),
            );
            let mut env = ProbeEnvironment::isolated(temp.path());
            env.search_path = Some(bin.into_os_string());
            let mut probe = OpenClawProbe::new(Arc::new(env));
            assert!(!probe.fix());
            assert!(!marker.exists());
        }

        #[test]
        fn regression_failed_installer_reports_not_fixed() {
            let temp = tempfile::tempdir().expect("tempdir");
            let env = env_with_tool(&temp, "bash", "echo boom >&2; exit 7");
            let mut probe = OpenClawProbe::new(env);
            probe.run();
            assert!(!probe.fix());
        }
    }
}
