use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use claw_diagnostics::{CheckResult, Probe};
use tracing::{debug, info, warn};

use crate::ProbeEnvironment;

pub const NAME: &str = "Folders";
pub const DESCRIPTION: &str = "Checks OpenClaw directory structure";
pub const EXPECTED_DIRS: &[&str] = &["skills", "channels", "workspaces"];
pub const EXPECTED_CONFIG_FILES: &[&str] = &["config.yaml", "config.yml"];

/// Readable means listable for directories; writable means not read-only.
fn is_accessible(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if metadata.permissions().readonly() {
        return false;
    }
    if metadata.is_dir() {
        std::fs::read_dir(path).is_ok()
    } else {
        std::fs::File::open(path).is_ok()
    }
}

/// OpenClaw home layout: expected subdirectories and a config file.
pub struct FoldersProbe {
    env: Arc<ProbeEnvironment>,
    home: Option<PathBuf>,
    missing_dirs: Vec<&'static str>,
    ran: bool,
}

impl FoldersProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            home: None,
            missing_dirs: Vec::new(),
            ran: false,
        }
    }

    fn create_dir(path: &Path) -> bool {
        match std::fs::create_dir_all(path) {
            Ok(()) => {
                info!(probe = NAME, path = %path.display(), "created directory");
                true
            }
            Err(error) => {
                warn!(probe = NAME, path = %path.display(), error = %error, "failed to create directory");
                false
            }
        }
    }
}

impl Probe for FoldersProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        self.ran = true;
        self.missing_dirs.clear();
        self.home = self.env.find_openclaw_home();
        let Some(home) = self.home.clone() else {
            self.missing_dirs.extend_from_slice(EXPECTED_DIRS);
            return Ok(CheckResult::warn(NAME, "OpenClaw home directory not found")?
                .with_details("Expected ~/.openclaw or similar")
                .with_auto_fix()
                .with_suggestions([
                    "Run 'openclaw init' to create the directory structure",
                    "Or manually create ~/.openclaw/",
                ]));
        };

        let mut permission_issues = Vec::new();
        if !is_accessible(&home) {
            permission_issues.push(home.display().to_string());
        }
        let mut found_dirs = Vec::new();
        for name in EXPECTED_DIRS {
            let path = home.join(name);
            if path.is_dir() {
                found_dirs.push(*name);
                if !is_accessible(&path) {
                    permission_issues.push(path.display().to_string());
                }
            } else {
                self.missing_dirs.push(*name);
            }
        }
        let config_file = EXPECTED_CONFIG_FILES
            .iter()
            .find(|name| home.join(name).is_file());

        if !permission_issues.is_empty() {
            return Ok(CheckResult::fail(
                NAME,
                format!("Permission issues in {} path(s)", permission_issues.len()),
            )?
            .with_details(format!("Issues: {}", permission_issues.join(", ")))
            .with_suggestions([
                format!("Fix permissions with: chmod 755 {}", home.display()),
                "Ensure your user owns the directory".to_string(),
            ]));
        }

        let mut details = vec![format!("Home: {}", home.display())];
        if !found_dirs.is_empty() {
            details.push(format!("Dirs: {}", found_dirs.join(", ")));
        }
        if let Some(file) = config_file {
            details.push(format!("Files: {file}"));
        }

        let mut missing = self.missing_dirs.clone();
        if config_file.is_none() {
            missing.push(EXPECTED_CONFIG_FILES[0]);
        }
        if missing.is_empty() {
            return Ok(
                CheckResult::pass(NAME, "OpenClaw folder structure OK")?.with_details(details.join("\n"))
            );
        }

        details.push(format!("Missing: {}", missing.join(", ")));
        let mut suggestions = vec!["Run 'openclaw init' to create missing directories".to_string()];
        if !self.missing_dirs.is_empty() {
            suggestions.push(format!("Or manually create: {}", self.missing_dirs.join(", ")));
        }
        if config_file.is_none() {
            suggestions.push(format!(
                "Create {} (the Config check can generate a default one)",
                home.join(EXPECTED_CONFIG_FILES[0]).display()
            ));
        }
        let mut result = CheckResult::warn(
            NAME,
            format!("OpenClaw structure incomplete ({} missing)", missing.len()),
        )?
        .with_details(details.join("\n"))
        .with_suggestions(suggestions);
        if !self.missing_dirs.is_empty() {
            result = result.with_auto_fix();
        }
        Ok(result)
    }

    fn fix(&mut self) -> bool {
        if !self.ran {
            debug!(probe = NAME, "fix requested before inspection; nothing to do");
            return false;
        }
        let home = match self.home.clone() {
            Some(home) => home,
            None => {
                let home = self.env.openclaw_home();
                if !Self::create_dir(&home) {
                    return false;
                }
                self.home = Some(home.clone());
                home
            }
        };
        let mut all_created = true;
        for name in std::mem::take(&mut self.missing_dirs) {
            if !Self::create_dir(&home.join(name)) {
                all_created = false;
                self.missing_dirs.push(name);
            }
        }
        all_created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_diagnostics::CheckStatus;

    fn probe_in(temp: &tempfile::TempDir) -> (Arc<ProbeEnvironment>, FoldersProbe) {
        let env = Arc::new(ProbeEnvironment::isolated(temp.path()));
        (env.clone(), FoldersProbe::new(env))
    }

    #[test]
    fn functional_missing_home_warns_and_fix_builds_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Warn);
        assert!(result.can_auto_fix());

        assert!(probe.fix());
        for name in EXPECTED_DIRS {
            assert!(env.openclaw_home().join(name).is_dir());
        }
    }

    #[test]
    fn functional_complete_layout_passes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        let home = env.openclaw_home();
        for name in EXPECTED_DIRS {
            std::fs::create_dir_all(home.join(name)).expect("dir");
        }
        std::fs::write(home.join("config.yml"), "provider: anthropic\n").expect("config");
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Pass);
        let details = result.details().unwrap_or_default();
        assert!(details.contains("Dirs: skills, channels, workspaces"));
        assert!(details.contains("Files: config.yml"));
        assert!(probe.fix());
    }

    #[test]
    fn functional_partial_layout_lists_missing_entries() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        std::fs::create_dir_all(env.openclaw_home().join("skills")).expect("dir");
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Warn);
        assert_eq!(result.message(), "OpenClaw structure incomplete (3 missing)");
        assert!(result
            .details()
            .unwrap_or_default()
            .ends_with("Missing: channels, workspaces, config.yaml"));

        assert!(probe.fix());
        assert_eq!(probe.run().message(), "OpenClaw structure incomplete (1 missing)");
    }

    #[test]
    fn regression_missing_config_only_is_not_auto_fixable_here() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        for name in EXPECTED_DIRS {
            std::fs::create_dir_all(env.openclaw_home().join(name)).expect("dir");
        }
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Warn);
        assert!(!result.can_auto_fix());
        assert!(!result.fix_suggestions().is_empty());
    }

    #[test]
    fn regression_fix_before_inspection_creates_no_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        assert!(!probe.fix());
        assert!(!env.openclaw_home().exists());
    }

    #[cfg(unix)]
    #[test]
    fn regression_read_only_home_fails() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        let home = env.openclaw_home();
        std::fs::create_dir_all(&home).expect("home");
        std::fs::set_permissions(&home, std::fs::Permissions::from_mode(0o555)).expect("chmod");
        let result = probe.run();
        std::fs::set_permissions(&home, std::fs::Permissions::from_mode(0o755)).expect("restore");
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.message(), "Permission issues in 1 path(s)");
    }
}
