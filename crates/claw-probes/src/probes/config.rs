use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use claw_diagnostics::{CheckResult, Probe};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::log_guidance;
use crate::ProbeEnvironment;

pub const NAME: &str = "Config";
pub const DESCRIPTION: &str = "Validates OpenClaw configuration";
pub const CONFIG_FILE_NAMES: &[&str] = &["config.yaml", "config.yml", "config.json"];
pub const REQUIRED_CONFIG_FIELDS: &[&str] = &["provider"];
pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

#[derive(Debug, Serialize)]
struct DefaultConfig {
    provider: &'static str,
    model: &'static str,
    channels: Vec<String>,
    skills: Vec<String>,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER,
            model: DEFAULT_MODEL,
            channels: Vec::new(),
            skills: Vec::new(),
        }
    }
}

/// First existing config file across the candidate OpenClaw homes.
pub fn find_config_file(env: &ProbeEnvironment) -> Option<PathBuf> {
    env.openclaw_home_candidates()
        .into_iter()
        .flat_map(|home| CONFIG_FILE_NAMES.iter().map(move |name| home.join(name)))
        .find(|path| path.is_file())
}

/// Parses a config file as JSON (`.json`) or YAML (anything else).
pub fn load_config_document(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&raw).context("Invalid JSON");
    }
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&raw).context("Invalid YAML")
}

/// Emptiness in the YAML sense: null, false, zero, or an empty
/// string/list/map.
pub fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

pub fn missing_required_fields(document: &Value) -> Vec<&'static str> {
    REQUIRED_CONFIG_FIELDS
        .iter()
        .copied()
        .filter(|field| document.get(*field).map_or(true, is_blank_value))
        .collect()
}

/// Writes the default config without ever replacing an existing file.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let rendered =
        serde_yaml::to_string(&DefaultConfig::default()).context("failed to render default config")?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Locates and validates the OpenClaw config file.
pub struct ConfigProbe {
    env: Arc<ProbeEnvironment>,
    config_path: Option<PathBuf>,
    valid: bool,
    ran: bool,
}

impl ConfigProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            config_path: None,
            valid: false,
            ran: false,
        }
    }
}

impl Probe for ConfigProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        self.ran = true;
        self.valid = false;
        self.config_path = find_config_file(&self.env);
        let Some(path) = self.config_path.as_ref() else {
            return Ok(CheckResult::warn(NAME, "No OpenClaw config file found")?
                .with_details("Config will be created during OpenClaw setup")
                .with_auto_fix()
                .with_suggestions([
                    "Run 'openclaw init' to create initial config",
                    "Or create ~/.openclaw/config.yaml manually",
                ]));
        };

        let document = match load_config_document(path) {
            Ok(document) => document,
            Err(error) => {
                return Ok(CheckResult::fail(NAME, "Config file has syntax errors")?
                    .with_details(format!("{error:#}"))
                    .with_suggestions([
                        format!("Fix the syntax errors in: {}", path.display()),
                        "Use a YAML/JSON validator to check the file".to_string(),
                    ]));
            }
        };
        if is_blank_value(&document) {
            return Ok(CheckResult::warn(NAME, "Config file is empty")?
                .with_details(format!("Path: {}", path.display()))
                .with_suggestions(["Add configuration to the file or run 'openclaw init'"]));
        }

        let missing = missing_required_fields(&document);
        if !missing.is_empty() {
            let fields = missing.join(", ");
            return Ok(
                CheckResult::warn(NAME, format!("Config missing fields: {fields}"))?
                    .with_details(format!("Path: {}", path.display()))
                    .with_suggestions([
                        format!("Add the following to your config: {fields}"),
                        "Run 'openclaw init' to reconfigure".to_string(),
                    ]),
            );
        }
        self.valid = true;
        Ok(CheckResult::pass(NAME, "Configuration valid")?
            .with_details(format!("Path: {}", path.display())))
    }

    fn fix(&mut self) -> bool {
        if !self.ran {
            debug!(probe = NAME, "fix requested before inspection; nothing to do");
            return false;
        }
        if self.valid {
            return true;
        }
        if let Some(path) = self.config_path.as_ref() {
            log_guidance(
                NAME,
                "Fix Config Issues",
                &[
                    format!("Edit your config file: {}", path.display()),
                    "Or run 'openclaw init' to reconfigure".to_string(),
                ],
            );
            return false;
        }

        let target = self.env.openclaw_home().join("config.yaml");
        match write_default_config(&target) {
            Ok(()) => {
                info!(probe = NAME, path = %target.display(), "created default config");
                self.config_path = Some(target);
                self.valid = true;
                true
            }
            Err(error) => {
                warn!(probe = NAME, error = %format!("{error:#}"), "failed to create config");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_diagnostics::CheckStatus;

    fn probe_in(temp: &tempfile::TempDir) -> (Arc<ProbeEnvironment>, ConfigProbe) {
        let env = Arc::new(ProbeEnvironment::isolated(temp.path()));
        (env.clone(), ConfigProbe::new(env))
    }

    fn write_config(env: &ProbeEnvironment, name: &str, body: &str) -> PathBuf {
        let home = env.openclaw_home();
        std::fs::create_dir_all(&home).expect("home");
        let path = home.join(name);
        std::fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn unit_blank_values_follow_yaml_truthiness() {
        assert!(is_blank_value(&Value::Null));
        assert!(is_blank_value(&serde_json::json!("")));
        assert!(is_blank_value(&serde_json::json!([])));
        assert!(is_blank_value(&serde_json::json!({})));
        assert!(is_blank_value(&serde_json::json!(false)));
        assert!(!is_blank_value(&serde_json::json!("anthropic")));
        assert!(!is_blank_value(&serde_json::json!({"provider": null})));
    }

    #[test]
    fn unit_missing_required_fields_treats_blank_provider_as_missing() {
        assert_eq!(
            missing_required_fields(&serde_json::json!({"provider": ""})),
            vec!["provider"]
        );
        assert!(missing_required_fields(&serde_json::json!({"provider": "openai"})).is_empty());
        assert_eq!(
            missing_required_fields(&serde_json::json!(["provider"])),
            vec!["provider"]
        );
    }

    #[test]
    fn functional_missing_config_warns_and_fix_creates_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Warn);
        assert!(result.can_auto_fix());

        assert!(probe.fix());
        assert!(probe.fix());
        let created = env.openclaw_home().join("config.yaml");
        let document = load_config_document(&created).expect("load created config");
        assert_eq!(document["provider"], "anthropic");
        assert_eq!(document["model"], DEFAULT_MODEL);
        assert_eq!(document["channels"], serde_json::json!([]));
        assert_eq!(probe.run().status(), CheckStatus::Pass);
    }

    #[test]
    fn functional_valid_yaml_and_json_configs_pass() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        write_config(&env, "config.json", r#"{"provider": "openai"}"#);
        assert_eq!(probe.run().status(), CheckStatus::Pass);

        write_config(&env, "config.yaml", "provider: anthropic\nmodel: x\n");
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Pass);
        assert!(result.details().unwrap_or_default().ends_with("config.yaml"));
    }

    #[test]
    fn functional_syntax_error_fails_with_parser_message() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        write_config(&env, "config.yaml", "provider: [unclosed\n");
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.message(), "Config file has syntax errors");
        assert!(result
            .details()
            .unwrap_or_default()
            .starts_with("Invalid YAML"));
        assert!(!probe.fix());
    }

    #[test]
    fn functional_empty_and_incomplete_configs_warn() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        write_config(&env, "config.yml", "");
        let result = probe.run();
        assert_eq!(result.status(), CheckStatus::Warn);
        assert_eq!(result.message(), "Config file is empty");
        assert!(!result.can_auto_fix());

        write_config(&env, "config.yml", "model: gpt-4o\n");
        let result = probe.run();
        assert_eq!(result.message(), "Config missing fields: provider");
    }

    #[test]
    fn regression_default_config_never_overwrites_existing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "provider: mine\n").expect("seed");
        assert!(write_default_config(&path).is_err());
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "provider: mine\n"
        );
    }

    #[test]
    fn regression_fix_before_inspection_writes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (env, mut probe) = probe_in(&temp);
        let xdg = temp.path().join(".config").join("openclaw");
        std::fs::create_dir_all(&xdg).expect("xdg home");
        std::fs::write(xdg.join("config.yaml"), "provider: openai\n").expect("config");

        assert!(!probe.fix());
        assert!(!env.openclaw_home().join("config.yaml").exists());
        assert_eq!(probe.run().status(), CheckStatus::Pass);
    }
}
