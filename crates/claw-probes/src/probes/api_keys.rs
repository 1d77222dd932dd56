use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use claw_diagnostics::{CheckResult, Probe};
use regex::Regex;
use tracing::debug;

use super::config::{find_config_file, load_config_document};
use super::log_guidance;
use crate::{Platform, ProbeEnvironment, PROVIDER_KEY_ENV_VARS};

pub const NAME: &str = "API Keys";
pub const DESCRIPTION: &str = "Checks AI provider keys configured";

const KEY_FORMATS: &[(&str, &str)] = &[
    ("ANTHROPIC_API_KEY", r"^sk-ant-[a-zA-Z0-9\-_]{40,}$"),
    ("OPENAI_API_KEY", r"^sk-[a-zA-Z0-9]{40,}$"),
    ("GOOGLE_API_KEY", r"^AIza[a-zA-Z0-9\-_]{35}$"),
    ("GROQ_API_KEY", r"^gsk_[a-zA-Z0-9]{50,}$"),
];

/// Config keys that carry a provider credential, as dotted paths.
const CONFIG_KEY_PATHS: &[&str] = &["api_key", "anthropic.api_key", "openai.api_key"];

fn key_formats() -> &'static [(&'static str, Regex)] {
    static FORMATS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        KEY_FORMATS
            .iter()
            .filter_map(|(name, pattern)| Regex::new(pattern).ok().map(|regex| (*name, regex)))
            .collect()
    })
}

/// `false` only when a format is known for `var` and `value` violates it.
pub fn key_format_matches(var: &str, value: &str) -> bool {
    key_formats()
        .iter()
        .find(|(name, _)| *name == var)
        .map_or(true, |(_, regex)| regex.is_match(value))
}

/// `GOOGLE_GENERATIVE_AI_API_KEY` → `Google Generative Ai`.
pub fn provider_display_name(var: &str) -> String {
    var.trim_end_matches("_API_KEY")
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Provider variable names assigned in a dotenv-style file.
pub fn dotenv_provider_keys(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, _)| key.trim().trim_start_matches("export ").trim())
        .filter(|key| PROVIDER_KEY_ENV_VARS.contains(key))
        .map(str::to_string)
        .collect()
}

fn dotenv_candidates(env: &ProbeEnvironment) -> Vec<PathBuf> {
    let home = env.openclaw_home();
    let mut candidates = vec![
        home.join(".env"),
        home.join("env"),
        env.home_dir.join(".config").join("openclaw").join(".env"),
        env.working_dir.join(".env"),
    ];
    if env.platform == Platform::Windows {
        candidates.push(
            env.home_dir
                .join("AppData")
                .join("Local")
                .join("openclaw")
                .join(".env"),
        );
    }
    candidates
}

fn config_key_present(document: &serde_json::Value, dotted: &str) -> bool {
    dotted
        .split('.')
        .try_fold(document, |node, segment| node.get(segment))
        .is_some_and(|value| !super::config::is_blank_value(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where a provider key was found.
pub enum KeySource {
    Environment(String),
    DotEnv { var: String, path: PathBuf },
    Config(String),
}

impl KeySource {
    pub fn display_label(&self) -> String {
        match self {
            KeySource::Environment(var) => provider_display_name(var),
            KeySource::DotEnv { var, .. } => format!("{} (.env)", provider_display_name(var)),
            KeySource::Config(path) => format!("{path} (config)"),
        }
    }
}

/// Looks for provider credentials in the environment, dotenv files and the
/// OpenClaw config. Only key names are ever reported.
pub struct ApiKeysProbe {
    env: Arc<ProbeEnvironment>,
    found: Vec<KeySource>,
    invalid: Vec<String>,
}

impl ApiKeysProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            found: Vec::new(),
            invalid: Vec::new(),
        }
    }

    fn scan_environment(&mut self) {
        for var in PROVIDER_KEY_ENV_VARS {
            let Some(value) = self.env.env_var(var) else {
                continue;
            };
            if key_format_matches(var, value) {
                self.found.push(KeySource::Environment((*var).to_string()));
            } else {
                self.invalid.push((*var).to_string());
            }
        }
    }

    fn scan_dotenv(&mut self) {
        for path in dotenv_candidates(&self.env) {
            if !path.is_file() {
                continue;
            }
            let Ok(raw) = std::fs::read_to_string(&path) else {
                debug!(probe = NAME, path = %path.display(), "unreadable dotenv file");
                continue;
            };
            let keys = dotenv_provider_keys(&raw);
            if keys.is_empty() {
                continue;
            }
            self.found.extend(keys.into_iter().map(|var| KeySource::DotEnv {
                var,
                path: path.clone(),
            }));
            return;
        }
    }

    fn scan_config(&mut self, config_path: &Path) {
        let document = match load_config_document(config_path) {
            Ok(document) => document,
            Err(error) => {
                debug!(probe = NAME, error = %format!("{error:#}"), "config unreadable for key scan");
                return;
            }
        };
        self.found.extend(
            CONFIG_KEY_PATHS
                .iter()
                .filter(|dotted| config_key_present(&document, dotted))
                .map(|dotted| KeySource::Config((*dotted).to_string())),
        );
    }

    pub fn found(&self) -> &[KeySource] {
        &self.found
    }
}

impl Probe for ApiKeysProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        self.found.clear();
        self.invalid.clear();
        self.scan_environment();
        self.scan_dotenv();
        if let Some(config_path) = find_config_file(&self.env) {
            self.scan_config(&config_path);
        }

        if !self.invalid.is_empty() {
            return Ok(CheckResult::warn(
                NAME,
                format!("Some API keys appear invalid: {}", self.invalid.join(", ")),
            )?
            .with_details("Keys may be malformed or using old format")
            .with_suggestions([
                "Verify your API keys are correct",
                "Get new keys from your AI provider's dashboard",
            ]));
        }
        if self.found.is_empty() {
            return Ok(CheckResult::warn(NAME, "No AI provider API keys found")?
                .with_details("OpenClaw requires at least one AI provider API key")
                .with_suggestions([
                    "Set environment variable: export ANTHROPIC_API_KEY=your_key",
                    "Or create ~/.openclaw/.env file with your keys",
                    "Or add to ~/.openclaw/config.yaml",
                    "Get API keys from:",
                    "  - Anthropic: https://console.anthropic.com/",
                    "  - OpenAI: https://platform.openai.com/",
                    "  - Google: https://aistudio.google.com/",
                ]));
        }

        let labels = self
            .found
            .iter()
            .map(KeySource::display_label)
            .collect::<Vec<_>>();
        Ok(CheckResult::pass(
            NAME,
            format!("API keys configured ({} found)", labels.len()),
        )?
        .with_details(format!("Found: {}", labels.join(", "))))
    }

    fn fix(&mut self) -> bool {
        let mut steps = vec![
            "Anthropic (Claude): https://console.anthropic.com/ then export ANTHROPIC_API_KEY=sk-ant-...".to_string(),
            "OpenAI (GPT): https://platform.openai.com/api-keys then export OPENAI_API_KEY=sk-...".to_string(),
            "Google (Gemini): https://aistudio.google.com/apikey then export GOOGLE_API_KEY=AIza...".to_string(),
            "Groq: https://console.groq.com/keys then export GROQ_API_KEY=gsk_...".to_string(),
        ];
        steps.push(match self.env.platform {
            Platform::Windows => {
                "On Windows use $env:ANTHROPIC_API_KEY = 'your_key' or System Environment Variables"
                    .to_string()
            }
            Platform::MacOs | Platform::Linux => {
                "Add the export to ~/.bashrc or ~/.zshrc for persistence".to_string()
            }
        });
        log_guidance(NAME, "Get an API Key", &steps);
        false
    }
}
