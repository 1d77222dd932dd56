//! Resolved machine view shared by all probes.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_STARTER_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_INSTALL_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_INSTALLER_URL: &str = "https://openclawd.ai/install.sh";
pub const OPENCLAW_HOME_DIR_NAME: &str = ".openclaw";

/// Provider key variables captured from the process environment.
pub const PROVIDER_KEY_ENV_VARS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "OPENAI_API_KEY",
    "GOOGLE_API_KEY",
    "GOOGLE_GENERATIVE_AI_API_KEY",
    "GROQ_API_KEY",
    "OPENROUTER_API_KEY",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `Platform` values.
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Per-call limits for external work.
pub struct ProbeTimeouts {
    /// Version and status queries (`node --version`, `docker info`).
    pub command: Duration,
    /// Daemon starters invoked by fixes.
    pub starter: Duration,
    /// Installer scripts invoked by fixes.
    pub installer: Duration,
    /// Each HTTP reachability request.
    pub network: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            command: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
            starter: Duration::from_millis(DEFAULT_STARTER_TIMEOUT_MS),
            installer: Duration::from_millis(DEFAULT_INSTALL_TIMEOUT_MS),
            network: Duration::from_millis(DEFAULT_NETWORK_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `ProviderEndpoint` probed for reachability.
pub struct ProviderEndpoint {
    pub name: String,
    pub url: String,
}

impl ProviderEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

pub fn default_provider_endpoints() -> Vec<ProviderEndpoint> {
    vec![
        ProviderEndpoint::new("Anthropic", "https://api.anthropic.com"),
        ProviderEndpoint::new("OpenAI", "https://api.openai.com"),
        ProviderEndpoint::new("Google AI", "https://generativelanguage.googleapis.com"),
        ProviderEndpoint::new("Groq", "https://api.groq.com"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Hardware thresholds for the system probe.
pub struct SystemRequirements {
    pub min_ram_gb: f64,
    pub recommended_ram_gb: f64,
    pub min_disk_gb: f64,
    pub min_cpu_cores: usize,
}

impl Default for SystemRequirements {
    fn default() -> Self {
        Self {
            min_ram_gb: 2.0,
            recommended_ram_gb: 4.0,
            min_disk_gb: 20.0,
            min_cpu_cores: 2,
        }
    }
}

/// Everything a probe may read about the machine.
#[derive(Clone)]
pub struct ProbeEnvironment {
    pub home_dir: PathBuf,
    pub working_dir: PathBuf,
    /// Executable search path; `None` means nothing is discoverable.
    pub search_path: Option<OsString>,
    /// Provider key variables; values never leave the API keys probe.
    pub env_vars: BTreeMap<String, String>,
    pub platform: Platform,
    pub timeouts: ProbeTimeouts,
    pub endpoints: Vec<ProviderEndpoint>,
    /// Network probe reports Skip instead of issuing requests.
    pub offline: bool,
    pub requirements: SystemRequirements,
    /// Volume whose free space the system probe measures.
    pub disk_probe_path: PathBuf,
    pub installer_url: String,
}

impl fmt::Debug for ProbeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeEnvironment")
            .field("home_dir", &self.home_dir)
            .field("working_dir", &self.working_dir)
            .field("search_path", &self.search_path)
            .field("env_vars", &self.env_vars.keys().collect::<Vec<_>>())
            .field("platform", &self.platform)
            .field("timeouts", &self.timeouts)
            .field("endpoints", &self.endpoints)
            .field("offline", &self.offline)
            .field("requirements", &self.requirements)
            .field("disk_probe_path", &self.disk_probe_path)
            .field("installer_url", &self.installer_url)
            .finish()
    }
}

fn default_disk_probe_path(platform: Platform) -> PathBuf {
    match platform {
        Platform::Windows => PathBuf::from("C:\\"),
        Platform::MacOs | Platform::Linux => PathBuf::from("/"),
    }
}

impl ProbeEnvironment {
    /// Reads the live process environment. `home_override` wins over the
    /// platform home directory.
    pub fn detect(home_override: Option<PathBuf>) -> Result<Self> {
        let home_dir = match home_override {
            Some(path) => path,
            None => dirs::home_dir().context("failed to resolve the user home directory")?,
        };
        let working_dir =
            std::env::current_dir().context("failed to resolve the working directory")?;
        let env_vars = PROVIDER_KEY_ENV_VARS
            .iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| ((*name).to_string(), value))
            })
            .collect();
        let platform = Platform::current();
        Ok(Self {
            home_dir,
            working_dir,
            search_path: std::env::var_os("PATH"),
            env_vars,
            platform,
            timeouts: ProbeTimeouts::default(),
            endpoints: default_provider_endpoints(),
            offline: false,
            requirements: SystemRequirements::default(),
            disk_probe_path: default_disk_probe_path(platform),
            installer_url: DEFAULT_INSTALLER_URL.to_string(),
        })
    }

    /// Environment rooted at `home` with nothing discoverable: empty search
    /// path, no provider keys, working directory inside `home`.
    pub fn isolated(home: &Path) -> Self {
        let platform = Platform::current();
        Self {
            home_dir: home.to_path_buf(),
            working_dir: home.to_path_buf(),
            search_path: None,
            env_vars: BTreeMap::new(),
            platform,
            timeouts: ProbeTimeouts::default(),
            endpoints: default_provider_endpoints(),
            offline: false,
            requirements: SystemRequirements::default(),
            disk_probe_path: home.to_path_buf(),
            installer_url: DEFAULT_INSTALLER_URL.to_string(),
        }
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env_vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Default OpenClaw home, the one fixes create.
    pub fn openclaw_home(&self) -> PathBuf {
        self.home_dir.join(OPENCLAW_HOME_DIR_NAME)
    }

    /// Candidate OpenClaw homes in lookup order.
    pub fn openclaw_home_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = vec![
            self.openclaw_home(),
            self.home_dir.join(".config").join("openclaw"),
        ];
        if self.platform == Platform::Windows {
            candidates.push(self.home_dir.join("AppData").join("Local").join("openclaw"));
        }
        candidates
    }

    pub fn find_openclaw_home(&self) -> Option<PathBuf> {
        self.openclaw_home_candidates()
            .into_iter()
            .find(|path| path.is_dir())
    }
}
