use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use claw_diagnostics::{CheckResult, Probe};
use regex::Regex;

use super::{locate, log_guidance, query_stdout};
use crate::{Platform, ProbeEnvironment};

pub const NAME: &str = "Node.js";
pub const DESCRIPTION: &str = "Verifies Node.js >= 18.x is installed";
pub const MIN_NODE_VERSION: NodeVersion = NodeVersion {
    major: 18,
    minor: 0,
    patch: 0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl std::fmt::Display for NodeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn version_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)").ok())
        .as_ref()
}

/// Parses `node --version` output such as `v20.10.0`.
pub fn parse_node_version(raw: &str) -> Option<NodeVersion> {
    let captures = version_regex()?.captures(raw.trim())?;
    let component = |index: usize| captures.get(index)?.as_str().parse::<u64>().ok();
    Some(NodeVersion {
        major: component(1)?,
        minor: component(2)?,
        patch: component(3)?,
    })
}

pub fn install_suggestions(platform: Platform) -> Vec<String> {
    let steps: &[&str] = match platform {
        Platform::MacOs => &[
            "Install via Homebrew: brew install node",
            "Or use nvm: curl -o- https://raw.githubusercontent.com/nvm-sh/nvm/v0.39.0/install.sh | bash",
            "Then: nvm install 20",
        ],
        Platform::Windows => &[
            "Download from: https://nodejs.org/en/download/",
            "Or use winget: winget install OpenJS.NodeJS.LTS",
            "Or use nvm-windows: https://github.com/coreybutler/nvm-windows",
        ],
        Platform::Linux => &[
            "Install via nvm: curl -o- https://raw.githubusercontent.com/nvm-sh/nvm/v0.39.0/install.sh | bash",
            "Then: nvm install 20",
            "Or via package manager (Ubuntu): sudo apt install nodejs npm",
        ],
    };
    steps.iter().map(|step| step.to_string()).collect()
}

/// Checks that a recent enough Node.js runtime is on the search path.
pub struct NodeProbe {
    env: Arc<ProbeEnvironment>,
    path: Option<PathBuf>,
    version: Option<NodeVersion>,
}

impl NodeProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            path: None,
            version: None,
        }
    }
}

impl Probe for NodeProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        self.path = locate(&self.env, "node");
        self.version = self.path.as_deref().and_then(|path| {
            query_stdout(path, &["--version"], self.env.timeouts.command)
                .and_then(|raw| parse_node_version(&raw))
        });

        let Some(path) = self.path.as_ref() else {
            return Ok(CheckResult::fail(NAME, "Node.js is not installed")?
                .with_details(format!("OpenClaw requires Node.js >= {}", MIN_NODE_VERSION.major))
                .with_suggestions(install_suggestions(self.env.platform)));
        };
        let Some(version) = self.version else {
            return Ok(
                CheckResult::warn(NAME, "Node.js found but version could not be determined")?
                    .with_details(format!("Path: {}", path.display()))
                    .with_suggestions(["Try running 'node --version' manually"]),
            );
        };
        if version < MIN_NODE_VERSION {
            return Ok(CheckResult::fail(
                NAME,
                format!("Node.js v{version} is below minimum v{MIN_NODE_VERSION}"),
            )?
            .with_details(format!("Path: {}", path.display()))
            .with_suggestions(install_suggestions(self.env.platform)));
        }
        Ok(CheckResult::pass(NAME, format!("Node.js v{version} installed"))?
            .with_details(format!("Path: {}", path.display())))
    }

    fn fix(&mut self) -> bool {
        log_guidance(NAME, "Install Node.js", &install_suggestions(self.env.platform));
        false
    }
}
