use std::sync::Arc;

use anyhow::{Context, Result};
use claw_diagnostics::{CheckResult, Probe};
use reqwest::blocking::Client;
use tracing::debug;

use super::log_guidance;
use crate::{ProbeEnvironment, ProviderEndpoint};

pub const NAME: &str = "Network";
pub const DESCRIPTION: &str = "Tests connectivity to AI providers";

fn troubleshooting_steps() -> Vec<String> {
    [
        "Check your internet connection",
        "If behind a proxy, configure HTTP_PROXY and HTTPS_PROXY",
        "Check if firewall is blocking outbound connections",
        "Try: curl https://api.anthropic.com to test manually",
    ]
    .map(String::from)
    .to_vec()
}

fn failure_label(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request error"
    }
}

/// Sends one HEAD request; any HTTP response means the host is reachable.
fn probe_endpoint(client: &Client, endpoint: &ProviderEndpoint) -> std::result::Result<(), String> {
    match client.head(&endpoint.url).send() {
        Ok(response) => {
            debug!(probe = NAME, endpoint = %endpoint.name, status = response.status().as_u16(), "endpoint reachable");
            Ok(())
        }
        Err(error) => {
            debug!(probe = NAME, endpoint = %endpoint.name, error = %error, "endpoint unreachable");
            Err(format!("{} ({})", endpoint.name, failure_label(&error)))
        }
    }
}

/// HEAD reachability of each provider endpoint.
pub struct NetworkProbe {
    env: Arc<ProbeEnvironment>,
    reachable: Vec<String>,
    unreachable: Vec<String>,
}

impl NetworkProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            reachable: Vec::new(),
            unreachable: Vec::new(),
        }
    }
}

impl Probe for NetworkProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        self.reachable.clear();
        self.unreachable.clear();
        if self.env.offline {
            return Ok(CheckResult::skip(NAME, "Network checks skipped (offline mode)")?);
        }
        if self.env.endpoints.is_empty() {
            return Ok(CheckResult::skip(NAME, "No provider endpoints configured")?);
        }

        let client = Client::builder()
            .timeout(self.env.timeouts.network.max(std::time::Duration::from_millis(1)))
            .build()
            .context("failed to build HTTP client")?;
        for endpoint in &self.env.endpoints {
            match probe_endpoint(&client, endpoint) {
                Ok(()) => self.reachable.push(endpoint.name.clone()),
                Err(label) => self.unreachable.push(label),
            }
        }

        if self.reachable.is_empty() {
            return Ok(CheckResult::fail(NAME, "Cannot reach any AI providers")?
                .with_details("All connection attempts failed")
                .with_suggestions(troubleshooting_steps()));
        }
        let reachable = format!("Reachable: {}", self.reachable.join(", "));
        if !self.unreachable.is_empty() {
            return Ok(CheckResult::warn(
                NAME,
                format!("Some providers unreachable: {}", self.unreachable.join(", ")),
            )?
            .with_details(reachable)
            .with_suggestions(troubleshooting_steps()));
        }
        Ok(CheckResult::pass(NAME, "Network connectivity OK")?.with_details(reachable))
    }

    fn fix(&mut self) -> bool {
        log_guidance(NAME, "Network Troubleshooting", &troubleshooting_steps());
        false
    }
}
