//! Registry builders wiring the concrete probes to a shared environment.

use std::sync::Arc;

use claw_diagnostics::{Probe, ProbeEntry, ProbeRegistry};

use crate::probes::{
    api_keys, config, docker, folders, logs, network, node, openclaw, system, ApiKeysProbe,
    ConfigProbe, DockerProbe, FoldersProbe, LogsProbe, NetworkProbe, NodeProbe, OpenClawProbe,
    SystemProbe,
};
use crate::ProbeEnvironment;

fn entry<P, F>(
    name: &'static str,
    description: &'static str,
    aliases: &'static [&'static str],
    env: &Arc<ProbeEnvironment>,
    build: F,
) -> ProbeEntry
where
    P: Probe + 'static,
    F: Fn(Arc<ProbeEnvironment>) -> P + 'static,
{
    let env = Arc::clone(env);
    ProbeEntry::new(name, description, move || {
        Box::new(build(Arc::clone(&env))) as Box<dyn Probe>
    })
    .with_aliases(aliases)
}

/// The seven standard probes in report order: Node.js, OpenClaw, Docker,
/// System, Config, API Keys, Network.
pub fn default_registry(env: Arc<ProbeEnvironment>) -> ProbeRegistry {
    ProbeRegistry::new()
        .with_entry(entry(
            node::NAME,
            node::DESCRIPTION,
            &["nodejs", "node"],
            &env,
            NodeProbe::new,
        ))
        .with_entry(entry(
            openclaw::NAME,
            openclaw::DESCRIPTION,
            &["claw"],
            &env,
            OpenClawProbe::new,
        ))
        .with_entry(entry(
            docker::NAME,
            docker::DESCRIPTION,
            &[],
            &env,
            DockerProbe::new,
        ))
        .with_entry(entry(
            system::NAME,
            system::DESCRIPTION,
            &[],
            &env,
            SystemProbe::new,
        ))
        .with_entry(entry(
            config::NAME,
            config::DESCRIPTION,
            &["configuration"],
            &env,
            ConfigProbe::new,
        ))
        .with_entry(entry(
            api_keys::NAME,
            api_keys::DESCRIPTION,
            &["apikeys", "keys"],
            &env,
            ApiKeysProbe::new,
        ))
        .with_entry(entry(
            network::NAME,
            network::DESCRIPTION,
            &["net"],
            &env,
            NetworkProbe::new,
        ))
}

/// Standard probes followed by the folder layout and log scan probes.
pub fn extended_registry(env: Arc<ProbeEnvironment>) -> ProbeRegistry {
    default_registry(Arc::clone(&env))
        .with_entry(entry(
            folders::NAME,
            folders::DESCRIPTION,
            &["dirs", "directories"],
            &env,
            FoldersProbe::new,
        ))
        .with_entry(entry(
            logs::NAME,
            logs::DESCRIPTION,
            &["log"],
            &env,
            LogsProbe::new,
        ))
}
