//! Ordered probe registry and name/alias resolution.

use std::fmt;

use crate::{DoctorError, Probe};

type ProbeFactory = Box<dyn Fn() -> Box<dyn Probe>>;

/// Registry slot: constant identity plus a factory for fresh instances.
pub struct ProbeEntry {
    name: &'static str,
    description: &'static str,
    aliases: &'static [&'static str],
    factory: ProbeFactory,
}

impl ProbeEntry {
    pub fn new<F>(name: &'static str, description: &'static str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Probe> + 'static,
    {
        Self {
            name,
            description,
            aliases: &[],
            factory: Box::new(factory),
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    /// Lookup key shown in listings, e.g. `api_keys` for "API Keys".
    pub fn key(&self) -> String {
        normalize_probe_key(self.name)
    }

    pub fn instantiate(&self) -> Box<dyn Probe> {
        (self.factory)()
    }

    fn matches(&self, normalized: &str) -> bool {
        self.key() == normalized
            || self
                .aliases
                .iter()
                .any(|alias| normalize_probe_key(alias) == normalized)
    }
}

impl fmt::Debug for ProbeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `ProbeListing` used by list output.
pub struct ProbeListing {
    pub name: String,
    pub key: String,
    pub description: String,
}

/// Fixed, ordered collection of probes for one invocation.
#[derive(Debug, Default)]
pub struct ProbeRegistry {
    entries: Vec<ProbeEntry>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: ProbeEntry) -> Self {
        self.push(entry);
        self
    }

    pub fn push(&mut self, entry: ProbeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ProbeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, name: &str) -> Option<&ProbeEntry> {
        let normalized = normalize_probe_key(name);
        if normalized.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| entry.matches(&normalized))
    }

    pub fn lookup(&self, name: &str) -> Result<&ProbeEntry, DoctorError> {
        self.resolve(name).ok_or_else(|| DoctorError::UnknownProbe {
            name: name.to_string(),
            available: self.keys(),
        })
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(ProbeEntry::key).collect()
    }

    pub fn listing(&self) -> Vec<ProbeListing> {
        self.entries
            .iter()
            .map(|entry| ProbeListing {
                name: entry.name.to_string(),
                key: entry.key(),
                description: entry.description.to_string(),
            })
            .collect()
    }
}

/// Lowercases and folds `-` and spaces to `_`.
pub fn normalize_probe_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch == '-' || ch.is_whitespace() { '_' } else { ch })
        .collect()
}
