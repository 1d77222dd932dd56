use std::sync::Arc;

use anyhow::{Context, Result};
use claw_diagnostics::{CheckResult, Probe};
use sysinfo::System;

use super::log_guidance;
use crate::{ProbeEnvironment, SystemRequirements};

pub const NAME: &str = "System";
pub const DESCRIPTION: &str = "RAM (2GB+), Disk (20GB+), CPU";

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Measured host resources.
pub struct SystemSnapshot {
    pub ram_gb: f64,
    pub free_disk_gb: f64,
    pub cpu_cores: usize,
}

impl SystemSnapshot {
    pub fn capture(env: &ProbeEnvironment) -> Result<Self> {
        let mut system = System::new();
        system.refresh_memory();
        let cpu_cores = system
            .physical_core_count()
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1);
        let free_disk = fs2::available_space(&env.disk_probe_path).with_context(|| {
            format!(
                "failed to read free space for {}",
                env.disk_probe_path.display()
            )
        })?;
        Ok(Self {
            ram_gb: system.total_memory() as f64 / BYTES_PER_GB,
            free_disk_gb: free_disk as f64 / BYTES_PER_GB,
            cpu_cores,
        })
    }
}

fn improvement_suggestions(snapshot: &SystemSnapshot, limits: &SystemRequirements) -> Vec<String> {
    let mut suggestions = Vec::new();
    if snapshot.ram_gb < limits.recommended_ram_gb {
        suggestions.push(format!(
            "Consider upgrading to {}GB+ RAM for better performance",
            limits.recommended_ram_gb
        ));
    }
    if snapshot.free_disk_gb < limits.min_disk_gb {
        suggestions.extend(
            [
                "Free up disk space by:",
                "  - Removing unused applications",
                "  - Clearing temporary files",
                "  - Moving large files to external storage",
            ]
            .map(String::from),
        );
    }
    if snapshot.cpu_cores < limits.min_cpu_cores {
        suggestions.push(format!(
            "Run OpenClaw on a machine with {}+ CPU cores for smoother agents",
            limits.min_cpu_cores
        ));
    }
    suggestions
}

/// Grades a snapshot against the thresholds. Shortfalls below the minimum
/// fail; soft shortfalls warn.
pub fn evaluate_snapshot(
    snapshot: &SystemSnapshot,
    limits: &SystemRequirements,
) -> Result<CheckResult> {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if snapshot.ram_gb < limits.min_ram_gb {
        issues.push(format!(
            "RAM: {:.1}GB (minimum {}GB required)",
            snapshot.ram_gb, limits.min_ram_gb
        ));
    } else if snapshot.ram_gb < limits.recommended_ram_gb {
        warnings.push(format!(
            "RAM: {:.1}GB (recommended {}GB+)",
            snapshot.ram_gb, limits.recommended_ram_gb
        ));
    }
    if snapshot.free_disk_gb < limits.min_disk_gb {
        issues.push(format!(
            "Disk: {:.1}GB free (minimum {}GB required)",
            snapshot.free_disk_gb, limits.min_disk_gb
        ));
    }
    if snapshot.cpu_cores < limits.min_cpu_cores {
        warnings.push(format!(
            "CPU: {} cores (recommended {}+)",
            snapshot.cpu_cores, limits.min_cpu_cores
        ));
    }

    let suggestions = improvement_suggestions(snapshot, limits);
    if !issues.is_empty() {
        let details = issues
            .iter()
            .chain(warnings.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        return Ok(
            CheckResult::fail(NAME, "System does not meet minimum requirements")?
                .with_details(details)
                .with_suggestions(suggestions),
        );
    }

    let summary = format!(
        "{:.1}GB RAM, {:.0}GB free, {} cores",
        snapshot.ram_gb, snapshot.free_disk_gb, snapshot.cpu_cores
    );
    if !warnings.is_empty() {
        return Ok(CheckResult::warn(
            NAME,
            format!("System meets minimum requirements ({summary})"),
        )?
        .with_details(warnings.join("\n"))
        .with_suggestions(suggestions));
    }
    Ok(CheckResult::pass(
        NAME,
        format!("System requirements met ({summary})"),
    )?)
}

/// Host RAM, free disk and CPU core count against OpenClaw's requirements.
pub struct SystemProbe {
    env: Arc<ProbeEnvironment>,
    snapshot: Option<SystemSnapshot>,
}

impl SystemProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            snapshot: None,
        }
    }
}

impl Probe for SystemProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        let snapshot = SystemSnapshot::capture(&self.env)?;
        self.snapshot = Some(snapshot);
        evaluate_snapshot(&snapshot, &self.env.requirements)
    }

    fn fix(&mut self) -> bool {
        let limits = self.env.requirements;
        let steps = self
            .snapshot
            .map(|snapshot| improvement_suggestions(&snapshot, &limits))
            .filter(|steps| !steps.is_empty())
            .unwrap_or_else(|| {
                vec![
                    "Your system meets the minimum requirements.".to_string(),
                    format!(
                        "For best performance, ensure you have {}GB+ RAM and {}GB+ free disk space.",
                        limits.recommended_ram_gb, limits.min_disk_gb
                    ),
                ]
            });
        log_guidance(NAME, "System Requirements", &steps);
        false
    }
}
