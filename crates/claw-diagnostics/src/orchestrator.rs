//! Diagnostic pass orchestration.
//!
//! Runs every registry entry exactly once, in order, on a fresh instance.
//! A probe that panics is isolated and reported as a synthesised Fail so the
//! rest of the pass still runs. When fixes are requested, Fail/Warn results
//! are revisited in the same order: auto-fixable ones get a fresh instance,
//! a `run` to repopulate its state and a single `fix` call; the rest surface
//! their suggestions as manual guidance.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{CheckResult, CheckStatus, DoctorError, Probe, ProbeEntry, ProbeRegistry};

/// Headline for a Result synthesised after a probe panicked.
pub const PROBE_PANIC_MESSAGE: &str = "Check crashed before it could report a result";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Public struct `PassOptions` used by batch and single-check runs.
pub struct PassOptions {
    pub attempt_fixes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Ordered results of one pass plus tallies. Skip is excluded from all counts.
pub struct RunSummary {
    pub results: Vec<CheckResult>,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_results(results: Vec<CheckResult>) -> Self {
        let mut summary = Self {
            results: Vec::with_capacity(results.len()),
            passed: 0,
            warned: 0,
            failed: 0,
        };
        for result in results {
            summary.record(result);
        }
        summary
    }

    fn record(&mut self, result: CheckResult) {
        match result.status() {
            CheckStatus::Pass => self.passed = self.passed.saturating_add(1),
            CheckStatus::Warn => self.warned = self.warned.saturating_add(1),
            CheckStatus::Fail => self.failed = self.failed.saturating_add(1),
            CheckStatus::Skip => {}
        }
        self.results.push(result);
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.status() == CheckStatus::Skip)
            .count()
    }

    /// True when any probe reported Fail; maps to a non-zero exit status.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
/// Enumerates supported `FixOutcome` values.
pub enum FixOutcome {
    Fixed,
    NotFixed,
    Faulted { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// One step of the remediation pass.
pub enum FixAction {
    AutoFix {
        name: String,
        #[serde(flatten)]
        outcome: FixOutcome,
        /// Suggestions to show when the fix did not resolve the issue.
        guidance: Vec<String>,
    },
    Manual {
        name: String,
        suggestions: Vec<String>,
    },
}

impl FixAction {
    pub fn name(&self) -> &str {
        match self {
            FixAction::AutoFix { name, .. } | FixAction::Manual { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Public struct `PassReport` returned by a batch run.
pub struct PassReport {
    pub summary: RunSummary,
    /// `None` when fixes were not requested.
    pub fixes: Option<Vec<FixAction>>,
}

impl PassReport {
    pub fn has_failures(&self) -> bool {
        self.summary.has_failures()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Public struct `SingleCheckReport` returned by a single-check run.
pub struct SingleCheckReport {
    pub result: CheckResult,
    pub fix: Option<FixAction>,
}

impl SingleCheckReport {
    pub fn has_failure(&self) -> bool {
        self.result.status() == CheckStatus::Fail
    }
}

/// Progress hooks for presentation layers. All methods default to no-ops.
pub trait PassObserver {
    fn probe_started(&mut self, _name: &str) {}

    fn probe_finished(&mut self, _result: &CheckResult) {}

    fn fix_started(&mut self, _name: &str) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl PassObserver for NoopObserver {}

/// Drives probes from a registry.
#[derive(Debug)]
pub struct Orchestrator<'a> {
    registry: &'a ProbeRegistry,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a ProbeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a ProbeRegistry {
        self.registry
    }

    pub fn run_pass(&self, options: PassOptions) -> PassReport {
        self.run_pass_with_observer(options, &mut NoopObserver)
    }

    pub fn run_pass_with_observer(
        &self,
        options: PassOptions,
        observer: &mut dyn PassObserver,
    ) -> PassReport {
        let mut summary = RunSummary::from_results(Vec::new());
        for entry in self.registry.entries() {
            observer.probe_started(entry.name());
            let (_, result) = run_isolated(entry);
            observer.probe_finished(&result);
            summary.record(result);
        }
        debug!(
            passed = summary.passed,
            warned = summary.warned,
            failed = summary.failed,
            "diagnostic pass finished"
        );

        let fixes = options
            .attempt_fixes
            .then(|| self.fix_pass(&summary.results, observer));
        PassReport { summary, fixes }
    }

    fn fix_pass(&self, results: &[CheckResult], observer: &mut dyn PassObserver) -> Vec<FixAction> {
        self.registry
            .entries()
            .iter()
            .zip(results)
            .filter(|(_, result)| result.needs_attention())
            .filter_map(|(entry, result)| {
                if result.can_auto_fix() {
                    observer.fix_started(entry.name());
                    let outcome = rerun_and_fix(entry);
                    Some(auto_fix_action(result, outcome))
                } else if !result.fix_suggestions().is_empty() {
                    Some(FixAction::Manual {
                        name: result.name().to_string(),
                        suggestions: result.fix_suggestions().to_vec(),
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn run_single(
        &self,
        name: &str,
        options: PassOptions,
    ) -> Result<SingleCheckReport, DoctorError> {
        self.run_single_with_observer(name, options, &mut NoopObserver)
    }

    pub fn run_single_with_observer(
        &self,
        name: &str,
        options: PassOptions,
        observer: &mut dyn PassObserver,
    ) -> Result<SingleCheckReport, DoctorError> {
        let entry = self.registry.lookup(name)?;
        observer.probe_started(entry.name());
        let (probe, result) = run_isolated(entry);
        observer.probe_finished(&result);

        let fix = if options.attempt_fixes && result.needs_attention() {
            match probe {
                Some(mut probe) if result.can_auto_fix() => {
                    observer.fix_started(entry.name());
                    let outcome = fix_isolated(entry.name(), probe.as_mut());
                    Some(auto_fix_action(&result, outcome))
                }
                _ if !result.fix_suggestions().is_empty() => Some(FixAction::Manual {
                    name: result.name().to_string(),
                    suggestions: result.fix_suggestions().to_vec(),
                }),
                _ => None,
            }
        } else {
            None
        };
        Ok(SingleCheckReport { result, fix })
    }
}

fn auto_fix_action(result: &CheckResult, outcome: FixOutcome) -> FixAction {
    let guidance = if outcome == FixOutcome::Fixed {
        Vec::new()
    } else {
        result.fix_suggestions().to_vec()
    };
    FixAction::AutoFix {
        name: result.name().to_string(),
        outcome,
        guidance,
    }
}

/// Instantiates and runs one entry; the instance is returned unless it panicked.
fn run_isolated(entry: &ProbeEntry) -> (Option<Box<dyn Probe>>, CheckResult) {
    debug!(probe = entry.name(), "running probe");
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut probe = entry.instantiate();
        let result = probe.run();
        (probe, result)
    }));
    match attempt {
        Ok((probe, result)) => {
            if result.name() != entry.name() {
                warn!(
                    probe = entry.name(),
                    reported = result.name(),
                    "probe reported a result under a different name"
                );
            }
            debug!(probe = entry.name(), status = %result.status(), "probe finished");
            (Some(probe), result)
        }
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            warn!(probe = entry.name(), reason = %reason, "probe panicked during run");
            (
                None,
                CheckResult::internal_fault(entry.name(), PROBE_PANIC_MESSAGE, reason),
            )
        }
    }
}

/// Re-runs a fresh instance and fixes it only if the issue is still present.
fn rerun_and_fix(entry: &ProbeEntry) -> FixOutcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut probe = entry.instantiate();
        let rerun = probe.run();
        if !rerun.needs_attention() {
            info!(probe = entry.name(), status = %rerun.status(), "issue cleared before fix");
            return true;
        }
        debug!(probe = entry.name(), status = %rerun.status(), "re-run confirmed issue");
        probe.fix()
    }));
    fix_outcome(entry.name(), attempt)
}

fn fix_isolated(name: &str, probe: &mut dyn Probe) -> FixOutcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| probe.fix()));
    fix_outcome(name, attempt)
}

fn fix_outcome(name: &str, attempt: std::thread::Result<bool>) -> FixOutcome {
    match attempt {
        Ok(true) => {
            info!(probe = name, "fix applied");
            FixOutcome::Fixed
        }
        Ok(false) => {
            info!(probe = name, "fix did not resolve the issue");
            FixOutcome::NotFixed
        }
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            warn!(probe = name, reason = %reason, "probe panicked during fix");
            FixOutcome::Faulted { reason }
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
