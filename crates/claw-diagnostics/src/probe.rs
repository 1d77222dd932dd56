//! The uniform contract every diagnostic probe implements.

use crate::CheckResult;

/// Headline used when a probe's inspection returns an unexpected error.
pub const PROBE_FAULT_MESSAGE: &str = "Check could not complete due to an unexpected error";

/// A named, stateful unit of diagnosis.
///
/// `inspect` records whatever it discovers in the probe's own fields so a
/// following `fix` on the same instance can act without re-discovering.
/// Absence of a tool, file or network target is reported as a Warn/Fail
/// result; `Err` is reserved for faults the probe did not anticipate.
pub trait Probe {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn inspect(&mut self) -> anyhow::Result<CheckResult>;

    /// Attempts remediation. `false` means nothing was mutated, which
    /// includes fixes that only emit guidance.
    fn fix(&mut self) -> bool;

    fn run(&mut self) -> CheckResult {
        match self.inspect() {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(probe = self.name(), error = %format!("{error:#}"), "probe inspection faulted");
                CheckResult::internal_fault(self.name(), PROBE_FAULT_MESSAGE, format!("{error:#}"))
            }
        }
    }
}
