use std::io::Write;

use claw_diagnostics::{CheckResult, PassObserver};

/// Streams "Checking ..." lines to a side channel while a pass runs.
pub(crate) struct ProgressObserver<'a> {
    writer: &'a mut dyn Write,
    enabled: bool,
}

impl<'a> ProgressObserver<'a> {
    pub(crate) fn new(writer: &'a mut dyn Write, enabled: bool) -> Self {
        Self { writer, enabled }
    }

    fn emit(&mut self, line: &str) {
        if !self.enabled {
            return;
        }
        if let Err(error) = writeln!(self.writer, "{line}") {
            tracing::debug!(error = %error, "failed to write progress line");
        }
    }
}

impl PassObserver for ProgressObserver<'_> {
    fn probe_started(&mut self, name: &str) {
        self.emit(&format!("Checking {name}..."));
    }

    fn probe_finished(&mut self, result: &CheckResult) {
        self.emit(&format!("  {} -> {}", result.name(), result.status()));
    }

    fn fix_started(&mut self, name: &str) {
        self.emit(&format!("Fixing {name}..."));
    }
}
