//! Text and JSON renderers for pass, single-check and listing output.

use anyhow::Result;
use claw_diagnostics::{
    CheckResult, CheckStatus, FixAction, FixOutcome, PassReport, ProbeListing, RunSummary,
    SingleCheckReport,
};
use serde_json::{json, Map, Value};

pub(crate) const REPORT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const FIX_HINT_COMMAND: &str = "claw-doctor --fix";
const HEADER_TITLE: &str = "OpenClaw Doctor";
const HEADER_SUBTITLE: &str = "Diagnosing your OpenClaw installation";
const RULE_WIDTH: usize = 48;

pub(crate) fn status_icon(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "✓",
        CheckStatus::Warn => "!",
        CheckStatus::Fail => "✗",
        CheckStatus::Skip => "-",
    }
}

/// "1 passed, 2 warnings, 1 failed"; zero counts are left out.
pub(crate) fn summary_line(passed: usize, warned: usize, failed: usize) -> String {
    let mut parts = Vec::new();
    if passed > 0 {
        parts.push(format!("{passed} passed"));
    }
    if warned > 0 {
        let noun = if warned == 1 { "warning" } else { "warnings" };
        parts.push(format!("{warned} {noun}"));
    }
    if failed > 0 {
        parts.push(format!("{failed} failed"));
    }
    if parts.is_empty() {
        return "no checks reported a result".to_string();
    }
    parts.join(", ")
}

fn render_header(out: &mut String) {
    out.push_str(HEADER_TITLE);
    out.push('\n');
    out.push_str(HEADER_SUBTITLE);
    out.push_str("\n\n");
}

fn render_rule(out: &mut String, title: &str) {
    let label = format!(" {title} ");
    let side = RULE_WIDTH.saturating_sub(label.chars().count()) / 2;
    out.push_str(&"─".repeat(side));
    out.push_str(&label);
    out.push_str(&"─".repeat(side));
    out.push('\n');
}

fn render_result_line(out: &mut String, result: &CheckResult, verbose: bool) {
    out.push_str(&format!("[{}] {}\n", status_icon(result.status()), result.message()));
    if verbose {
        if let Some(details) = result.details() {
            for line in details.lines() {
                out.push_str(&format!("    {line}\n"));
            }
        }
    }
}

fn render_bullets(out: &mut String, items: &[String]) {
    for item in items {
        out.push_str(&format!("  • {item}\n"));
    }
}

fn render_fix_action(out: &mut String, action: &FixAction) {
    match action {
        FixAction::AutoFix {
            name,
            outcome,
            guidance,
        } => {
            out.push_str(&format!("[⚡] Attempting to fix: {name}\n"));
            match outcome {
                FixOutcome::Fixed => out.push_str(&format!("Success: {name} fixed!\n")),
                FixOutcome::NotFixed => {
                    out.push_str(&format!("{name} could not be fixed automatically.\n"));
                }
                FixOutcome::Faulted { reason } => {
                    out.push_str(&format!("{name} fix crashed: {reason}\n"));
                }
            }
            if !guidance.is_empty() {
                out.push_str("Try these steps instead:\n");
                render_bullets(out, guidance);
            }
        }
        FixAction::Manual { name, suggestions } => {
            out.push_str(&format!("{name} - Manual fix required:\n"));
            render_bullets(out, suggestions);
        }
    }
    out.push('\n');
}

fn render_summary(out: &mut String, summary: &RunSummary, fixes_requested: bool) {
    out.push('\n');
    out.push_str(&"─".repeat(RULE_WIDTH));
    out.push_str("\n\n");
    out.push_str(&format!(
        "Summary: {}\n",
        summary_line(summary.passed, summary.warned, summary.failed)
    ));
    if summary.failed > 0 || summary.warned > 0 {
        out.push('\n');
        if fixes_requested {
            out.push_str("Run claw-doctor again to verify the fixes.\n");
        } else {
            out.push_str(&format!("To fix issues, run: {FIX_HINT_COMMAND}\n"));
        }
    }
}

pub(crate) fn render_pass_text(report: &PassReport, verbose: bool) -> String {
    let mut out = String::new();
    render_header(&mut out);
    for result in &report.summary.results {
        render_result_line(&mut out, result, verbose);
    }
    if let Some(fixes) = report.fixes.as_ref().filter(|fixes| !fixes.is_empty()) {
        out.push('\n');
        render_rule(&mut out, "Auto-Fix");
        out.push('\n');
        for action in fixes {
            render_fix_action(&mut out, action);
        }
    }
    render_summary(&mut out, &report.summary, report.fixes.is_some());
    out
}

pub(crate) fn render_single_text(report: &SingleCheckReport, verbose: bool) -> String {
    let mut out = String::new();
    render_header(&mut out);
    render_result_line(&mut out, &report.result, verbose);
    if let Some(action) = report.fix.as_ref() {
        out.push('\n');
        render_fix_action(&mut out, action);
    }
    out
}

fn json_document(results: &[CheckResult], fixes: Option<Vec<Value>>) -> Value {
    let summary = RunSummary::from_results(results.to_vec());
    let mut document = Map::new();
    document.insert("version".to_string(), Value::from(REPORT_VERSION));
    document.insert(
        "checks".to_string(),
        Value::Array(results.iter().map(CheckResult::to_value).collect()),
    );
    document.insert(
        "summary".to_string(),
        json!({
            "passed": summary.passed,
            "warnings": summary.warned,
            "failed": summary.failed,
        }),
    );
    if let Some(fixes) = fixes {
        document.insert("fixes".to_string(), Value::Array(fixes));
    }
    Value::Object(document)
}

fn fix_values(actions: &[FixAction]) -> Result<Vec<Value>> {
    actions
        .iter()
        .map(|action| serde_json::to_value(action).map_err(anyhow::Error::from))
        .collect()
}

pub(crate) fn render_pass_json(report: &PassReport) -> Result<Value> {
    let fixes = report.fixes.as_deref().map(fix_values).transpose()?;
    Ok(json_document(&report.summary.results, fixes))
}

/// Same document shape as a pass, with one entry in `checks`.
pub(crate) fn render_single_json(report: &SingleCheckReport, fixes_requested: bool) -> Result<Value> {
    let fixes = if fixes_requested {
        Some(fix_values(report.fix.as_slice())?)
    } else {
        None
    };
    Ok(json_document(std::slice::from_ref(&report.result), fixes))
}

pub(crate) fn render_listing_text(listing: &[ProbeListing]) -> String {
    let mut out = String::from("Available Health Checks:\n\n");
    for item in listing {
        out.push_str(&format!("  {} ({})\n", item.name, item.key));
        out.push_str(&format!("    {}\n\n", item.description));
    }
    out
}

pub(crate) fn render_listing_json(listing: &[ProbeListing]) -> Value {
    Value::Array(
        listing
            .iter()
            .map(|item| {
                json!({
                    "name": item.name,
                    "key": item.key,
                    "description": item.description,
                })
            })
            .collect(),
    )
}

/// Stderr text for a check name that resolved to nothing.
pub(crate) fn render_unknown_check(name: &str, listing: &[ProbeListing]) -> String {
    let mut out = format!("Error: Unknown check: {name}\n\nAvailable checks:\n");
    for item in listing {
        out.push_str(&format!("  • {} - {}\n", item.key, item.description));
    }
    out
}
