use std::{
    collections::VecDeque,
    fs,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use claw_diagnostics::{
    CheckResult, CheckStatus, DoctorError, FixAction, FixOutcome, Orchestrator, PassOptions,
    Probe, ProbeEntry, ProbeRegistry,
};
use claw_probes::{default_registry, extended_registry, ProbeEnvironment};
use serde_json::Value;

#[derive(Default)]
struct CallLog {
    constructed: AtomicUsize,
    runs: AtomicUsize,
    fixes: AtomicUsize,
}

/// Replays queued statuses across fresh instances; the last one repeats.
struct ScriptedProbe {
    name: &'static str,
    statuses: Arc<Mutex<VecDeque<CheckStatus>>>,
    auto_fix: bool,
    fix_succeeds: bool,
    calls: Arc<CallLog>,
}

impl Probe for ScriptedProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "scripted probe"
    }

    fn inspect(&mut self) -> anyhow::Result<CheckResult> {
        self.calls.runs.fetch_add(1, Ordering::SeqCst);
        let status = {
            let mut statuses = self
                .statuses
                .lock()
                .map_err(|_| anyhow::anyhow!("status queue poisoned"))?;
            if statuses.len() > 1 {
                statuses.pop_front().unwrap_or(CheckStatus::Pass)
            } else {
                statuses.front().copied().unwrap_or(CheckStatus::Pass)
            }
        };
        let mut result = CheckResult::new(self.name, status, format!("{} is {status}", self.name))?;
        if status != CheckStatus::Pass {
            result = result.with_suggestions([format!("repair {}", self.name)]);
            if self.auto_fix {
                result = result.with_auto_fix();
            }
        }
        Ok(result)
    }

    fn fix(&mut self) -> bool {
        self.calls.fixes.fetch_add(1, Ordering::SeqCst);
        self.fix_succeeds
    }
}

struct ScriptedSpec {
    name: &'static str,
    statuses: Vec<CheckStatus>,
    auto_fix: bool,
    fix_succeeds: bool,
}

impl ScriptedSpec {
    fn new(name: &'static str, statuses: &[CheckStatus]) -> Self {
        Self {
            name,
            statuses: statuses.to_vec(),
            auto_fix: false,
            fix_succeeds: false,
        }
    }

    fn auto_fix(mut self, fix_succeeds: bool) -> Self {
        self.auto_fix = true;
        self.fix_succeeds = fix_succeeds;
        self
    }

    fn into_entry(self) -> (ProbeEntry, Arc<CallLog>) {
        let calls = Arc::new(CallLog::default());
        let statuses = Arc::new(Mutex::new(VecDeque::from(self.statuses)));
        let factory_calls = Arc::clone(&calls);
        let Self {
            name,
            auto_fix,
            fix_succeeds,
            ..
        } = self;
        let entry = ProbeEntry::new(name, "scripted probe", move || {
            factory_calls.constructed.fetch_add(1, Ordering::SeqCst);
            Box::new(ScriptedProbe {
                name,
                statuses: Arc::clone(&statuses),
                auto_fix,
                fix_succeeds,
                calls: Arc::clone(&factory_calls),
            }) as Box<dyn Probe>
        });
        (entry, calls)
    }
}

fn scripted_registry(specs: Vec<ScriptedSpec>) -> (ProbeRegistry, Vec<Arc<CallLog>>) {
    let mut registry = ProbeRegistry::new();
    let mut logs = Vec::new();
    for spec in specs {
        let (entry, calls) = spec.into_entry();
        registry.push(entry);
        logs.push(calls);
    }
    (registry, logs)
}

#[test]
fn integration_mixed_statuses_signal_failure_and_keep_order() {
    let (registry, logs) = scripted_registry(vec![
        ScriptedSpec::new("A", &[CheckStatus::Pass]),
        ScriptedSpec::new("B", &[CheckStatus::Warn]),
        ScriptedSpec::new("C", &[CheckStatus::Fail]),
    ]);
    let report = Orchestrator::new(&registry).run_pass(PassOptions::default());

    let names: Vec<&str> = report.summary.results.iter().map(CheckResult::name).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_eq!(
        (report.summary.passed, report.summary.warned, report.summary.failed),
        (1, 1, 1)
    );
    assert!(report.has_failures());
    assert!(report.fixes.is_none());
    for calls in &logs {
        assert_eq!(calls.constructed.load(Ordering::SeqCst), 1);
        assert_eq!(calls.runs.load(Ordering::SeqCst), 1);
        assert_eq!(calls.fixes.load(Ordering::SeqCst), 0);
    }
}

#[test]
fn integration_unknown_single_check_runs_nothing() {
    let (registry, logs) = scripted_registry(vec![
        ScriptedSpec::new("Alpha", &[CheckStatus::Pass]),
        ScriptedSpec::new("Beta Gamma", &[CheckStatus::Fail]),
    ]);
    let error = Orchestrator::new(&registry)
        .run_single("bogus", PassOptions { attempt_fixes: true })
        .expect_err("unknown name");
    match error {
        DoctorError::UnknownProbe { name, available } => {
            assert_eq!(name, "bogus");
            assert_eq!(available, ["alpha", "beta_gamma"]);
        }
    }
    for calls in &logs {
        assert_eq!(calls.constructed.load(Ordering::SeqCst), 0);
    }
}

#[test]
fn integration_fix_pass_reruns_fresh_instance_and_fixes_once() {
    let (registry, logs) = scripted_registry(vec![
        ScriptedSpec::new("Docker", &[CheckStatus::Warn, CheckStatus::Warn]).auto_fix(true),
        ScriptedSpec::new("Manual", &[CheckStatus::Fail]),
        ScriptedSpec::new("Healthy", &[CheckStatus::Pass]).auto_fix(true),
    ]);
    let report = Orchestrator::new(&registry).run_pass(PassOptions {
        attempt_fixes: true,
    });

    assert_eq!(report.summary.results[0].status(), CheckStatus::Warn);
    assert_eq!(logs[0].constructed.load(Ordering::SeqCst), 2);
    assert_eq!(logs[0].runs.load(Ordering::SeqCst), 2);
    assert_eq!(logs[0].fixes.load(Ordering::SeqCst), 1);
    assert_eq!(logs[2].fixes.load(Ordering::SeqCst), 0);

    let fixes = report.fixes.expect("fix actions present");
    assert_eq!(
        fixes,
        vec![
            FixAction::AutoFix {
                name: "Docker".to_string(),
                outcome: FixOutcome::Fixed,
                guidance: Vec::new(),
            },
            FixAction::Manual {
                name: "Manual".to_string(),
                suggestions: vec!["repair Manual".to_string()],
            },
        ]
    );
}

#[test]
fn integration_unsuccessful_fix_carries_guidance() {
    let (registry, logs) = scripted_registry(vec![
        ScriptedSpec::new("Stubborn", &[CheckStatus::Fail]).auto_fix(false),
    ]);
    let report = Orchestrator::new(&registry)
        .run_single("stubborn", PassOptions { attempt_fixes: true })
        .expect("known probe");
    assert!(report.has_failure());
    assert_eq!(logs[0].constructed.load(Ordering::SeqCst), 1);
    assert_eq!(logs[0].fixes.load(Ordering::SeqCst), 1);
    match report.fix.expect("fix attempted") {
        FixAction::AutoFix {
            outcome, guidance, ..
        } => {
            assert_eq!(outcome, FixOutcome::NotFixed);
            assert_eq!(guidance, ["repair Stubborn"]);
        }
        other => panic!("unexpected action {other:?}"),
    }
}

#[test]
fn integration_results_survive_structural_round_trip() {
    let (registry, _) = scripted_registry(vec![
        ScriptedSpec::new("One", &[CheckStatus::Warn]).auto_fix(true),
        ScriptedSpec::new("Two", &[CheckStatus::Skip]),
    ]);
    let report = Orchestrator::new(&registry).run_pass(PassOptions::default());
    for result in &report.summary.results {
        let value: Value = result.to_value();
        let restored = CheckResult::from_value(&value).expect("restore");
        assert_eq!(&restored, result);
    }
    assert_eq!(report.summary.skipped(), 1);
}

#[test]
fn integration_isolated_default_registry_reports_absences() {
    let home = tempfile::tempdir().expect("home");
    let mut env = ProbeEnvironment::isolated(home.path());
    env.offline = true;
    let registry = default_registry(Arc::new(env));
    let report = Orchestrator::new(&registry).run_pass(PassOptions::default());

    assert_eq!(report.summary.results.len(), registry.len());
    let status_of = |name: &str| {
        report
            .summary
            .results
            .iter()
            .find(|result| result.name() == name)
            .map(CheckResult::status)
    };
    assert_eq!(status_of("Node.js"), Some(CheckStatus::Fail));
    assert_eq!(status_of("OpenClaw"), Some(CheckStatus::Fail));
    assert_eq!(status_of("Docker"), Some(CheckStatus::Warn));
    assert_eq!(status_of("Config"), Some(CheckStatus::Warn));
    assert_eq!(status_of("API Keys"), Some(CheckStatus::Warn));
    assert_eq!(status_of("Network"), Some(CheckStatus::Skip));
    assert!(report.has_failures());

    for result in &report.summary.results {
        assert!(!result.message().trim().is_empty());
        if result.needs_attention() && !result.can_auto_fix() {
            assert!(
                !result.fix_suggestions().is_empty(),
                "{} has no next step",
                result.name()
            );
        }
    }
}

#[test]
fn integration_extended_fix_pass_builds_openclaw_layout() {
    let home = tempfile::tempdir().expect("home");
    let mut env = ProbeEnvironment::isolated(home.path());
    env.offline = true;
    let registry = extended_registry(Arc::new(env));
    let orchestrator = Orchestrator::new(&registry);

    let first = orchestrator.run_pass(PassOptions {
        attempt_fixes: true,
    });
    let fixes = first.fixes.expect("fixes requested");
    let fixed: Vec<&str> = fixes
        .iter()
        .filter(|action| {
            matches!(
                action,
                FixAction::AutoFix {
                    outcome: FixOutcome::Fixed,
                    ..
                }
            )
        })
        .map(FixAction::name)
        .collect();
    assert!(fixed.contains(&"Config"), "{fixes:?}");
    assert!(fixed.contains(&"Folders"), "{fixes:?}");

    let openclaw_home = home.path().join(".openclaw");
    assert!(openclaw_home.join("config.yaml").is_file());
    for name in ["skills", "channels", "workspaces"] {
        assert!(openclaw_home.join(name).is_dir(), "{name} missing");
    }

    let second = orchestrator.run_pass(PassOptions::default());
    let status_of = |name: &str| {
        second
            .summary
            .results
            .iter()
            .find(|result| result.name() == name)
            .map(CheckResult::status)
    };
    assert_eq!(status_of("Config"), Some(CheckStatus::Pass));
    assert_eq!(status_of("Folders"), Some(CheckStatus::Pass));
    assert_eq!(status_of("Logs"), Some(CheckStatus::Pass));
}

#[test]
fn integration_recent_error_log_fails_logs_probe() {
    let home = tempfile::tempdir().expect("home");
    let logs_dir = home.path().join(".openclaw").join("logs");
    fs::create_dir_all(&logs_dir).expect("logs dir");
    fs::write(
        logs_dir.join("openclaw.log"),
        "starting gateway\nError: connect ECONNREFUSED 127.0.0.1:443\n",
    )
    .expect("log file");

    let mut env = ProbeEnvironment::isolated(home.path());
    env.offline = true;
    let registry = extended_registry(Arc::new(env));
    let report = Orchestrator::new(&registry)
        .run_single("log", PassOptions::default())
        .expect("logs probe registered");
    assert_eq!(report.result.status(), CheckStatus::Fail);
    assert!(report
        .result
        .details()
        .unwrap_or_default()
        .contains("Connection refused"));
}
