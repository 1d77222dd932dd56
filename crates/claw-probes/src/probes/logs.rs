//! Recent OpenClaw log scan with plain-language explanations.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use claw_diagnostics::{CheckResult, CheckStatus, Probe};
use regex::Regex;
use tracing::{debug, info};

use crate::{Platform, ProbeEnvironment};

pub const NAME: &str = "Logs";
pub const DESCRIPTION: &str = "Parses logs for errors with explanations";
pub const MAX_LOG_AGE_HOURS: i64 = 24;
pub const MAX_LOG_FILES: usize = 5;
pub const MAX_TAIL_BYTES: u64 = 100 * 1024;
pub const MAX_ISSUES_SHOWN: usize = 5;
pub const MAX_SUGGESTIONS: usize = 3;
const MAX_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Error,
    Warning,
}

#[derive(Debug)]
/// Known failure signature with its explanation.
pub struct LogPattern {
    pub message: &'static str,
    pub explanation: &'static str,
    pub suggestion: &'static str,
    pub severity: LogSeverity,
    regex: Regex,
}

struct PatternSpec(&'static str, &'static str, &'static str, &'static str, LogSeverity);

const PATTERN_SPECS: &[PatternSpec] = &[
    PatternSpec(
        r"rate.?limit|too.?many.?requests|429",
        "API rate limit exceeded",
        "You've made too many API calls in a short time period.",
        "Wait a few minutes before trying again, or upgrade your API plan for higher limits.",
        LogSeverity::Warning,
    ),
    PatternSpec(
        r"invalid.?api.?key|unauthorized|401|authentication.?failed",
        "API authentication failed",
        "Your API key is invalid, expired, or not authorized.",
        "Check your API key in the config or environment variables. Get a new key from your provider's dashboard.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"insufficient.?quota|billing|payment.?required|402",
        "Billing/quota issue",
        "Your API account has run out of credits or has a billing problem.",
        "Add credits to your API account or check your payment method.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"connection.?refused|ECONNREFUSED",
        "Connection refused",
        "Could not connect to the server. The service may be down.",
        "Check your internet connection. Try again in a few minutes.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"connection.?timeout|ETIMEDOUT|timed?.?out",
        "Connection timeout",
        "The server took too long to respond.",
        "Check your internet connection. The service may be experiencing high load.",
        LogSeverity::Warning,
    ),
    PatternSpec(
        r"ENOTFOUND|DNS|name.?resolution",
        "DNS resolution failed",
        "Could not find the server's address.",
        "Check your internet connection and DNS settings.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"ssl|certificate|TLS|CERT",
        "SSL/TLS certificate error",
        "There's a problem with the secure connection.",
        "Check your system date/time is correct. Your firewall may be intercepting traffic.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"config.?not.?found|missing.?config",
        "Configuration not found",
        "OpenClaw couldn't find its configuration file.",
        "Run 'openclaw init' to create a new configuration.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"invalid.?yaml|yaml.?parse|syntax.?error",
        "Configuration syntax error",
        "Your config file has invalid YAML syntax.",
        "Check config.yaml for typos. Use a YAML validator to find errors.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"permission.?denied|EACCES|access.?denied",
        "Permission denied",
        "OpenClaw doesn't have permission to access a file or directory.",
        "Check file permissions. On Unix: chmod 755 ~/.openclaw",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"out.?of.?memory|ENOMEM|memory.?limit",
        "Out of memory",
        "The system ran out of available memory.",
        "Close other applications. Consider increasing system RAM.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"model.?not.?found|invalid.?model",
        "AI model not found",
        "The specified AI model doesn't exist or isn't available.",
        "Check the model name in your config. Use 'openclaw models' to see available options.",
        LogSeverity::Error,
    ),
    PatternSpec(
        r"context.?length|token.?limit|too.?long",
        "Context length exceeded",
        "Your message or conversation is too long for the AI model.",
        "Try a shorter message or start a new conversation.",
        LogSeverity::Warning,
    ),
    PatternSpec(
        r"skill.?failed|skill.?error",
        "Skill execution failed",
        "One of OpenClaw's skills encountered an error.",
        "Check the skill's configuration. Try disabling and re-enabling the skill.",
        LogSeverity::Warning,
    ),
    PatternSpec(
        r"channel.?disconnected|channel.?error",
        "Messaging channel error",
        "There's a problem with a messaging channel (WhatsApp, Telegram, etc.).",
        "Re-authenticate the channel. Check your API tokens.",
        LogSeverity::Warning,
    ),
];

/// Compiled, case-insensitive patterns in declaration order.
pub fn log_patterns() -> &'static [LogPattern] {
    static PATTERNS: OnceLock<Vec<LogPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PATTERN_SPECS
            .iter()
            .filter_map(|spec| {
                let regex = Regex::new(&format!("(?i){}", spec.0)).ok()?;
                Some(LogPattern {
                    message: spec.1,
                    explanation: spec.2,
                    suggestion: spec.3,
                    severity: spec.4,
                    regex,
                })
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
/// One pattern hit inside one log file.
pub struct LogFinding {
    pub pattern: &'static LogPattern,
    pub excerpt: String,
    pub file: PathBuf,
}

/// Every pattern matching `content`, each with its first matching line.
pub fn scan_log_content(content: &str) -> Vec<(&'static LogPattern, String)> {
    log_patterns()
        .iter()
        .filter(|pattern| pattern.regex.is_match(content))
        .map(|pattern| {
            let excerpt = content
                .lines()
                .find(|line| pattern.regex.is_match(line))
                .map(|line| line.trim().chars().take(MAX_EXCERPT_CHARS).collect())
                .unwrap_or_default();
            (pattern, excerpt)
        })
        .collect()
}

pub fn is_log_file_name(name: &str) -> bool {
    name.ends_with(".log")
        || name.ends_with(".txt")
        || name.starts_with("error")
        || name.starts_with("openclaw")
}

/// Last `MAX_TAIL_BYTES` of `path`, starting at a line boundary.
pub fn read_log_tail(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let size = file
        .metadata()
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    let truncated = size > MAX_TAIL_BYTES;
    if truncated {
        file.seek(SeekFrom::Start(size - MAX_TAIL_BYTES))
            .with_context(|| format!("failed to seek {}", path.display()))?;
    }
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&buffer).into_owned();
    if truncated {
        return Ok(text
            .split_once('\n')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default());
    }
    Ok(text)
}

fn log_dir_candidates(env: &ProbeEnvironment) -> Vec<PathBuf> {
    let home = env.openclaw_home();
    let mut candidates = vec![
        home.join("logs"),
        home.join("log"),
        env.home_dir.join(".config").join("openclaw").join("logs"),
    ];
    if env.platform == Platform::Windows {
        let app_data = env.home_dir.join("AppData");
        candidates.push(app_data.join("Local").join("openclaw").join("logs"));
        candidates.push(app_data.join("Roaming").join("openclaw").join("logs"));
    }
    candidates
}

/// Log files in `dir` modified after `cutoff`, newest first.
pub fn recent_log_files(dir: &Path, cutoff: DateTime<Utc>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        let matches_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_log_file_name);
        if !matches_name {
            continue;
        }
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else { continue };
        let modified = DateTime::<Utc>::from(modified);
        if modified > cutoff {
            files.push((modified, path));
        }
    }
    files.sort_by(|left, right| right.0.cmp(&left.0));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Scans recent OpenClaw logs for known failure signatures.
pub struct LogsProbe {
    env: Arc<ProbeEnvironment>,
    findings: Vec<LogFinding>,
}

impl LogsProbe {
    pub fn new(env: Arc<ProbeEnvironment>) -> Self {
        Self {
            env,
            findings: Vec::new(),
        }
    }

    /// First finding per distinct pattern, in discovery order.
    fn unique_findings(&self) -> Vec<&LogFinding> {
        let mut unique: Vec<&LogFinding> = Vec::new();
        for finding in &self.findings {
            if !unique
                .iter()
                .any(|seen| seen.pattern.message == finding.pattern.message)
            {
                unique.push(finding);
            }
        }
        unique
    }
}

impl Probe for LogsProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn inspect(&mut self) -> Result<CheckResult> {
        self.findings.clear();
        let Some(log_dir) = log_dir_candidates(&self.env)
            .into_iter()
            .find(|path| path.is_dir())
        else {
            return Ok(
                CheckResult::pass(NAME, "No log directory found (OK if OpenClaw is new)")?
                    .with_details("Logs will appear in ~/.openclaw/logs/ after using OpenClaw"),
            );
        };

        let cutoff = Utc::now() - ChronoDuration::hours(MAX_LOG_AGE_HOURS);
        let files = recent_log_files(&log_dir, cutoff)?;
        if files.is_empty() {
            return Ok(CheckResult::pass(NAME, "No recent logs found")?.with_details(format!(
                "Checked {} for logs from last {MAX_LOG_AGE_HOURS}h",
                log_dir.display()
            )));
        }

        for file in files.iter().take(MAX_LOG_FILES) {
            let content = match read_log_tail(file) {
                Ok(content) => content,
                Err(error) => {
                    debug!(probe = NAME, error = %format!("{error:#}"), "skipping unreadable log");
                    continue;
                }
            };
            self.findings.extend(
                scan_log_content(&content)
                    .into_iter()
                    .map(|(pattern, excerpt)| LogFinding {
                        pattern,
                        excerpt,
                        file: file.clone(),
                    }),
            );
        }

        if self.findings.is_empty() {
            return Ok(CheckResult::pass(
                NAME,
                format!("No errors in recent logs ({} files checked)", files.len()),
            )?
            .with_details(format!("Log directory: {}", log_dir.display())));
        }

        let has_errors = self
            .findings
            .iter()
            .any(|finding| finding.pattern.severity == LogSeverity::Error);
        let status = if has_errors {
            CheckStatus::Fail
        } else {
            CheckStatus::Warn
        };
        let unique = self.unique_findings();
        let details = unique
            .iter()
            .take(MAX_ISSUES_SHOWN)
            .map(|finding| format!("• {}: {}", finding.pattern.message, finding.pattern.explanation))
            .collect::<Vec<_>>()
            .join("\n");
        let suggestions = unique
            .iter()
            .take(MAX_SUGGESTIONS)
            .map(|finding| finding.pattern.suggestion)
            .collect::<Vec<_>>();
        Ok(CheckResult::new(
            NAME,
            status,
            format!("Found {} issue(s) in logs", unique.len()),
        )?
        .with_details(details)
        .with_suggestions(suggestions))
    }

    fn fix(&mut self) -> bool {
        if self.findings.is_empty() {
            return true;
        }
        for (index, finding) in self.unique_findings().into_iter().enumerate() {
            let file = finding
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!(
                probe = NAME,
                rank = index + 1,
                issue = finding.pattern.message,
                file = %file,
                line = %finding.excerpt,
                explanation = finding.pattern.explanation,
                remedy = finding.pattern.suggestion,
                "log finding"
            );
        }
        false
    }
}
