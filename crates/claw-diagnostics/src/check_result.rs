//! Result model shared by every probe.
//!
//! A `CheckResult` is built once by a probe's `run` and never mutated after
//! it leaves the probe. Its structural view (`to_value`/`from_value`) keeps
//! field order stable for machine-readable output.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CheckResultError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Enumerates supported `CheckStatus` values.
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skip => "skip",
        }
    }

    /// Severity rank: `Fail > Warn > Pass > Skip`.
    pub fn severity(self) -> u8 {
        match self {
            CheckStatus::Skip => 0,
            CheckStatus::Pass => 1,
            CheckStatus::Warn => 2,
            CheckStatus::Fail => 3,
        }
    }

    pub fn cmp_severity(self, other: CheckStatus) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = CheckResultError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pass" => Ok(CheckStatus::Pass),
            "warn" => Ok(CheckStatus::Warn),
            "fail" => Ok(CheckStatus::Fail),
            "skip" => Ok(CheckStatus::Skip),
            _ => Err(CheckResultError::InvalidStatus(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CheckResultRecord")]
/// Outcome of one probe invocation.
pub struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    details: Option<String>,
    can_auto_fix: bool,
    fix_suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CheckResultRecord {
    name: String,
    status: CheckStatus,
    message: String,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    can_auto_fix: bool,
    #[serde(default)]
    fix_suggestions: Vec<String>,
}

impl TryFrom<CheckResultRecord> for CheckResult {
    type Error = CheckResultError;

    fn try_from(record: CheckResultRecord) -> Result<Self, Self::Error> {
        let mut result = CheckResult::new(record.name, record.status, record.message)?;
        result.details = record.details;
        result.can_auto_fix = record.can_auto_fix;
        result.fix_suggestions = record.fix_suggestions;
        Ok(result)
    }
}

impl CheckResult {
    pub fn new(
        name: impl Into<String>,
        status: CheckStatus,
        message: impl Into<String>,
    ) -> Result<Self, CheckResultError> {
        let name = name.into();
        let message = message.into();
        if message.trim().is_empty() {
            return Err(CheckResultError::EmptyMessage { name });
        }
        Ok(Self {
            name,
            status,
            message,
            details: None,
            can_auto_fix: false,
            fix_suggestions: Vec::new(),
        })
    }

    pub fn pass(
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, CheckResultError> {
        Self::new(name, CheckStatus::Pass, message)
    }

    pub fn warn(
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, CheckResultError> {
        Self::new(name, CheckStatus::Warn, message)
    }

    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, CheckResultError> {
        Self::new(name, CheckStatus::Fail, message)
    }

    pub fn skip(
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, CheckResultError> {
        Self::new(name, CheckStatus::Skip, message)
    }

    /// Fail result used when a probe faults instead of reporting.
    pub fn internal_fault(name: &str, headline: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            message: headline.to_string(),
            details: Some(details.into()),
            can_auto_fix: false,
            fix_suggestions: vec![
                format!("Re-run with RUST_LOG=debug to see why the {name} check faulted"),
                "Report the failure if it persists".to_string(),
            ],
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.details = if details.trim().is_empty() {
            None
        } else {
            Some(details)
        };
        self
    }

    pub fn with_auto_fix(mut self) -> Self {
        self.can_auto_fix = true;
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fix_suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn can_auto_fix(&self) -> bool {
        self.can_auto_fix
    }

    pub fn fix_suggestions(&self) -> &[String] {
        &self.fix_suggestions
    }

    /// Pass or Warn. Warnings are noted but never blocking.
    pub fn passed(&self) -> bool {
        matches!(self.status, CheckStatus::Pass | CheckStatus::Warn)
    }

    pub fn is_warning(&self) -> bool {
        self.status == CheckStatus::Warn
    }

    /// Fail or Warn: the results a fix pass considers. Skip is never actionable.
    pub fn needs_attention(&self) -> bool {
        matches!(self.status, CheckStatus::Fail | CheckStatus::Warn)
    }

    /// Ordered-key mapping of every field, status rendered as its string form.
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("name".to_string(), Value::from(self.name.clone()));
        map.insert("status".to_string(), Value::from(self.status.as_str()));
        map.insert("message".to_string(), Value::from(self.message.clone()));
        map.insert(
            "details".to_string(),
            self.details.clone().map(Value::from).unwrap_or(Value::Null),
        );
        map.insert("can_auto_fix".to_string(), Value::from(self.can_auto_fix));
        map.insert(
            "fix_suggestions".to_string(),
            Value::Array(
                self.fix_suggestions
                    .iter()
                    .cloned()
                    .map(Value::from)
                    .collect(),
            ),
        );
        Value::Object(map)
    }

    pub fn from_value(value: &Value) -> Result<Self, CheckResultError> {
        let record = serde_json::from_value::<CheckResultRecord>(value.clone()).map_err(|error| {
            let text = error.to_string();
            if text.contains("unknown variant") {
                let raw = value
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                CheckResultError::InvalidStatus(raw)
            } else {
                CheckResultError::MalformedRecord(text)
            }
        })?;
        CheckResult::try_from(record)
    }
}
