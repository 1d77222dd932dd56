use thiserror::Error;

/// Errors raised while building or decoding a `CheckResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckResultError {
    #[error("check result for '{name}' requires a non-empty message")]
    EmptyMessage { name: String },
    #[error("unknown check status '{0}' (expected pass, warn, fail, or skip)")]
    InvalidStatus(String),
    #[error("malformed check result record: {0}")]
    MalformedRecord(String),
}

/// Errors surfaced by registry lookups and single-check dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoctorError {
    #[error("unknown check: {name}")]
    UnknownProbe {
        name: String,
        available: Vec<String>,
    },
}
