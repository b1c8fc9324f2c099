use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Why a raw configuration entry was thrown out.
///
/// Always scoped to one entry. The batch keeps going; the rejection is
/// surfaced next to the index of the offending entry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("field '{field}' is not a {expected}")]
    TypeMismatch { field: String, expected: &'static str },
    #[error("duplicate machine name '{0}'")]
    DuplicateName(String),
    #[error("unknown machine type '{0}'")]
    UnknownMachineType(String),
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self::MissingField(field.to_string())
    }

    pub fn mismatch(field: &str, expected: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.to_string(),
            expected,
        }
    }
}

/// A diagnostic that settled as a failure.
///
/// Contained at the invocation boundary and reported as a row; it never
/// aborts sibling machines or the batch.
#[derive(Clone, Debug, Error)]
#[error("{kind} on '{machine}': {message}")]
pub struct DiagnosticError {
    pub machine: String,
    pub kind: DiagnosticErrorKind,
    pub message: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticErrorKind {
    ConnectionFailed,
    Timeout,
    BatchTimeout,
    ProbeInternal,
}

impl DiagnosticErrorKind {
    /// Stable machine-readable tag, used in report rows and CSV columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionFailed => "connection_failed",
            Self::Timeout => "timeout",
            Self::BatchTimeout => "batch_timeout",
            Self::ProbeInternal => "probe_internal",
        }
    }
}

impl fmt::Display for DiagnosticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ConnectionFailed => "connection failed",
            Self::Timeout => "probe timed out",
            Self::BatchTimeout => "batch deadline elapsed",
            Self::ProbeInternal => "probe internal error",
        };
        f.write_str(text)
    }
}

impl DiagnosticError {
    pub fn new(
        machine: impl Into<String>,
        kind: DiagnosticErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            machine: machine.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn connection_failed(machine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(machine, DiagnosticErrorKind::ConnectionFailed, message)
    }

    pub fn timeout(machine: impl Into<String>, budget: Duration) -> Self {
        let message = format!("no result within {:.1}s", budget.as_secs_f64());
        Self::new(machine, DiagnosticErrorKind::Timeout, message)
    }

    pub fn batch_timeout(machine: impl Into<String>) -> Self {
        Self::new(
            machine,
            DiagnosticErrorKind::BatchTimeout,
            "not started before the batch deadline",
        )
    }

    pub fn probe_internal(machine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(machine, DiagnosticErrorKind::ProbeInternal, message)
    }
}

/// Contract breakage between pipeline stages.
///
/// Unlike the per-entry and per-machine errors above, these signal a
/// programming defect and fail the whole batch.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("settled index {index} outside descriptor range 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("machine at index {0} settled twice")]
    DuplicateResult(usize),
    #[error("machine at index {0} never settled")]
    MissingResult(usize),
    #[error("no probe bound for validated machine type '{0}'")]
    UnboundMachineType(String),
}
