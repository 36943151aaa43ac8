// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Labelwerk.

use thiserror::Error;

use crate::types::{ErrorClass, JobPhase};

/// Top-level error type for all Labelwerk operations.
///
/// Payloads are plain strings so a resolved job outcome can be cloned and
/// replayed to later callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelwerkError {
    // -- Job lifecycle --
    /// Page accounting bound exceeded. Raised before any device interaction.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A lifecycle operation was called in a phase that does not allow it.
    #[error("cannot {operation} while job is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: JobPhase,
    },

    // -- Device --
    /// The device abstraction failed, or the printer reported a terminal error.
    #[error("device error: {0}")]
    Device(String),

    /// A page or the completion phase did not finish within its deadline.
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),
}

impl LabelwerkError {
    /// Classify this error so callers can decide whether a retry makes sense.
    ///
    /// The lifecycle itself never retries.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Timeout { .. } => ErrorClass::Transient,
            Self::Device(detail) => classify_device_detail(detail),
            Self::InvariantViolation(_) | Self::Config(_) => ErrorClass::UserAction,
            Self::InvalidState { .. } => ErrorClass::Permanent,
        }
    }

    /// Whether this is a deadline failure rather than a device-reported one.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Classify a device error detail string.
fn classify_device_detail(detail: &str) -> ErrorClass {
    let lower = detail.to_ascii_lowercase();

    // Physical printer state the user has to fix
    if lower.contains("cover open")
        || lower.contains("cover-open")
        || lower.contains("no paper")
        || lower.contains("out of labels")
        || lower.contains("rfid")
        || lower.contains("low battery")
    {
        return ErrorClass::UserAction;
    }

    if lower.contains("unsupported") || lower.contains("not supported") {
        return ErrorClass::Permanent;
    }

    ErrorClass::Transient
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_transient() {
        let err = LabelwerkError::Timeout {
            operation: "wait for finished",
            after_ms: 5000,
        };
        assert_eq!(err.class(), ErrorClass::Transient);
        assert!(err.is_timeout());
    }

    #[test]
    fn page_overflow_needs_user_action() {
        let err = LabelwerkError::InvariantViolation("too many pages".into());
        assert_eq!(err.class(), ErrorClass::UserAction);
        assert!(!err.is_timeout());
    }

    #[test]
    fn cover_open_needs_user_action() {
        let err = LabelwerkError::Device("printer reported: cover open".into());
        assert_eq!(err.class(), ErrorClass::UserAction);
    }

    #[test]
    fn generic_device_error_is_transient() {
        let err = LabelwerkError::Device("write failed: broken pipe".into());
        assert_eq!(err.class(), ErrorClass::Transient);
    }

    #[test]
    fn invalid_state_message_names_phase() {
        let err = LabelwerkError::InvalidState {
            operation: "submit page",
            phase: JobPhase::Created,
        };
        assert_eq!(err.to_string(), "cannot submit page while job is created");
        assert_eq!(err.class(), ErrorClass::Permanent);
    }
}
