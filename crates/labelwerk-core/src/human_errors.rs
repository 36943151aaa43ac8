// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people standing at a label printer.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::LabelwerkError;
use crate::types::ErrorClass;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Communication blip or timeout, trying again may work.
    Transient,
    /// User must do something (close the cover, load labels, fix the job).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the whole job is worthwhile.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `LabelwerkError` into a `HumanError`.
pub fn humanize_error(err: &LabelwerkError) -> HumanError {
    let retriable = err.class() == ErrorClass::Transient;

    match err {
        LabelwerkError::InvariantViolation(_) => HumanError {
            message: "The job tried to print more labels than it was set up for.".into(),
            suggestion: "Check the number of labels in the job settings and start the job again.".into(),
            retriable,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::InvalidState { .. } => HumanError {
            message: "This print job can't be used any more.".into(),
            suggestion: "Start a new print job.".into(),
            retriable,
            severity: Severity::Permanent,
        },

        LabelwerkError::Device(detail) => humanize_device_error(detail, retriable),

        LabelwerkError::Timeout { operation, .. } => HumanError {
            message: "The printer didn't respond in time.".into(),
            suggestion: format!(
                "Make sure the printer is switched on and nearby, then try again. ({operation})"
            ),
            retriable,
            severity: Severity::Transient,
        },

        LabelwerkError::Config(detail) => HumanError {
            message: "The print settings couldn't be read.".into(),
            suggestion: format!("Check the settings file and try again. ({detail})"),
            retriable,
            severity: Severity::ActionRequired,
        },
    }
}

/// Parse device-reported error details into human-readable messages.
fn humanize_device_error(detail: &str, retriable: bool) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("cover open") || lower.contains("cover-open") {
        HumanError {
            message: "The printer's cover is open.".into(),
            suggestion: "Close the cover until it clicks, then print again.".into(),
            retriable,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("no paper") || lower.contains("out of labels") {
        HumanError {
            message: "The printer is out of labels.".into(),
            suggestion: "Load a new label roll, then print again.".into(),
            retriable,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("rfid") {
        HumanError {
            message: "The printer couldn't read the label roll.".into(),
            suggestion: "Take the roll out and put it back in, making sure it sits flat.".into(),
            retriable,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("low battery") {
        HumanError {
            message: "The printer's battery is too low to print.".into(),
            suggestion: "Charge the printer for a few minutes, then try again.".into(),
            retriable,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The printer had a problem.".into(),
            suggestion: format!(
                "Try again. If this keeps happening, switch the printer off and on. (Detail: {detail})"
            ),
            retriable,
            severity: if retriable {
                Severity::Transient
            } else {
                Severity::Permanent
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_transient() {
        let err = LabelwerkError::Timeout {
            operation: "page print",
            after_ms: 10_000,
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn too_many_pages_is_action_required() {
        let err = LabelwerkError::InvariantViolation("too many pages".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn cover_open_is_action_required() {
        let human = humanize_error(&LabelwerkError::Device("cover open".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("cover"));
    }

    #[test]
    fn unknown_device_error_keeps_detail() {
        let human = humanize_error(&LabelwerkError::Device("checksum mismatch".into()));
        assert!(human.retriable);
        assert!(human.suggestion.contains("checksum mismatch"));
    }
}
