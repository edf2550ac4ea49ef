//! Execution outcome and status types shown to the user.

use std::fmt;

use serde::Serialize;

/// Message shown when the submitted code is blank.
pub const NOTHING_TO_EXECUTE: &str = "Nothing to execute";

/// Message shown when an evaluation completes without a value.
pub const NO_RESULTS: &str = "** no results from the execution **";

/// Outcome of one evaluation attempt. Always replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum ExecutionResult {
    Success(String),
    Warning(String),
    Error(String),
}

impl ExecutionResult {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Warning(m) | Self::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short label used in pane titles and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Warning(_) => "warning",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Ready,
    Error,
}

/// Status line state, mutated in place as an evaluation progresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStatus {
    pub label: String,
    pub kind: StatusKind,
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        Self {
            label: "Ready".to_string(),
            kind: StatusKind::Ready,
        }
    }
}

impl ExecutionStatus {
    pub fn set_ready(&mut self) {
        self.set_status("Ready", StatusKind::Ready);
    }

    pub fn set_info(&mut self, label: impl Into<String>) {
        self.set_status(label, StatusKind::Info);
    }

    pub fn set_status(&mut self, label: impl Into<String>, kind: StatusKind) {
        self.label = label.into();
        self.kind = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_ready() {
        let status = ExecutionStatus::default();
        assert_eq!(status.kind, StatusKind::Ready);
        assert_eq!(status.label, "Ready");
    }

    #[test]
    fn status_is_mutated_in_place() {
        let mut status = ExecutionStatus::default();
        status.set_info("Executing...");
        assert_eq!(status, ExecutionStatus { label: "Executing...".into(), kind: StatusKind::Info });

        status.set_status("Failed", StatusKind::Error);
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.label, "Failed");

        status.set_ready();
        assert_eq!(status, ExecutionStatus::default());
    }

    #[test]
    fn result_serializes_as_tagged_message() {
        let json = serde_json::to_value(ExecutionResult::Warning(NOTHING_TO_EXECUTE.into())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "warning", "message": "Nothing to execute"}));
    }

    #[test]
    fn result_exposes_message_and_label() {
        let result = ExecutionResult::Error("boom".into());
        assert!(result.is_error());
        assert_eq!(result.message(), "boom");
        assert_eq!(result.label(), "error");
        assert_eq!(result.to_string(), "boom");
    }
}
