//! Scripting engine seam: the coordinator only sees these traits.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

pub mod rhai;

pub use self::rhai::{RhaiEngine, RhaiSession};

/// Failure to construct an engine or its session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid setting {key}={value}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },
    #[error("failed to create session: {0}")]
    Construction(String),
}

/// Failure raised while evaluating one submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("Syntax error: {0}")]
    Parse(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Evaluation interrupted")]
    Interrupted,
    #[error("Evaluation panicked: {0}")]
    Panicked(String),
    #[error("Session is not available")]
    SessionUnavailable,
}

/// Factory for the single persistent session the coordinator owns.
pub trait ScriptEngine {
    type Session: Session;

    fn create_session(&self) -> Result<Self::Session, EngineError>;
}

/// A stateful evaluation context: bindings made by one call are visible to the next.
pub trait Session: Send + 'static {
    type Value: Display + Send + 'static;

    /// Evaluate `code`. `Ok(None)` means the code produced no value.
    fn evaluate(&mut self, code: &str) -> Result<Option<Self::Value>, EvalError>;

    /// Handle that aborts a running `evaluate` from another thread, if supported.
    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        None
    }
}

/// Shared flag polled by an engine while it evaluates.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_handle_is_shared_between_clones() {
        let handle = InterruptHandle::new();
        let seen_by_engine = handle.clone();
        assert!(!seen_by_engine.is_interrupted());

        handle.interrupt();
        assert!(seen_by_engine.is_interrupted());

        seen_by_engine.reset();
        assert!(!handle.is_interrupted());
    }

    #[test]
    fn eval_errors_render_full_description() {
        assert_eq!(
            EvalError::Runtime("Variable not found: y (line 1, position 1)".into()).to_string(),
            "Runtime error: Variable not found: y (line 1, position 1)"
        );
        assert_eq!(EvalError::Interrupted.to_string(), "Evaluation interrupted");
    }
}
