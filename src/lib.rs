//! Rhai scratchpad: a persistent scripting session behind a single-flight coordinator.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod execution;
pub mod handlers;
pub mod logging;
pub mod printer;
pub mod tui;
pub mod utils;

pub use coordinator::{Coordinator, CoordinatorError, CoordinatorHandle, ViewState};
pub use engine::{EngineError, EvalError, InterruptHandle, RhaiEngine, ScriptEngine, Session};
pub use execution::{ExecutionResult, ExecutionStatus, StatusKind};
