use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

use super::{Command, ViewState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("coordinator has stopped")]
    Closed,
}

/// Cheap, cloneable front door to a running coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ViewState>,
}

impl CoordinatorHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        state: watch::Receiver<ViewState>,
    ) -> Self {
        Self { commands, state }
    }

    /// Ask for `code` to be evaluated. Dropped silently if an evaluation is running.
    pub fn submit(&self, code: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(Command::Submit(code.into()))
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(Command::SetText(text.into()))
    }

    /// Interrupt the running evaluation, if any.
    pub fn cancel(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Cancel)
    }

    /// Current state as seen by the coordinator, after every earlier command was handled.
    pub async fn snapshot(&self) -> Result<ViewState, CoordinatorError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Submit and wait until the coordinator is idle again.
    pub async fn execute(&self, code: impl Into<String>) -> Result<ViewState, CoordinatorError> {
        self.submit(code)?;
        self.wait_idle().await
    }

    /// Wait for the evaluation in flight (if any) to settle.
    pub async fn wait_idle(&self) -> Result<ViewState, CoordinatorError> {
        // barrier: earlier commands are reflected in the watch value from here on
        self.snapshot().await?;
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|s| !s.is_executing)
            .await
            .map_err(|_| CoordinatorError::Closed)?;
        Ok(settled.clone())
    }

    /// Latest published state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    fn send(&self, cmd: Command) -> Result<(), CoordinatorError> {
        self.commands.send(cmd).map_err(|_| CoordinatorError::Closed)
    }
}
