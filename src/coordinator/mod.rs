//! Single-flight execution coordinator.
//!
//! One task owns the view state and the session. Commands arrive on a mailbox
//! and are handled one at a time; evaluation itself runs on the blocking pool
//! while the mailbox keeps being served, so submissions that land mid-flight
//! hit the guard and are dropped.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::engine::{EngineError, EvalError, InterruptHandle, ScriptEngine, Session};
use crate::execution::{
    ExecutionResult, ExecutionStatus, StatusKind, NOTHING_TO_EXECUTE, NO_RESULTS,
};

mod handle;

pub use handle::{CoordinatorError, CoordinatorHandle};

/// Everything a front end renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Editor contents, owned by the caller.
    pub text: String,
    /// `None` while an evaluation is pending or before the first one.
    pub execution_result: Option<ExecutionResult>,
    pub status: ExecutionStatus,
    pub is_executing: bool,
}

#[derive(Debug)]
pub(crate) enum Command {
    Submit(String),
    SetText(String),
    Cancel,
    Snapshot(oneshot::Sender<ViewState>),
}

type Outcome = Result<Option<String>, EvalError>;

pub struct Coordinator<S: Session> {
    session: Option<S>,
    interrupt: Option<InterruptHandle>,
    state: ViewState,
    state_tx: watch::Sender<ViewState>,
    in_flight: Option<JoinHandle<(S, Outcome)>>,
    started: Option<Instant>,
    timeout: Option<Duration>,
    deadline: Option<tokio::time::Instant>,
}

impl<S: Session> Coordinator<S> {
    /// Create the session and reset the status. Done once, before any submission.
    pub fn load<E>(engine: &E) -> Result<Self, EngineError>
    where
        E: ScriptEngine<Session = S>,
    {
        let session = engine.create_session()?;
        let interrupt = session.interrupt_handle();
        let state = ViewState::default();
        let (state_tx, _) = watch::channel(state.clone());

        debug!(interruptible = interrupt.is_some(), "session created");

        Ok(Self {
            session: Some(session),
            interrupt,
            state,
            state_tx,
            in_flight: None,
            started: None,
            timeout: None,
            deadline: None,
        })
    }

    /// Interrupt evaluations that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    /// Start the coordinator task. It stops once every handle is dropped.
    pub fn spawn(self) -> CoordinatorHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let state_rx = self.subscribe();
        tokio::spawn(self.run(commands_rx));
        CoordinatorHandle::new(commands_tx, state_rx)
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                joined = wait_for_evaluation(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.complete(joined);
                }
                _ = wait_for_deadline(self.deadline) => {
                    self.deadline = None;
                    warn!(
                        timeout_secs = self.timeout.map(|t| t.as_secs_f64()),
                        "evaluation timed out, interrupting"
                    );
                    self.interrupt();
                }
            }
        }

        if self.in_flight.is_some() {
            self.interrupt();
        }
        debug!("coordinator stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Submit(code) => self.submit(code),
            Command::SetText(text) => {
                self.state.text = text;
                self.publish();
            }
            Command::Cancel => {
                if self.in_flight.is_some() {
                    info!("cancelling evaluation");
                    self.interrupt();
                }
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.state.clone());
            }
        }
    }

    fn submit(&mut self, code: String) {
        if self.state.is_executing {
            debug!(code_len = code.len(), "evaluation in flight, dropping submission");
            return;
        }
        self.state.is_executing = true;
        self.state.execution_result = None;
        self.publish();

        if code.trim().is_empty() {
            self.state.execution_result =
                Some(ExecutionResult::Warning(NOTHING_TO_EXECUTE.to_string()));
            self.state.status.set_ready();
            self.publish();
            self.finish();
            return;
        }

        let Some(mut session) = self.session.take() else {
            error!("submission received without a session");
            self.fail(EvalError::SessionUnavailable);
            self.finish();
            return;
        };

        self.state.status.set_info("Executing...");
        self.publish();

        if let Some(interrupt) = &self.interrupt {
            interrupt.reset();
        }
        self.started = Some(Instant::now());
        self.deadline = self.timeout.map(|t| tokio::time::Instant::now() + t);

        debug!(code_len = code.len(), "dispatching evaluation");
        self.in_flight = Some(tokio::task::spawn_blocking(move || {
            let outcome = evaluate_contained(&mut session, &code);
            (session, outcome)
        }));
    }

    fn complete(&mut self, joined: Result<(S, Outcome), JoinError>) {
        let elapsed_ms = self
            .started
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or_default();
        self.deadline = None;

        let outcome = match joined {
            Ok((session, outcome)) => {
                self.session = Some(session);
                outcome
            }
            Err(e) => {
                error!(error = %e, "evaluation worker did not return, session lost");
                Err(EvalError::SessionUnavailable)
            }
        };

        match outcome {
            Ok(value) => {
                info!(elapsed_ms, has_value = value.is_some(), "evaluation finished");
                let message = value.unwrap_or_else(|| NO_RESULTS.to_string());
                self.state.execution_result = Some(ExecutionResult::Success(message));
                self.state.status.set_info("Executed");
                self.publish();
            }
            Err(err) => {
                info!(elapsed_ms, error = %err, "evaluation failed");
                self.fail(err);
            }
        }
        self.finish();
    }

    fn fail(&mut self, err: EvalError) {
        self.state.execution_result = Some(ExecutionResult::Error(err.to_string()));
        self.state.status.set_status("Failed", StatusKind::Error);
        self.publish();
    }

    fn finish(&mut self) {
        self.state.is_executing = false;
        self.publish();
    }

    fn interrupt(&self) {
        match &self.interrupt {
            Some(handle) => handle.interrupt(),
            None => debug!("session does not support interruption"),
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

async fn wait_for_evaluation<T>(in_flight: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match in_flight {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn wait_for_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Runs on the blocking pool. A panicking session is still handed back.
fn evaluate_contained<S: Session>(session: &mut S, code: &str) -> Outcome {
    panic::catch_unwind(AssertUnwindSafe(|| session.evaluate(code)))
        .unwrap_or_else(|payload| Err(EvalError::Panicked(panic_message(payload.as_ref()))))
        .map(|value| value.map(|v| v.to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
