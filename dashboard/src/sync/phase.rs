//! Finite state machine for the displayed run phase

use clue_api::models::ActiveRun;
use serde::{Deserialize, Serialize};

use crate::errors::DashboardError;

/// Run phase as shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    /// Nothing has been started in this session
    Idle,

    /// A run is executing
    Deploying,

    /// The backend finished the run
    Completed,

    /// The backend reported a failure
    Failed,

    /// The user stopped the run
    Stopped,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Failed | RunPhase::Stopped)
    }
}

/// Run phase event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEvent {
    /// A start or deploy request was accepted
    Start,

    /// A run was seen on the backend that this client did not start
    Detected,

    /// A stop request was accepted
    Stop,

    /// The backend reported the run finished
    Complete,

    /// The backend reported the run failed
    Fail(String),

    /// Back to idle
    Reset,
}

/// What the backend says about the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPhase {
    Running,
    Completed,
    Failed(String),
    /// Nothing is running
    Absent,
}

impl ServerPhase {
    pub fn from_run(run: Option<&ActiveRun>) -> Self {
        let Some(run) = run else {
            return ServerPhase::Absent;
        };
        match run
            .phase
            .as_deref()
            .or(run.entry.status.as_deref())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("completed" | "complete" | "finished" | "done" | "succeeded") => {
                ServerPhase::Completed
            }
            Some(p @ ("failed" | "error")) => ServerPhase::Failed(format!("backend reported {}", p)),
            _ => ServerPhase::Running,
        }
    }
}

/// Run phase FSM
#[derive(Debug, Clone)]
pub struct RunPhaseMachine {
    phase: RunPhase,
    error: Option<String>,
    /// Set by a local stop until the backend first reports no run
    lingering: bool,
}

impl RunPhaseMachine {
    /// Create a new FSM in the idle phase
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            error: None,
            lingering: false,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Failure reason of the last failed run
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition
    pub fn process(&mut self, event: PhaseEvent) -> Result<(), DashboardError> {
        let next = match (self.phase, &event) {
            (RunPhase::Idle, PhaseEvent::Start | PhaseEvent::Detected) => RunPhase::Deploying,
            (p, PhaseEvent::Start | PhaseEvent::Detected) if p.is_terminal() => {
                self.error = None;
                RunPhase::Deploying
            }

            (RunPhase::Deploying, PhaseEvent::Stop) => {
                self.lingering = true;
                RunPhase::Stopped
            }
            (RunPhase::Deploying, PhaseEvent::Complete) => RunPhase::Completed,
            (RunPhase::Deploying, PhaseEvent::Fail(err)) => {
                self.error = Some(err.clone());
                RunPhase::Failed
            }

            (p, PhaseEvent::Reset) if p.is_terminal() => {
                self.error = None;
                RunPhase::Idle
            }

            (phase, event) => {
                return Err(DashboardError::State(format!(
                    "Invalid transition: {:?} -> {:?}",
                    phase, event
                )));
            }
        };

        if next != RunPhase::Stopped {
            self.lingering = false;
        }
        self.phase = next;
        Ok(())
    }

    /// Fold a polled server status into the phase.
    ///
    /// Only transitions the server status justifies are taken. A run still
    /// reported after a stop is the backend winding down, not a new run,
    /// until the backend has once reported nothing running.
    pub fn observe(&mut self, server: &ServerPhase) -> Result<(), DashboardError> {
        match (self.phase, server) {
            (RunPhase::Stopped, ServerPhase::Absent) => {
                self.lingering = false;
                Ok(())
            }
            (RunPhase::Stopped, _) if self.lingering => Ok(()),
            (RunPhase::Deploying, ServerPhase::Running) => Ok(()),
            (RunPhase::Deploying, ServerPhase::Completed | ServerPhase::Absent) => {
                self.process(PhaseEvent::Complete)
            }
            (RunPhase::Deploying, ServerPhase::Failed(err)) => {
                self.process(PhaseEvent::Fail(err.clone()))
            }
            (_, ServerPhase::Running) => self.process(PhaseEvent::Detected),
            _ => Ok(()),
        }
    }
}

impl Default for RunPhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
