use crate::StepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type RunId = Uuid;

/// Events emitted while a flow runs.
///
/// `StepPassed` and `StepFailed` are emitted once per step identity per run,
/// the first time that step is seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionEvent {
    RunStarted {
        run_id: RunId,
        flow: String,
        routes: usize,
        timestamp: DateTime<Utc>,
    },
    RouteStarted {
        run_id: RunId,
        route: String,
        steps: usize,
        timestamp: DateTime<Utc>,
    },
    StepPassed {
        run_id: RunId,
        route: String,
        step: StepId,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    StepFailed {
        run_id: RunId,
        route: String,
        step: StepId,
        error: String,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    RouteFinished {
        run_id: RunId,
        route: String,
        completed: bool,
        timestamp: DateTime<Utc>,
    },
    RunCompleted {
        run_id: RunId,
        passed: usize,
        failed: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcasts execution events to any number of subscribers
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    /// Send to current subscribers; dropped silently when there are none
    pub fn emit(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
