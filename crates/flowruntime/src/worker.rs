use crate::{OutcomeRegistry, PlannedStep};
use chrono::Utc;
use flowcore::{
    EventBus, ExecutionEvent, FlowContext, RunId, Session, SessionProvider, StepError, StepId,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// State shared by every worker of a single run
pub struct RunScope<P: SessionProvider> {
    pub run_id: RunId,
    pub flow: Arc<FlowContext>,
    pub provider: Arc<P>,
    pub outcomes: Arc<OutcomeRegistry>,
    pub events: EventBus,
    pub step_timeout: Option<Duration>,
}

impl<P: SessionProvider> Clone for RunScope<P> {
    fn clone(&self) -> Self {
        Self {
            run_id: self.run_id,
            flow: Arc::clone(&self.flow),
            provider: Arc::clone(&self.provider),
            outcomes: Arc::clone(&self.outcomes),
            events: self.events.clone(),
            step_timeout: self.step_timeout,
        }
    }
}

/// Lifecycle of an [`ExecutionWorker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Done,
}

/// How a route's execution ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteStatus {
    Completed,
    Aborted { step: StepId, error: String },
    SessionFailed { error: String },
    Crashed { error: String },
}

/// Per-route summary of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    pub route: String,
    /// Steps attempted, in order; the last one is the failing step on abort
    pub executed: Vec<StepId>,
    pub status: RouteStatus,
}

impl RouteReport {
    pub fn is_success(&self) -> bool {
        self.status == RouteStatus::Completed
    }
}

/// Runs one route's plan against its own session
pub struct ExecutionWorker<P: SessionProvider> {
    route: String,
    plan: Vec<PlannedStep<P::Session>>,
    scope: RunScope<P>,
    state: WorkerState,
    report: Option<RouteReport>,
}

impl<P: SessionProvider> ExecutionWorker<P> {
    pub fn new(route: impl Into<String>, plan: Vec<PlannedStep<P::Session>>, scope: RunScope<P>) -> Self {
        Self {
            route: route.into(),
            plan,
            scope,
            state: WorkerState::Idle,
            report: None,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Report of the finished route, once the worker is `Done`
    pub fn report(&self) -> Option<&RouteReport> {
        self.report.as_ref()
    }

    /// Open a session, run the plan until the first failure, close the
    /// session. A worker runs its route once; later calls only return the
    /// stored report.
    pub async fn run(&mut self) -> RouteReport {
        if let Some(report) = &self.report {
            return report.clone();
        }

        self.state = WorkerState::Running;
        tracing::info!("Starting route {} ({} steps)", self.route, self.plan.len());

        self.scope.events.emit(ExecutionEvent::RouteStarted {
            run_id: self.scope.run_id,
            route: self.route.clone(),
            steps: self.plan.len(),
            timestamp: Utc::now(),
        });

        let report = match self.scope.provider.open().await {
            Ok(mut session) => {
                let report = self.execute(&mut session).await;
                if let Err(e) = session.close().await {
                    tracing::warn!("Failed to close session for route {}: {}", self.route, e);
                }
                report
            }
            Err(e) => {
                tracing::error!("Route {} could not open a session: {}", self.route, e);
                RouteReport {
                    route: self.route.clone(),
                    executed: Vec::new(),
                    status: RouteStatus::SessionFailed {
                        error: e.to_string(),
                    },
                }
            }
        };

        self.state = WorkerState::Done;
        self.report = Some(report.clone());
        tracing::info!("Route {} finished: {:?}", self.route, report.status);

        self.scope.events.emit(ExecutionEvent::RouteFinished {
            run_id: self.scope.run_id,
            route: self.route.clone(),
            completed: report.is_success(),
            timestamp: Utc::now(),
        });

        report
    }

    async fn execute(&self, session: &mut P::Session) -> RouteReport {
        let mut executed = Vec::with_capacity(self.plan.len());

        for planned in &self.plan {
            tracing::debug!("Route {}: running {:?}", self.route, planned);
            let start = Instant::now();
            let result = self.invoke(planned, session).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            executed.push(planned.id.clone());

            match result {
                Ok(()) => {
                    if self.scope.outcomes.record_pass(&planned.id).await {
                        tracing::info!("Step {} passed in {}ms", planned.id, duration_ms);
                        self.scope.events.emit(ExecutionEvent::StepPassed {
                            run_id: self.scope.run_id,
                            route: self.route.clone(),
                            step: planned.id.clone(),
                            duration_ms,
                            timestamp: Utc::now(),
                        });
                    }
                }
                Err(e) => {
                    if self.scope.outcomes.record_failure(&planned.id).await {
                        tracing::error!("Step {} failed: {}", planned.id, e);
                        self.scope.events.emit(ExecutionEvent::StepFailed {
                            run_id: self.scope.run_id,
                            route: self.route.clone(),
                            step: planned.id.clone(),
                            error: e.to_string(),
                            duration_ms,
                            timestamp: Utc::now(),
                        });
                    }
                    return RouteReport {
                        route: self.route.clone(),
                        executed,
                        status: RouteStatus::Aborted {
                            step: planned.id.clone(),
                            error: e.to_string(),
                        },
                    };
                }
            }
        }

        RouteReport {
            route: self.route.clone(),
            executed,
            status: RouteStatus::Completed,
        }
    }

    /// Run one step, turning panics and timeouts into step errors
    async fn invoke(
        &self,
        planned: &PlannedStep<P::Session>,
        session: &mut P::Session,
    ) -> Result<(), StepError> {
        let task = AssertUnwindSafe(planned.step.run(&self.scope.flow, session)).catch_unwind();

        let outcome = match self.scope.step_timeout {
            Some(limit) => match timeout(limit, task).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(StepError::Timeout {
                        millis: limit.as_millis() as u64,
                    })
                }
            },
            None => task.await,
        };

        outcome.unwrap_or_else(|panic| Err(StepError::Panicked(panic_message(panic.as_ref()))))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
