use crate::{
    ExecutionWorker, OutcomeRegistry, RouteReport, RouteStatus, RunScope, SequenceLinearizer,
};
use chrono::Utc;
use flowcore::{
    EventBus, ExecutionEvent, FlowContext, FlowError, RouteTable, RunId, SessionProvider, StepId,
};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub seen: BTreeSet<StepId>,
    pub passed: BTreeSet<StepId>,
    pub failed: BTreeSet<StepId>,
    /// One report per route, ordered by route name
    pub routes: Vec<RouteReport>,
    pub duration_ms: u64,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.routes.iter().all(RouteReport::is_success)
    }

    pub fn route(&self, name: &str) -> Option<&RouteReport> {
        self.routes.iter().find(|report| report.route == name)
    }
}

/// Launches one worker per route and waits for all of them
pub struct RunCoordinator<P: SessionProvider> {
    provider: Arc<P>,
    events: EventBus,
    step_timeout: Option<Duration>,
}

impl<P: SessionProvider> RunCoordinator<P> {
    pub fn new(provider: P, events: EventBus) -> Self {
        Self {
            provider: Arc::new(provider),
            events,
            step_timeout: None,
        }
    }

    pub fn with_step_timeout(mut self, step_timeout: Option<Duration>) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Run every route concurrently. Returns once all workers are done.
    ///
    /// Plans are computed up front, so a broken route table fails before any
    /// session is opened.
    pub async fn run(
        &self,
        flow: Arc<FlowContext>,
        routes: &RouteTable<P::Session>,
    ) -> Result<RunResult, FlowError> {
        let plans = routes
            .names()
            .map(|name| Ok::<_, FlowError>((name.to_string(), SequenceLinearizer::linearize(routes, name)?)))
            .collect::<Result<Vec<_>, FlowError>>()?;

        let run_id = RunId::new_v4();
        let start_time = Instant::now();
        let outcomes = Arc::new(OutcomeRegistry::new());

        self.events.emit(ExecutionEvent::RunStarted {
            run_id,
            flow: flow.name().to_string(),
            routes: plans.len(),
            timestamp: Utc::now(),
        });
        tracing::info!("Starting run {} of flow {} ({} routes)", run_id, flow.name(), plans.len());

        let scope = RunScope {
            run_id,
            flow,
            provider: Arc::clone(&self.provider),
            outcomes: Arc::clone(&outcomes),
            events: self.events.clone(),
            step_timeout: self.step_timeout,
        };

        let mut running = FuturesUnordered::new();
        for (route, plan) in plans {
            let mut worker = ExecutionWorker::new(route.clone(), plan, scope.clone());
            let handle = tokio::spawn(async move { worker.run().await });
            running.push(async move { (route, handle.await) });
        }

        let mut reports = Vec::new();
        while let Some((route, joined)) = running.next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!("Worker for route {} died: {}", route, e);
                    reports.push(RouteReport {
                        route,
                        executed: Vec::new(),
                        status: RouteStatus::Crashed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }
        reports.sort_by(|a, b| a.route.cmp(&b.route));

        let sets = outcomes.snapshot().await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        self.events.emit(ExecutionEvent::RunCompleted {
            run_id,
            passed: sets.passed.len(),
            failed: sets.failed.len(),
            duration_ms,
            timestamp: Utc::now(),
        });
        tracing::info!(
            "Run {} completed in {}ms: {} passed, {} failed",
            run_id,
            duration_ms,
            sets.passed.len(),
            sets.failed.len()
        );

        Ok(RunResult {
            run_id,
            seen: sets.seen,
            passed: sets.passed,
            failed: sets.failed,
            routes: reports,
            duration_ms,
        })
    }
}
