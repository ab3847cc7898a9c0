use flowcore::StepId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::Mutex;

/// Pass/fail/seen sets for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSets {
    pub seen: BTreeSet<StepId>,
    pub passed: BTreeSet<StepId>,
    pub failed: BTreeSet<StepId>,
}

/// Outcome state shared by every worker of a run.
///
/// One lock covers all three sets so that "first seen" is decided exactly
/// once per step identity.
#[derive(Debug, Default)]
pub struct OutcomeRegistry {
    inner: Mutex<OutcomeSets>,
}

impl OutcomeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pass. Returns true if this is the first time the step is seen.
    pub async fn record_pass(&self, id: &StepId) -> bool {
        let mut sets = self.inner.lock().await;
        let first_seen = sets.seen.insert(id.clone());
        sets.failed.remove(id);
        sets.passed.insert(id.clone());
        first_seen
    }

    /// Record a failure. Returns true if this is the first time the step is seen.
    pub async fn record_failure(&self, id: &StepId) -> bool {
        let mut sets = self.inner.lock().await;
        let first_seen = sets.seen.insert(id.clone());
        sets.passed.remove(id);
        sets.failed.insert(id.clone());
        first_seen
    }

    pub async fn snapshot(&self) -> OutcomeSets {
        self.inner.lock().await.clone()
    }
}
