use crate::{FlowContext, Session, StepError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Core trait that every test step implements
#[async_trait]
pub trait Step<S: Session>: Send + Sync {
    /// Run the step against the worker's session. Returning an error fails
    /// the step and aborts the rest of its route.
    async fn run(&self, flow: &FlowContext, session: &mut S) -> Result<(), StepError>;
}

/// Adapts a synchronous closure into a [`Step`]
pub struct FnStep<F>(F);

impl<F> FnStep<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<S, F> Step<S> for FnStep<F>
where
    S: Session,
    F: Fn(&FlowContext, &mut S) -> Result<(), StepError> + Send + Sync,
{
    async fn run(&self, flow: &FlowContext, session: &mut S) -> Result<(), StepError> {
        (self.0)(flow, session)
    }
}

/// Identity of a step across a whole run.
///
/// The same step reached from several routes (through a shared prefix) keeps
/// one identity, so it is reported once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        StepId(s.to_string())
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        StepId(s)
    }
}
