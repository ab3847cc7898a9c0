use crate::{FnStep, FlowContext, RegistrationError, Session, Step, StepError, StepId, StepRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A point in another route to branch off: that route's steps with an
/// ordinal strictly below `ordinal` run before the branching route's own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RootReference {
    pub route: String,
    pub ordinal: u32,
}

impl RootReference {
    pub fn new(route: impl Into<String>, ordinal: u32) -> Self {
        Self {
            route: route.into(),
            ordinal,
        }
    }
}

/// A flow: a user journey made of one or more routes.
///
/// Implementors list their steps declaratively; the runtime groups them into
/// routes and wires up branches.
pub trait FlowDefinition<S: Session>: Send + Sync {
    fn name(&self) -> &str;

    fn describe_steps(&self) -> Vec<StepDefinition<S>>;
}

/// Author-facing step declaration. Every field may be left out; missing
/// pieces are caught when the definition is registered.
pub struct StepDefinition<S: Session> {
    pub route: Option<String>,
    pub ordinal: Option<u32>,
    pub name: Option<String>,
    pub step: Option<Arc<dyn Step<S>>>,
    pub root: Option<RootReference>,
}

impl<S: Session> StepDefinition<S> {
    pub fn new(
        route: impl Into<String>,
        ordinal: u32,
        name: impl Into<String>,
        step: impl Step<S> + 'static,
    ) -> Self {
        Self {
            route: Some(route.into()),
            ordinal: Some(ordinal),
            name: Some(name.into()),
            step: Some(Arc::new(step)),
            root: None,
        }
    }

    /// Declare a step from a synchronous closure
    pub fn from_fn<F>(route: impl Into<String>, ordinal: u32, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FlowContext, &mut S) -> Result<(), StepError> + Send + Sync + 'static,
    {
        Self::new(route, ordinal, name, FnStep::new(f))
    }

    pub fn empty() -> Self {
        Self {
            route: None,
            ordinal: None,
            name: None,
            step: None,
            root: None,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_step(mut self, step: impl Step<S> + 'static) -> Self {
        self.step = Some(Arc::new(step));
        self
    }

    /// Branch this route off `route`, running its steps below `ordinal` first.
    /// Only legal on the entry (ordinal 1) step.
    pub fn rooted_on(mut self, route: impl Into<String>, ordinal: u32) -> Self {
        self.root = Some(RootReference::new(route, ordinal));
        self
    }

    /// Validate into a [`StepRecord`]
    pub fn into_record(self) -> Result<StepRecord<S>, RegistrationError> {
        if let (Some(ordinal), Some(_)) = (self.ordinal, &self.root) {
            if ordinal != 1 {
                return Err(RegistrationError::InvalidBranch {
                    route: self.route.unwrap_or_default(),
                    name: self.name.unwrap_or_default(),
                    ordinal,
                });
            }
        }

        let malformed = |field: &str| RegistrationError::MalformedStep {
            name: self.name.clone(),
            field: field.to_string(),
        };

        let name = match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(malformed("name")),
        };
        let route = match self.route.as_deref() {
            Some(route) if !route.trim().is_empty() => route.to_string(),
            _ => return Err(malformed("route")),
        };
        let ordinal = match self.ordinal {
            Some(ordinal) if ordinal >= 1 => ordinal,
            _ => return Err(malformed("ordinal")),
        };
        let step = self.step.clone().ok_or_else(|| malformed("step"))?;

        Ok(StepRecord {
            route,
            ordinal,
            id: StepId::new(name),
            step,
            root: self.root,
        })
    }
}
