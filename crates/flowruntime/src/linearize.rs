use flowcore::{FlowError, Route, RouteError, RouteTable, Session, Step, StepId};
use std::fmt;
use std::sync::Arc;

/// One entry of a route's execution plan
pub struct PlannedStep<S: Session> {
    pub id: StepId,
    /// Route the step was declared on, which differs from the planned route
    /// for steps inherited from a root
    pub route: String,
    pub ordinal: u32,
    pub step: Arc<dyn Step<S>>,
}

impl<S: Session> Clone for PlannedStep<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            route: self.route.clone(),
            ordinal: self.ordinal,
            step: Arc::clone(&self.step),
        }
    }
}

impl<S: Session> fmt::Debug for PlannedStep<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}", self.route, self.ordinal, self.id)
    }
}

/// Turns a resolved route into the ordered list of steps to execute
pub struct SequenceLinearizer;

impl SequenceLinearizer {
    /// Steps of `route`, preceded by the truncated prefixes of its roots
    pub fn linearize<S: Session>(
        routes: &RouteTable<S>,
        route: &str,
    ) -> Result<Vec<PlannedStep<S>>, FlowError> {
        let route = routes
            .get(route)
            .ok_or_else(|| FlowError::RouteNotFound(route.to_string()))?;

        let mut plan = Vec::new();
        Self::append(routes, route, None, 0, &mut plan)?;
        Ok(plan)
    }

    /// Append `route`'s plan to `plan`, keeping only its own steps below
    /// `cut`. Roots are always expanded up to their own link ordinal.
    fn append<S: Session>(
        routes: &RouteTable<S>,
        route: &Route<S>,
        cut: Option<u32>,
        depth: usize,
        plan: &mut Vec<PlannedStep<S>>,
    ) -> Result<(), FlowError> {
        // An unresolved table could still loop
        if depth > routes.len() {
            return Err(RouteError::CyclicRoute {
                route: route.name().to_string(),
            }
            .into());
        }

        if let Some(root) = route.root() {
            let parent = routes
                .get(&root.route)
                .ok_or_else(|| RouteError::UnknownRoute {
                    route: route.name().to_string(),
                    root: root.route.clone(),
                })?;
            Self::append(routes, parent, Some(root.ordinal), depth + 1, plan)?;
        }

        plan.extend(route.prefix(cut).iter().map(|record| PlannedStep {
            id: record.id.clone(),
            route: record.route.clone(),
            ordinal: record.ordinal,
            step: Arc::clone(&record.step),
        }));

        Ok(())
    }
}
