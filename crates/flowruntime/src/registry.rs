use flowcore::{RegistrationError, RouteTable, Session, StepDefinition, StepId};
use std::collections::HashMap;

/// Outcome of registering a flow's step definitions
pub struct Registration<S: Session> {
    pub routes: RouteTable<S>,
    /// Definitions that were skipped because they were incomplete
    pub rejected: Vec<RegistrationError>,
}

/// Groups step definitions into routes
pub struct StepRegistry<S: Session> {
    routes: RouteTable<S>,
    rejected: Vec<RegistrationError>,
    /// Route each step name was first registered in
    owners: HashMap<StepId, String>,
}

impl<S: Session> StepRegistry<S> {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            rejected: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Register every definition, failing only on an invalid branch
    pub fn collect(
        definitions: impl IntoIterator<Item = StepDefinition<S>>,
    ) -> Result<Registration<S>, RegistrationError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry.finish())
    }

    /// Register a single definition.
    ///
    /// A malformed definition, or one reusing a registered step name, is
    /// skipped and remembered; an `Err` means the whole flow cannot be built.
    pub fn register(&mut self, definition: StepDefinition<S>) -> Result<(), RegistrationError> {
        let checked = definition.into_record().and_then(|record| {
            match self.owners.get(&record.id) {
                Some(existing) => Err(RegistrationError::DuplicateStep {
                    name: record.id.to_string(),
                    route: record.route.clone(),
                    existing: existing.clone(),
                }),
                None => Ok(record),
            }
        });

        match checked {
            Ok(record) => {
                tracing::debug!(
                    "Registering step {} at {}[{}]",
                    record.id,
                    record.route,
                    record.ordinal
                );
                let route = record.route.clone();
                self.owners.insert(record.id.clone(), route.clone());
                self.routes.route_mut(&route).add_step(record);
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping step definition: {}", e);
                self.rejected.push(e);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Invalid step definition: {}", e);
                Err(e)
            }
        }
    }

    pub fn finish(self) -> Registration<S> {
        Registration {
            routes: self.routes,
            rejected: self.rejected,
        }
    }
}

impl<S: Session> Default for StepRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
