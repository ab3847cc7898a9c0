use crate::{PlannedStep, RouteTree, RunCoordinator, RunResult, SequenceLinearizer, StepRegistry};
use flowcore::{
    EventBus, FlowConfig, FlowContext, FlowDefinition, FlowError, RegistrationError, RouteTable,
    Session, SessionProvider,
};
use std::sync::Arc;
use std::time::Duration;

/// A flow whose routes are registered and linked, ready to run
pub struct Flow<S: Session> {
    context: Arc<FlowContext>,
    routes: RouteTable<S>,
    rejected: Vec<RegistrationError>,
}

impl<S: Session> Flow<S> {
    pub fn name(&self) -> &str {
        self.context.name()
    }

    pub fn context(&self) -> &Arc<FlowContext> {
        &self.context
    }

    pub fn routes(&self) -> &RouteTable<S> {
        &self.routes
    }

    /// Definitions skipped during registration
    pub fn rejected(&self) -> &[RegistrationError] {
        &self.rejected
    }

    /// Execution plan of a single route
    pub fn plan(&self, route: &str) -> Result<Vec<PlannedStep<S>>, FlowError> {
        SequenceLinearizer::linearize(&self.routes, route)
    }

    /// Execution plans of every route, by route name
    pub fn plans(&self) -> Result<Vec<(String, Vec<PlannedStep<S>>)>, FlowError> {
        self.routes
            .names()
            .map(|name| Ok::<_, FlowError>((name.to_string(), self.plan(name)?)))
            .collect()
    }
}

/// Main runtime for building and running flows
pub struct FlowRuntime {
    config: RuntimeConfig,
    event_bus: Arc<EventBus>,
}

impl FlowRuntime {
    /// Create a new runtime with default settings
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));
        Self { config, event_bus }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Validate `config`, register the definition's steps and link routes.
    ///
    /// Any error here is surfaced before a single session is opened.
    pub fn build<S, D>(&self, mut config: FlowConfig, definition: &D) -> Result<Flow<S>, FlowError>
    where
        S: Session,
        D: FlowDefinition<S> + ?Sized,
    {
        if config.name.is_empty() {
            config.name = definition.name().to_string();
        }
        let context = FlowContext::new(config)?;

        tracing::info!("Building flow {}", context.name());
        let registration = StepRegistry::collect(definition.describe_steps())?;
        let mut routes = registration.routes;
        RouteTree::resolve(&mut routes)?;

        tracing::debug!(
            "Flow {} has {} routes, {} rejected definitions",
            context.name(),
            routes.len(),
            registration.rejected.len()
        );

        Ok(Flow {
            context: Arc::new(context),
            routes,
            rejected: registration.rejected,
        })
    }

    /// Run every route of `flow`, each on its own session from `provider`
    pub async fn run<P: SessionProvider>(
        &self,
        flow: &Flow<P::Session>,
        provider: P,
    ) -> Result<RunResult, FlowError> {
        RunCoordinator::new(provider, self.event_bus.as_ref().clone())
            .with_step_timeout(self.config.step_timeout)
            .run(Arc::clone(&flow.context), &flow.routes)
            .await
    }

    /// Subscribe to execution events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<flowcore::ExecutionEvent> {
        self.event_bus.subscribe()
    }

    /// Get the event bus for direct access
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for FlowRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Upper bound on a single step; `None` lets a step run indefinitely
    pub step_timeout: Option<Duration>,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            step_timeout: None,
            event_buffer_size: 1000,
        }
    }
}
