use async_trait::async_trait;
use flowcore::{FlowContext, Session, Step, StepError};

/// Logs a message and passes
pub struct LogStep {
    message: String,
}

impl LogStep {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl<S: Session> Step<S> for LogStep {
    async fn run(&self, flow: &FlowContext, _session: &mut S) -> Result<(), StepError> {
        tracing::info!("[{}] {}", flow.name(), self.message);
        Ok(())
    }
}
