use async_trait::async_trait;
use flowcore::{FlowContext, Session, Step, StepError};
use tokio::time::{sleep, Duration};

/// Wait before the next step, e.g. for client-side rendering to settle
pub struct DelayStep {
    delay: Duration,
}

impl DelayStep {
    pub fn millis(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

#[async_trait]
impl<S: Session> Step<S> for DelayStep {
    async fn run(&self, _flow: &FlowContext, _session: &mut S) -> Result<(), StepError> {
        tracing::debug!("Delaying for {}ms", self.delay.as_millis());
        sleep(self.delay).await;
        Ok(())
    }
}
