use crate::Browser;
use async_trait::async_trait;
use flowcore::{FlowContext, Step, StepError};

/// Load a page relative to the flow's root url
pub struct Navigate {
    path: String,
    expect_status: Option<u16>,
}

impl Navigate {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expect_status: None,
        }
    }

    /// Fail the step unless the page loads with `status`
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expect_status = Some(status);
        self
    }
}

#[async_trait]
impl<S: Browser> Step<S> for Navigate {
    async fn run(&self, flow: &FlowContext, session: &mut S) -> Result<(), StepError> {
        let url = flow.url(&self.path);
        session.navigate(&url).await?;

        if let Some(expected) = self.expect_status {
            check_status(session, expected)?;
        }
        Ok(())
    }
}

/// Assert the status of the current page
pub struct ExpectStatus(pub u16);

#[async_trait]
impl<S: Browser> Step<S> for ExpectStatus {
    async fn run(&self, _flow: &FlowContext, session: &mut S) -> Result<(), StepError> {
        check_status(session, self.0)
    }
}

/// Assert the current page contains some text
pub struct ExpectText(pub String);

impl ExpectText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

#[async_trait]
impl<S: Browser> Step<S> for ExpectText {
    async fn run(&self, _flow: &FlowContext, session: &mut S) -> Result<(), StepError> {
        let page = session
            .page()
            .ok_or_else(|| StepError::failed("no page loaded"))?;

        if page.body.contains(&self.0) {
            Ok(())
        } else {
            Err(StepError::Assertion {
                expected: format!("page {} to contain {:?}", page.url, self.0),
                actual: format!("{} bytes without it", page.body.len()),
            })
        }
    }
}

fn check_status<S: Browser>(session: &S, expected: u16) -> Result<(), StepError> {
    let page = session
        .page()
        .ok_or_else(|| StepError::failed("no page loaded"))?;

    if page.status == expected {
        Ok(())
    } else {
        Err(StepError::Assertion {
            expected: format!("status {} from {}", expected, page.url),
            actual: format!("status {}", page.status),
        })
    }
}
