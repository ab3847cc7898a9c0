use crate::{Browser, Page};
use async_trait::async_trait;
use flowcore::{Session, SessionError, SessionProvider};
use std::time::Duration;

/// Headless session that loads pages over HTTP with its own cookie jar
pub struct HttpSession {
    client: Option<reqwest::Client>,
    page: Option<Page>,
    history: Vec<String>,
}

#[async_trait]
impl Session for HttpSession {
    async fn close(&mut self) -> Result<(), SessionError> {
        if self.client.take().is_none() {
            return Err(SessionError::Close("session already closed".to_string()));
        }
        self.page = None;
        Ok(())
    }
}

#[async_trait]
impl Browser for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let client = self.client.as_ref().ok_or_else(|| SessionError::Navigation {
            url: url.to_string(),
            message: "session is closed".to_string(),
        })?;

        tracing::debug!("GET {}", url);
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::Navigation {
                url: url.to_string(),
                message: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| SessionError::Navigation {
            url: url.to_string(),
            message: format!("Failed to read response: {}", e),
        })?;

        tracing::debug!("Response status: {}", status);
        self.history.push(url.to_string());
        self.page = Some(Page {
            url: final_url,
            status,
            body,
        });
        Ok(())
    }

    fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    fn history(&self) -> &[String] {
        &self.history
    }
}

/// Opens one [`HttpSession`] per route, none sharing cookies
pub struct HttpSessionProvider {
    timeout: Duration,
    user_agent: String,
}

impl HttpSessionProvider {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("flowengine/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for HttpSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, SessionError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| SessionError::Open(e.to_string()))?;

        Ok(HttpSession {
            client: Some(client),
            page: None,
            history: Vec::new(),
        })
    }
}
