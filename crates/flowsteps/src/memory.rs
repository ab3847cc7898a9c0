use crate::{Browser, Page};
use async_trait::async_trait;
use flowcore::{Session, SessionError, SessionProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Session over a fixed set of scripted pages; unknown urls load as 404.
///
/// Used for dry runs and tests where no site is reachable.
pub struct MemorySession {
    pages: HashMap<String, (u16, String)>,
    page: Option<Page>,
    history: Vec<String>,
    closed: bool,
    stats: Arc<SessionStats>,
}

#[async_trait]
impl Session for MemorySession {
    async fn close(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Close("session already closed".to_string()));
        }
        self.closed = true;
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Browser for MemorySession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                message: "session is closed".to_string(),
            });
        }

        let (status, body) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| (404, String::from("Not Found")));

        self.history.push(url.to_string());
        self.page = Some(Page {
            url: url.to_string(),
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

/// Open/close counters shared by a provider and its sessions
#[derive(Debug, Default)]
pub struct SessionStats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl SessionStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MemorySessionProvider {
    pages: HashMap<String, (u16, String)>,
    stats: Arc<SessionStats>,
}

impl MemorySessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), (status, body.into()));
        self
    }

    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl SessionProvider for MemorySessionProvider {
    type Session = MemorySession;

    async fn open(&self) -> Result<MemorySession, SessionError> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession {
            pages: self.pages.clone(),
            page: None,
            history: Vec::new(),
            closed: false,
            stats: Arc::clone(&self.stats),
        })
    }
}
