use async_trait::async_trait;
use flowcore::{Session, SessionError};

/// The page a browser session currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// A session that can load pages. Steps in this crate work against any
/// implementation.
#[async_trait]
pub trait Browser: Session {
    /// Load `url`, replacing the current page. Non-2xx responses still
    /// count as a loaded page.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    fn page(&self) -> Option<&Page>;

    /// Urls loaded so far, oldest first
    fn history(&self) -> &[String];
}
