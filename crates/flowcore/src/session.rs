use crate::SessionError;
use async_trait::async_trait;

/// An exclusively-owned automation resource, e.g. a browser instance.
///
/// A worker opens exactly one session and closes it exactly once, whether
/// its route completed or aborted on a failing step.
#[async_trait]
pub trait Session: Send + 'static {
    /// Release the underlying resource
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens a fresh, isolated session for each route worker
#[async_trait]
pub trait SessionProvider: Send + Sync + 'static {
    type Session: Session;

    async fn open(&self) -> Result<Self::Session, SessionError>;
}
