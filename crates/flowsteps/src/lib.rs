//! Standard step library
//!
//! Browser-like sessions and the common steps that drive them

mod browser;
mod debug;
mod http;
mod memory;
mod navigate;
mod time;

pub use browser::{Browser, Page};
pub use debug::LogStep;
pub use http::{HttpSession, HttpSessionProvider};
pub use memory::{MemorySession, MemorySessionProvider, SessionStats};
pub use navigate::{ExpectStatus, ExpectText, Navigate};
pub use time::DelayStep;
