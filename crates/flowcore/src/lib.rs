//! Core abstractions for the flow engine
//!
//! This crate provides the step, route and session types that the runtime
//! and step library build on. It runs nothing by itself.

mod config;
mod definition;
mod error;
pub mod events;
mod route;
mod session;
mod step;

pub use config::{FlowConfig, FlowContext};
pub use definition::{FlowDefinition, RootReference, StepDefinition};
pub use error::{
    ConfigError, FlowError, RegistrationError, RouteError, SessionError, StepError,
};
pub use events::*;
pub use route::{Route, RouteTable, StepRecord};
pub use session::{Session, SessionProvider};
pub use step::{FnStep, Step, StepId};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
