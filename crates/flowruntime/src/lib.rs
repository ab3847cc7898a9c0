//! Flow execution runtime
//!
//! This crate turns step definitions into linked routes, linearizes each
//! route into an execution plan and runs all routes concurrently, one
//! session per route.

mod coordinator;
mod linearize;
mod outcome;
mod registry;
mod runtime;
mod tree;
mod worker;

pub use coordinator::{RunCoordinator, RunResult};
pub use linearize::{PlannedStep, SequenceLinearizer};
pub use outcome::{OutcomeRegistry, OutcomeSets};
pub use registry::{Registration, StepRegistry};
pub use runtime::{Flow, FlowRuntime, RuntimeConfig};
pub use tree::RouteTree;
pub use worker::{ExecutionWorker, RouteReport, RouteStatus, RunScope, WorkerState};
