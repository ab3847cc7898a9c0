use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Route '{route}' has no step with ordinal {ordinal}")]
    OrdinalNotFound { route: String, ordinal: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Problems found while turning step definitions into routes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A single definition is incomplete. Only that definition is skipped.
    #[error("Malformed step definition{}: missing or invalid {field}", describe(.name))]
    MalformedStep { name: Option<String>, field: String },

    /// A second definition reusing a step name already registered in the flow.
    /// Only the later definition is skipped.
    #[error("Step '{name}' in route '{route}' reuses a name already registered in route '{existing}'")]
    DuplicateStep {
        name: String,
        route: String,
        existing: String,
    },

    /// A root reference on anything but the entry ordinal.
    #[error("Step '{name}' in route '{route}' cannot root on a non-1 ordinal ({ordinal})")]
    InvalidBranch {
        route: String,
        name: String,
        ordinal: u32,
    },
}

impl RegistrationError {
    /// Whether registration may continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RegistrationError::MalformedStep { .. } | RegistrationError::DuplicateStep { .. }
        )
    }
}

fn describe(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" '{}'", name),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("No route named '{root}' found for route '{route}' to branch off")]
    UnknownRoute { route: String, root: String },

    #[error("Route '{route}' branches off itself through its roots")]
    CyclicRoute { route: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No {setting} set on flow '{flow}'")]
    MissingConfiguration { flow: String, setting: String },
}

/// Failure of a single step. Never escapes the worker that ran it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),

    #[error("Assertion failed: expected {expected}, got {actual}")]
    Assertion { expected: String, actual: String },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Timeout after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Step panicked: {0}")]
    Panicked(String),
}

impl StepError {
    pub fn failed(message: impl Into<String>) -> Self {
        StepError::Failed(message.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Failed to open session: {0}")]
    Open(String),

    #[error("Failed to close session: {0}")]
    Close(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
}
