use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Flow-level configuration, validated before any route is built
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Flow name, used in logs and events
    #[serde(default)]
    pub name: String,

    /// Base URL every route of the flow starts from
    #[serde(default)]
    pub root_url: String,

    /// Free-form settings readable by steps
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

impl FlowConfig {
    pub fn new(name: impl Into<String>, root_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_url: root_url.into(),
            settings: HashMap::new(),
        }
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading flow config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_url.trim().is_empty() {
            return Err(ConfigError::MissingConfiguration {
                flow: self.name.clone(),
                setting: "root_url".to_string(),
            });
        }
        Ok(())
    }
}

/// The flow instance every step receives alongside its session.
#[derive(Debug, Clone)]
pub struct FlowContext {
    config: FlowConfig,
}

impl FlowContext {
    /// Validates `config` and wraps it
    pub fn new(config: FlowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn root_url(&self) -> &str {
        &self.config.root_url
    }

    /// Resolve a path against the root url
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.config.root_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.config.settings.get(key)
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }
}
