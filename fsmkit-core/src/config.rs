//! Engine configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via FSMKIT_CONFIG)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How callbacks and the fallback are invoked relative to the engine lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokePolicy {
    /// Invoke while holding the engine lock. Every callback is serialized with
    /// every other operation. Calling back into the same engine deadlocks.
    #[default]
    HoldLock,
    /// Update the engine under the lock, release it, then invoke. Callbacks may
    /// re-enter the engine but can run concurrently with other operations.
    ReleaseLock,
}

impl InvokePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hold_lock" | "hold" => Some(InvokePolicy::HoldLock),
            "release_lock" | "release" => Some(InvokePolicy::ReleaseLock),
            _ => None,
        }
    }
}

/// Per-instance engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name attached to every log event from this engine.
    pub name: String,
    /// Callback invocation discipline.
    pub invoke_policy: InvokePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "fsm".to_string(),
            invoke_policy: InvokePolicy::HoldLock,
        }
    }
}

impl EngineConfig {
    /// Creates a default configuration with the given engine name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the engine name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the invoke policy.
    pub fn with_invoke_policy(mut self, policy: InvokePolicy) -> Self {
        self.invoke_policy = policy;
        self
    }

    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("FSMKIT_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup);
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })
    }

    /// Applies FSMKIT_* environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("FSMKIT_NAME") {
            if !name.is_empty() {
                self.name = name;
            }
        }

        if let Some(policy) = lookup("FSMKIT_INVOKE_POLICY") {
            match InvokePolicy::parse(&policy) {
                Some(parsed) => self.invoke_policy = parsed,
                None => tracing::warn!("Ignoring unknown FSMKIT_INVOKE_POLICY '{}'", policy),
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}
