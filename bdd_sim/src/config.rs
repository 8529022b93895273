//! Run configuration, read from a JSON file.

use crate::error::ConfigError;
use crate::registry::default_behaviour_key;
use bdd_core::CallableKey;
use bdd_env::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One model document to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSource {
    pub url: String,

    /// Guessed from the URL extension when absent
    #[serde(default)]
    pub format: Option<DocumentFormat>,
}

impl ModelSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: None,
        }
    }
}

/// Configuration for a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Model documents, loaded in order into one graph
    pub models: Vec<ModelSource>,

    /// Local mirror for remote document URLs
    pub mirror_dir: Option<PathBuf>,

    /// Where generated template data is written
    pub output_dir: PathBuf,

    /// Base for relative `sim:path` values
    pub base_dir: PathBuf,

    /// Extra prefix bindings on top of the built-in vocabularies
    pub namespaces: BTreeMap<String, String>,

    /// Behaviour implementations to make available
    pub behaviours: Vec<CallableKey>,

    /// Behaviour used when a variant declares none
    pub default_behaviour: Option<CallableKey>,

    /// Steps per behaviour run
    pub max_count: u32,

    /// Simulated duration of each half-step in milliseconds
    pub step_delay_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            mirror_dir: None,
            output_dir: PathBuf::from("generated"),
            base_dir: PathBuf::from("."),
            namespaces: BTreeMap::new(),
            behaviours: vec![default_behaviour_key()],
            default_behaviour: Some(default_behaviour_key()),
            max_count: 5,
            step_delay_ms: 50,
        }
    }
}

impl SimConfig {
    /// Reads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_count == 0 {
            return Err(ConfigError::Invalid("max_count must be positive".into()));
        }
        if let Some(default) = &self.default_behaviour {
            if !self.behaviours.contains(default) {
                return Err(ConfigError::Invalid(format!(
                    "default behaviour '{}' is not in the behaviours list",
                    default
                )));
            }
        }
        Ok(())
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}
