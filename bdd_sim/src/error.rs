//! Error types for behaviour execution and harness steps.

use bdd_core::{CallableKey, ModelError};
use bdd_env::{EnvError, Uri};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while binding or stepping a behaviour.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("max_count must be positive")]
    InvalidMaxCount,

    #[error("behaviour is finished; reset() before stepping again")]
    AlreadyFinished,

    #[error("no behaviour implementation registered for '{0}'")]
    UnknownBehaviour(CallableKey),

    #[error("scenario variant '{variant}' has no behaviour and no default is configured")]
    NoBehaviour { variant: Uri },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure of one harness step; the scenario fails with it.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("missing step parameter '{0}'")]
    MissingParameter(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Env(#[from] EnvError),
}

impl StepError {
    pub(crate) fn assertion(msg: impl Into<String>) -> Self {
        StepError::Assertion(msg.into())
    }
}

/// Errors reading the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors writing generated files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("can't write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}
