//! Error types for scenario model resolution.
//!
//! Every variant here points at an authoring defect in the model documents
//! or feature files, so messages always name the offending entity.

use bdd_env::{EnvError, Uri};
use thiserror::Error;

/// Kind of scene participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Object,
    Agent,
    Workspace,
}

impl ParticipantKind {
    /// Returns the participant name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            ParticipantKind::Object => "object",
            ParticipantKind::Agent => "agent",
            ParticipantKind::Workspace => "workspace",
        }
    }
}

impl std::fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors raised while resolving scenario models.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Attribute model lacks a predicate its type requires
    #[error("attribute model '{model}' missing required attribute '{predicate}'")]
    MissingAttribute { model: Uri, predicate: String },

    /// Attribute model failed type-directed loading
    #[error("attribute model '{model}' for entity '{entity}' is invalid: {reason}")]
    InvalidAttributeModel {
        entity: Uri,
        model: Uri,
        #[source]
        reason: Box<ModelError>,
    },

    /// Entity has no attribute model of the requested type
    #[error("entity '{entity}' has no model of type '{model_type}'")]
    NoModelOfType { entity: Uri, model_type: String },

    /// Scene lacks one of objects, agents, workspaces
    #[error("scene '{scene}' has no {missing}")]
    IncompleteScene { scene: Uri, missing: ParticipantKind },

    /// Referenced participant is not part of the scene
    #[error("{kind} '{uri}' is not part of scene '{scene}'")]
    UnknownParticipant {
        kind: ParticipantKind,
        uri: Uri,
        scene: Uri,
    },

    /// Structural defect in a model document
    #[error("malformed model '{entity}': {message}")]
    MalformedSpec { entity: Uri, message: String },

    /// Module attribute names no registered implementation
    #[error("no implementation registered for '{0}'")]
    UnknownCallable(String),

    /// Step parameter string can't be parsed into URIs
    #[error("invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Environment error (namespace expansion, documents)
    #[error(transparent)]
    Env(#[from] EnvError),
}

impl ModelError {
    /// Creates a malformed-model error.
    pub fn malformed(entity: &Uri, msg: impl Into<String>) -> Self {
        Self::MalformedSpec {
            entity: entity.clone(),
            message: msg.into(),
        }
    }

    /// Creates an invalid-parameter error.
    pub fn invalid_param(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: msg.into(),
        }
    }
}
