//! Error types for the BDD environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A model document could not be read from its URL or mirror location
    #[error("can't load model document '{url}': {source}")]
    UnresolvableDocument {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Document content does not match its declared serialization format
    #[error("can't parse document '{url}': {message}")]
    Parse { url: String, message: String },

    /// Serialization format name not recognized
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Compact name uses a prefix with no namespace binding
    #[error("unknown namespace prefix '{prefix}' in '{curie}'")]
    UnknownPrefix { prefix: String, curie: String },

    /// String is neither a compact name nor a bracketed IRI
    #[error("can't parse '{0}' as URI")]
    InvalidCurie(String),

    /// Raw JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnvError {
    /// Creates a parse error for a document.
    pub fn parse(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Creates an unresolvable-document error.
    pub fn unresolvable(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::UnresolvableDocument {
            url: url.into(),
            source,
        }
    }
}
