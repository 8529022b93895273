//! Common types for the graph abstraction.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::sync::Arc;

/// Identifier of a graph node: a full IRI or a `_:` blank-node label.
///
/// Cloning is cheap (shared string), so URIs can be used freely as map keys
/// across scene and entity caches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uri(Arc<str>);

impl Uri {
    /// Creates a URI from any string-like value.
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    /// Creates a blank-node identifier with the given label.
    pub fn blank(label: impl std::fmt::Display) -> Self {
        Self::new(format!("_:{}", label))
    }

    /// Returns true if this identifies a blank node.
    pub fn is_blank(&self) -> bool {
        self.0.starts_with("_:")
    }

    /// Returns the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Uri {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Borrow<str> for Uri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal value with optional datatype or language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form
    pub value: String,

    /// Datatype IRI, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Uri>,

    /// Language tag, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Literal {
    /// Creates a plain literal.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Reference to another node
    Iri(Uri),

    /// Literal value
    Literal(Literal),
}

impl Term {
    /// Shorthand for a plain literal term.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(value))
    }

    /// Returns the node reference, if this term is one.
    pub fn as_iri(&self) -> Option<&Uri> {
        match self {
            Term::Iri(uri) => Some(uri),
            Term::Literal(_) => None,
        }
    }

    /// Returns the lexical form of a literal, if this term is one.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal(lit) => Some(&lit.value),
            Term::Iri(_) => None,
        }
    }

    /// Returns the lexical form of a literal or the string of an IRI.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(uri) => uri.as_str(),
            Term::Literal(lit) => &lit.value,
        }
    }
}

impl From<Uri> for Term {
    fn from(uri: Uri) -> Self {
        Term::Iri(uri)
    }
}

/// A single (subject, predicate, object) edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Uri,
    pub predicate: Uri,
    pub object: Term,
}

impl Triple {
    /// Creates a new triple.
    pub fn new(subject: impl Into<Uri>, predicate: impl Into<Uri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}
