//! Graph store abstraction for scenario model documents.

use crate::document::{self, ContextLoader, DocumentFormat};
use crate::error::EnvError;
use crate::namespace::NamespaceManager;
use crate::resolver::DocumentResolver;
use crate::types::{Term, Triple, Uri};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Read access to a triple store.
///
/// Every query is keyed by subject or by (predicate, object); model
/// resolution never traverses the graph, so the cost of loading an entity
/// depends only on the number of edges attached to it.
///
/// # Implementations
///
/// - **In-memory**: `MemoryGraph` - parsed from JSON-LD / N-Triples documents
pub trait GraphStore {
    /// Returns all triples with the given subject, in insertion order.
    fn triples_for(&self, subject: &Uri) -> Vec<&Triple>;

    /// Returns the objects of `(subject, predicate, ?)`.
    fn objects(&self, subject: &Uri, predicate: &str) -> Vec<&Term> {
        self.triples_for(subject)
            .into_iter()
            .filter(|t| t.predicate.as_str() == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Returns the subjects of `(?, predicate, object)`.
    fn subjects(&self, predicate: &str, object: &Term) -> Vec<&Uri>;

    /// Returns true if the exact triple is present.
    fn contains(&self, triple: &Triple) -> bool;

    /// Number of triples in the store.
    fn len(&self) -> usize;

    /// Returns true if the store holds no triples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Namespace mapping used to expand and compact names.
    fn namespaces(&self) -> &NamespaceManager;
}

/// Insertion-ordered, deduplicated in-memory triple store.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    /// All triples in insertion order
    triples: Vec<Triple>,

    /// Dedup set
    seen: HashSet<Triple>,

    /// Subject → indices into `triples`
    by_subject: HashMap<Uri, Vec<usize>>,

    /// Prefix bindings collected from documents and configuration
    namespaces: NamespaceManager,

    /// Blank-node counter shared by every parsed document
    next_blank: u64,
}

impl MemoryGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a triple. Returns false if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        let index = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(index);
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Mutable access to the namespace mapping.
    pub fn namespaces_mut(&mut self) -> &mut NamespaceManager {
        &mut self.namespaces
    }

    /// Parses a document already held in memory and merges it into the graph.
    ///
    /// Remote JSON-LD contexts can't be resolved here; use `load` for
    /// documents that reference them.
    ///
    /// # Arguments
    /// * `url` - Identifier of the document (error messages, base IRI)
    /// * `text` - Document content
    /// * `format` - Serialization format of `text`
    ///
    /// # Returns
    /// Number of new triples added.
    pub fn parse_document(
        &mut self,
        url: &str,
        text: &str,
        format: DocumentFormat,
    ) -> Result<usize, EnvError> {
        self.merge(url, text, format, None)
    }

    /// Fetches a document through a resolver and merges it into the graph.
    ///
    /// Remote `@context` URLs are fetched through the same resolver.
    pub fn load<R>(&mut self, resolver: &R, url: &str, format: DocumentFormat) -> Result<usize, EnvError>
    where
        R: DocumentResolver + Clone + Send + Sync + 'static,
    {
        let text = resolver.fetch(url)?;
        let contexts: ContextLoader = Arc::new(resolver.clone());
        self.merge(url, &text, format, Some(contexts))
    }

    fn merge(
        &mut self,
        url: &str,
        text: &str,
        format: DocumentFormat,
        contexts: Option<ContextLoader>,
    ) -> Result<usize, EnvError> {
        let parsed = document::parse(url, text, format, &mut self.next_blank, contexts)?;

        for (prefix, namespace) in parsed.prefixes {
            self.namespaces.bind(prefix, namespace);
        }

        let added = parsed
            .triples
            .into_iter()
            .filter(|t| self.insert(t.clone()))
            .count();
        debug!("parsed '{}' ({}): {} new triples", url, format, added);
        Ok(added)
    }

    /// Iterates over all triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }
}

impl GraphStore for MemoryGraph {
    fn triples_for(&self, subject: &Uri) -> Vec<&Triple> {
        self.by_subject
            .get(subject)
            .map(|indices| indices.iter().map(|&i| &self.triples[i]).collect())
            .unwrap_or_default()
    }

    fn subjects(&self, predicate: &str, object: &Term) -> Vec<&Uri> {
        self.triples
            .iter()
            .filter(|t| t.predicate.as_str() == predicate && &t.object == object)
            .map(|t| &t.subject)
            .collect()
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    fn len(&self) -> usize {
        self.triples.len()
    }

    fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }
}
