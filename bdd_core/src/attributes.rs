//! Attribute models and type-directed attribute loading.
//!
//! An attribute model is a typed bundle of predicate → value(s) attached to
//! an entity. What a model must contain depends on its declared type, so
//! interpretation is delegated to [`AttributeLoader`]s registered per type
//! URI in an [`AttrLoaderRegistry`]. New model types are supported by
//! registering a loader, never by editing dispatch code.

use crate::error::ModelError;
use bdd_env::{GraphStore, Term, Uri, RDF_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

/// A typed, immutable bundle of attributes attached to an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeModel {
    /// Model URI
    id: Uri,

    /// Declared types (`rdf:type`), in document order
    types: Vec<Uri>,

    /// Predicate → values, excluding `rdf:type`
    attrs: BTreeMap<Uri, Vec<Term>>,
}

impl AttributeModel {
    /// Creates an empty model.
    pub fn new(id: impl Into<Uri>) -> Self {
        Self {
            id: id.into(),
            types: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    /// Adds a declared type.
    pub fn with_type(mut self, model_type: impl Into<Uri>) -> Self {
        let model_type = model_type.into();
        if !self.types.contains(&model_type) {
            self.types.push(model_type);
        }
        self
    }

    /// Adds an attribute value.
    pub fn with_attr(mut self, predicate: impl Into<Uri>, value: impl Into<Term>) -> Self {
        self.attrs.entry(predicate.into()).or_default().push(value.into());
        self
    }

    /// Reads a model from the graph with a single subject-keyed query.
    pub fn from_graph<G: GraphStore + ?Sized>(graph: &G, id: &Uri) -> Self {
        let mut model = Self::new(id.clone());
        for triple in graph.triples_for(id) {
            if triple.predicate.as_str() == RDF_TYPE {
                if let Term::Iri(ty) = &triple.object {
                    model = model.with_type(ty.clone());
                }
            } else {
                model = model.with_attr(triple.predicate.clone(), triple.object.clone());
            }
        }
        model
    }

    pub fn id(&self) -> &Uri {
        &self.id
    }

    pub fn types(&self) -> &[Uri] {
        &self.types
    }

    /// Returns true if the model declares the given type.
    pub fn has_type(&self, model_type: &str) -> bool {
        self.types.iter().any(|t| t.as_str() == model_type)
    }

    /// Returns true if at least one value is present for the predicate.
    pub fn has_attr(&self, predicate: &str) -> bool {
        self.attrs.get(predicate).map_or(false, |v| !v.is_empty())
    }

    /// Returns all values of a predicate.
    pub fn attr(&self, predicate: &str) -> &[Term] {
        self.attrs.get(predicate).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the lexical form of the first value of a predicate.
    pub fn first_value(&self, predicate: &str) -> Option<&str> {
        self.attr(predicate).first().map(Term::lexical)
    }

    /// Like `first_value`, failing with `MissingAttribute` when absent.
    pub fn require(&self, predicate: &str) -> Result<&str, ModelError> {
        self.first_value(predicate)
            .ok_or_else(|| ModelError::MissingAttribute {
                model: self.id.clone(),
                predicate: predicate.to_string(),
            })
    }

    /// Iterates over (predicate, values).
    pub fn attrs(&self) -> impl Iterator<Item = (&Uri, &[Term])> {
        self.attrs.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

/// Key of an implementation living at attribute `attribute` of module `module`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallableKey {
    pub module: String,
    pub attribute: String,
}

impl CallableKey {
    /// Creates a new key.
    pub fn new(module: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            attribute: attribute.into(),
        }
    }
}

impl std::fmt::Display for CallableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.attribute)
    }
}

/// Host service answering whether a module attribute can be resolved.
pub trait CallableLookup: std::fmt::Debug {
    /// Returns true if an implementation is registered under the key.
    fn contains(&self, key: &CallableKey) -> bool;
}

/// Result of loading one attribute model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadedAttribute {
    /// Resource path, resolved against the loader's base directory
    Path { path: PathBuf },

    /// Configuration entries attached to a resource
    Configs { entries: Vec<String> },

    /// Reference to a registered implementation
    Callable { key: CallableKey },
}

/// Type-directed validator/enricher of attribute models.
///
/// Loaders are pure: they read the model and either return an enrichment
/// or fail. A loader must fail, never silently continue, when a predicate
/// its type requires is absent.
pub trait AttributeLoader: std::fmt::Debug {
    /// Unique loader name; registration is idempotent per name.
    fn name(&self) -> &str;

    /// Type URI of the models this loader handles.
    fn model_type(&self) -> &str;

    /// Validates and interprets a model of `model_type()`.
    fn load(&self, model: &AttributeModel) -> Result<LoadedAttribute, ModelError>;
}

/// Dispatch table: model type URI → loaders in registration order.
#[derive(Debug, Clone, Default)]
pub struct AttrLoaderRegistry {
    by_type: BTreeMap<Uri, Vec<Arc<dyn AttributeLoader>>>,
    names: BTreeSet<String>,
}

impl AttrLoaderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loader. Returns false if one with the same name exists.
    pub fn register(&mut self, loader: Arc<dyn AttributeLoader>) -> bool {
        if !self.names.insert(loader.name().to_string()) {
            return false;
        }
        self.by_type
            .entry(Uri::new(loader.model_type()))
            .or_default()
            .push(loader);
        true
    }

    /// Returns the loaders registered for a type.
    pub fn loaders_for(&self, model_type: &str) -> &[Arc<dyn AttributeLoader>] {
        self.by_type.get(model_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if a loader with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of registered loaders.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Runs every loader matching one of the model's declared types.
    ///
    /// # Returns
    /// (loader name, result) pairs, types in declaration order and loaders
    /// in registration order. The first failing loader aborts loading.
    pub fn load(&self, model: &AttributeModel) -> Result<Vec<(String, LoadedAttribute)>, ModelError> {
        let mut results = Vec::new();
        for model_type in model.types() {
            for loader in self.loaders_for(model_type.as_str()) {
                let loaded = loader.load(model)?;
                results.push((loader.name().to_string(), loaded));
            }
        }
        Ok(results)
    }
}
