//! Entity models: attribute models of one entity grouped by declared type.

use crate::attributes::{AttrLoaderRegistry, AttributeLoader, AttributeModel, LoadedAttribute};
use crate::error::ModelError;
use crate::uris::URI_MODEL_PRED_HAS_MODEL;
use bdd_env::{GraphStore, Term, Uri};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// An entity with its attribute models, grouped by declared type.
///
/// A model declaring several types is listed under each of them; with one
/// type per model, `model_type_to_id` partitions the attached models.
#[derive(Debug, Clone, Default)]
pub struct EntityModel {
    /// Entity URI
    id: Uri,

    /// Declared types over all attached models
    model_types: BTreeSet<Uri>,

    /// Type → attached model URIs, in attachment order
    model_type_to_id: BTreeMap<Uri, Vec<Uri>>,

    /// Model URI → model
    models: BTreeMap<Uri, AttributeModel>,

    /// Model URI → (loader name, result), in loader registration order
    loaded: BTreeMap<Uri, Vec<(String, LoadedAttribute)>>,
}

impl EntityModel {
    /// Creates an entity with no attached models.
    pub fn new(id: impl Into<Uri>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Attaches a model, indexing it under each of its declared types.
    pub fn attach(&mut self, model: AttributeModel) {
        if self.models.contains_key(model.id()) {
            return;
        }
        for model_type in model.types() {
            self.model_types.insert(model_type.clone());
            self.model_type_to_id
                .entry(model_type.clone())
                .or_default()
                .push(model.id().clone());
        }
        self.models.insert(model.id().clone(), model);
    }

    pub fn id(&self) -> &Uri {
        &self.id
    }

    /// Declared type URIs over all attached models.
    pub fn model_types(&self) -> &BTreeSet<Uri> {
        &self.model_types
    }

    /// Returns true if any attached model declares the type.
    pub fn has_model_type(&self, model_type: &str) -> bool {
        self.model_types.contains(model_type)
    }

    /// Full type → model URI index.
    pub fn model_type_to_id(&self) -> &BTreeMap<Uri, Vec<Uri>> {
        &self.model_type_to_id
    }

    /// URIs of the models of one type.
    pub fn model_ids(&self, model_type: &str) -> &[Uri] {
        self.model_type_to_id
            .get(model_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All attached models by URI.
    pub fn models(&self) -> &BTreeMap<Uri, AttributeModel> {
        &self.models
    }

    /// Looks up an attached model.
    pub fn model(&self, model_id: &str) -> Option<&AttributeModel> {
        self.models.get(model_id)
    }

    /// All models of a type, in attachment order.
    pub fn models_by_type(&self, model_type: &str) -> Vec<&AttributeModel> {
        self.model_ids(model_type)
            .iter()
            .filter_map(|id| self.models.get(id))
            .collect()
    }

    /// Returns the first model of a type.
    ///
    /// Used where exactly one model of the type is expected. Repeated calls
    /// return the same model.
    pub fn load_first_model_by_type(&self, model_type: &str) -> Result<&AttributeModel, ModelError> {
        self.models_by_type(model_type)
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::NoModelOfType {
                entity: self.id.clone(),
                model_type: model_type.to_string(),
            })
    }

    /// Loader results recorded for a model.
    pub fn loaded(&self, model_id: &str) -> &[(String, LoadedAttribute)] {
        self.loaded.get(model_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All loader results, in model URI order.
    pub fn loaded_attributes(&self) -> impl Iterator<Item = &LoadedAttribute> {
        self.loaded.values().flatten().map(|(_, attr)| attr)
    }
}

/// Loads entity models from a graph and runs registered attribute loaders.
#[derive(Debug, Clone, Default)]
pub struct ModelLoader {
    registry: AttrLoaderRegistry,
}

impl ModelLoader {
    /// Creates a loader with no attribute loaders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds attribute loaders; already registered names are skipped.
    pub fn register_attr_loaders<I>(&mut self, loaders: I)
    where
        I: IntoIterator<Item = Arc<dyn AttributeLoader>>,
    {
        for loader in loaders {
            if !self.registry.register(loader.clone()) {
                debug!("attribute loader '{}' already registered", loader.name());
            }
        }
    }

    /// The loader dispatch table.
    pub fn registry(&self) -> &AttrLoaderRegistry {
        &self.registry
    }

    /// Loads an entity's attribute models.
    ///
    /// Queries the entity's `modl:has-model` edges and each attached
    /// model's own edges; no further traversal.
    ///
    /// # Errors
    /// * `MalformedSpec` - a `has-model` value is a literal
    /// * `InvalidAttributeModel` - a registered loader rejected a model
    pub fn load_entity<G: GraphStore + ?Sized>(&self, graph: &G, id: &Uri) -> Result<EntityModel, ModelError> {
        let mut entity = EntityModel::new(id.clone());

        for term in graph.objects(id, URI_MODEL_PRED_HAS_MODEL) {
            let model_id = match term {
                Term::Iri(uri) => uri,
                Term::Literal(lit) => {
                    return Err(ModelError::malformed(
                        id,
                        format!("has-model value '{}' is not a URI", lit.value),
                    ))
                }
            };
            entity.attach(AttributeModel::from_graph(graph, model_id));
        }

        for (model_id, model) in &entity.models {
            let results = self
                .registry
                .load(model)
                .map_err(|reason| ModelError::InvalidAttributeModel {
                    entity: id.clone(),
                    model: model_id.clone(),
                    reason: Box::new(reason),
                })?;
            if !results.is_empty() {
                entity.loaded.insert(model_id.clone(), results);
            }
        }

        debug!(
            "loaded entity '{}': {} models, {} types",
            id,
            entity.models.len(),
            entity.model_types.len()
        );
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{ModuleAttrLoader, PathLoader};
    use crate::uris::*;
    use bdd_env::{MemoryGraph, Triple, RDF_TYPE};
    use proptest::prelude::*;

    fn attach_model(g: &mut MemoryGraph, entity: &str, model: &str, model_type: &str, attrs: &[(&str, &str)]) {
        g.insert(Triple::new(entity, URI_MODEL_PRED_HAS_MODEL, Term::Iri(Uri::new(model))));
        g.insert(Triple::new(model, RDF_TYPE, Term::Iri(Uri::new(model_type))));
        for (p, v) in attrs {
            g.insert(Triple::new(model, *p, Term::literal(*v)));
        }
    }

    fn cube_graph() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        attach_model(
            &mut g,
            "https://e.org/cube1",
            "https://e.org/cube1-path",
            URI_SIM_TYPE_RES_PATH,
            &[(URI_SIM_PRED_PATH, "cube.usd")],
        );
        attach_model(
            &mut g,
            "https://e.org/cube1",
            "https://e.org/cube1-py",
            URI_PY_TYPE_MODULE_ATTR,
            &[(URI_PY_PRED_MODULE_NAME, "objects"), (URI_PY_PRED_ATTR_NAME, "Cube")],
        );
        g
    }

    #[test]
    fn test_load_entity_groups_by_type() {
        let g = cube_graph();
        let entity = ModelLoader::new()
            .load_entity(&g, &Uri::new("https://e.org/cube1"))
            .unwrap();

        assert_eq!(entity.model_types().len(), 2);
        assert!(entity.has_model_type(URI_SIM_TYPE_RES_PATH));
        assert_eq!(entity.model_ids(URI_PY_TYPE_MODULE_ATTR), &[Uri::new("https://e.org/cube1-py")]);
        assert!(entity.model("https://e.org/cube1-path").unwrap().has_attr(URI_SIM_PRED_PATH));
        assert!(entity.loaded("https://e.org/cube1-path").is_empty());
    }

    #[test]
    fn test_load_first_model_by_type() {
        let g = cube_graph();
        let entity = ModelLoader::new()
            .load_entity(&g, &Uri::new("https://e.org/cube1"))
            .unwrap();

        let first = entity.load_first_model_by_type(URI_SIM_TYPE_RES_PATH).unwrap();
        let again = entity.load_first_model_by_type(URI_SIM_TYPE_RES_PATH).unwrap();
        assert_eq!(first.id(), again.id());

        let err = entity.load_first_model_by_type(URI_SIM_TYPE_RES_CONFIGS).unwrap_err();
        assert!(matches!(err, ModelError::NoModelOfType { .. }));
    }

    #[test]
    fn test_registered_loaders_enrich() {
        let g = cube_graph();
        let mut loader = ModelLoader::new();
        loader.register_attr_loaders([
            Arc::new(PathLoader::new("/assets")) as Arc<dyn AttributeLoader>,
            Arc::new(ModuleAttrLoader::new()),
        ]);
        // Second registration of the same names is a no-op
        loader.register_attr_loaders([Arc::new(ModuleAttrLoader::new()) as Arc<dyn AttributeLoader>]);
        assert_eq!(loader.registry().len(), 2);

        let entity = loader.load_entity(&g, &Uri::new("https://e.org/cube1")).unwrap();
        assert_eq!(
            entity.loaded("https://e.org/cube1-path"),
            &[(
                "resource_path".to_string(),
                LoadedAttribute::Path {
                    path: "/assets/cube.usd".into()
                }
            )]
        );
        assert_eq!(entity.loaded_attributes().count(), 2);
    }

    #[test]
    fn test_loader_failure_names_entity_and_model() {
        let mut g = MemoryGraph::new();
        attach_model(
            &mut g,
            "https://e.org/robot1",
            "https://e.org/robot1-py",
            URI_PY_TYPE_MODULE_ATTR,
            &[(URI_PY_PRED_ATTR_NAME, "Robot")],
        );
        let mut loader = ModelLoader::new();
        loader.register_attr_loaders([Arc::new(ModuleAttrLoader::new()) as Arc<dyn AttributeLoader>]);

        let err = loader
            .load_entity(&g, &Uri::new("https://e.org/robot1"))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("https://e.org/robot1-py"), "{}", msg);
        assert!(msg.contains("'https://e.org/robot1'"), "{}", msg);
    }

    #[test]
    fn test_literal_has_model_is_malformed() {
        let mut g = MemoryGraph::new();
        g.insert(Triple::new("https://e.org/x", URI_MODEL_PRED_HAS_MODEL, Term::literal("oops")));
        let err = ModelLoader::new()
            .load_entity(&g, &Uri::new("https://e.org/x"))
            .unwrap_err();
        assert!(matches!(err, ModelError::MalformedSpec { .. }));
    }

    proptest! {
        #[test]
        fn prop_model_types_partition_models(types in proptest::collection::vec(0usize..4, 1..20)) {
            let mut g = MemoryGraph::new();
            for (i, t) in types.iter().enumerate() {
                attach_model(
                    &mut g,
                    "https://e.org/entity",
                    &format!("https://e.org/model{}", i),
                    &format!("https://e.org/Type{}", t),
                    &[],
                );
            }

            let entity = ModelLoader::new()
                .load_entity(&g, &Uri::new("https://e.org/entity"))
                .unwrap();

            let distinct: BTreeSet<_> = types.iter().collect();
            prop_assert_eq!(entity.model_type_to_id().len(), distinct.len());

            let mut union = BTreeSet::new();
            let mut total = 0;
            for ids in entity.model_type_to_id().values() {
                total += ids.len();
                union.extend(ids.iter().cloned());
            }
            // pairwise disjoint groups whose union is every model
            prop_assert_eq!(total, types.len());
            prop_assert_eq!(union.len(), types.len());
            prop_assert_eq!(entity.models().len(), types.len());
        }
    }
}
