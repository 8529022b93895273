//! Scene model: the objects, agents and workspaces of one scenario.

use crate::entity::{EntityModel, ModelLoader};
use crate::error::{ModelError, ParticipantKind};
use crate::uris::{URI_BDD_PRED_HAS_AGN, URI_BDD_PRED_HAS_OBJ, URI_BDD_PRED_HAS_WS};
use bdd_env::{GraphStore, Term, Uri};
use std::collections::{BTreeSet, HashMap};

/// Participants of a scenario plus lazily loaded entity models.
///
/// Membership is fixed at construction. Entity models are loaded on first
/// request and cached for the scene's lifetime; loaders must therefore be
/// registered before the first `load_*_model` call.
#[derive(Debug, Clone)]
pub struct SceneModel {
    /// Scene URI
    id: Uri,

    objects: BTreeSet<Uri>,
    agents: BTreeSet<Uri>,
    workspaces: BTreeSet<Uri>,

    /// Loader for object entity models
    pub obj_model_loader: ModelLoader,

    /// Loader for agent entity models
    pub agn_model_loader: ModelLoader,

    /// Loader for workspace entity models
    pub ws_model_loader: ModelLoader,

    obj_models: HashMap<Uri, EntityModel>,
    agn_models: HashMap<Uri, EntityModel>,
    ws_models: HashMap<Uri, EntityModel>,
}

impl SceneModel {
    /// Creates a scene with the given membership.
    pub fn new<I>(id: impl Into<Uri>, objects: I, agents: I, workspaces: I) -> Self
    where
        I: IntoIterator<Item = Uri>,
    {
        Self {
            id: id.into(),
            objects: objects.into_iter().collect(),
            agents: agents.into_iter().collect(),
            workspaces: workspaces.into_iter().collect(),
            obj_model_loader: ModelLoader::new(),
            agn_model_loader: ModelLoader::new(),
            ws_model_loader: ModelLoader::new(),
            obj_models: HashMap::new(),
            agn_models: HashMap::new(),
            ws_models: HashMap::new(),
        }
    }

    /// Reads scene membership from `bdd:has-object`, `bdd:has-agent` and
    /// `bdd:has-workspace` edges.
    ///
    /// Empty categories are allowed here; completeness is checked when a
    /// scenario variant is resolved.
    pub fn from_graph<G: GraphStore + ?Sized>(graph: &G, id: &Uri) -> Result<Self, ModelError> {
        let members = |predicate: &str| -> Result<Vec<Uri>, ModelError> {
            graph
                .objects(id, predicate)
                .into_iter()
                .map(|term| match term {
                    Term::Iri(uri) => Ok(uri.clone()),
                    Term::Literal(lit) => Err(ModelError::malformed(
                        id,
                        format!("scene member '{}' is not a URI", lit.value),
                    )),
                })
                .collect()
        };

        Ok(Self::new(
            id.clone(),
            members(URI_BDD_PRED_HAS_OBJ)?,
            members(URI_BDD_PRED_HAS_AGN)?,
            members(URI_BDD_PRED_HAS_WS)?,
        ))
    }

    pub fn id(&self) -> &Uri {
        &self.id
    }

    pub fn objects(&self) -> &BTreeSet<Uri> {
        &self.objects
    }

    pub fn agents(&self) -> &BTreeSet<Uri> {
        &self.agents
    }

    pub fn workspaces(&self) -> &BTreeSet<Uri> {
        &self.workspaces
    }

    /// Membership set of a participant kind.
    pub fn members(&self, kind: ParticipantKind) -> &BTreeSet<Uri> {
        match kind {
            ParticipantKind::Object => &self.objects,
            ParticipantKind::Agent => &self.agents,
            ParticipantKind::Workspace => &self.workspaces,
        }
    }

    /// Fails with `UnknownParticipant` unless `uri` is a member of `kind`.
    pub fn check_member(&self, kind: ParticipantKind, uri: &Uri) -> Result<(), ModelError> {
        if self.members(kind).contains(uri) {
            Ok(())
        } else {
            Err(ModelError::UnknownParticipant {
                kind,
                uri: uri.clone(),
                scene: self.id.clone(),
            })
        }
    }

    /// Loads (or returns the cached) model of a scene object.
    pub fn load_obj_model<G: GraphStore + ?Sized>(&mut self, graph: &G, obj_id: &Uri) -> Result<&EntityModel, ModelError> {
        self.load_model(ParticipantKind::Object, graph, obj_id)
    }

    /// Loads (or returns the cached) model of a scene agent.
    pub fn load_agn_model<G: GraphStore + ?Sized>(&mut self, graph: &G, agn_id: &Uri) -> Result<&EntityModel, ModelError> {
        self.load_model(ParticipantKind::Agent, graph, agn_id)
    }

    /// Loads (or returns the cached) model of a scene workspace.
    pub fn load_ws_model<G: GraphStore + ?Sized>(&mut self, graph: &G, ws_id: &Uri) -> Result<&EntityModel, ModelError> {
        self.load_model(ParticipantKind::Workspace, graph, ws_id)
    }

    /// Returns true if the model of a participant has been loaded.
    pub fn is_cached(&self, kind: ParticipantKind, uri: &Uri) -> bool {
        match kind {
            ParticipantKind::Object => self.obj_models.contains_key(uri),
            ParticipantKind::Agent => self.agn_models.contains_key(uri),
            ParticipantKind::Workspace => self.ws_models.contains_key(uri),
        }
    }

    fn load_model<G: GraphStore + ?Sized>(
        &mut self,
        kind: ParticipantKind,
        graph: &G,
        uri: &Uri,
    ) -> Result<&EntityModel, ModelError> {
        self.check_member(kind, uri)?;

        let (loader, cache) = match kind {
            ParticipantKind::Object => (&self.obj_model_loader, &mut self.obj_models),
            ParticipantKind::Agent => (&self.agn_model_loader, &mut self.agn_models),
            ParticipantKind::Workspace => (&self.ws_model_loader, &mut self.ws_models),
        };

        if !cache.contains_key(uri) {
            let model = loader.load_entity(graph, uri)?;
            cache.insert(uri.clone(), model);
        }
        Ok(&cache[uri])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uris::*;
    use bdd_env::{MemoryGraph, Triple, RDF_TYPE};

    fn scene_graph() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        let scene = "https://e.org/scene";
        g.insert(Triple::new(scene, URI_BDD_PRED_HAS_OBJ, Term::Iri(Uri::new("https://e.org/cube1"))));
        g.insert(Triple::new(scene, URI_BDD_PRED_HAS_AGN, Term::Iri(Uri::new("https://e.org/robot1"))));
        g.insert(Triple::new(scene, URI_BDD_PRED_HAS_WS, Term::Iri(Uri::new("https://e.org/tableA"))));
        g.insert(Triple::new(
            "https://e.org/cube1",
            URI_MODEL_PRED_HAS_MODEL,
            Term::Iri(Uri::new("https://e.org/cube1-path")),
        ));
        g.insert(Triple::new(
            "https://e.org/cube1-path",
            RDF_TYPE,
            Term::Iri(Uri::new(URI_SIM_TYPE_RES_PATH)),
        ));
        g
    }

    #[test]
    fn test_scene_from_graph() {
        let g = scene_graph();
        let scene = SceneModel::from_graph(&g, &Uri::new("https://e.org/scene")).unwrap();

        assert_eq!(scene.objects().len(), 1);
        assert_eq!(scene.agents().len(), 1);
        assert_eq!(scene.workspaces().len(), 1);
        assert!(scene.objects().contains("https://e.org/cube1"));
    }

    #[test]
    fn test_partial_scene_is_legal() {
        let g = MemoryGraph::new();
        let scene = SceneModel::from_graph(&g, &Uri::new("https://e.org/empty")).unwrap();
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn test_load_obj_model_is_memoized() {
        let mut g = scene_graph();
        let mut scene = SceneModel::from_graph(&g, &Uri::new("https://e.org/scene")).unwrap();
        let cube = Uri::new("https://e.org/cube1");

        assert!(!scene.is_cached(ParticipantKind::Object, &cube));
        let first_types = scene.load_obj_model(&g, &cube).unwrap().model_types().len();
        assert_eq!(first_types, 1);
        assert!(scene.is_cached(ParticipantKind::Object, &cube));

        // A second model added to the graph afterwards is not seen: the
        // cached entity is returned unchanged.
        g.insert(Triple::new(
            "https://e.org/cube1",
            URI_MODEL_PRED_HAS_MODEL,
            Term::Iri(Uri::new("https://e.org/cube1-py")),
        ));
        g.insert(Triple::new(
            "https://e.org/cube1-py",
            RDF_TYPE,
            Term::Iri(Uri::new(URI_PY_TYPE_MODULE_ATTR)),
        ));
        let again = scene.load_obj_model(&g, &cube).unwrap();
        assert_eq!(again.model_types().len(), 1);
    }

    #[test]
    fn test_unknown_participant_fails() {
        let g = scene_graph();
        let mut scene = SceneModel::from_graph(&g, &Uri::new("https://e.org/scene")).unwrap();

        let err = scene
            .load_agn_model(&g, &Uri::new("https://e.org/cube1"))
            .unwrap_err();
        match err {
            ModelError::UnknownParticipant { kind, uri, scene } => {
                assert_eq!(kind, ParticipantKind::Agent);
                assert_eq!(uri.as_str(), "https://e.org/cube1");
                assert_eq!(scene.as_str(), "https://e.org/scene");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_literal_member_is_malformed() {
        let mut g = MemoryGraph::new();
        g.insert(Triple::new("https://e.org/scene", URI_BDD_PRED_HAS_OBJ, Term::literal("cube")));
        assert!(matches!(
            SceneModel::from_graph(&g, &Uri::new("https://e.org/scene")),
            Err(ModelError::MalformedSpec { .. })
        ));
    }
}
