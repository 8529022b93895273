//! User stories and scenario variant resolution.

use crate::attributes::AttributeLoader;
use crate::error::{ModelError, ParticipantKind};
use crate::scene::SceneModel;
use crate::uris::{
    URI_BDD_PRED_HAS_AC, URI_BDD_PRED_HAS_BHV, URI_BDD_PRED_HAS_SCENE, URI_BDD_PRED_OF_TMPL,
    URI_BDD_TYPE_US,
};
use bdd_env::{GraphStore, NamespaceManager, Term, Uri, RDF_TYPE};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Separator between outline name and examples in generated scenario names.
pub const SCENARIO_NAME_SEPARATOR: &str = " -- ";

/// Attribute loaders wired onto a scene's model loaders per execution context.
#[derive(Debug, Clone, Default)]
pub struct SceneLoaders {
    pub objects: Vec<Arc<dyn AttributeLoader>>,
    pub agents: Vec<Arc<dyn AttributeLoader>>,
    pub workspaces: Vec<Arc<dyn AttributeLoader>>,
}

/// One concrete, resolved parameterization of a scenario template.
#[derive(Debug, Clone)]
pub struct ScenarioVariantModel {
    /// Variant URI
    pub id: Uri,

    /// Scenario template the variant instantiates, if declared
    pub template: Option<Uri>,

    /// Behaviour entity the variant executes, if declared
    pub behaviour: Option<Uri>,

    /// The variant's scene
    pub scene: SceneModel,
}

/// Index of user stories and their scenario variants.
#[derive(Debug, Clone, Default)]
pub struct UserStoryLoader {
    stories: BTreeMap<Uri, Vec<Uri>>,
}

impl UserStoryLoader {
    /// Indexes every `bdd:UserStory` of the graph with its `bdd:has-criteria`.
    pub fn new<G: GraphStore + ?Sized>(graph: &G) -> Result<Self, ModelError> {
        let us_type = Term::Iri(Uri::new(URI_BDD_TYPE_US));
        let mut stories = BTreeMap::new();

        for us in graph.subjects(RDF_TYPE, &us_type) {
            let variants = graph
                .objects(us, URI_BDD_PRED_HAS_AC)
                .into_iter()
                .map(|term| {
                    term.as_iri().cloned().ok_or_else(|| {
                        ModelError::malformed(us, format!("criteria '{}' is not a URI", term.lexical()))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            debug!("user story '{}': {} scenario variants", us, variants.len());
            stories.insert(us.clone(), variants);
        }

        info!("indexed {} user stories", stories.len());
        Ok(Self { stories })
    }

    /// Iterates over user story URIs in sorted order.
    pub fn user_stories(&self) -> impl Iterator<Item = &Uri> {
        self.stories.keys()
    }

    /// Scenario variants of a user story, in document order.
    pub fn scenario_variants(&self, us_id: &Uri) -> &[Uri] {
        self.stories.get(us_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every (user story, variant) pair.
    pub fn all_variants(&self) -> impl Iterator<Item = (&Uri, &Uri)> {
        self.stories
            .iter()
            .flat_map(|(us, variants)| variants.iter().map(move |v| (us, v)))
    }

    /// Resolves a scenario variant and validates its scene.
    ///
    /// # Steps
    /// 1. Resolve the variant's single `bdd:has-scene`
    /// 2. Require at least one object, workspace and agent
    /// 3. Register `loaders` on the scene's model loaders
    ///
    /// # Errors
    /// * `MalformedSpec` - no scene, several scenes, or non-URI references
    /// * `IncompleteScene` - a participant category is empty
    pub fn load_scenario_variant<G: GraphStore + ?Sized>(
        &self,
        full_graph: &G,
        variant_id: &Uri,
        loaders: &SceneLoaders,
    ) -> Result<ScenarioVariantModel, ModelError> {
        let scene_id = single_iri(full_graph, variant_id, URI_BDD_PRED_HAS_SCENE)?
            .ok_or_else(|| ModelError::malformed(variant_id, "scenario variant has no scene"))?;
        let template = single_iri(full_graph, variant_id, URI_BDD_PRED_OF_TMPL)?;
        let behaviour = single_iri(full_graph, variant_id, URI_BDD_PRED_HAS_BHV)?;

        let mut scene = SceneModel::from_graph(full_graph, &scene_id)?;

        for kind in [ParticipantKind::Object, ParticipantKind::Workspace, ParticipantKind::Agent] {
            if scene.members(kind).is_empty() {
                return Err(ModelError::IncompleteScene {
                    scene: scene_id,
                    missing: kind,
                });
            }
        }

        scene.obj_model_loader.register_attr_loaders(loaders.objects.iter().cloned());
        scene.agn_model_loader.register_attr_loaders(loaders.agents.iter().cloned());
        scene.ws_model_loader.register_attr_loaders(loaders.workspaces.iter().cloned());

        info!(
            "resolved scenario variant '{}' (scene '{}': {} objects, {} agents, {} workspaces)",
            variant_id,
            scene_id,
            scene.objects().len(),
            scene.agents().len(),
            scene.workspaces().len()
        );

        Ok(ScenarioVariantModel {
            id: variant_id.clone(),
            template,
            behaviour,
            scene,
        })
    }
}

/// Reads an optional single URI-valued edge; several values are malformed.
fn single_iri<G: GraphStore + ?Sized>(graph: &G, subject: &Uri, predicate: &str) -> Result<Option<Uri>, ModelError> {
    let values = graph.objects(subject, predicate);
    match values.as_slice() {
        [] => Ok(None),
        [Term::Iri(uri)] => Ok(Some(uri.clone())),
        [Term::Literal(lit)] => Err(ModelError::malformed(
            subject,
            format!("'{}' value '{}' is not a URI", predicate, lit.value),
        )),
        _ => Err(ModelError::malformed(
            subject,
            format!("expected one '{}' value, found {}", predicate, values.len()),
        )),
    }
}

/// Extracts the variant's compact name from a generated scenario name.
///
/// Outline scenarios are named `"{outline-name} -- {examples-name}@{row-id}"`;
/// only the part before the separator names the variant. Names without the
/// separator are returned whole.
pub fn scenario_variant_name(scenario_name: &str) -> &str {
    scenario_name
        .split(SCENARIO_NAME_SEPARATOR)
        .next()
        .unwrap_or(scenario_name)
        .trim()
}

/// Parses a test-runner scenario name into the variant URI.
pub fn parse_scenario_name(scenario_name: &str, ns: &NamespaceManager) -> Result<Uri, ModelError> {
    let compact = scenario_variant_name(scenario_name);
    ns.expand_curie(compact).map_err(|e| {
        ModelError::invalid_param(scenario_name, format!("can't parse '{}' as URI: {}", compact, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::ModuleAttrLoader;
    use crate::uris::*;
    use bdd_env::{MemoryGraph, Triple};

    const EX: &str = "https://example.org/";

    fn ex(local: &str) -> Uri {
        Uri::new(format!("{}{}", EX, local))
    }

    fn link(g: &mut MemoryGraph, s: &str, p: &str, o: &str) {
        g.insert(Triple::new(ex(s), p, Term::Iri(ex(o))));
    }

    fn story_graph(with_objects: bool, with_agents: bool, with_workspaces: bool) -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.insert(Triple::new(ex("us1"), RDF_TYPE, Term::Iri(Uri::new(URI_BDD_TYPE_US))));
        link(&mut g, "us1", URI_BDD_PRED_HAS_AC, "variant1");
        link(&mut g, "variant1", URI_BDD_PRED_HAS_SCENE, "scene1");
        link(&mut g, "variant1", URI_BDD_PRED_OF_TMPL, "pickplace-tmpl");
        if with_objects {
            link(&mut g, "scene1", URI_BDD_PRED_HAS_OBJ, "cube1");
        }
        if with_agents {
            link(&mut g, "scene1", URI_BDD_PRED_HAS_AGN, "robot1");
        }
        if with_workspaces {
            link(&mut g, "scene1", URI_BDD_PRED_HAS_WS, "tableA");
        }
        g.namespaces_mut().bind("ex", EX);
        g
    }

    #[test]
    fn test_user_story_index() {
        let g = story_graph(true, true, true);
        let loader = UserStoryLoader::new(&g).unwrap();

        assert_eq!(loader.user_stories().count(), 1);
        assert_eq!(loader.scenario_variants(&ex("us1")), &[ex("variant1")]);
        assert_eq!(loader.all_variants().count(), 1);
    }

    #[test]
    fn test_load_complete_variant() {
        let g = story_graph(true, true, true);
        let loader = UserStoryLoader::new(&g).unwrap();
        let loaders = SceneLoaders {
            agents: vec![Arc::new(ModuleAttrLoader::new()) as Arc<dyn AttributeLoader>],
            ..Default::default()
        };

        let variant = loader.load_scenario_variant(&g, &ex("variant1"), &loaders).unwrap();
        assert_eq!(variant.scene.id(), &ex("scene1"));
        assert_eq!(variant.template, Some(ex("pickplace-tmpl")));
        assert_eq!(variant.behaviour, None);
        assert_eq!(variant.scene.agn_model_loader.registry().len(), 1);
        assert!(variant.scene.obj_model_loader.registry().is_empty());
    }

    #[test]
    fn test_incomplete_scene_fails() {
        for (objects, agents, workspaces, missing) in [
            (false, true, true, ParticipantKind::Object),
            (true, false, true, ParticipantKind::Agent),
            (true, true, false, ParticipantKind::Workspace),
        ] {
            let g = story_graph(objects, agents, workspaces);
            let loader = UserStoryLoader::new(&g).unwrap();
            let err = loader
                .load_scenario_variant(&g, &ex("variant1"), &SceneLoaders::default())
                .unwrap_err();
            match err {
                ModelError::IncompleteScene { scene, missing: m } => {
                    assert_eq!(scene, ex("scene1"));
                    assert_eq!(m, missing);
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_variant_without_scene_fails() {
        let g = story_graph(true, true, true);
        let loader = UserStoryLoader::new(&g).unwrap();
        let err = loader
            .load_scenario_variant(&g, &ex("us1"), &SceneLoaders::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::MalformedSpec { .. }));
    }

    #[test]
    fn test_scenario_name_split() {
        assert_eq!(scenario_variant_name("outline -- examples@3"), "outline");
        assert_eq!(scenario_variant_name("ex:variant1 -- sorting@1.2"), "ex:variant1");
        assert_eq!(scenario_variant_name("ex:variant1"), "ex:variant1");
    }

    #[test]
    fn test_parse_scenario_name() {
        let g = story_graph(true, true, true);
        let ns = g.namespaces();

        assert_eq!(parse_scenario_name("ex:variant1 -- table@1", ns).unwrap(), ex("variant1"));
        assert_eq!(parse_scenario_name("ex:variant1", ns).unwrap(), ex("variant1"));
        assert!(parse_scenario_name("unknown:variant1 -- table@1", ns).is_err());
        assert!(parse_scenario_name("no compact name -- table@1", ns).is_err());
    }
}
