//! Serializable template data: one record per user story.
//!
//! Feature-file generators consume this data; the records only carry
//! compact names so they stay readable in the generated files.

use crate::error::ModelError;
use crate::scene::SceneModel;
use crate::uris::{URI_BDD_PRED_HAS_SCENE, URI_BDD_PRED_OF_TMPL};
use crate::user_story::UserStoryLoader;
use bdd_env::{GraphStore, NamespaceManager, Term, Uri};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Template data of one scenario variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioData {
    pub name: String,
    pub template: Option<String>,
    pub scene: String,
    pub objects: Vec<String>,
    pub agents: Vec<String>,
    pub workspaces: Vec<String>,
}

/// Template data of one user story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStoryData {
    /// Compact user story name, also the output filename stem
    pub name: String,

    /// One entry per scenario variant, in declaration order
    pub criteria: Vec<ScenarioData>,
}

/// Collects template data for every user story of the graph.
///
/// Only variants with a scene are listed; scene completeness is not
/// checked here.
pub fn prepare_template_data<G: GraphStore + ?Sized>(
    us_loader: &UserStoryLoader,
    graph: &G,
) -> Result<Vec<UserStoryData>, ModelError> {
    let ns = graph.namespaces();
    let mut stories = Vec::new();

    for us in us_loader.user_stories() {
        let mut criteria = Vec::new();
        for variant in us_loader.scenario_variants(us) {
            let Some(scene_id) = first_iri(graph, variant, URI_BDD_PRED_HAS_SCENE) else {
                debug!("skipping variant '{}' without scene", variant);
                continue;
            };
            let scene = SceneModel::from_graph(graph, &scene_id)?;
            criteria.push(ScenarioData {
                name: ns.compact(variant),
                template: first_iri(graph, variant, URI_BDD_PRED_OF_TMPL).map(|t| ns.compact(&t)),
                scene: ns.compact(&scene_id),
                objects: compact_all(ns, scene.objects()),
                agents: compact_all(ns, scene.agents()),
                workspaces: compact_all(ns, scene.workspaces()),
            });
        }
        stories.push(UserStoryData {
            name: ns.compact(us),
            criteria,
        });
    }

    Ok(stories)
}

fn first_iri<G: GraphStore + ?Sized>(graph: &G, subject: &Uri, predicate: &str) -> Option<Uri> {
    graph
        .objects(subject, predicate)
        .into_iter()
        .find_map(Term::as_iri)
        .cloned()
}

fn compact_all(ns: &NamespaceManager, uris: &BTreeSet<Uri>) -> Vec<String> {
    uris.iter().map(|uri| ns.compact(uri)).collect()
}

/// Turns a name into a safe filename.
///
/// Strips surrounding whitespace, maps inner spaces to `_` and drops every
/// character other than ASCII alphanumerics, `-`, `_` and `.`.
pub fn valid_filename(name: &str) -> Result<String, ModelError> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(ModelError::invalid_param(
            name,
            format!("could not derive a valid filename from '{}'", name),
        ));
    }
    Ok(cleaned)
}
