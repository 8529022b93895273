//! Test-harness lifecycle hooks and step implementations.
//!
//! A BDD runner drives one [`Environment`] per process and one
//! [`ScenarioContext`] per scenario. Every hook takes the state it needs
//! explicitly; nothing is shared between scenarios.

use crate::behaviour::{run_behaviour, BehaviourRequest};
use crate::config::SimConfig;
use crate::error::StepError;
use crate::execution::{BehaviourModel, ExecutionModel};
use crate::registry::BehaviourRegistry;
use bdd_core::uris::{
    URI_PY_PRED_ATTR_NAME, URI_PY_PRED_MODULE_NAME, URI_PY_TYPE_MODULE_ATTR, URI_SIM_PRED_PATH,
    URI_SIM_TYPE_RES_PATH,
};
use bdd_core::{
    parse_scenario_name, parse_str_param, AttributeLoader, ConfigLoader, EntityModel,
    ParticipantKind, PathLoader, SceneLoaders, ScenarioVariantModel, UserStoryLoader,
};
use bdd_env::{ExecContext, GraphStore, MemoryGraph, Uri};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const PARAM_AGN: &str = "agn";
pub const PARAM_OBJ: &str = "obj";
pub const PARAM_WS: &str = "ws";
pub const PARAM_EVT: &str = "evt";
pub const PARAM_PICK_WS: &str = "pick_ws";
pub const PARAM_PLACE_WS: &str = "place_ws";

/// Tabular step argument: a heading row plus rows of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headings: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headings: headings.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Single-column table, one value per row.
    pub fn column<I, S>(heading: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new([heading]);
        for value in values {
            table.rows.push(vec![value.into()]);
        }
        table
    }

    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// First cell of every row; rows without cells fail.
    pub fn first_cells(&self) -> Result<Vec<&str>, StepError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.first()
                    .map(String::as_str)
                    .ok_or_else(|| StepError::assertion(format!("table row {} is empty", i + 1)))
            })
            .collect()
    }
}

/// Named string parameters of a step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepParams {
    values: BTreeMap<String, String>,
}

impl StepParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns a parameter or fails naming it.
    pub fn require(&self, name: &str) -> Result<&str, StepError> {
        self.get(name)
            .ok_or_else(|| StepError::MissingParameter(name.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StepParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Process-wide state installed once before any scenario.
#[derive(Debug)]
pub struct Environment {
    pub graph: MemoryGraph,
    pub us_loader: UserStoryLoader,
    pub execution: ExecutionModel,
    pub scene_loaders: SceneLoaders,
}

/// State of one scenario execution.
#[derive(Debug)]
pub struct ScenarioContext {
    /// Unique id of this execution
    pub run_id: Uuid,

    /// Name the runner gave the scenario
    pub scenario_name: String,

    /// The resolved variant, owning the scene and its model caches
    pub variant: ScenarioVariantModel,

    /// Behaviour binding, created by the first behaviour step
    pub behaviour: Option<BehaviourModel>,
}

/// Installs the graph, the user story index and the loaders.
pub fn before_all(graph: MemoryGraph, config: &SimConfig) -> Result<Environment, StepError> {
    let registry = BehaviourRegistry::from_keys(&config.behaviours)?;
    let mut execution = ExecutionModel::new(Arc::new(registry))
        .with_max_count(config.max_count)
        .with_step_delay(config.step_delay());
    if let Some(key) = &config.default_behaviour {
        execution = execution.with_default_behaviour(key.clone());
    }

    // Module attributes of scene participants are asserted by the given
    // steps; only behaviour keys are checked against the registry.
    let scene_loaders = SceneLoaders {
        objects: vec![
            Arc::new(PathLoader::new(config.base_dir.clone())) as Arc<dyn AttributeLoader>,
            Arc::new(ConfigLoader),
        ],
        agents: Vec::new(),
        workspaces: Vec::new(),
    };

    let us_loader = UserStoryLoader::new(&graph)?;
    info!(
        "environment ready: {} triples, {} user stories",
        graph.len(),
        us_loader.user_stories().count()
    );

    Ok(Environment {
        graph,
        us_loader,
        execution,
        scene_loaders,
    })
}

/// Resolves the scenario variant named by the runner's scenario name.
pub fn before_scenario(env: &Environment, scenario_name: &str) -> Result<ScenarioContext, StepError> {
    let variant_id = parse_scenario_name(scenario_name, env.graph.namespaces())?;
    let variant = env
        .us_loader
        .load_scenario_variant(&env.graph, &variant_id, &env.scene_loaders)?;

    let run_id = Uuid::new_v4();
    info!("scenario '{}' -> variant '{}' (run {})", scenario_name, variant_id, run_id);

    Ok(ScenarioContext {
        run_id,
        scenario_name: scenario_name.to_string(),
        variant,
        behaviour: None,
    })
}

/// Loads every object listed in the table and checks its models.
pub fn given_objects(env: &Environment, ctx: &mut ScenarioContext, table: &Table) -> Result<(), StepError> {
    for uri in table_uris(env, table)? {
        let obj_model = ctx.variant.scene.load_obj_model(&env.graph, &uri)?;
        check_module_attrs(obj_model, ParticipantKind::Object)?;

        if obj_model.has_model_type(URI_SIM_TYPE_RES_PATH) {
            let path_model = obj_model.load_first_model_by_type(URI_SIM_TYPE_RES_PATH)?;
            if !path_model.has_attr(URI_SIM_PRED_PATH) {
                return Err(StepError::assertion(format!(
                    "ResourceWithPath model '{}' for object '{}' missing attr path",
                    path_model.id(),
                    obj_model.id()
                )));
            }
        }
    }
    Ok(())
}

/// Loads every agent listed in the table and checks its models.
pub fn given_agents(env: &Environment, ctx: &mut ScenarioContext, table: &Table) -> Result<(), StepError> {
    for uri in table_uris(env, table)? {
        let agn_model = ctx.variant.scene.load_agn_model(&env.graph, &uri)?;
        check_module_attrs(agn_model, ParticipantKind::Agent)?;
    }
    Ok(())
}

/// Checks an "object is located at workspace" assertion.
///
/// Requires `obj`, `ws` and `evt`; objects must load, workspaces must
/// belong to the scene and the event must name a URI.
pub fn is_located_at(env: &Environment, ctx: &mut ScenarioContext, params: &StepParams) -> Result<(), StepError> {
    let ns = env.graph.namespaces();
    let obj_str = params.require(PARAM_OBJ)?;
    let ws_str = params.require(PARAM_WS)?;
    let evt_str = params.require(PARAM_EVT)?;

    for obj_uri in parse_str_param(obj_str, ns)?.uris() {
        let obj_model = ctx.variant.scene.load_obj_model(&env.graph, obj_uri)?;
        if obj_model.has_model_type(URI_PY_TYPE_MODULE_ATTR) {
            let py_model = obj_model.load_first_model_by_type(URI_PY_TYPE_MODULE_ATTR)?;
            check_py_model(py_model, obj_model, ParticipantKind::Object)?;
        }
    }

    for ws_uri in parse_str_param(ws_str, ns)?.uris() {
        ctx.variant.scene.check_member(ParticipantKind::Workspace, ws_uri)?;
    }

    let evt = ns.expand_curie(evt_str)?;
    debug!("'{}' located at '{}' at event '{}'", obj_str, ws_str, evt);
    Ok(())
}

/// Binds (or reuses) the scenario's behaviour and runs it to completion.
///
/// # Returns
/// The number of behaviour steps taken.
pub fn execute_behaviour(
    env: &Environment,
    ctx: &mut ScenarioContext,
    params: &StepParams,
    exec_ctx: &mut dyn ExecContext,
) -> Result<usize, StepError> {
    let request = BehaviourRequest::new(
        params.require(PARAM_AGN)?,
        params.require(PARAM_OBJ)?,
        params.require(PARAM_PICK_WS)?,
        params.require(PARAM_PLACE_WS)?,
    );

    let binding = env.execution.load_behaviour_impl(
        &mut ctx.behaviour,
        &env.graph,
        &ctx.variant,
        &request,
        env.graph.namespaces(),
    )?;
    let steps = run_behaviour(binding.behaviour.as_mut(), exec_ctx)?;
    info!("behaviour '{}' ran {} steps in scenario '{}'", binding.key, steps, ctx.scenario_name);
    Ok(steps)
}

/// Expands the participant references of a table's rows, in order.
fn table_uris(env: &Environment, table: &Table) -> Result<Vec<Uri>, StepError> {
    let mut uris = Vec::new();
    for cell in table.first_cells()? {
        for uri in parse_str_param(cell, env.graph.namespaces())?.uris() {
            if !uris.contains(uri) {
                uris.push(uri.clone());
            }
        }
    }
    Ok(uris)
}

fn check_module_attrs(entity: &EntityModel, kind: ParticipantKind) -> Result<(), StepError> {
    for py_model in entity.models_by_type(URI_PY_TYPE_MODULE_ATTR) {
        check_py_model(py_model, entity, kind)?;
    }
    Ok(())
}

fn check_py_model(
    py_model: &bdd_core::AttributeModel,
    entity: &EntityModel,
    kind: ParticipantKind,
) -> Result<(), StepError> {
    for (predicate, what) in [
        (URI_PY_PRED_MODULE_NAME, "module name"),
        (URI_PY_PRED_ATTR_NAME, "attribute name"),
    ] {
        if !py_model.has_attr(predicate) {
            return Err(StepError::assertion(format!(
                "Python attribute model '{}' for {} '{}' missing {}",
                py_model.id(),
                kind,
                entity.id(),
                what
            )));
        }
    }
    Ok(())
}
