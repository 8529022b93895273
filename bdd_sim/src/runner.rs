//! Scenario runner - executes every scenario variant through the hooks.

use crate::config::SimConfig;
use crate::context::SimClock;
use crate::error::StepError;
use crate::hooks::{
    before_scenario, execute_behaviour, given_agents, given_objects, Environment, ScenarioContext, StepParams,
    Table, PARAM_AGN, PARAM_OBJ, PARAM_PICK_WS, PARAM_PLACE_WS,
};
use bdd_core::uris::default_namespaces;
use bdd_env::{
    DocumentFormat, EnvError, ExecContext, FileResolver, GraphStore, MemoryGraph, NamespaceManager, Uri,
    WallClockContext,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Loads every configured model document into one graph.
///
/// The built-in vocabulary prefixes are bound first, then the configured
/// ones, then whatever the documents declare.
pub fn load_model_graph(config: &SimConfig) -> Result<MemoryGraph, EnvError> {
    let mut graph = MemoryGraph::new();
    for (prefix, namespace) in default_namespaces().iter() {
        graph.namespaces_mut().bind(prefix, namespace);
    }
    for (prefix, namespace) in &config.namespaces {
        graph.namespaces_mut().bind(prefix.clone(), namespace.clone());
    }

    let mut resolver = FileResolver::new();
    if let Some(mirror) = &config.mirror_dir {
        resolver = resolver.with_mirror(mirror.clone());
    }

    for source in &config.models {
        let format = match source.format {
            Some(format) => format,
            None => DocumentFormat::guess(&source.url)
                .ok_or_else(|| EnvError::UnsupportedFormat(source.url.clone()))?,
        };
        let added = graph.load(&resolver, &source.url, format)?;
        info!("loaded '{}' ({}): {} triples", source.url, format, added);
    }
    Ok(graph)
}

/// Results from running a scenario variant.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario name given to the hooks
    pub scenario: String,

    /// Resolved variant, if resolution got that far
    pub variant: Option<Uri>,

    /// Run id of the scenario context
    pub run_id: Option<Uuid>,

    /// Whether every step passed
    pub passed: bool,

    /// Behaviour steps executed
    pub steps: usize,

    /// Time spent in the behaviour (virtual or wall clock)
    pub elapsed: Duration,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Runs scenario variants of an environment.
pub struct ScenarioRunner<'a> {
    env: &'a Environment,

    /// Use a virtual clock instead of sleeping
    virtual_time: bool,
}

impl<'a> ScenarioRunner<'a> {
    /// Creates a runner using the wall clock.
    pub fn new(env: &'a Environment) -> Self {
        Self {
            env,
            virtual_time: false,
        }
    }

    /// Switches between virtual and wall-clock time.
    pub fn with_virtual_time(mut self, virtual_time: bool) -> Self {
        self.virtual_time = virtual_time;
        self
    }

    /// Compact names of every variant, grouped by user story.
    pub fn scenario_names(&self) -> Vec<String> {
        let ns = self.env.graph.namespaces();
        self.env
            .us_loader
            .all_variants()
            .map(|(_, variant)| ns.compact(variant))
            .collect()
    }

    /// Runs every variant; a failing scenario does not stop the others.
    pub fn run_all(&self) -> Vec<ScenarioResult> {
        self.scenario_names()
            .iter()
            .map(|name| self.run(name))
            .collect()
    }

    /// Runs one scenario and returns the result.
    pub fn run(&self, scenario_name: &str) -> ScenarioResult {
        info!("Starting scenario: {}", scenario_name);

        let mut exec_ctx: Box<dyn ExecContext> = if self.virtual_time {
            Box::new(SimClock::echoing())
        } else {
            Box::new(WallClockContext::new())
        };

        let mut result = ScenarioResult {
            scenario: scenario_name.to_string(),
            variant: None,
            run_id: None,
            passed: false,
            steps: 0,
            elapsed: Duration::ZERO,
            failure_reason: None,
        };

        let mut ctx = match before_scenario(self.env, scenario_name) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("scenario '{}' failed to resolve: {}", scenario_name, e);
                result.failure_reason = Some(e.to_string());
                return result;
            }
        };
        result.variant = Some(ctx.variant.id.clone());
        result.run_id = Some(ctx.run_id);

        let started = exec_ctx.now();
        match self.run_steps(&mut ctx, exec_ctx.as_mut()) {
            Ok(steps) => {
                result.passed = true;
                result.steps = steps;
            }
            Err(e) => {
                warn!("scenario '{}' failed: {}", scenario_name, e);
                result.failure_reason = Some(e.to_string());
            }
        }
        result.elapsed = exec_ctx.now().saturating_sub(started);
        debug!("scenario '{}' took {:?}", scenario_name, result.elapsed);
        result
    }

    /// given objects → given agents → execute behaviour, from the scene.
    fn run_steps(&self, ctx: &mut ScenarioContext, exec_ctx: &mut dyn ExecContext) -> Result<usize, StepError> {
        let ns = self.env.graph.namespaces();
        let scene = &ctx.variant.scene;

        let objects = compact_names(ns, scene.objects());
        let agents = compact_names(ns, scene.agents());
        let workspaces = compact_names(ns, scene.workspaces());

        // First workspace is the pick location, the rest are place
        // alternatives; a single workspace is both.
        let (pick_ws, place_ws) = match workspaces.split_first() {
            Some((first, [])) => (first.clone(), first.clone()),
            Some((first, rest)) => (first.clone(), rest.join(" or ")),
            None => return Err(StepError::assertion("scene has no workspace")),
        };
        let params = StepParams::new()
            .with(PARAM_AGN, agents.join(" or "))
            .with(PARAM_OBJ, objects.join(" or "))
            .with(PARAM_PICK_WS, pick_ws)
            .with(PARAM_PLACE_WS, place_ws);

        given_objects(self.env, ctx, &Table::column(PARAM_OBJ, objects))?;
        given_agents(self.env, ctx, &Table::column(PARAM_AGN, agents))?;
        execute_behaviour(self.env, ctx, &params, exec_ctx)
    }
}

fn compact_names(ns: &NamespaceManager, uris: &BTreeSet<Uri>) -> Vec<String> {
    uris.iter().map(|uri| ns.compact(uri)).collect()
}
