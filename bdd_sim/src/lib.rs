//! BDD Scenario Execution Harness
//!
//! Runs the expected behaviour of resolved scenario variants in-process.
//!
//! # Core Principle: Explicit Scenario State
//!
//! Nothing is shared implicitly between hooks:
//! - **Environment**: graph, user story index, loaders and the execution
//!   model, installed once by `before_all`
//! - **ScenarioContext**: the resolved variant with its model caches and the
//!   behaviour binding, created by `before_scenario` and dropped after
//! - **Time**: behaviours sleep and report through an `ExecContext`, either
//!   the wall clock or the virtual `SimClock`
//!
//! # Usage
//!
//! ```ignore
//! use bdd_sim::{before_all, load_model_graph, ScenarioRunner, SimConfig};
//!
//! let config = SimConfig::from_file("bdd-sim.json")?;
//! let env = before_all(load_model_graph(&config)?, &config)?;
//! for result in ScenarioRunner::new(&env).run_all() {
//!     println!("{}: {}", result.scenario, result.passed);
//! }
//! ```

mod behaviour;
mod config;
mod context;
mod error;
mod execution;
mod exporter;
pub mod hooks;
mod pickplace;
mod registry;
mod runner;

pub use behaviour::{run_behaviour, Behaviour, BehaviourFactory, BehaviourRequest, BehaviourState};
pub use config::{ModelSource, SimConfig};
pub use context::SimClock;
pub use error::{ConfigError, ExecError, ExportError, StepError};
pub use execution::{BehaviourModel, ExecutionModel};
pub use exporter::{export_template_data, TemplateExport};
pub use hooks::{before_all, before_scenario, Environment, ScenarioContext, StepParams, Table};
pub use pickplace::PickPlaceBehaviour;
pub use registry::{builtin_behaviours, default_behaviour_key, BehaviourRegistry};
pub use runner::{load_model_graph, ScenarioResult, ScenarioRunner};
