//! BDD Core - Scenario Model Resolution
//!
//! Resolves behaviour-driven robotic test scenarios from a knowledge graph:
//! 1. **Entity models**: attribute models grouped by type, interpreted by
//!    type-directed attribute loaders
//! 2. **Scenes**: objects, agents and workspaces of a scenario, with
//!    lazily loaded and cached entity models
//! 3. **Scenario variants**: user stories indexed into validated variants
//!    ready for execution

pub mod attributes;
pub mod entity;
pub mod error;
pub mod loaders;
pub mod params;
pub mod scene;
pub mod template;
pub mod uris;
pub mod user_story;

// Re-export key types for convenience
pub use attributes::{
    AttrLoaderRegistry, AttributeLoader, AttributeModel, CallableKey, CallableLookup, LoadedAttribute,
};
pub use entity::{EntityModel, ModelLoader};
pub use error::{ModelError, ParticipantKind};
pub use loaders::{ConfigLoader, ModuleAttrLoader, PathLoader};
pub use params::{parse_str_param, ParamKind, ParticipantSet};
pub use scene::SceneModel;
pub use template::{prepare_template_data, valid_filename, ScenarioData, UserStoryData};
pub use user_story::{
    parse_scenario_name, scenario_variant_name, SceneLoaders, ScenarioVariantModel, UserStoryLoader,
};
