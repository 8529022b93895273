//! Vocabulary of the scenario model documents.
//!
//! All model documents share these namespaces; `default_namespaces` binds
//! their conventional prefixes so compact names in feature files expand
//! even before a document declaring them has been parsed.

use bdd_env::NamespaceManager;

/// Root of the published metamodels
pub const URL_SECORO_MM: &str = "https://secorolab.github.io/metamodels";

pub const NS_BDD: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#";
pub const NS_MODEL: &str = "https://secorolab.github.io/metamodels/models#";
pub const NS_ENV: &str = "https://secorolab.github.io/metamodels/environment#";
pub const NS_AGN: &str = "https://secorolab.github.io/metamodels/agent#";
pub const NS_PY: &str = "https://secorolab.github.io/metamodels/languages/python#";
pub const NS_SIM: &str = "https://secorolab.github.io/metamodels/simulation#";

// BDD: user stories, scenario variants, scenes
pub const URI_BDD_TYPE_US: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#UserStory";
pub const URI_BDD_PRED_HAS_AC: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#has-criteria";
pub const URI_BDD_TYPE_SCENARIO_VARIANT: &str =
    "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#ScenarioVariant";
pub const URI_BDD_PRED_HAS_SCENE: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#has-scene";
pub const URI_BDD_PRED_OF_TMPL: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#of-template";
pub const URI_BDD_PRED_HAS_BHV: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#has-behaviour";
pub const URI_BDD_TYPE_SCENE: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#Scene";
pub const URI_BDD_PRED_HAS_OBJ: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#has-object";
pub const URI_BDD_PRED_HAS_AGN: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#has-agent";
pub const URI_BDD_PRED_HAS_WS: &str = "https://secorolab.github.io/metamodels/acceptance-criteria/bdd#has-workspace";

// Entity → attribute model edges
pub const URI_MODEL_PRED_HAS_MODEL: &str = "https://secorolab.github.io/metamodels/models#has-model";

// Python module attributes
pub const URI_PY_TYPE_MODULE_ATTR: &str = "https://secorolab.github.io/metamodels/languages/python#ModuleAttribute";
pub const URI_PY_PRED_MODULE_NAME: &str = "https://secorolab.github.io/metamodels/languages/python#module-name";
pub const URI_PY_PRED_ATTR_NAME: &str = "https://secorolab.github.io/metamodels/languages/python#attribute-name";

// Simulation resources
pub const URI_SIM_TYPE_RES_PATH: &str = "https://secorolab.github.io/metamodels/simulation#ResourceWithPath";
pub const URI_SIM_PRED_PATH: &str = "https://secorolab.github.io/metamodels/simulation#path";
pub const URI_SIM_TYPE_RES_CONFIGS: &str = "https://secorolab.github.io/metamodels/simulation#ResourceWithConfigs";
pub const URI_SIM_PRED_CONFIGS: &str = "https://secorolab.github.io/metamodels/simulation#configs";

/// Returns a namespace mapping with the metamodel prefixes bound.
pub fn default_namespaces() -> NamespaceManager {
    let mut ns = NamespaceManager::new();
    ns.bind("bdd", NS_BDD);
    ns.bind("modl", NS_MODEL);
    ns.bind("env", NS_ENV);
    ns.bind("agn", NS_AGN);
    ns.bind("py", NS_PY);
    ns.bind("sim", NS_SIM);
    ns
}
