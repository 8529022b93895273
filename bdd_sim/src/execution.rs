//! Execution model: binds scenario variants to behaviour implementations.

use crate::behaviour::{Behaviour, BehaviourRequest};
use crate::error::ExecError;
use crate::registry::BehaviourRegistry;
use bdd_core::uris::URI_PY_TYPE_MODULE_ATTR;
use bdd_core::{
    AttributeLoader, CallableKey, CallableLookup, ModelLoader, ModuleAttrLoader, ScenarioVariantModel,
};
use bdd_env::{GraphStore, NamespaceManager};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A behaviour bound to one scenario, with the request that built it.
#[derive(Debug)]
pub struct BehaviourModel {
    /// Key the implementation was resolved from
    pub key: CallableKey,

    /// Parameters of the first binding request
    pub request: BehaviourRequest,

    /// The behaviour instance
    pub behaviour: Box<dyn Behaviour>,
}

/// Resolves and instantiates behaviours for scenario variants.
#[derive(Debug, Clone)]
pub struct ExecutionModel {
    registry: Arc<BehaviourRegistry>,

    /// Key used when a variant declares no implementation
    default_key: Option<CallableKey>,

    max_count: Option<u32>,
    step_delay: Option<Duration>,
}

impl ExecutionModel {
    /// Creates an execution model over a behaviour registry.
    pub fn new(registry: Arc<BehaviourRegistry>) -> Self {
        Self {
            registry,
            default_key: None,
            max_count: None,
            step_delay: None,
        }
    }

    /// Sets the fallback behaviour key.
    pub fn with_default_behaviour(mut self, key: CallableKey) -> Self {
        self.default_key = Some(key);
        self
    }

    /// Sets the step count applied to requests that don't carry one.
    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Sets the step delay applied to requests that don't carry one.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    pub fn registry(&self) -> &Arc<BehaviourRegistry> {
        &self.registry
    }

    /// Module-attribute loader that checks keys against the registry.
    pub fn module_attr_loader(&self) -> Arc<dyn AttributeLoader> {
        let lookup: Arc<dyn CallableLookup> = self.registry.clone();
        Arc::new(ModuleAttrLoader::with_lookup(lookup))
    }

    /// Resolves the behaviour key of a scenario variant.
    ///
    /// The variant's behaviour entity wins when it carries a
    /// `py:ModuleAttribute` model; otherwise the default key is used.
    pub fn behaviour_key<G: GraphStore + ?Sized>(
        &self,
        graph: &G,
        variant: &ScenarioVariantModel,
    ) -> Result<CallableKey, ExecError> {
        if let Some(bhv_id) = &variant.behaviour {
            let mut loader = ModelLoader::new();
            loader.register_attr_loaders([self.module_attr_loader()]);
            let entity = loader.load_entity(graph, bhv_id)?;
            if entity.has_model_type(URI_PY_TYPE_MODULE_ATTR) {
                let py_model = entity.load_first_model_by_type(URI_PY_TYPE_MODULE_ATTR)?;
                return Ok(ModuleAttrLoader::key_of(py_model)?);
            }
        }

        self.default_key.clone().ok_or_else(|| ExecError::NoBehaviour {
            variant: variant.id.clone(),
        })
    }

    /// Returns the scenario's behaviour binding, creating it on first use.
    ///
    /// The first call resolves the key and builds the behaviour. Later
    /// calls for the same scenario return the stored binding unchanged,
    /// even when `request` names other participants; that case is logged.
    pub fn load_behaviour_impl<'a, G: GraphStore + ?Sized>(
        &self,
        slot: &'a mut Option<BehaviourModel>,
        graph: &G,
        variant: &ScenarioVariantModel,
        request: &BehaviourRequest,
        ns: &NamespaceManager,
    ) -> Result<&'a mut BehaviourModel, ExecError> {
        let model = match slot.take() {
            Some(existing) => {
                if !existing.request.same_participants(request) {
                    warn!(
                        "scenario '{}' already bound '{}' with {:?}; ignoring new parameters {:?}",
                        variant.id, existing.key, existing.request, request
                    );
                }
                existing
            }
            None => self.bind(graph, variant, request, ns)?,
        };
        Ok(slot.insert(model))
    }

    fn bind<G: GraphStore + ?Sized>(
        &self,
        graph: &G,
        variant: &ScenarioVariantModel,
        request: &BehaviourRequest,
        ns: &NamespaceManager,
    ) -> Result<BehaviourModel, ExecError> {
        let key = self.behaviour_key(graph, variant)?;

        let mut request = request.clone();
        if request.max_count.is_none() {
            request.max_count = self.max_count;
        }
        if request.step_delay.is_none() {
            request.step_delay = self.step_delay;
        }

        let behaviour = self.registry.build(&key, &request, ns)?;
        info!("bound behaviour '{}' to scenario '{}'", key, variant.id);

        Ok(BehaviourModel {
            key,
            request,
            behaviour,
        })
    }
}
