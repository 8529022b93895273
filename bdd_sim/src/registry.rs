//! Behaviour plugin registry keyed by (module, attribute).

use crate::behaviour::{Behaviour, BehaviourFactory, BehaviourRequest};
use crate::error::ExecError;
use crate::pickplace::{PickPlaceBehaviour, PICKPLACE_ATTRIBUTE, PICKPLACE_MODULE};
use bdd_core::{CallableKey, CallableLookup};
use bdd_env::NamespaceManager;
use std::collections::BTreeMap;
use tracing::debug;

/// Behaviours compiled into this crate.
pub fn builtin_behaviours() -> Vec<(CallableKey, BehaviourFactory)> {
    vec![(
        CallableKey::new(PICKPLACE_MODULE, PICKPLACE_ATTRIBUTE),
        PickPlaceBehaviour::build as BehaviourFactory,
    )]
}

/// Key of the default pick-and-place behaviour.
pub fn default_behaviour_key() -> CallableKey {
    CallableKey::new(PICKPLACE_MODULE, PICKPLACE_ATTRIBUTE)
}

/// Maps callable keys to behaviour factories.
#[derive(Debug, Clone, Default)]
pub struct BehaviourRegistry {
    factories: BTreeMap<CallableKey, BehaviourFactory>,
}

impl BehaviourRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in behaviour.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (key, factory) in builtin_behaviours() {
            registry.register(key, factory);
        }
        registry
    }

    /// Creates a registry from configured keys.
    ///
    /// # Errors
    /// * `UnknownBehaviour` - a key names no built-in behaviour
    pub fn from_keys<'a, I>(keys: I) -> Result<Self, ExecError>
    where
        I: IntoIterator<Item = &'a CallableKey>,
    {
        let builtins: BTreeMap<_, _> = builtin_behaviours().into_iter().collect();
        let mut registry = Self::new();
        for key in keys {
            let factory = builtins
                .get(key)
                .ok_or_else(|| ExecError::UnknownBehaviour(key.clone()))?;
            registry.register(key.clone(), *factory);
        }
        Ok(registry)
    }

    /// Registers a factory, replacing any previous one for the key.
    pub fn register(&mut self, key: CallableKey, factory: BehaviourFactory) {
        debug!("registering behaviour '{}'", key);
        self.factories.insert(key, factory);
    }

    /// Builds a behaviour.
    pub fn build(
        &self,
        key: &CallableKey,
        request: &BehaviourRequest,
        ns: &NamespaceManager,
    ) -> Result<Box<dyn Behaviour>, ExecError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| ExecError::UnknownBehaviour(key.clone()))?;
        factory(request, ns)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CallableKey> {
        self.factories.keys()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl CallableLookup for BehaviourRegistry {
    fn contains(&self, key: &CallableKey) -> bool {
        self.factories.contains_key(key)
    }
}
