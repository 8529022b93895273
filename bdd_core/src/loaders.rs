//! Built-in attribute loaders.

use crate::attributes::{AttributeLoader, AttributeModel, CallableKey, CallableLookup, LoadedAttribute};
use crate::error::ModelError;
use crate::uris::{
    URI_PY_PRED_ATTR_NAME, URI_PY_PRED_MODULE_NAME, URI_PY_TYPE_MODULE_ATTR, URI_SIM_PRED_CONFIGS,
    URI_SIM_PRED_PATH, URI_SIM_TYPE_RES_CONFIGS, URI_SIM_TYPE_RES_PATH,
};
use bdd_env::Term;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolves `sim:path` of `sim:ResourceWithPath` models.
///
/// Relative paths are joined onto `base_dir`; nothing is read from disk.
#[derive(Debug, Clone)]
pub struct PathLoader {
    base_dir: PathBuf,
}

impl PathLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl AttributeLoader for PathLoader {
    fn name(&self) -> &str {
        "resource_path"
    }

    fn model_type(&self) -> &str {
        URI_SIM_TYPE_RES_PATH
    }

    fn load(&self, model: &AttributeModel) -> Result<LoadedAttribute, ModelError> {
        let raw = model.require(URI_SIM_PRED_PATH)?;
        let raw = raw.strip_prefix("file://").unwrap_or(raw);
        let path = PathBuf::from(raw);
        let path = if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        };
        Ok(LoadedAttribute::Path { path })
    }
}

/// Checks that `sim:ResourceWithConfigs` models carry `sim:configs`.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl AttributeLoader for ConfigLoader {
    fn name(&self) -> &str {
        "resource_configs"
    }

    fn model_type(&self) -> &str {
        URI_SIM_TYPE_RES_CONFIGS
    }

    fn load(&self, model: &AttributeModel) -> Result<LoadedAttribute, ModelError> {
        model.require(URI_SIM_PRED_CONFIGS)?;
        let entries = model
            .attr(URI_SIM_PRED_CONFIGS)
            .iter()
            .map(Term::lexical)
            .map(str::to_string)
            .collect();
        Ok(LoadedAttribute::Configs { entries })
    }
}

/// Resolves `py:ModuleAttribute` models to a registered implementation.
///
/// Both `py:module-name` and `py:attribute-name` are required. When a
/// lookup service is attached, the key must also name a registered
/// implementation.
#[derive(Debug, Clone, Default)]
pub struct ModuleAttrLoader {
    lookup: Option<Arc<dyn CallableLookup>>,
}

impl ModuleAttrLoader {
    /// Creates a loader that only validates the model's shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader that also checks keys against `lookup`.
    pub fn with_lookup(lookup: Arc<dyn CallableLookup>) -> Self {
        Self {
            lookup: Some(lookup),
        }
    }

    /// Reads the callable key of a module-attribute model.
    pub fn key_of(model: &AttributeModel) -> Result<CallableKey, ModelError> {
        let module = model.require(URI_PY_PRED_MODULE_NAME)?;
        let attribute = model.require(URI_PY_PRED_ATTR_NAME)?;
        Ok(CallableKey::new(module, attribute))
    }
}

impl AttributeLoader for ModuleAttrLoader {
    fn name(&self) -> &str {
        "module_attribute"
    }

    fn model_type(&self) -> &str {
        URI_PY_TYPE_MODULE_ATTR
    }

    fn load(&self, model: &AttributeModel) -> Result<LoadedAttribute, ModelError> {
        let key = Self::key_of(model)?;
        if let Some(lookup) = &self.lookup {
            if !lookup.contains(&key) {
                return Err(ModelError::UnknownCallable(key.to_string()));
            }
        }
        Ok(LoadedAttribute::Callable { key })
    }
}
