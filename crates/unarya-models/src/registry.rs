//! Load-once registry for label models stored on disk.
//!
//! Models live in `<model_dir>/<name>.json`. The first `load` of a name
//! reads and parses the file; later loads return the same `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use unarya_abstraction::ModelError;

/// A label model: the ordered set of classes a predictor can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelModel {
    /// Class labels, in prediction-index order.
    pub labels: Vec<String>,
}

/// Registry of loaded models, keyed by name.
#[derive(Debug)]
pub struct ModelRegistry {
    model_dir: PathBuf,
    models: RwLock<HashMap<String, Arc<LabelModel>>>,
}

impl ModelRegistry {
    /// Creates an empty registry reading models from `model_dir`.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self { model_dir: model_dir.into(), models: RwLock::new(HashMap::new()) }
    }

    /// Directory models are read from.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Returns the model called `name`, loading it on first use.
    ///
    /// # Errors
    /// Returns `ModelError::ModelNotFound` if no file exists for `name`,
    /// and `ModelError::ModelLoad` if the file cannot be read or parsed.
    pub fn load(&self, name: &str) -> Result<Arc<LabelModel>, ModelError> {
        if let Some(model) = self.get(name) {
            debug!(model = %name, "Model registry hit");
            return Ok(model);
        }

        let path = self.model_dir.join(format!("{name}.json"));
        if !path.exists() {
            return Err(ModelError::ModelNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ModelError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let model: LabelModel = serde_json::from_str(&content)
            .map_err(|e| ModelError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        if model.labels.is_empty() {
            return Err(ModelError::ModelLoad(format!("{}: no labels", path.display())));
        }

        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded the same model meanwhile; keep the first.
        let model = Arc::clone(models.entry(name.to_string()).or_insert_with(|| Arc::new(model)));
        info!(model = %name, labels = model.labels.len(), "Model loaded");
        Ok(model)
    }

    /// Loads every model in `names`, failing on the first error.
    ///
    /// # Errors
    /// Returns the first `ModelError` encountered.
    pub fn preload<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ModelError> {
        for name in names {
            self.load(name.as_ref())?;
        }
        Ok(())
    }

    /// Returns an already-loaded model without touching the filesystem.
    pub fn get(&self, name: &str) -> Option<Arc<LabelModel>> {
        self.models.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    /// Names of all loaded models, sorted.
    pub fn loaded(&self) -> Vec<String> {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = models.keys().cloned().collect();
        names.sort();
        names
    }
}
