//! Heuristic language classifier.

use std::sync::Arc;

use tracing::debug;
use unarya_abstraction::{LanguagePrediction, LanguagePredictor, ModelError};

use crate::registry::{LabelModel, ModelRegistry};

/// Labels used when no label model is configured.
pub const DEFAULT_LANGUAGES: &[&str] = &["Python", "JavaScript", "Java", "C++", "Go", "Ruby", "PHP"];

/// Predicts a language by folding a feature vector onto a label set.
///
/// The label index is the feature sum truncated toward zero, taken modulo
/// the label count. The confidence is the fractional part of the feature
/// mean.
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    labels: Arc<LabelModel>,
}

impl LanguageClassifier {
    /// Creates a classifier over [`DEFAULT_LANGUAGES`].
    pub fn new() -> Self {
        let labels = DEFAULT_LANGUAGES.iter().map(ToString::to_string).collect();
        Self { labels: Arc::new(LabelModel { labels }) }
    }

    /// Creates a classifier over the labels of a registry model.
    ///
    /// # Errors
    /// Returns a `ModelError` if the model cannot be loaded.
    pub fn from_registry(registry: &ModelRegistry, model: &str) -> Result<Self, ModelError> {
        Ok(Self { labels: registry.load(model)? })
    }

    /// The labels this classifier predicts from.
    pub fn labels(&self) -> &[String] {
        &self.labels.labels
    }
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePredictor for LanguageClassifier {
    fn predict(&self, features: &[f64]) -> Result<LanguagePrediction, ModelError> {
        if features.is_empty() {
            return Err(ModelError::InvalidInput("features must not be empty".to_string()));
        }
        if features.iter().any(|f| !f.is_finite()) {
            return Err(ModelError::InvalidInput("features must be finite numbers".to_string()));
        }

        let sum: f64 = features.iter().sum();
        let mean = sum / features.len() as f64;
        if !sum.is_finite() || !mean.is_finite() {
            return Err(ModelError::InvalidInput("features overflow when summed".to_string()));
        }

        let labels = self.labels();
        let index = (sum.trunc() as i64).rem_euclid(labels.len() as i64) as usize;
        let confidence = (mean.rem_euclid(1.0) * 1000.0).round() / 1000.0;

        debug!(label = %labels[index], confidence, "Language predicted");
        Ok(LanguagePrediction { name: labels[index].clone(), confidence })
    }
}
