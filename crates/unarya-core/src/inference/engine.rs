use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use unarya_models::{LanguageClassifier, ModelRegistry};

use super::{ClassifyHandler, HandlerTable, InferenceRequest, InferenceResult, Operation};
use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::Result;
use crate::fingerprint::fingerprint;
use crate::metrics::MetricsCollector;

/// Routes requests to handlers behind a fingerprint-keyed result cache.
///
/// One engine is shared by every worker. Cache hits skip the handler and
/// are not counted in the metrics; only computed results are.
pub struct InferenceEngine {
    handlers: HandlerTable,
    cache: ResultCache,
    metrics: MetricsCollector,
}

impl InferenceEngine {
    /// Creates an engine over `handlers` whose cache entries live for `ttl`.
    pub fn new(handlers: HandlerTable, ttl: Duration) -> Self {
        Self { handlers, cache: ResultCache::new(ttl), metrics: MetricsCollector::new() }
    }

    /// Builds the engine with the built-in collaborators.
    ///
    /// Label models listed in `models.preload` are loaded up front, and the
    /// classifier uses `models.language_model` when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator fails to initialize or a
    /// configured model cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = ModelRegistry::new(&config.models.model_dir);
        registry.preload(&config.models.preload)?;

        let mut handlers = HandlerTable::builtin()?;
        if let Some(model) = &config.models.language_model {
            let classifier = LanguageClassifier::from_registry(&registry, model)?;
            handlers = handlers.with_classify(ClassifyHandler::new(Arc::new(classifier)));
        }

        info!(
            model_dir = %registry.model_dir().display(),
            models = ?registry.loaded(),
            ttl_secs = config.cache.ttl_secs,
            "Inference engine initialized"
        );
        Ok(Self::new(handlers, config.cache.ttl()))
    }

    /// Runs one request. Never fails: errors and handler panics come back
    /// as a failed result.
    pub fn infer(&self, request: &InferenceRequest) -> InferenceResult {
        let key = fingerprint(request);

        if let Some(cached) = self.cache.get(&key) {
            debug!(operation = %request.operation, key = %key, "Cache hit");
            return InferenceResult::cache_hit(cached);
        }

        let operation = Operation::parse(&request.operation);
        let Some(handler) = self.handlers.handler_for(&operation) else {
            warn!(operation = %operation, "Unknown operation");
            return InferenceResult::failure(format!("Unknown op: {operation}"));
        };

        let start = Instant::now();
        let outcome = match catch_unwind(AssertUnwindSafe(|| handler.handle(&request.payload))) {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = format!("Handler panicked: {}", panic_message(panic.as_ref()));
                warn!(operation = %operation, error = %message, "Operation panicked");
                return InferenceResult::failure(message);
            }
        };

        match outcome {
            Ok(output) => {
                self.cache.set(key, output.clone());
                self.metrics.record_latency(start);
                debug!(
                    operation = %operation,
                    duration_ms = start.elapsed().as_millis(),
                    "Operation completed"
                );
                InferenceResult::success(output)
            }
            Err(e) => {
                warn!(operation = %operation, error = %e, "Operation failed");
                InferenceResult::failure(e.to_string())
            }
        }
    }

    /// Runs each request independently, in order.
    pub fn batch_infer(&self, requests: &[InferenceRequest]) -> Vec<InferenceResult> {
        requests.iter().map(|request| self.infer(request)).collect()
    }

    /// The result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The latency collector.
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}
