//! Operation dispatch for the model server.
//!
//! An [`InferenceRequest`] names an operation and carries a JSON object
//! payload. The [`InferenceEngine`] fingerprints it, answers from the
//! result cache when it can, and otherwise routes it through the
//! [`HandlerTable`] to the collaborator responsible for that operation.
//! Failures are always returned as an [`InferenceResult`], never raised.

mod engine;
mod handlers;
mod operation;

pub use engine::InferenceEngine;
pub use handlers::{
    AnalyzeHandler, ClassifyHandler, FnHandler, GenerateHandler, HandlerTable, HealthHandler,
    OperationHandler, PreprocessHandler, handler_fn,
};
pub use operation::Operation;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use unarya_abstraction::ModelError;

/// Operation-specific request fields.
pub type Payload = serde_json::Map<String, Value>;

/// A request to run one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Name of the operation, see [`Operation`].
    pub operation: String,
    /// Fields the operation's handler reads.
    #[serde(default)]
    pub payload: Payload,
}

impl InferenceRequest {
    /// Creates a request with an empty payload.
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(), payload: Payload::new() }
    }

    /// Adds a payload field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }
}

/// Outcome of one request.
///
/// On success `output` holds the handler output; on failure `output` is
/// `None` and `message` explains why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Whether the operation produced an output.
    pub success: bool,
    /// Handler output, present on success.
    pub output: Option<Value>,
    /// Status or error description.
    pub message: Option<String>,
}

impl InferenceResult {
    /// A freshly computed output.
    pub fn success(output: Value) -> Self {
        Self { success: true, output: Some(output), message: Some("OK".to_string()) }
    }

    /// An output served from the result cache.
    pub fn cache_hit(output: Value) -> Self {
        Self { success: true, output: Some(output), message: Some("Cache hit".to_string()) }
    }

    /// A failure with its description.
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, output: None, message: Some(message.into()) }
    }
}

/// Errors raised by an operation handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A required payload field is absent.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A payload field has the wrong shape.
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The collaborator rejected the input or failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl HandlerError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField { field: field.to_string(), reason: reason.into() }
    }
}
