//! Operation handlers and the dispatch table.
//!
//! Each handler adapts one collaborator to the `payload -> output` shape
//! the engine expects. Handlers are synchronous; the server runs them on
//! blocking worker threads.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use unarya_abstraction::{
    ArtifactContext, ArtifactGenerator, CodeAnalyzer, Encoder, LanguagePredictor, ModelError,
    Tokenizer,
};
use unarya_models::{
    CodeTokenizer, DockerfileGenerator, LanguageClassifier, StyleAnalyzer, VocabularyEncoder,
};

use super::{HandlerError, Operation, Payload};

/// Runs one operation against its payload.
pub trait OperationHandler: Send + Sync {
    /// Produces the operation output, or the reason it could not.
    fn handle(&self, payload: &Payload) -> Result<Value, HandlerError>;
}

/// Handler backed by a closure. Built with [`handler_fn`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps a closure as an [`OperationHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Payload) -> Result<Value, HandlerError> + Send + Sync,
{
    FnHandler { f }
}

impl<F> OperationHandler for FnHandler<F>
where
    F: Fn(&Payload) -> Result<Value, HandlerError> + Send + Sync,
{
    fn handle(&self, payload: &Payload) -> Result<Value, HandlerError> {
        (self.f)(payload)
    }
}

fn string_field<'a>(payload: &'a Payload, field: &str) -> Result<&'a str, HandlerError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(HandlerError::MissingField(field.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(HandlerError::invalid(field, "expected a string")),
    }
}

/// `preprocess`: tokenizes `code` and encodes the tokens.
pub struct PreprocessHandler {
    tokenizer: Arc<dyn Tokenizer>,
    encoder: Arc<dyn Encoder>,
}

impl PreprocessHandler {
    /// Creates the handler from a tokenizer and an encoder.
    pub fn new(tokenizer: Arc<dyn Tokenizer>, encoder: Arc<dyn Encoder>) -> Self {
        Self { tokenizer, encoder }
    }
}

impl OperationHandler for PreprocessHandler {
    fn handle(&self, payload: &Payload) -> Result<Value, HandlerError> {
        let code = string_field(payload, "code")?;
        let tokens = self.tokenizer.tokenize(code)?;
        let encoded = self.encoder.encode(&tokens)?;
        Ok(json!(encoded))
    }
}

/// `classify`: predicts a language from `features`.
pub struct ClassifyHandler {
    predictor: Arc<dyn LanguagePredictor>,
}

impl ClassifyHandler {
    /// Creates the handler around a predictor.
    pub fn new(predictor: Arc<dyn LanguagePredictor>) -> Self {
        Self { predictor }
    }
}

impl OperationHandler for ClassifyHandler {
    fn handle(&self, payload: &Payload) -> Result<Value, HandlerError> {
        let features = match payload.get("features") {
            None | Some(Value::Null) => return Err(HandlerError::MissingField("features".to_string())),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_f64().ok_or_else(|| HandlerError::invalid("features", "expected numbers")))
                .collect::<Result<Vec<f64>, _>>()?,
            Some(_) => return Err(HandlerError::invalid("features", "expected an array")),
        };

        let prediction = self.predictor.predict(&features)?;
        Ok(json!({ "language": prediction.name, "confidence": prediction.confidence }))
    }
}

/// `generate`: renders an artifact from `context`.
pub struct GenerateHandler {
    generator: Arc<dyn ArtifactGenerator>,
}

impl GenerateHandler {
    /// Creates the handler around a generator.
    pub fn new(generator: Arc<dyn ArtifactGenerator>) -> Self {
        Self { generator }
    }
}

impl OperationHandler for GenerateHandler {
    fn handle(&self, payload: &Payload) -> Result<Value, HandlerError> {
        let context = match payload.get("context") {
            None | Some(Value::Null) => return Err(HandlerError::MissingField("context".to_string())),
            Some(value) => ArtifactContext::deserialize(value)
                .map_err(|e| HandlerError::invalid("context", e.to_string()))?,
        };
        Ok(Value::String(self.generator.generate(&context)?))
    }
}

/// `health`: constant liveness payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthHandler;

impl OperationHandler for HealthHandler {
    fn handle(&self, _payload: &Payload) -> Result<Value, HandlerError> {
        Ok(json!({ "status": "OK", "uptime": "active" }))
    }
}

/// `analyze`: style analysis of `code_structure` written in `language`.
pub struct AnalyzeHandler {
    analyzer: Arc<dyn CodeAnalyzer>,
}

impl AnalyzeHandler {
    /// Creates the handler around an analyzer.
    pub fn new(analyzer: Arc<dyn CodeAnalyzer>) -> Self {
        Self { analyzer }
    }
}

impl OperationHandler for AnalyzeHandler {
    fn handle(&self, payload: &Payload) -> Result<Value, HandlerError> {
        let language = string_field(payload, "language")?;
        let code_structure = string_field(payload, "code_structure")?;
        let insight = self.analyzer.analyze(language, code_structure)?;
        Ok(json!({ "insights": insight.insights, "confidence": insight.confidence }))
    }
}

/// One handler per known [`Operation`].
#[derive(Clone)]
pub struct HandlerTable {
    preprocess: Arc<dyn OperationHandler>,
    classify: Arc<dyn OperationHandler>,
    generate: Arc<dyn OperationHandler>,
    health: Arc<dyn OperationHandler>,
    analyze: Arc<dyn OperationHandler>,
}

impl HandlerTable {
    /// Table wired to the built-in collaborators from `unarya-models`.
    ///
    /// # Errors
    /// Returns a `ModelError` if a built-in collaborator fails to initialize.
    pub fn builtin() -> Result<Self, ModelError> {
        Ok(Self {
            preprocess: Arc::new(PreprocessHandler::new(
                Arc::new(CodeTokenizer::new()?),
                Arc::new(VocabularyEncoder::new()),
            )),
            classify: Arc::new(ClassifyHandler::new(Arc::new(LanguageClassifier::new()))),
            generate: Arc::new(GenerateHandler::new(Arc::new(DockerfileGenerator::new()))),
            health: Arc::new(HealthHandler),
            analyze: Arc::new(AnalyzeHandler::new(Arc::new(StyleAnalyzer::new()?))),
        })
    }

    /// Replaces the `preprocess` handler.
    #[must_use]
    pub fn with_preprocess(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.preprocess = Arc::new(handler);
        self
    }

    /// Replaces the `classify` handler.
    #[must_use]
    pub fn with_classify(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.classify = Arc::new(handler);
        self
    }

    /// Replaces the `generate` handler.
    #[must_use]
    pub fn with_generate(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.generate = Arc::new(handler);
        self
    }

    /// Replaces the `health` handler.
    #[must_use]
    pub fn with_health(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.health = Arc::new(handler);
        self
    }

    /// Replaces the `analyze` handler.
    #[must_use]
    pub fn with_analyze(mut self, handler: impl OperationHandler + 'static) -> Self {
        self.analyze = Arc::new(handler);
        self
    }

    /// The handler bound to `operation`, or `None` for unknown operations.
    pub fn handler_for(&self, operation: &Operation) -> Option<&dyn OperationHandler> {
        let handler = match operation {
            Operation::Preprocess => &self.preprocess,
            Operation::Classify => &self.classify,
            Operation::Generate => &self.generate,
            Operation::Health => &self.health,
            Operation::Analyze => &self.analyze,
            Operation::Unknown(_) => return None,
        };
        Some(handler.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_preprocess_encodes_tokens() {
        let table = HandlerTable::builtin().unwrap();
        let handler = table.handler_for(&Operation::Preprocess).unwrap();
        let output = handler.handle(&payload(json!({"code": "x = x + 1"}))).unwrap();
        assert_eq!(output, json!([1, 2, 1, 3, 4]));
    }

    #[test]
    fn test_preprocess_requires_code() {
        let table = HandlerTable::builtin().unwrap();
        let handler = table.handler_for(&Operation::Preprocess).unwrap();
        let err = handler.handle(&Payload::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: code");

        let err = handler.handle(&payload(json!({"code": 42}))).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidField { .. }));
    }

    #[test]
    fn test_classify() {
        let table = HandlerTable::builtin().unwrap();
        let handler = table.handler_for(&Operation::Classify).unwrap();
        let output = handler.handle(&payload(json!({"features": [2, 3, 4]}))).unwrap();
        assert_eq!(output["language"], json!("Java"));
        assert_eq!(output["confidence"], json!(0.0));
    }

    #[test]
    fn test_classify_rejects_malformed_features() {
        let table = HandlerTable::builtin().unwrap();
        let handler = table.handler_for(&Operation::Classify).unwrap();

        let err = handler.handle(&payload(json!({"features": "1,2"}))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid field features: expected an array");

        let err = handler.handle(&payload(json!({"features": [1, "two"]}))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid field features: expected numbers");

        let err = handler.handle(&payload(json!({"features": []}))).unwrap_err();
        assert!(matches!(err, HandlerError::Model(ModelError::InvalidInput(_))));
    }

    #[test]
    fn test_generate() {
        let table = HandlerTable::builtin().unwrap();
        let handler = table.handler_for(&Operation::Generate).unwrap();
        let output = handler
            .handle(&payload(json!({"context": {"language": "go", "entry_point": "main.go"}})))
            .unwrap();
        let dockerfile = output.as_str().unwrap();
        assert!(dockerfile.contains("FROM golang:1.21-alpine AS build"));
        assert!(dockerfile.contains("RUN go build -o app main.go"));
    }

    #[test]
    fn test_generate_rejects_malformed_context() {
        let table = HandlerTable::builtin().unwrap();
        let handler = table.handler_for(&Operation::Generate).unwrap();
        assert!(matches!(
            handler.handle(&Payload::new()).unwrap_err(),
            HandlerError::MissingField(_)
        ));
        let err = handler.handle(&payload(json!({"context": {"language": "go"}}))).unwrap_err();
        assert!(err.to_string().starts_with("Invalid field context:"));
    }

    #[test]
    fn test_health() {
        let table = HandlerTable::builtin().unwrap();
        let output = table.handler_for(&Operation::Health).unwrap().handle(&Payload::new()).unwrap();
        assert_eq!(output, json!({"status": "OK", "uptime": "active"}));
    }

    #[test]
    fn test_analyze() {
        let table = HandlerTable::builtin().unwrap();
        let handler = table.handler_for(&Operation::Analyze).unwrap();
        let output = handler
            .handle(&payload(json!({"language": "python", "code_structure": "def hello(): pass"})))
            .unwrap();
        assert!(output["insights"].as_str().unwrap().starts_with("python:"));
        assert!(output["confidence"].is_string());

        let err = handler.handle(&payload(json!({"language": "python"}))).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: code_structure");
    }

    #[test]
    fn test_unknown_has_no_handler() {
        let table = HandlerTable::builtin().unwrap();
        assert!(table.handler_for(&Operation::Unknown("bogus".to_string())).is_none());
    }

    #[test]
    fn test_with_handler_replaces_binding() {
        let table = HandlerTable::builtin()
            .unwrap()
            .with_health(handler_fn(|_: &Payload| Ok(json!("custom"))));
        let output = table.handler_for(&Operation::Health).unwrap().handle(&Payload::new()).unwrap();
        assert_eq!(output, json!("custom"));
    }
}
