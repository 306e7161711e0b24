//! Collaborator abstraction layer for Unarya.
//!
//! The serving core never talks to a tokenizer, classifier or generator
//! directly. It goes through the traits in this crate, which keeps the
//! model-side implementations swappable (and stubbable in tests).
//!
//! Every collaborator is synchronous and reports malformed input as a
//! [`ModelError`] instead of returning a partial result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error raised by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// The input handed to the collaborator is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A named model could not be found.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A model file exists but could not be loaded.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Other unexpected errors.
    #[error("Other model error: {0}")]
    Other(String),
}

/// Lexical category of a source token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Identifiers and keywords.
    Identifier,
    /// Integer literals.
    Number,
    /// Operators and punctuation.
    Symbol,
    /// Anything else.
    Unknown,
}

/// A single token of source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token category.
    pub kind: TokenKind,
    /// The raw text of the token.
    pub value: String,
    /// Ordinal position of the token in the token stream.
    pub position: usize,
}

/// Splits source code into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenizes `code`.
    ///
    /// # Errors
    /// Returns a `ModelError` if the code cannot be tokenized.
    fn tokenize(&self, code: &str) -> Result<Vec<Token>, ModelError>;
}

/// Turns tokens into a numeric vector.
pub trait Encoder: Send + Sync {
    /// Encodes `tokens` into vocabulary indices.
    ///
    /// # Errors
    /// Returns a `ModelError` if the tokens cannot be encoded.
    fn encode(&self, tokens: &[Token]) -> Result<Vec<u32>, ModelError>;
}

/// Outcome of a language prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguagePrediction {
    /// Predicted language name.
    pub name: String,
    /// Confidence in `[0, 1)`.
    pub confidence: f64,
}

/// Predicts a programming language from a feature vector.
pub trait LanguagePredictor: Send + Sync {
    /// Predicts the language described by `features`.
    ///
    /// # Errors
    /// Returns a `ModelError` if the features are empty or not finite.
    fn predict(&self, features: &[f64]) -> Result<LanguagePrediction, ModelError>;
}

/// Context describing the project an artifact is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactContext {
    /// Primary language of the project (e.g. `python`, `node`).
    pub language: String,
    /// Entry point file or module.
    pub entry_point: String,
    /// Declared dependencies.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Optional language/runtime version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Renders a deployment artifact from a project context.
pub trait ArtifactGenerator: Send + Sync {
    /// Generates the artifact text.
    ///
    /// # Errors
    /// Returns a `ModelError` if the context cannot be rendered.
    fn generate(&self, context: &ArtifactContext) -> Result<String, ModelError>;
}

/// Result of a code analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInsight {
    /// Human-readable findings.
    pub insights: String,
    /// Confidence rendered as text (e.g. `"0.85"`).
    pub confidence: String,
}

/// Produces insights about a piece of code.
pub trait CodeAnalyzer: Send + Sync {
    /// Analyzes `code_structure` written in `language`.
    ///
    /// # Errors
    /// Returns a `ModelError` if the input cannot be analyzed.
    fn analyze(&self, language: &str, code_structure: &str) -> Result<CodeInsight, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::InvalidInput("features must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: features must not be empty");

        let err = ModelError::ModelNotFound("language".to_string());
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn test_token_kind_serializes_screaming_case() {
        let json = serde_json::to_string(&TokenKind::Identifier).unwrap();
        assert_eq!(json, "\"IDENTIFIER\"");
    }

    #[test]
    fn test_artifact_context_optional_fields_default() {
        let json = r#"{"language": "python", "entry_point": "app.py"}"#;
        let context: ArtifactContext = serde_json::from_str(json).unwrap();
        assert_eq!(context.language, "python");
        assert!(context.dependencies.is_empty());
        assert_eq!(context.version, None);
    }

    #[test]
    fn test_artifact_context_requires_entry_point() {
        let json = r#"{"language": "python"}"#;
        let result: Result<ArtifactContext, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
