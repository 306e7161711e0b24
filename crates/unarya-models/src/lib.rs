//! Built-in collaborator implementations for Unarya.
//!
//! This crate provides the concrete implementations of the traits in
//! `unarya-abstraction` that the model server wires in by default.
//!
//! # Collaborators
//!
//! - **CodeTokenizer**: regex tokenizer for source code
//! - **VocabularyEncoder**: token to vocabulary-index encoder
//! - **LanguageClassifier**: heuristic language predictor over feature vectors
//! - **DockerfileGenerator**: Dockerfile rendering per language
//! - **StyleAnalyzer**: style metrics and framework detection
//!
//! Label models are loaded through a [`ModelRegistry`], which is built once
//! at startup and shared with the collaborators that need it.

pub mod analyzer;
pub mod classifier;
pub mod encoder;
pub mod generator;
pub mod registry;
pub mod tokenizer;

pub use analyzer::{Framework, StyleAnalyzer, StyleMetrics};
pub use classifier::{DEFAULT_LANGUAGES, LanguageClassifier};
pub use encoder::VocabularyEncoder;
pub use generator::DockerfileGenerator;
pub use registry::{LabelModel, ModelRegistry};
pub use tokenizer::CodeTokenizer;
