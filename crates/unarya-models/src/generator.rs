//! Dockerfile generation.

use std::fmt::Write;

use unarya_abstraction::{ArtifactContext, ArtifactGenerator, ModelError};

const FALLBACK_IMAGE: &str = "ubuntu:22.04";

/// Renders a single-stage Dockerfile for a project context.
#[derive(Debug, Clone, Default)]
pub struct DockerfileGenerator;

impl DockerfileGenerator {
    /// Creates a new generator.
    pub const fn new() -> Self {
        Self
    }

    /// Base image for a (lowercased) language.
    pub fn base_image(language: &str) -> &'static str {
        match language {
            "python" => "python:3.10-slim",
            "node" => "node:18-alpine",
            "java" => "eclipse-temurin:17-jdk",
            "go" => "golang:1.21-alpine",
            _ => FALLBACK_IMAGE,
        }
    }
}

impl ArtifactGenerator for DockerfileGenerator {
    fn generate(&self, context: &ArtifactContext) -> Result<String, ModelError> {
        let language = context.language.trim().to_lowercase();
        if language.is_empty() {
            return Err(ModelError::InvalidInput("language must not be empty".to_string()));
        }
        let entry_point = context.entry_point.trim();
        if entry_point.is_empty() {
            return Err(ModelError::InvalidInput("entry_point must not be empty".to_string()));
        }

        let mut out = String::new();
        let _ = writeln!(out, "# Generated Dockerfile");
        let _ = writeln!(out, "FROM {} AS build", Self::base_image(&language));
        let _ = writeln!(out, "WORKDIR /app");
        let _ = writeln!(out, "COPY . .");

        match language.as_str() {
            "python" => {
                let _ = writeln!(out, "RUN pip install -r requirements.txt");
                let _ = writeln!(out, "CMD [\"python\", \"{entry_point}\"]");
            }
            "node" => {
                let _ = writeln!(out, "RUN npm install");
                let _ = writeln!(out, "CMD [\"node\", \"{entry_point}\"]");
            }
            "java" => {
                let class = entry_point.split('.').next().unwrap_or(entry_point);
                let _ = writeln!(out, "RUN javac {entry_point}");
                let _ = writeln!(out, "CMD [\"java\", \"{class}\"]");
            }
            "go" => {
                let _ = writeln!(out, "RUN go build -o app {entry_point}");
                let _ = writeln!(out, "CMD [\"./app\"]");
            }
            _ => {
                let _ = writeln!(out, "CMD [\"bash\"]");
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(language: &str, entry_point: &str) -> ArtifactContext {
        ArtifactContext {
            language: language.to_string(),
            entry_point: entry_point.to_string(),
            dependencies: vec![],
            version: None,
        }
    }

    #[test]
    fn test_generate_python() {
        let dockerfile = DockerfileGenerator::new().generate(&context("Python", "main.py")).unwrap();
        assert!(dockerfile.starts_with("# Generated Dockerfile\nFROM python:3.10-slim AS build\n"));
        assert!(dockerfile.contains("RUN pip install -r requirements.txt"));
        assert!(dockerfile.contains("CMD [\"python\", \"main.py\"]"));
    }

    #[test]
    fn test_generate_java_strips_extension() {
        let dockerfile = DockerfileGenerator::new().generate(&context("java", "Main.java")).unwrap();
        assert!(dockerfile.contains("FROM eclipse-temurin:17-jdk AS build"));
        assert!(dockerfile.contains("RUN javac Main.java"));
        assert!(dockerfile.contains("CMD [\"java\", \"Main\"]"));
    }

    #[test]
    fn test_generate_unknown_language_falls_back() {
        let dockerfile = DockerfileGenerator::new().generate(&context("cobol", "run.cbl")).unwrap();
        assert!(dockerfile.contains("FROM ubuntu:22.04 AS build"));
        assert!(dockerfile.contains("CMD [\"bash\"]"));
    }

    #[test]
    fn test_generate_rejects_blank_fields() {
        let generator = DockerfileGenerator::new();
        assert!(generator.generate(&context("", "main.py")).is_err());
        assert!(generator.generate(&context("go", "  ")).is_err());
    }
}
