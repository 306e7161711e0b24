//! Style and framework analysis of source code.

use std::fmt::Write;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unarya_abstraction::{CodeAnalyzer, CodeInsight, ModelError};

const FRAMEWORK_PATTERNS: &[(&str, &[&str])] = &[
    ("React", &[r#"from\s+['"]react['"]"#, r"ReactDOM\.render"]),
    ("Angular", &[r"@Component", r"angular\.module"]),
    ("Vue", &[r"new\s+Vue", r"v-bind:"]),
    ("Django", &[r"from\s+django", r"urlpatterns"]),
    ("Flask", &[r"from\s+flask", r"Flask\("]),
    ("Spring Boot", &[r"@SpringBootApplication", r"org\.springframework"]),
    ("Express", &[r#"require\(['"]express['"]\)"#, r"app\.listen"]),
];

/// Style metrics of a code sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleMetrics {
    /// Average leading whitespace of non-empty lines.
    pub indentation_spaces: usize,
    /// `snake_case`, `camelCase`, `PascalCase` or `unknown`.
    pub naming_convention: String,
    /// Average length of non-empty lines.
    pub average_line_length: f64,
    /// Share of lines that are comments.
    pub comment_ratio: f64,
    /// Branching keywords per line.
    pub complexity_estimate: f64,
    /// Total number of lines.
    pub line_count: usize,
}

/// A framework detected in a code sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    /// Framework name.
    pub name: String,
    /// Detection confidence in `(0, 1]`.
    pub confidence: f64,
}

struct NamingRules {
    snake: Regex,
    camel: Regex,
    pascal: Regex,
}

/// Analyzer combining style metrics and framework detection.
pub struct StyleAnalyzer {
    naming: NamingRules,
    branching: Regex,
    frameworks: Vec<(&'static str, Vec<Regex>)>,
}

fn compile(pattern: &str) -> Result<Regex, ModelError> {
    Regex::new(pattern).map_err(|e| ModelError::Other(format!("invalid pattern {pattern}: {e}")))
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

impl StyleAnalyzer {
    /// Creates an analyzer.
    ///
    /// # Errors
    /// Returns a `ModelError` if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, ModelError> {
        let frameworks = FRAMEWORK_PATTERNS
            .iter()
            .map(|(name, patterns)| {
                let compiled = patterns.iter().map(|p| compile(p)).collect::<Result<Vec<_>, _>>()?;
                Ok((*name, compiled))
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(Self {
            naming: NamingRules {
                snake: compile(r"[a-z]+_[a-z]+")?,
                camel: compile(r"[a-z]+[A-Z][a-z]+")?,
                pascal: compile(r"class\s+[A-Z][a-zA-Z]+")?,
            },
            branching: compile(r"\b(if|for|while|switch|case|try)\b")?,
            frameworks,
        })
    }

    /// Computes style metrics, or `None` when `code` has no non-empty lines.
    pub fn style_metrics(&self, code: &str) -> Option<StyleMetrics> {
        let lines: Vec<&str> = code.lines().collect();
        let non_empty: Vec<&str> = lines.iter().copied().filter(|l| !l.trim().is_empty()).collect();
        if non_empty.is_empty() {
            return None;
        }

        let indentation: usize = non_empty
            .iter()
            .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
            .sum();
        let total_len: usize = non_empty.iter().map(|l| l.chars().count()).sum();
        let comments = lines
            .iter()
            .filter(|l| {
                let t = l.trim_start();
                t.starts_with('#') || t.starts_with("//") || t.starts_with("/*")
            })
            .count();
        let line_count = lines.len().max(1);

        let naming_convention = if self.naming.snake.is_match(code) {
            "snake_case"
        } else if self.naming.camel.is_match(code) {
            "camelCase"
        } else if self.naming.pascal.is_match(code) {
            "PascalCase"
        } else {
            "unknown"
        };

        Some(StyleMetrics {
            indentation_spaces: indentation / non_empty.len(),
            naming_convention: naming_convention.to_string(),
            average_line_length: round_to(total_len as f64 / non_empty.len() as f64, 2),
            comment_ratio: round_to(comments as f64 / line_count as f64, 3),
            complexity_estimate: round_to(
                self.branching.find_iter(code).count() as f64 / line_count as f64,
                3,
            ),
            line_count: lines.len(),
        })
    }

    /// Detects known frameworks; each matching pattern adds 0.5 confidence.
    pub fn detect_frameworks(&self, code: &str) -> Vec<Framework> {
        self.frameworks
            .iter()
            .filter_map(|(name, patterns)| {
                let hits = patterns.iter().filter(|p| p.is_match(code)).count();
                (hits > 0).then(|| Framework {
                    name: (*name).to_string(),
                    confidence: (hits as f64 * 0.5).min(1.0),
                })
            })
            .collect()
    }
}

impl CodeAnalyzer for StyleAnalyzer {
    fn analyze(&self, language: &str, code_structure: &str) -> Result<CodeInsight, ModelError> {
        let language = match language.trim() {
            "" => "unknown",
            other => other,
        };

        let Some(metrics) = self.style_metrics(code_structure) else {
            return Ok(CodeInsight {
                insights: format!("{language}: no code to analyze"),
                confidence: "0.00".to_string(),
            });
        };
        let frameworks = self.detect_frameworks(code_structure);

        let mut insights = format!(
            "{language}: {} lines, {} naming, {}-space indentation, avg line length {}, \
             comment ratio {}, complexity {}",
            metrics.line_count,
            metrics.naming_convention,
            metrics.indentation_spaces,
            metrics.average_line_length,
            metrics.comment_ratio,
            metrics.complexity_estimate,
        );
        if !frameworks.is_empty() {
            let names: Vec<String> =
                frameworks.iter().map(|f| format!("{} ({:.2})", f.name, f.confidence)).collect();
            let _ = write!(insights, "; frameworks: {}", names.join(", "));
        }

        let mut confidence = 0.5;
        if metrics.naming_convention != "unknown" {
            confidence += 0.2;
        }
        if metrics.line_count >= 5 {
            confidence += 0.1;
        }
        confidence += 0.1 * frameworks.len().min(2) as f64;

        Ok(CodeInsight { insights, confidence: format!("{:.2}", confidence.min(0.95)) })
    }
}
