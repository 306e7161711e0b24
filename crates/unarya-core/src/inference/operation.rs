use std::fmt;

/// The closed set of operations the dispatcher knows how to route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Tokenize and encode source code.
    Preprocess,
    /// Predict a language from a feature vector.
    Classify,
    /// Render a deployment artifact.
    Generate,
    /// Static liveness payload.
    Health,
    /// Style and framework analysis.
    Analyze,
    /// Anything else. Carries the name as received.
    Unknown(String),
}

impl Operation {
    /// Every routable operation, in dispatch-table order.
    pub const KNOWN: [Self; 5] =
        [Self::Preprocess, Self::Classify, Self::Generate, Self::Health, Self::Analyze];

    /// Parses an operation name. Matching is exact and case-sensitive.
    pub fn parse(name: &str) -> Self {
        match name {
            "preprocess" => Self::Preprocess,
            "classify" => Self::Classify,
            "generate" => Self::Generate,
            "health" => Self::Health,
            "analyze" => Self::Analyze,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Wire name of the operation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Preprocess => "preprocess",
            Self::Classify => "classify",
            Self::Generate => "generate",
            Self::Health => "health",
            Self::Analyze => "analyze",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
