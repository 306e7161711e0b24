//! Regex-based source code tokenizer.

use regex::Regex;
use unarya_abstraction::{ModelError, Token, TokenKind, Tokenizer};

/// Identifiers, integers, two-character comparison operators, then any
/// other single non-whitespace character.
const TOKEN_PATTERN: &str = r"[A-Za-z_]\w*|\d+|==|!=|<=|>=|\S";

const SYMBOLS: &[&str] =
    &["=", "==", "+", "-", "*", "/", "(", ")", "{", "}", "[", "]", ":", ","];

/// Tokenizer that splits code into identifiers, numbers and symbols.
#[derive(Debug, Clone)]
pub struct CodeTokenizer {
    pattern: Regex,
}

impl CodeTokenizer {
    /// Creates a new tokenizer.
    ///
    /// # Errors
    /// Returns a `ModelError` if the token pattern fails to compile.
    pub fn new() -> Result<Self, ModelError> {
        let pattern = Regex::new(TOKEN_PATTERN)
            .map_err(|e| ModelError::Other(format!("invalid token pattern: {e}")))?;
        Ok(Self { pattern })
    }

    fn classify(value: &str) -> TokenKind {
        let mut chars = value.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => TokenKind::Identifier,
            Some(c) if c.is_ascii_digit() => TokenKind::Number,
            _ if SYMBOLS.contains(&value) => TokenKind::Symbol,
            _ => TokenKind::Unknown,
        }
    }
}

impl Tokenizer for CodeTokenizer {
    fn tokenize(&self, code: &str) -> Result<Vec<Token>, ModelError> {
        let tokens = self
            .pattern
            .find_iter(code)
            .enumerate()
            .map(|(position, m)| Token {
                kind: Self::classify(m.as_str()),
                value: m.as_str().to_string(),
                position,
            })
            .collect();
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_tokenize_simple_function() {
        let tokenizer = CodeTokenizer::new().unwrap();
        let tokens = tokenizer.tokenize("def add(a, b): return a + 42").unwrap();

        assert_eq!(
            values(&tokens),
            vec!["def", "add", "(", "a", ",", "b", ")", ":", "return", "a", "+", "42"]
        );
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Symbol);
        assert_eq!(tokens[11].kind, TokenKind::Number);
        assert_eq!(tokens[11].position, 11);
    }

    #[test]
    fn test_tokenize_comparison_operators() {
        let tokenizer = CodeTokenizer::new().unwrap();
        let tokens = tokenizer.tokenize("a == b != c <= d").unwrap();
        assert_eq!(values(&tokens), vec!["a", "==", "b", "!=", "c", "<=", "d"]);
        assert_eq!(tokens[1].kind, TokenKind::Symbol);
        // `!=` is not in the symbol table
        assert_eq!(tokens[3].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_tokenize_empty_code() {
        let tokenizer = CodeTokenizer::new().unwrap();
        assert!(tokenizer.tokenize("   \n\t").unwrap().is_empty());
    }
}
