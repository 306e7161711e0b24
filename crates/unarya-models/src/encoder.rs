//! Vocabulary encoder.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use unarya_abstraction::{Encoder, ModelError, Token};

/// Encoder that maps each distinct token value to a stable index.
///
/// Indices start at 1 and are assigned in order of first appearance. The
/// vocabulary is shared by every call, so the same token always encodes to
/// the same index for the lifetime of the encoder.
///
/// The vocabulary is never pruned. Every distinct token a caller sends adds
/// an entry, so memory grows with the variety of input seen over the
/// process lifetime, the same tradeoff as the unbounded result cache.
/// Indices stop at `u32::MAX`, after which new tokens fail to encode.
#[derive(Debug)]
pub struct VocabularyEncoder {
    vocab: Mutex<Vocabulary>,
}

#[derive(Debug)]
struct Vocabulary {
    indices: HashMap<String, u32>,
    next_index: u32,
}

impl VocabularyEncoder {
    /// Creates an encoder with an empty vocabulary.
    pub fn new() -> Self {
        Self { vocab: Mutex::new(Vocabulary { indices: HashMap::new(), next_index: 1 }) }
    }

    /// Number of distinct tokens seen so far.
    pub fn vocabulary_size(&self) -> usize {
        self.vocab.lock().unwrap_or_else(PoisonError::into_inner).indices.len()
    }
}

impl Default for VocabularyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for VocabularyEncoder {
    fn encode(&self, tokens: &[Token]) -> Result<Vec<u32>, ModelError> {
        let mut vocab = self.vocab.lock().unwrap_or_else(PoisonError::into_inner);
        let mut encoded = Vec::with_capacity(tokens.len());

        for token in tokens {
            let index = match vocab.indices.get(&token.value) {
                Some(index) => *index,
                None => {
                    let index = vocab.next_index;
                    vocab.next_index = index
                        .checked_add(1)
                        .ok_or_else(|| ModelError::Other("vocabulary is full".to_string()))?;
                    vocab.indices.insert(token.value.clone(), index);
                    index
                }
            };
            encoded.push(index);
        }

        Ok(encoded)
    }
}
