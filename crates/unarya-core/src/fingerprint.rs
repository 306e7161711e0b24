//! Cache keys for inference requests.
//!
//! A fingerprint is the hex SHA-256 of a canonical JSON rendering of the
//! request: object keys are sorted at every depth, so two payloads with the
//! same content produce the same key regardless of field order.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::inference::InferenceRequest;

/// Computes the cache key for `request`.
pub fn fingerprint(request: &InferenceRequest) -> String {
    let mut envelope = Map::new();
    envelope.insert("operation".to_string(), Value::String(request.operation.clone()));
    envelope.insert("payload".to_string(), Value::Object(request.payload.clone()));

    let mut canonical = String::new();
    write_canonical(&Value::Object(envelope), &mut canonical);

    hex::encode(Sha256::digest(canonical.as_bytes()))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
