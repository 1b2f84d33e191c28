//! Structured payload extraction
//!
//! A secret body may itself be a JSON or YAML mapping. JSON is tried first,
//! then YAML; the first format that decodes decides whether the key exists.

use crate::error::{Result, SecretError};
use tracing::debug;

/// Look up `key` in the JSON or YAML mapping `body`
///
/// Scalars render as their plain text, nested values as compact JSON.
pub fn extract(body: &str, key: &str) -> Result<String> {
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(body) {
        Ok(map) => {
            return map
                .get(key)
                .map(render_json)
                .ok_or_else(|| key_not_found(key));
        }
        Err(e) => debug!(error = %e, "secret body is not a JSON mapping, trying YAML"),
    }

    let mapping: serde_yaml_ng::Mapping =
        serde_yaml_ng::from_str(body).map_err(|e| SecretError::UnparseableBody {
            reason: e.to_string(),
        })?;

    match mapping.get(key) {
        Some(value) => render_yaml(value),
        None => Err(key_not_found(key)),
    }
}

fn key_not_found(key: &str) -> SecretError {
    SecretError::KeyNotFound {
        key: key.to_string(),
    }
}

fn render_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_yaml(value: &serde_yaml_ng::Value) -> Result<String> {
    use serde_yaml_ng::Value;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        nested => serde_json::to_string(nested)
            .or_else(|_| serde_yaml_ng::to_string(nested).map(|s| s.trim_end().to_string()))
            .map_err(|e| SecretError::UnparseableBody {
                reason: e.to_string(),
            }),
    }
}
