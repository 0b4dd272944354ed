//! Key Builder Module
//!
//! Derives the canonical cache key `{prefix}{namespace}_{key}_{params}` used
//! verbatim by both tiers.
//!
//! Inside the namespace segment `%` and `_` are percent-encoded, so the
//! first separator after the prefix always ends the namespace and
//! `"{prefix}{namespace}_"` matches that namespace's keys and no other's.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CacheError, Result};

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '_';

// == Key Builder ==
/// Builds canonical cache keys under a reserved prefix.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    prefix: String,
}

impl KeyBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The reserved prefix every key starts with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // == Build ==
    /// Builds the key for `(namespace, key, params)`.
    ///
    /// Params are serialized to JSON with object keys sorted at every depth,
    /// so two params values with the same fields yield the same key whatever
    /// order the fields were declared or inserted in. Unit or `null` params
    /// render as `{}`.
    pub fn build<P>(&self, namespace: &str, key: &str, params: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        let namespace = encode_namespace(namespace)?;
        if key.is_empty() {
            return Err(CacheError::InvalidKey(
                "logical key cannot be empty".to_string(),
            ));
        }

        let params = match serde_json::to_value(params)? {
            Value::Null => Value::Object(Map::new()),
            other => canonicalize(other),
        };
        let params = serde_json::to_string(&params)?;

        Ok(format!(
            "{}{}{}{}{}{}",
            self.prefix, namespace, KEY_SEPARATOR, key, KEY_SEPARATOR, params
        ))
    }

    // == Namespace Prefix ==
    /// Prefix shared by every key built for `namespace`.
    pub fn namespace_prefix(&self, namespace: &str) -> Result<String> {
        let namespace = encode_namespace(namespace)?;
        Ok(format!("{}{}{}", self.prefix, namespace, KEY_SEPARATOR))
    }
}

/// One-off key construction without holding a [`KeyBuilder`].
pub fn build_key<P>(prefix: &str, namespace: &str, key: &str, params: &P) -> Result<String>
where
    P: Serialize + ?Sized,
{
    KeyBuilder::new(prefix).build(namespace, key, params)
}

/// Rejects an empty namespace and percent-encodes `%` and the separator.
fn encode_namespace(namespace: &str) -> Result<Cow<'_, str>> {
    if namespace.is_empty() {
        return Err(CacheError::InvalidKey(
            "namespace cannot be empty".to_string(),
        ));
    }
    if !namespace.contains(['%', KEY_SEPARATOR]) {
        return Ok(Cow::Borrowed(namespace));
    }
    Ok(Cow::Owned(
        namespace.replace('%', "%25").replace(KEY_SEPARATOR, "%5F"),
    ))
}

/// Rebuilds every object with its keys in sorted order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
