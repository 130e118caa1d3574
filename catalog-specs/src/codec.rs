//! Canonical text encoding for persisted schemas and value maps.
//!
//! `encode` always writes the canonical shape. `decode` parses to a generic
//! JSON value and repairs it, so a legacy blob read once is written back in
//! canonical form the next time it is saved.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::normalize::{normalize_fields, normalize_values};
use crate::types::{FieldDefinition, ScalarValue};

/// A persisted payload type that can repair itself from any decoded value.
pub trait Canonical: Serialize + Default {
    fn from_payload(payload: &Value) -> Self;
}

impl Canonical for Vec<FieldDefinition> {
    fn from_payload(payload: &Value) -> Self {
        normalize_fields(payload)
    }
}

impl Canonical for BTreeMap<String, ScalarValue> {
    fn from_payload(payload: &Value) -> Self {
        normalize_values(payload)
    }
}

/// Encode in canonical form.
pub fn encode<T: Canonical>(payload: &T) -> Result<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Decode and repair. Empty or unparsable text yields the empty value.
pub fn decode<T: Canonical>(text: &str) -> T {
    if text.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(payload) => T::from_payload(&payload),
        Err(e) => {
            warn!(%e, len = text.len(), "unparsable specification payload");
            T::default()
        }
    }
}

/// Encode a field list.
pub fn encode_fields(fields: &[FieldDefinition]) -> Result<String> {
    Ok(serde_json::to_string(fields)?)
}

/// Decode a field list.
pub fn decode_fields(text: &str) -> Vec<FieldDefinition> {
    decode(text)
}
