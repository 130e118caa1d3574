//! Defensive repair of persisted payloads.
//!
//! Schema payloads come from several generations of admin tooling. Besides the
//! canonical array of field objects, two legacy shapes are still found in
//! storage: a lone field object, and an "object keyed by field" export which
//! is sometimes wrapped in a one-element array. Each shape has a detector; the
//! detectors are tried in order and the first one that applies wins.
//!
//! Nothing here fails. Unusable input degrades to an empty schema and a
//! warning.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{FieldDefinition, FieldKind, ScalarValue};

/// Recognizes one persisted schema shape.
pub trait ShapeDetector: Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Field objects in display order, or `None` if the payload is not this shape.
    fn detect<'a>(&self, payload: &'a Value) -> Option<Vec<&'a Map<String, Value>>>;
}

/// `[{ "<key>": {"key": ..}, "<key>": {"key": ..} }]`
pub struct WrappedFieldMap;

/// `[{..}, {..}]`; non-object elements are dropped.
pub struct FieldArray;

/// `{..}`: a lone field object, or an unwrapped object keyed by field.
pub struct SingleObject;

/// Detectors in the order they are tried.
pub static SHAPE_DETECTORS: &[&dyn ShapeDetector] = &[&WrappedFieldMap, &FieldArray, &SingleObject];

impl ShapeDetector for WrappedFieldMap {
    fn name(&self) -> &'static str {
        "wrapped-field-map"
    }

    fn detect<'a>(&self, payload: &'a Value) -> Option<Vec<&'a Map<String, Value>>> {
        match payload.as_array()?.as_slice() {
            [Value::Object(inner)] => field_map_values(inner),
            _ => None,
        }
    }
}

impl ShapeDetector for FieldArray {
    fn name(&self) -> &'static str {
        "field-array"
    }

    fn detect<'a>(&self, payload: &'a Value) -> Option<Vec<&'a Map<String, Value>>> {
        let items = payload.as_array()?;
        let objects: Vec<_> = items.iter().filter_map(Value::as_object).collect();
        if objects.len() < items.len() {
            warn!(
                dropped = items.len() - objects.len(),
                "dropping non-object entries from specification schema"
            );
        }
        Some(objects)
    }
}

impl ShapeDetector for SingleObject {
    fn name(&self) -> &'static str {
        "single-object"
    }

    fn detect<'a>(&self, payload: &'a Value) -> Option<Vec<&'a Map<String, Value>>> {
        let object = payload.as_object()?;
        Some(field_map_values(object).unwrap_or_else(|| vec![object]))
    }
}

/// Values of an object whose every value is itself a field object with a `key`.
fn field_map_values(object: &Map<String, Value>) -> Option<Vec<&Map<String, Value>>> {
    if object.is_empty() {
        return None;
    }
    object
        .values()
        .map(|v| v.as_object().filter(|o| o.contains_key("key")))
        .collect()
}

/// Repair an arbitrary decoded payload into a canonical, key-unique field list.
pub fn normalize_fields(payload: &Value) -> Vec<FieldDefinition> {
    let detected = SHAPE_DETECTORS
        .iter()
        .find_map(|d| d.detect(payload).map(|objects| (d.name(), objects)));

    let Some((shape, objects)) = detected else {
        if payload.is_null() {
            debug!("specification schema payload is null");
        } else {
            warn!(
                payload = value_kind(payload),
                "unrecognized specification schema payload, using empty schema"
            );
        }
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(objects.len());
    for object in objects {
        let Some(field) = field_from_object(object) else {
            warn!("dropping specification field without a usable key");
            continue;
        };
        if !seen.insert(field.key.clone()) {
            warn!(key = %field.key, "dropping duplicate specification field");
            continue;
        }
        fields.push(field);
    }

    debug!(shape, fields = fields.len(), "normalized specification schema");
    fields
}

/// Keep the scalar entries of a decoded value map.
pub fn normalize_values(payload: &Value) -> BTreeMap<String, ScalarValue> {
    let Some(object) = payload.as_object() else {
        if !payload.is_null() {
            warn!(
                payload = value_kind(payload),
                "specification values payload is not an object, using empty values"
            );
        }
        return BTreeMap::new();
    };

    object
        .iter()
        .filter_map(|(key, value)| match scalar_from_json(value) {
            Some(scalar) => Some((key.clone(), scalar)),
            None => {
                warn!(%key, value = value_kind(value), "dropping non-scalar specification value");
                None
            }
        })
        .collect()
}

fn scalar_from_json(value: &Value) -> Option<ScalarValue> {
    match value {
        Value::Bool(b) => Some(ScalarValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(ScalarValue::Number),
        Value::String(s) => Some(ScalarValue::String(s.clone())),
        _ => None,
    }
}

/// Build a field from a loosely shaped object. `None` when there is no usable key.
fn field_from_object(object: &Map<String, Value>) -> Option<FieldDefinition> {
    let key = object
        .get("key")
        .and_then(scalar_text)
        .filter(|k| !k.trim().is_empty())?;

    let label = object
        .get("label")
        .and_then(scalar_text)
        .unwrap_or_else(|| key.clone());

    let type_name = object
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t.trim().to_ascii_lowercase());

    let kind = match type_name.as_deref() {
        Some("text") => FieldKind::Text,
        Some("textarea") => FieldKind::Textarea,
        Some("number") => FieldKind::Number,
        Some("boolean") => FieldKind::Boolean,
        Some("select") => FieldKind::Select {
            options: object.get("options").map(parse_options).unwrap_or_default(),
        },
        other => {
            warn!(%key, field_type = ?other, "unknown specification field type, treating as text");
            FieldKind::Text
        }
    };

    let required = match object.get("required") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    };

    Some(FieldDefinition {
        label,
        kind,
        required,
        unit: optional_text(object, "unit"),
        placeholder: optional_text(object, "placeholder"),
        description: optional_text(object, "description"),
        key,
    })
}

fn parse_options(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::String(list) => list
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn optional_text(object: &Map<String, Value>, name: &str) -> Option<String> {
    object.get(name).and_then(scalar_text)
}

/// Text of a scalar JSON value. Strings are kept exactly as stored.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
