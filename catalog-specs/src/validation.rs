//! Per-field validation and coercion of submitted specification values.
//!
//! Every templated field is checked and all failures are reported together.
//! Keys that are not part of the field list are never validated.

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::{FieldDefinition, FieldKind, ScalarValue};

/// Result of validating a value map against a field list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    /// Coerced value for every templated field that produced one.
    pub values: BTreeMap<String, ScalarValue>,
    /// Error message per failing field key.
    pub errors: BTreeMap<String, String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check every field and return the error map. Empty means valid.
pub fn validate(
    fields: &[FieldDefinition],
    values: &BTreeMap<String, ScalarValue>,
) -> BTreeMap<String, String> {
    validate_and_coerce(fields, values).errors
}

/// Check every field, collecting both coerced values and errors.
pub fn validate_and_coerce(
    fields: &[FieldDefinition],
    values: &BTreeMap<String, ScalarValue>,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for field in fields {
        let (coerced, error) = check(field, values.get(&field.key));
        if let Some(value) = coerced {
            outcome.values.insert(field.key.clone(), value);
        }
        if let Some(message) = error {
            outcome.errors.insert(field.key.clone(), message);
        }
    }

    debug!(
        fields = fields.len(),
        errors = outcome.errors.len(),
        "validated specification values"
    );
    outcome
}

/// Coerce a raw value to the field's type. `None` means the value is absent.
pub fn coerce(field: &FieldDefinition, value: Option<&ScalarValue>) -> Option<ScalarValue> {
    check(field, value).0
}

fn check(
    field: &FieldDefinition,
    value: Option<&ScalarValue>,
) -> (Option<ScalarValue>, Option<String>) {
    match &field.kind {
        FieldKind::Text | FieldKind::Textarea => {
            let text = value.map(ToString::to_string);
            let missing = text.as_deref().is_none_or(str::is_empty);
            (text.map(ScalarValue::String), required_error(field, missing))
        }
        FieldKind::Number => {
            let number = value.and_then(parse_number);
            (
                number.map(ScalarValue::Number),
                required_error(field, number.is_none()),
            )
        }
        FieldKind::Select { options } => {
            let choice = value.map(ToString::to_string).filter(|s| !s.is_empty());
            match choice {
                None => (None, required_error(field, true)),
                Some(choice) if options.contains(&choice) => {
                    (Some(ScalarValue::String(choice)), None)
                }
                Some(_) => (
                    None,
                    Some(format!("{} must be one of: {}", field.label, options.join(", "))),
                ),
            }
        }
        FieldKind::Boolean => {
            let checked = matches!(value, Some(ScalarValue::Bool(true)))
                || value.and_then(ScalarValue::as_str) == Some("true");
            (Some(ScalarValue::Bool(checked)), None)
        }
    }
}

/// Finite number from a number or numeric string. Anything else counts as absent.
fn parse_number(value: &ScalarValue) -> Option<f64> {
    let number = match value {
        ScalarValue::Number(n) => *n,
        ScalarValue::String(s) => s.trim().parse::<f64>().ok()?,
        ScalarValue::Bool(_) => return None,
    };
    number.is_finite().then_some(number)
}

fn required_error(field: &FieldDefinition, missing: bool) -> Option<String> {
    (field.required && missing).then(|| format!("{} is required", field.label))
}
