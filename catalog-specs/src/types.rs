//! Core field, value and template types.
//!
//! A [`FieldDefinition`] describes one named product attribute. A
//! [`CategoryTemplate`] is the ordered list of fields registered for one
//! category. Values stored on products are loosely typed [`ScalarValue`]s.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SpecsError};

/// The type of a field, carrying only the data meaningful to that type.
///
/// Serialized inline with the owning field as `"type": "<kind>"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Select {
        #[serde(default)]
        options: Vec<String>,
    },
    Boolean,
    Textarea,
}

impl FieldKind {
    /// The persisted type name.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Select { .. } => "select",
            FieldKind::Boolean => "boolean",
            FieldKind::Textarea => "textarea",
        }
    }

    /// Options of a select field, empty for every other kind.
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::Select { options } => options,
            _ => &[],
        }
    }
}

/// A field definition: the schema for a single named product attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    /// Create an optional field with no display metadata.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            unit: None,
            placeholder: None,
            description: None,
        }
    }

    /// A single-line text field.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    /// A multi-line text field.
    pub fn textarea(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Textarea)
    }

    /// A numeric field.
    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    /// A checkbox field.
    pub fn boolean(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Boolean)
    }

    /// A field restricted to the given options, in display order.
    pub fn select<I, S>(key: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            key,
            label,
            FieldKind::Select {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Unit shown after the value, such as `GHz`.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Hint shown in an empty input.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Longer help text for the field.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A loosely typed value stored under one key of a product's specifications.
///
/// Integral numbers are written without a fraction. Non-finite numbers have no
/// JSON form and are written as their text (`"NaN"`, `"inf"`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl ScalarValue {
    /// The text, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Number(n) => match integral(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ScalarValue::Bool(b) => serializer.serialize_bool(*b),
            ScalarValue::String(s) => serializer.serialize_str(s),
            ScalarValue::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None if n.is_finite() => serializer.serialize_f64(*n),
                None => serializer.collect_str(n),
            },
        }
    }
}

/// The number as an `i64` when it has no fraction and is exactly representable.
fn integral(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15).then_some(n as i64)
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Number(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Number(value as f64)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

/// Identifies a category by display name and URL slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CategoryKey {
    pub name: String,
    pub slug: String,
}

impl CategoryKey {
    /// Build a key whose slug is derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }

    /// Build a key with an explicit slug, stored as given.
    pub fn with_slug(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// The ordered field schema registered for one category.
///
/// Keys are unique within a template. Edits happen on an owned copy which is
/// then registered again as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTemplate {
    category: CategoryKey,
    fields: Vec<FieldDefinition>,
}

impl CategoryTemplate {
    /// Create a template, rejecting duplicate field keys.
    pub fn new(category: CategoryKey, fields: Vec<FieldDefinition>) -> Result<Self> {
        let mut template = Self {
            category,
            fields: Vec::with_capacity(fields.len()),
        };
        for field in fields {
            template.push_field(field)?;
        }
        Ok(template)
    }

    pub fn category(&self) -> &CategoryKey {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.category.name
    }

    pub fn slug(&self) -> &str {
        &self.category.slug
    }

    /// Fields in display order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FieldDefinition> {
        self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a field at the end of the list.
    pub fn push_field(&mut self, field: FieldDefinition) -> Result<()> {
        if self.contains_key(&field.key) {
            return Err(SpecsError::DuplicateFieldKey { key: field.key });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Remove a field, keeping the order of the remaining ones.
    pub fn remove_field(&mut self, key: &str) -> Result<FieldDefinition> {
        let idx = self.require_position(key)?;
        Ok(self.fields.remove(idx))
    }

    /// Move a field to `to_index`, shifting the fields in between.
    pub fn move_field(&mut self, key: &str, to_index: usize) -> Result<()> {
        let from = self.require_position(key)?;
        if to_index >= self.fields.len() {
            return Err(SpecsError::IndexOutOfRange {
                index: to_index,
                len: self.fields.len(),
            });
        }
        let field = self.fields.remove(from);
        self.fields.insert(to_index, field);
        Ok(())
    }

    /// Insert a copy of a field directly after the original under a fresh key.
    pub fn duplicate_field(&mut self, key: &str) -> Result<&FieldDefinition> {
        let idx = self.require_position(key)?;
        let mut copy = self.fields[idx].clone();
        copy.key = self.unused_copy_key(key);
        copy.label = format!("{} (copy)", copy.label);
        self.fields.insert(idx + 1, copy);
        Ok(&self.fields[idx + 1])
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }

    fn require_position(&self, key: &str) -> Result<usize> {
        self.position(key).ok_or_else(|| SpecsError::FieldNotFound {
            key: key.to_string(),
        })
    }

    fn unused_copy_key(&self, key: &str) -> String {
        let base = format!("{key}_copy");
        if !self.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.contains_key(candidate))
            .unwrap_or(base)
    }
}

/// Lowercase URL slug: ASCII alphanumerics kept, other runs collapsed to `-`.
pub fn slugify(text: &str) -> String {
    collapse(text, '-')
}

/// Derive a snake_case field key from a display label.
pub fn key_from_label(label: &str) -> String {
    collapse(label, '_')
}

fn collapse(text: &str, separator: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push(separator);
            }
            pending = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_template() -> CategoryTemplate {
        CategoryTemplate::new(
            CategoryKey::new("Processors (CPU)"),
            vec![
                FieldDefinition::text("socket", "Socket").required(),
                FieldDefinition::number("cores", "Cores"),
                FieldDefinition::number("cache", "Cache").with_unit("MB"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn field_kind_serializes_inline_as_type() {
        let field = FieldDefinition::select("form", "Form factor", ["ATX", "mATX"]).required();
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["options"], serde_json::json!(["ATX", "mATX"]));
        assert_eq!(json["required"], true);
        assert!(json.get("unit").is_none());
    }

    #[test]
    fn non_select_field_has_no_options_key() {
        let json = serde_json::to_value(FieldDefinition::boolean("ecc", "ECC")).unwrap();
        assert_eq!(json["type"], "boolean");
        assert!(json.get("options").is_none());
    }

    #[test]
    fn field_definition_json_round_trip() {
        let field = FieldDefinition::number("baseClock", "Base clock")
            .required()
            .with_unit("GHz")
            .with_placeholder("3.5")
            .with_description("Nominal frequency");
        let json = serde_json::to_string(&field).unwrap();
        let parsed: FieldDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(field, parsed);
    }

    #[test]
    fn scalar_value_untagged() {
        let values: Vec<ScalarValue> = serde_json::from_str(r#"[true, 3.5, "x", 4]"#).unwrap();
        assert_eq!(values[0], ScalarValue::Bool(true));
        assert_eq!(values[1], ScalarValue::Number(3.5));
        assert_eq!(values[2], ScalarValue::String("x".into()));
        assert_eq!(values[3], ScalarValue::Number(4.0));
    }

    #[test]
    fn scalar_value_display() {
        assert_eq!(ScalarValue::from(4i64).to_string(), "4");
        assert_eq!(ScalarValue::from(3.5).to_string(), "3.5");
        assert_eq!(ScalarValue::from(false).to_string(), "false");
        assert_eq!(ScalarValue::from("LGA1700").to_string(), "LGA1700");
    }

    #[test]
    fn scalar_value_serializes_numbers_as_stored_text() {
        let values = vec![
            ScalarValue::from(16i64),
            ScalarValue::from(5.7),
            ScalarValue::from(f64::NAN),
            ScalarValue::from(f64::INFINITY),
            ScalarValue::from(f64::NEG_INFINITY),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[16,5.7,"NaN","inf","-inf"]"#
        );
    }

    #[test]
    fn slug_and_key_derivation() {
        assert_eq!(slugify("Processors (CPU)"), "processors-cpu");
        assert_eq!(slugify("  Graphics Cards  "), "graphics-cards");
        assert_eq!(key_from_label("Base Clock (GHz)"), "base_clock_ghz");
        assert_eq!(key_from_label("***"), "");
    }

    #[test]
    fn category_key_derives_slug() {
        let key = CategoryKey::new("Processors (CPU)");
        assert_eq!(key.name, "Processors (CPU)");
        assert_eq!(key.slug, "processors-cpu");
    }

    #[test]
    fn new_rejects_duplicate_keys() {
        let result = CategoryTemplate::new(
            CategoryKey::new("Memory"),
            vec![
                FieldDefinition::number("size", "Size"),
                FieldDefinition::text("size", "Size again"),
            ],
        );
        assert!(matches!(result, Err(SpecsError::DuplicateFieldKey { key }) if key == "size"));
    }

    #[test]
    fn push_and_remove_preserve_order() {
        let mut template = cpu_template();
        template
            .push_field(FieldDefinition::boolean("igpu", "Integrated graphics"))
            .unwrap();
        let removed = template.remove_field("cores").unwrap();
        assert_eq!(removed.key, "cores");
        assert_eq!(
            template.keys().collect::<Vec<_>>(),
            vec!["socket", "cache", "igpu"]
        );
        assert!(template.remove_field("cores").is_err());
    }

    #[test]
    fn move_field_reorders() {
        let mut template = cpu_template();
        template.move_field("cache", 0).unwrap();
        assert_eq!(
            template.keys().collect::<Vec<_>>(),
            vec!["cache", "socket", "cores"]
        );
        template.move_field("cache", 2).unwrap();
        assert_eq!(
            template.keys().collect::<Vec<_>>(),
            vec!["socket", "cores", "cache"]
        );
        assert!(matches!(
            template.move_field("cache", 3),
            Err(SpecsError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn duplicate_field_inserts_after_original() {
        let mut template = cpu_template();
        let copy = template.duplicate_field("socket").unwrap();
        assert_eq!(copy.key, "socket_copy");
        assert_eq!(copy.label, "Socket (copy)");
        assert!(copy.required);

        let second = template.duplicate_field("socket").unwrap();
        assert_eq!(second.key, "socket_copy_2");
        assert_eq!(
            template.keys().collect::<Vec<_>>(),
            vec!["socket", "socket_copy_2", "socket_copy", "cores", "cache"]
        );
    }
}
