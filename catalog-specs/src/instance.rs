//! Specification values attached to one product.

use std::collections::BTreeMap;

use crate::codec;
use crate::error::Result;
use crate::types::{CategoryTemplate, ScalarValue};

/// The key→value attribute set stored on one product.
///
/// Values are a snapshot taken at edit time, not a live view of any template.
/// Which keys count as templated is decided per call to [`partition`], against
/// whatever template the caller currently has.
///
/// [`partition`]: SpecificationInstance::partition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecificationInstance {
    product_id: String,
    values: BTreeMap<String, ScalarValue>,
}

/// Values split by membership in a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Values whose key is a field of the template.
    pub templated: BTreeMap<String, ScalarValue>,
    /// Everything else.
    pub custom: BTreeMap<String, ScalarValue>,
}

impl SpecificationInstance {
    /// An empty set of values for a product.
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn from_values(product_id: impl Into<String>, values: BTreeMap<String, ScalarValue>) -> Self {
        Self {
            product_id: product_id.into(),
            values,
        }
    }

    /// Rebuild from a persisted blob. Malformed blobs yield an empty set.
    pub fn decode(product_id: impl Into<String>, text: &str) -> Self {
        Self::from_values(product_id, codec::decode(text))
    }

    /// Canonical persisted form of the values.
    pub fn encode(&self) -> Result<String> {
        codec::encode(&self.values)
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn values(&self) -> &BTreeMap<String, ScalarValue> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.values.get(key)
    }

    /// Insert or replace a value as given. Coercion happens at validation time.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<ScalarValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove_value(&mut self, key: &str) -> Option<ScalarValue> {
        self.values.remove(key)
    }

    /// Split the values against the category's current template.
    ///
    /// Without a template every value is custom.
    pub fn partition(&self, template: Option<&CategoryTemplate>) -> Partition {
        let mut partition = Partition::default();
        for (key, value) in &self.values {
            let bucket = match template {
                Some(t) if t.contains_key(key) => &mut partition.templated,
                _ => &mut partition.custom,
            };
            bucket.insert(key.clone(), value.clone());
        }
        partition
    }
}
