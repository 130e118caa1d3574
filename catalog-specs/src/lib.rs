//! Category specification templates and product specification values
//!
//! `catalog-specs` reconciles a mutable, per-category schema of product
//! attributes with the loosely typed values already stored on products. It
//! owns no storage: callers hand it persisted text blobs and get canonical
//! ones back.
//!
//! # Architecture
//!
//! - **Types**: `FieldDefinition` with a `FieldKind` sum type; `CategoryTemplate`
//!   is an ordered, key-unique list of fields
//! - **Normalizer**: repairs legacy and malformed schema payloads, never fails
//! - **Registry**: one `TemplateRegistry` per service, fuzzy lookup by name or slug
//! - **Validation**: per-type coercion, all field errors collected together
//! - **Instances**: product values partitioned into templated and custom keys
//!   against whatever template is current
//! - **Codec**: canonical JSON encode, repairing decode

pub mod codec;
pub mod config;
pub mod error;
pub mod instance;
pub mod logging;
pub mod normalize;
pub mod registry;
pub mod types;
pub mod validation;

pub use codec::{decode, decode_fields, encode, encode_fields, Canonical};
pub use config::SpecsConfig;
pub use error::{Result, SpecsError};
pub use instance::{Partition, SpecificationInstance};
pub use normalize::{normalize_fields, normalize_values, ShapeDetector, SHAPE_DETECTORS};
pub use registry::{LookupRule, TemplateRegistry};
pub use types::{
    key_from_label, slugify, CategoryKey, CategoryTemplate, FieldDefinition, FieldKind,
    ScalarValue,
};
pub use validation::{coerce, validate, validate_and_coerce, ValidationOutcome};
