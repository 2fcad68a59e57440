//! Record data: canonical file naming, per-kind schemas, raw -> normalized transform,
//! validation of normalized collections, and the flat directory store they live in.

pub mod canonical;
pub mod normalize;
pub mod record;
pub mod registry;
pub mod schema;
pub mod store;
pub mod transform;
pub mod validate;

pub use canonical::{canonical_id, canonicalize, CanonicalId, CANONICAL_RULES, RECORD_EXTENSION};
pub use normalize::{normalize_dir, normalize_records, NormalizeReport, RecordFailure};
pub use record::NormalizedRecord;
pub use schema::{FieldKind, FieldSource, FieldSpec, RecordKind, RecordSchema};
pub use transform::{transform, Transformer, DEFAULT_LOCALE};
pub use validate::{
    validate, ValidationMode, ValidationReport, Validator, Violation, ViolationKind,
};
