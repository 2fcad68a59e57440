//! Normalized record: the allowlisted projection of a raw record, one per file.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::data::canonical::{canonical_id, CanonicalId};
use crate::data::schema::RecordKind;

/// Fields are kept in schema order so serialized output is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    kind: RecordKind,
    display_name: String,
    fields: Map<String, Value>,
}

impl NormalizedRecord {
    pub(crate) fn new(kind: RecordKind, display_name: String, fields: Map<String, Value>) -> Self {
        Self {
            kind,
            display_name,
            fields,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn canonical_id(&self) -> CanonicalId {
        canonical_id(&self.display_name)
    }

    /// File name this record must be written under.
    pub fn file_name(&self) -> String {
        self.canonical_id().file_name()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
