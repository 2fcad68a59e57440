//! Raw source record -> normalized record projection.
//!
//! The projection is driven entirely by the kind's [RecordSchema]: allowlisted fields are
//! copied verbatim (no type coercion), the display name comes from the locale-keyed name
//! map and the description from the variant-keyed description map. Every nested lookup
//! that can miss reports the dotted path it missed on.

use serde_json::{Map, Value};
use tracing::debug;

use crate::data::record::NormalizedRecord;
use crate::data::schema::{FieldSource, FieldSpec, RecordKind, RecordSchema};
use crate::errors::TransformError;

pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone)]
pub struct Transformer {
    schema: &'static RecordSchema,
    locale: String,
    description_key: String,
}

impl Transformer {
    /// `description_key` selects which description variant (e.g. an edition label) is
    /// kept. It has no default: raw records carry several parallel variants.
    pub fn new(kind: RecordKind, description_key: impl Into<String>) -> Self {
        Self {
            schema: kind.schema(),
            locale: DEFAULT_LOCALE.to_string(),
            description_key: description_key.into(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.schema.kind
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn description_key(&self) -> &str {
        &self.description_key
    }

    pub fn transform(&self, raw: &Value) -> Result<NormalizedRecord, TransformError> {
        let object = raw.as_object().ok_or(TransformError::NotAnObject)?;

        let mut fields = Map::new();
        for spec in self.schema.fields {
            let value = self.project_field(object, spec)?;
            fields.insert(spec.name.to_string(), value);
        }

        let display_name = match fields.get(self.schema.name_field) {
            Some(Value::String(name)) => name.clone(),
            Some(_) => {
                return Err(TransformError::NotAString {
                    field: self.schema.name_field.to_string(),
                })
            }
            None => return Err(TransformError::missing(self.schema.name_field)),
        };

        debug!(
            kind = %self.schema.kind,
            name = %display_name,
            "projected raw record"
        );
        Ok(NormalizedRecord::new(self.schema.kind, display_name, fields))
    }

    fn project_field(
        &self,
        object: &Map<String, Value>,
        spec: &FieldSpec,
    ) -> Result<Value, TransformError> {
        match spec.source {
            FieldSource::Localized(key) => keyed_string(object, key, &self.locale),
            FieldSource::Variant(key) => keyed_string(object, key, &self.description_key),
            FieldSource::Pointer(pointer) => match lookup(object, pointer) {
                Some(value) => Ok(value.clone()),
                None if spec.kind.accepts(&Value::Null) => Ok(Value::Null),
                None => Err(TransformError::missing(pointer_path(pointer))),
            },
            FieldSource::Flag(pointer) => {
                Ok(lookup(object, pointer).cloned().unwrap_or(Value::Bool(false)))
            }
        }
    }
}

/// Transform a raw move definition, keeping the description under `description_key`.
pub fn transform(raw: &Value, description_key: &str) -> Result<NormalizedRecord, TransformError> {
    Transformer::new(RecordKind::Move, description_key).transform(raw)
}

/// `object[map_key][entry_key]`, which must exist and be a string.
fn keyed_string(
    object: &Map<String, Value>,
    map_key: &str,
    entry_key: &str,
) -> Result<Value, TransformError> {
    let map = object
        .get(map_key)
        .and_then(Value::as_object)
        .ok_or_else(|| TransformError::missing(map_key))?;
    let path = format!("{map_key}.{entry_key}");
    match map.get(entry_key) {
        Some(value @ Value::String(_)) => Ok(value.clone()),
        Some(_) => Err(TransformError::NotAString { field: path }),
        None => Err(TransformError::missing(path)),
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, pointer: &str) -> Option<&'a Value> {
    let mut segments = pointer.trim_start_matches('/').split('/');
    let first = segments.next()?;
    let mut current = object.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn pointer_path(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}
