//! Per-kind record schemas: the ordered field allowlist, each field's expected JSON type,
//! and where the transformer finds it in a raw source record.
//!
//! Both the transformer and the validator read these tables; neither keeps its own list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Item,
    Move,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Move => "move",
        }
    }

    pub fn schema(&self) -> &'static RecordSchema {
        match self {
            Self::Item => &ITEM_SCHEMA,
            Self::Move => &MOVE_SCHEMA,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "item" | "items" => Ok(Self::Item),
            "move" | "moves" => Ok(Self::Move),
            other => Err(format!("unknown record kind '{other}' (expected item or move)")),
        }
    }
}

/// Expected JSON type of a normalized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Number,
    /// Number or `null`.
    NullableNumber,
}

impl FieldKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::NullableNumber => value.is_null() || value.is_number(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::NullableNumber => "number or null",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a normalized field's value inside a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Locale-keyed mapping at this top-level key; the configured locale is selected.
    Localized(&'static str),
    /// Variant-keyed mapping at this top-level key; the description selector is selected.
    Variant(&'static str),
    /// JSON pointer, copied verbatim. Absent is an error unless the field is nullable.
    Pointer(&'static str),
    /// JSON pointer into a flag map; absent means `false`.
    Flag(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub source: FieldSource,
}

const fn field(name: &'static str, kind: FieldKind, source: FieldSource) -> FieldSpec {
    FieldSpec { name, kind, source }
}

#[derive(Debug)]
pub struct RecordSchema {
    pub kind: RecordKind,
    /// Field holding the display name the file name is derived from.
    pub name_field: &'static str,
    pub fields: &'static [FieldSpec],
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.name)
    }

    /// True when transforming this kind needs a description variant selector.
    pub fn uses_variant(&self) -> bool {
        self.fields
            .iter()
            .any(|spec| matches!(spec.source, FieldSource::Variant(_)))
    }
}

pub static ITEM_SCHEMA: RecordSchema = RecordSchema {
    kind: RecordKind::Item,
    name_field: "name",
    fields: &[
        field("name", FieldKind::String, FieldSource::Localized("name")),
        field("sell_price", FieldKind::NullableNumber, FieldSource::Pointer("/sell_price")),
        field("holdable", FieldKind::Boolean, FieldSource::Flag("/flags/holdable")),
        field("battle", FieldKind::Boolean, FieldSource::Flag("/flags/battle")),
        field("category", FieldKind::String, FieldSource::Pointer("/category")),
        field("subcategory", FieldKind::String, FieldSource::Pointer("/subcategory")),
    ],
};

pub static MOVE_SCHEMA: RecordSchema = RecordSchema {
    kind: RecordKind::Move,
    name_field: "name",
    fields: &[
        field("id", FieldKind::Number, FieldSource::Pointer("/index")),
        field("name", FieldKind::String, FieldSource::Localized("name")),
        field("type", FieldKind::String, FieldSource::Pointer("/type")),
        field("category", FieldKind::String, FieldSource::Pointer("/category")),
        field("pp", FieldKind::Number, FieldSource::Pointer("/pp")),
        field("power", FieldKind::NullableNumber, FieldSource::Pointer("/power")),
        field("accuracy", FieldKind::NullableNumber, FieldSource::Pointer("/accuracy")),
        field("priority", FieldKind::Number, FieldSource::Pointer("/priority")),
        field("target", FieldKind::String, FieldSource::Pointer("/target")),
        field("contact", FieldKind::Boolean, FieldSource::Flag("/flags/contact")),
        field("affected_by_protect", FieldKind::Boolean, FieldSource::Flag("/flags/protect")),
        field("affected_by_magic_coat", FieldKind::Boolean, FieldSource::Flag("/flags/magic_coat")),
        field("affected_by_snatch", FieldKind::Boolean, FieldSource::Flag("/flags/snatch")),
        field("affected_by_mirror_move", FieldKind::Boolean, FieldSource::Flag("/flags/mirror_move")),
        field("affected_by_kings_rock", FieldKind::Boolean, FieldSource::Flag("/flags/kings_rock")),
        field("description", FieldKind::String, FieldSource::Variant("description")),
    ],
};
