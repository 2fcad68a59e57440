//! Display name -> file name mapping for normalized records.
//!
//! Every normalized record lives at `<canonical id>.json`, where the id is derived from
//! the record's display name by [CANONICAL_RULES]. The rule set is deliberately narrow:
//! only the characters listed below are rewritten, everything else passes through.

use std::fmt;

use serde::Serialize;

/// Suffix appended to a canonical id to form the record's file name.
pub const RECORD_EXTENSION: &str = ".json";

/// Ordered rewrite rules applied after lowercasing. Order matters: the decomposed
/// "é" rule must run after the composed one.
pub const CANONICAL_RULES: &[(&str, &str)] = &[
    (".", ""),
    ("-", "_"),
    ("'", "_"),
    (" ", "_"),
    ("\u{e9}", "e"),
    ("e\u{301}", "e"),
];

/// File identifier derived from a display name (no extension).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
    pub fn from_display_name(display_name: &str) -> Self {
        let mut id = display_name.to_lowercase();
        for (pattern, replacement) in CANONICAL_RULES {
            if id.contains(pattern) {
                id = id.replace(pattern, replacement);
            }
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, RECORD_EXTENSION)
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn canonical_id(display_name: &str) -> CanonicalId {
    CanonicalId::from_display_name(display_name)
}

/// File name a record with this display name must be stored under, e.g.
/// `"King's Rock"` -> `"king_s_rock.json"`.
pub fn canonicalize(display_name: &str) -> String {
    canonical_id(display_name).file_name()
}
