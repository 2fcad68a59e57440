use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::canonical::canonicalize;
use crate::data::schema::{FieldKind, RecordKind, RecordSchema};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    FilenameMismatch {
        expected: String,
        actual: String,
    },
    MissingField {
        field: String,
    },
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: Value,
    },
    NotAnObject,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilenameMismatch { .. } => "filename_mismatch",
            Self::MissingField { .. } => "missing_field",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::NotAnObject => "not_an_object",
        }
    }

    /// Field the violation is about, when it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::TypeMismatch { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FilenameMismatch { expected, actual } => {
                write!(f, "file is named '{actual}' but its name field maps to '{expected}'")
            }
            Self::MissingField { field } => write!(f, "missing required field '{field}'"),
            Self::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(f, "field '{field}' should be {expected}, found {actual}"),
            Self::NotAnObject => write!(f, "record is not a JSON object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub file_name: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.kind)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub records_checked: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn push(&mut self, file_name: impl Into<String>, kind: ViolationKind) {
        self.violations.push(Violation {
            file_name: file_name.into(),
            kind,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations_for<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |violation| violation.file_name == file_name)
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.records_checked += other.records_checked;
        self.violations.extend(other.violations);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Check every record and report every violation.
    #[default]
    Accumulate,
    /// Stop at the first violation.
    FailFast,
}

/// Checks normalized records of one kind against the file naming rule and the kind's schema.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    schema: &'static RecordSchema,
    mode: ValidationMode,
}

impl Validator {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            schema: kind.schema(),
            mode: ValidationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.schema.kind
    }

    pub fn validate<'a, I, S>(&self, records: I) -> ValidationReport
    where
        I: IntoIterator<Item = (S, &'a Value)>,
        S: AsRef<str>,
    {
        let mut report = ValidationReport::default();
        for (file_name, record) in records {
            let file_name = file_name.as_ref();
            report.records_checked += 1;
            let violations = self.check_record(file_name, record);
            if violations.is_empty() {
                debug!(file = file_name, kind = %self.schema.kind, "record ok");
                continue;
            }
            for kind in violations {
                debug!(file = file_name, violation = %kind, "validation failed");
                report.push(file_name, kind);
                if self.mode == ValidationMode::FailFast {
                    return report;
                }
            }
        }
        report
    }

    /// All violations for one record, filename check first, then fields in schema order.
    pub fn check_record(&self, file_name: &str, record: &Value) -> Vec<ViolationKind> {
        let Some(object) = record.as_object() else {
            return vec![ViolationKind::NotAnObject];
        };

        let mut violations = Vec::new();
        if let Some(violation) = self.check_file_name(file_name, object) {
            violations.push(violation);
        }
        for spec in self.schema.fields {
            match object.get(spec.name) {
                None => violations.push(ViolationKind::MissingField {
                    field: spec.name.to_string(),
                }),
                Some(value) if !spec.kind.accepts(value) => {
                    violations.push(type_mismatch(spec.name, spec.kind, value))
                }
                Some(_) => {}
            }
        }
        violations
    }

    fn check_file_name(&self, file_name: &str, object: &Map<String, Value>) -> Option<ViolationKind> {
        // A missing or non-string name is reported by the field checks.
        let display_name = object.get(self.schema.name_field)?.as_str()?;
        let expected = canonicalize(display_name);
        (expected != file_name).then(|| ViolationKind::FilenameMismatch {
            expected,
            actual: file_name.to_string(),
        })
    }
}

fn type_mismatch(field: &str, expected: FieldKind, actual: &Value) -> ViolationKind {
    ViolationKind::TypeMismatch {
        field: field.to_string(),
        expected: expected.as_str(),
        actual: actual.clone(),
    }
}

/// Validate `(file_name, record)` pairs of one kind, accumulating every violation.
pub fn validate(kind: RecordKind, records: &[(String, Value)]) -> ValidationReport {
    Validator::new(kind).validate(records.iter().map(|(name, value)| (name.as_str(), value)))
}
