use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A raw record could not be projected onto its normalized schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("raw record is not a JSON object")]
    NotAnObject,
    #[error("raw record is missing '{field}'")]
    MissingField { field: String },
    #[error("raw field '{field}' is not a string")]
    NotAString { field: String },
}

impl TransformError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Failures reading or writing record files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse JSON in '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize '{file_name}': {source}")]
    Serialize {
        file_name: String,
        source: serde_json::Error,
    },
    #[error("'{incoming}' canonicalizes to '{file_name}', already written for '{existing}'")]
    Collision {
        file_name: String,
        existing: String,
        incoming: String,
    },
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse registry '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write registry '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
}
