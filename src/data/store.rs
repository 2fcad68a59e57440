//! Flat directory store: one JSON object per `*.json` file.
//! Reads a directory into `(file_name, value)` pairs and writes normalized records under
//! their canonical file name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::data::record::NormalizedRecord;
use crate::errors::StoreError;

pub const REGISTRY_FILE_NAME: &str = "registry.json";

/// Read every `*.json` file directly under `dir`, sorted by file name.
pub fn read_collection(dir: &Path) -> Result<Vec<(String, Value)>, StoreError> {
    read_collection_excluding(dir, None)
}

/// Like [read_collection], but skips the file at `excluded` (the dataset registry when a
/// collection shares the data root with it).
pub fn read_collection_excluding(
    dir: &Path,
    excluded: Option<&Path>,
) -> Result<Vec<(String, Value)>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::NotADirectory(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| StoreError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let excluded = excluded.and_then(|path| fs::canonicalize(path).ok());

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        if excluded.is_some() && fs::canonicalize(&path).ok() == excluded {
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let file_name = file_name.to_string();
        records.push((file_name, read_record(&path)?));
    }
    debug!(dir = %dir.display(), count = records.len(), "read collection");
    Ok(records)
}

pub fn read_record(path: &Path) -> Result<Value, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes normalized records into one output directory, refusing to write two records
/// to the same file name within a run.
#[derive(Debug)]
pub struct RecordWriter {
    dir: PathBuf,
    written: HashMap<String, String>,
}

impl RecordWriter {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            written: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Write `record` as indented JSON to `<dir>/<canonical file name>`. The file is
    /// written to a temporary sibling first and renamed into place.
    pub fn write(&mut self, record: &NormalizedRecord) -> Result<PathBuf, StoreError> {
        let file_name = record.file_name();
        if let Some(existing) = self.written.get(&file_name) {
            return Err(StoreError::Collision {
                file_name,
                existing: existing.clone(),
                incoming: record.display_name().to_string(),
            });
        }

        let mut payload =
            serde_json::to_string_pretty(record).map_err(|source| StoreError::Serialize {
                file_name: file_name.clone(),
                source,
            })?;
        payload.push('\n');

        let path = self.dir.join(&file_name);
        let staging = self.dir.join(format!("{file_name}.tmp"));
        fs::write(&staging, payload).map_err(|source| StoreError::Write {
            path: staging.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(StoreError::Write { path, source });
        }

        debug!(path = %path.display(), "wrote record");
        self.written
            .insert(file_name, record.display_name().to_string());
        Ok(path)
    }
}
