//! Dataset registry: kind, location and provenance of each normalized collection.
//! Written by `dexdata normalize`; read by `dexdata validate` to check every collection.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::data::schema::RecordKind;
use crate::errors::RegistryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetEntry {
    pub kind: RecordKind,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Collection directory, relative to the registry's directory.
    pub path: String,
}

pub type Registry = BTreeMap<String, DataSetEntry>;

/// Missing registry file reads as empty.
pub fn load_registry(path: &Path) -> Result<Registry, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Registry::new()),
        Err(source) => {
            return Err(RegistryError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_registry(path: &Path, registry: &Registry) -> Result<(), RegistryError> {
    let write_err = |source| RegistryError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut payload = serde_json::to_string_pretty(registry)
        .map_err(|err| write_err(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    payload.push('\n');
    fs::write(path, payload).map_err(write_err)
}

/// Insert or replace `name`, stamping `last_updated` with the current UTC time.
pub fn record_dataset(
    path: &Path,
    name: &str,
    mut entry: DataSetEntry,
) -> Result<Registry, RegistryError> {
    let mut registry = load_registry(path)?;
    entry.last_updated = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    registry.insert(name.to_string(), entry);
    save_registry(path, &registry)?;
    Ok(registry)
}
