//! Runtime configuration: optional YAML file, then `DEXDATA_*` environment overrides.
//! Command-line flags are applied on top by the CLI.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::store::REGISTRY_FILE_NAME;
use crate::data::transform::DEFAULT_LOCALE;
use crate::errors::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "dexdata.yaml";
pub const DEFAULT_DATA_ROOT: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the dataset registry; registry paths are relative to it.
    pub data_root: PathBuf,
    pub locale: String,
    /// Description variant kept when normalizing moves. No default.
    pub description_key: Option<String>,
    pub fail_fast: bool,
    /// Recorded in the registry for each normalized dataset.
    pub data_version: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            locale: DEFAULT_LOCALE.to_string(),
            description_key: None,
            fail_fast: false,
            data_version: None,
        }
    }
}

impl Config {
    /// Load from `path` (or `DEXDATA_CONFIG`, or `dexdata.yaml` when present) and apply
    /// environment overrides. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os("DEXDATA_CONFIG").map(PathBuf::from));
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.is_file() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Apply `DEXDATA_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("DEXDATA_DATA_ROOT") {
            self.data_root = PathBuf::from(root);
        }
        if let Some(locale) = lookup("DEXDATA_LOCALE") {
            self.locale = locale;
        }
        if let Some(key) = lookup("DEXDATA_DESCRIPTION_KEY") {
            self.description_key = Some(key);
        }
        if let Some(version) = lookup("DEXDATA_DATA_VERSION") {
            self.data_version = Some(version);
        }
        if let Some(raw) = lookup("DEXDATA_FAIL_FAST") {
            self.fail_fast = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                key: "DEXDATA_FAIL_FAST",
                value: raw,
            })?;
        }
        Ok(())
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_root.join(REGISTRY_FILE_NAME)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
