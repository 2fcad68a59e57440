use std::fs;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::data::registry::{load_registry, record_dataset, DataSetEntry};
use crate::data::store::read_collection_excluding;
use crate::data::{
    canonicalize, normalize_dir, RecordKind, Transformer, ValidationMode, ValidationReport,
    Validator,
};
use crate::errors::StoreError;

#[derive(Debug, Parser)]
#[command(name = "dexdata", version, about = "Normalize and validate per-record JSON game data")]
pub struct Cli {
    /// YAML config file (defaults to $DEXDATA_CONFIG, then ./dexdata.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print the file name each display name must be stored under.
    Canonicalize {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Transform a directory of raw records into normalized records.
    Normalize {
        raw_dir: PathBuf,
        out_dir: PathBuf,
        #[arg(long, default_value = "move")]
        kind: RecordKind,
        /// Description variant to keep (e.g. an edition label).
        #[arg(long)]
        description_key: Option<String>,
        #[arg(long)]
        locale: Option<String>,
        /// Registry name for the output collection (defaults to the output directory name).
        #[arg(long)]
        dataset: Option<String>,
    },
    /// Check normalized records against file naming and schema rules.
    Validate {
        /// Collection directory; omit to validate every dataset in the registry.
        #[arg(requires = "kind")]
        dir: Option<PathBuf>,
        /// Record kind of the collection in DIR (registry entries carry their own).
        #[arg(long, requires = "dir")]
        kind: Option<RecordKind>,
        #[arg(long)]
        fail_fast: bool,
    },
}

pub fn parse_command(args: &[String]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match parse_command(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 2,
            };
            let _ = err.print();
            return code;
        }
    };

    if let Command::Canonicalize { names } = &cli.command {
        return handle_canonicalize(names);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 2;
        }
    };

    match cli.command {
        Command::Canonicalize { .. } => 0,
        Command::Normalize {
            raw_dir,
            out_dir,
            kind,
            description_key,
            locale,
            dataset,
        } => handle_normalize(
            &config,
            NormalizeArgs {
                raw_dir,
                out_dir,
                kind,
                description_key,
                locale,
                dataset,
            },
        ),
        Command::Validate {
            dir,
            kind,
            fail_fast,
        } => {
            let mode = if fail_fast || config.fail_fast {
                ValidationMode::FailFast
            } else {
                ValidationMode::Accumulate
            };
            match (dir, kind) {
                (Some(dir), Some(kind)) => handle_validate_dir(&config, &dir, kind, mode),
                (Some(_), None) => {
                    eprintln!("usage: dexdata validate <dir> --kind <item|move>");
                    2
                }
                (None, _) => handle_validate_registry(&config, mode),
            }
        }
    }
}

fn handle_canonicalize(names: &[String]) -> i32 {
    for name in names {
        println!("{}", canonicalize(name));
    }
    0
}

struct NormalizeArgs {
    raw_dir: PathBuf,
    out_dir: PathBuf,
    kind: RecordKind,
    description_key: Option<String>,
    locale: Option<String>,
    dataset: Option<String>,
}

fn handle_normalize(config: &Config, args: NormalizeArgs) -> i32 {
    let description_key = args
        .description_key
        .or_else(|| config.description_key.clone());
    let description_key = match description_key {
        Some(key) => key,
        None if !args.kind.schema().uses_variant() => String::new(),
        None => {
            eprintln!(
                "usage: dexdata normalize <raw-dir> <out-dir> --description-key <key> \
                 (or set description_key in config)"
            );
            return 2;
        }
    };
    let locale = args.locale.unwrap_or_else(|| config.locale.clone());
    let transformer = Transformer::new(args.kind, description_key).with_locale(locale);

    let report = match normalize_dir(&args.raw_dir, &args.out_dir, &transformer) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("normalize failed: {err}");
            return 1;
        }
    };

    for failure in &report.failures {
        eprintln!("- {}: {}", failure.source_file, failure.reason);
    }
    println!(
        "normalized {} of {} {} records into {}",
        report.written.len(),
        report.total_records,
        args.kind,
        args.out_dir.display()
    );

    let dataset = args.dataset.or_else(|| {
        args.out_dir
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
    });
    if let Some(dataset) = dataset {
        let entry = DataSetEntry {
            kind: args.kind,
            source: args.raw_dir.display().to_string(),
            data_version: config.data_version.clone(),
            last_updated: None,
            path: registry_relative_path(&config.data_root, &args.out_dir),
        };
        if let Err(err) = record_dataset(&config.registry_path(), &dataset, entry) {
            eprintln!("failed to update registry: {err}");
            return 1;
        }
    }

    if report.has_failures() {
        1
    } else {
        0
    }
}

fn handle_validate_dir(
    config: &Config,
    dir: &Path,
    kind: RecordKind,
    mode: ValidationMode,
) -> i32 {
    match validate_dir(config, dir, kind, mode) {
        Ok(report) => print_validation(&dir.display().to_string(), &report),
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

fn handle_validate_registry(config: &Config, mode: ValidationMode) -> i32 {
    let registry_path = config.registry_path();
    let registry = match load_registry(&registry_path) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    if registry.is_empty() {
        eprintln!("no datasets registered in {}", registry_path.display());
        eprintln!("usage: dexdata validate <dir> --kind <item|move>");
        return 2;
    }

    let mut exit = 0;
    for (name, entry) in &registry {
        let dir = config.data_root.join(&entry.path);
        let code = match validate_dir(config, &dir, entry.kind, mode) {
            Ok(report) => print_validation(name, &report),
            Err(err) => {
                eprintln!("[{name}] validation failed: {err}");
                1
            }
        };
        exit = exit.max(code);
        if exit != 0 && mode == ValidationMode::FailFast {
            break;
        }
    }
    exit
}

/// The registry file is only skipped when `dir` is the data root itself.
fn validate_dir(
    config: &Config,
    dir: &Path,
    kind: RecordKind,
    mode: ValidationMode,
) -> Result<ValidationReport, StoreError> {
    let registry_path = config.registry_path();
    let records = read_collection_excluding(dir, Some(&registry_path))?;
    Ok(Validator::new(kind)
        .with_mode(mode)
        .validate(records.iter().map(|(name, value)| (name.as_str(), value))))
}

fn print_validation(label: &str, report: &ValidationReport) -> i32 {
    if report.is_clean() {
        println!(
            "validation passed: {label} ({} records)",
            report.records_checked
        );
        return 0;
    }
    eprintln!(
        "validation failed: {label}: {} violation(s) in {} records checked",
        report.violations.len(),
        report.records_checked
    );
    for violation in &report.violations {
        eprintln!("- {violation}");
    }
    1
}

/// Registry paths are stored relative to the data root when the output lives under it.
/// Anything else is stored absolute so it resolves the same from any data root.
fn registry_relative_path(data_root: &Path, out_dir: &Path) -> String {
    match out_dir.strip_prefix(data_root) {
        Ok(relative) => relative.display().to_string(),
        Err(_) => fs::canonicalize(out_dir)
            .unwrap_or_else(|_| out_dir.to_path_buf())
            .display()
            .to_string(),
    }
}
