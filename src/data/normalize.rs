//! Raw collection -> normalized collection.
//! Each raw record is transformed, checked against its schema, and written under its
//! canonical file name. A record that fails any step is reported and skipped; the rest
//! of the collection is still processed.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::store::{read_collection, RecordWriter};
use crate::data::transform::Transformer;
use crate::data::validate::Validator;
use crate::errors::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Raw file the failing record came from.
    pub source_file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    pub total_records: usize,
    /// Output file names, in input order.
    pub written: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

impl NormalizeReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn fail(&mut self, source_file: &str, reason: String) {
        debug!(file = source_file, %reason, "record not normalized");
        self.failures.push(RecordFailure {
            source_file: source_file.to_string(),
            reason,
        });
    }
}

pub fn normalize_records(
    raw_records: &[(String, Value)],
    transformer: &Transformer,
    writer: &mut RecordWriter,
) -> NormalizeReport {
    let validator = Validator::new(transformer.kind());
    let mut report = NormalizeReport {
        total_records: raw_records.len(),
        ..NormalizeReport::default()
    };

    for (source_file, raw) in raw_records {
        let record = match transformer.transform(raw) {
            Ok(record) => record,
            Err(err) => {
                report.fail(source_file, err.to_string());
                continue;
            }
        };

        let file_name = record.file_name();
        let violations = validator.check_record(&file_name, &record.to_value());
        if !violations.is_empty() {
            let reason = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            report.fail(source_file, reason);
            continue;
        }

        match writer.write(&record) {
            Ok(_) => {
                debug!(source = %source_file, output = %file_name, "normalized record");
                report.written.push(file_name);
            }
            Err(err) => report.fail(source_file, err.to_string()),
        }
    }

    info!(
        kind = %transformer.kind(),
        total = report.total_records,
        written = report.written.len(),
        failed = report.failures.len(),
        "normalized collection"
    );
    report
}

/// Read `raw_dir`, normalize every record into `out_dir`.
pub fn normalize_dir(
    raw_dir: &Path,
    out_dir: &Path,
    transformer: &Transformer,
) -> Result<NormalizeReport, StoreError> {
    let raw_records = read_collection(raw_dir)?;
    if raw_records.is_empty() {
        warn!(dir = %raw_dir.display(), "no raw JSON records found");
    }
    let mut writer = RecordWriter::create(out_dir)?;
    Ok(normalize_records(&raw_records, transformer, &mut writer))
}
