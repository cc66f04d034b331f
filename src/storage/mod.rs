// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::records::filter::Filters;
use crate::records::RecordSet;
use crate::utils::error::StorageError;

const EXPORT_PREFIX: &str = "us_companies_revenue";

/// Describes one export, written next to the CSV as JSON.
#[derive(Debug, Serialize)]
pub struct ExportMetadata<'a> {
    pub source_url: &'a str,
    pub row_count: usize,
    pub columns: &'a [String],
    pub filters: &'a Filters,
    pub export_timestamp: String,
}

pub struct ExportManager {
    base_dir: PathBuf,
}

impl ExportManager {
    /// Creates a new ExportManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes the Record Set as CSV, returning the file path.
    pub fn save_csv(&self, records: &RecordSet, at: DateTime<Local>) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(export_filename(at));
        let payload = to_csv_string(records)?;

        fs::write(&file_path, payload)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved {} rows to {}", records.len(), file_path.display());
        Ok(file_path)
    }

    /// Writes the JSON sidecar for an export made at `at`.
    pub fn save_metadata(&self, metadata: &ExportMetadata, at: DateTime<Local>) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", export_stem(at)));

        let metadata_str = serde_json::to_string_pretty(metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the raw page for inspecting structure changes (`--debug`).
    pub fn save_raw_page(&self, html: &str, at: DateTime<Local>) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("raw_page_{}.html", at.format("%Y%m%d_%H%M%S")));
        fs::write(&file_path, html)
            .map_err(StorageError::IoError)?;
        tracing::info!("Saved raw page to: {}", file_path.display());
        Ok(file_path)
    }
}

fn export_stem(at: DateTime<Local>) -> String {
    format!("{}_{}", EXPORT_PREFIX, at.format("%Y%m%d_%H%M%S"))
}

/// `us_companies_revenue_<YYYYMMDD>_<HHMMSS>.csv`
pub fn export_filename(at: DateTime<Local>) -> String {
    format!("{}.csv", export_stem(at))
}

/// Header row plus one line per row; no index column, missing values empty.
pub fn to_csv_string(records: &RecordSet) -> Result<String, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(records.headers())?;
    for row in records {
        writer.write_record(row.cells().iter().map(|c| c.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StorageError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::coerce::coerce_numeric_columns;
    use chrono::TimeZone;

    fn sample() -> RecordSet {
        let mut set = RecordSet::new(
            ["Rank", "Name", "Revenue (USD millions)", "Employees"].map(String::from).to_vec(),
        );
        set.push_row(["1", "Acme, Inc.", "$500,000", "120,000"].map(String::from).to_vec());
        set.push_row(["2", "Globex", "12.5", "N/A"].map(String::from).to_vec());
        coerce_numeric_columns(&mut set);
        set
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn filename_embeds_timestamp() {
        assert_eq!(export_filename(fixed_time()), "us_companies_revenue_20240305_140709.csv");
    }

    #[test]
    fn csv_has_header_and_no_index() {
        let csv = to_csv_string(&sample()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "Rank,Name,Revenue (USD millions),Employees",
                "1,\"Acme, Inc.\",500000,120000",
                "2,Globex,12.5,",
            ]
        );
    }

    #[test]
    fn export_writes_csv_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ExportManager::new(dir.path().join("exports")).unwrap();
        let records = sample();
        let filters = Filters::default();

        let csv_path = manager.save_csv(&records, fixed_time()).unwrap();
        assert!(csv_path.ends_with("us_companies_revenue_20240305_140709.csv"));
        assert_eq!(fs::read_to_string(&csv_path).unwrap(), to_csv_string(&records).unwrap());

        let metadata = ExportMetadata {
            source_url: "https://example.org/list",
            row_count: records.len(),
            columns: records.headers(),
            filters: &filters,
            export_timestamp: fixed_time().to_rfc3339(),
        };
        let meta_path = manager.save_metadata(&metadata, fixed_time()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(meta_path).unwrap()).unwrap();
        assert_eq!(json["row_count"], 2);
        assert_eq!(json["columns"][2], "Revenue (USD millions)");
        assert_eq!(json["filters"]["min_revenue"], 0.0);
        assert!(json["filters"]["industry"].is_null());
    }
}
