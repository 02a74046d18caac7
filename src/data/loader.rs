//! CSV ingest for the project and task exports.
//!
//! Bytes are decoded with the configured legacy encoding, optionally
//! gunzipped, then parsed by header name. Columns that are missing from a file
//! simply yield `None` for every row.

use crate::config::DataConfig;
use crate::error::{DataError, DataResult};
use crate::normalize::{normalize_identifier, parse_date_tolerant, strip_markup};
use crate::types::{Project, Task};
use csv::StringRecord;
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Column headers of the project export.
pub mod project_columns {
    pub const ID: &str = "Project ID";
    pub const KEY: &str = "Project Key";
    pub const STATUS: &str = "Status";
    pub const PRIORITY: &str = "Priority";
    pub const TYPE: &str = "Project Type";
    pub const DEPARTMENT: &str = "Department";
    pub const FUNDING_AGENCY: &str = "Funding Agency";
    pub const BENEFICIARY_COUNT: &str = "Beneficiary Count";
    pub const ESTIMATED_COST: &str = "Estimated Cost";
    pub const EXPECTED_START: &str = "Expected Start Date";
    pub const EXPECTED_END: &str = "Expected End Date";
}

/// Column headers of the task export.
pub mod task_columns {
    pub const ID: &str = "Task ID";
    pub const SUBJECT: &str = "Task Subject";
    pub const DESCRIPTION: &str = "Task Description";
    pub const OWNER: &str = "Task Owner";
    pub const TYPE: &str = "Task Type";
    pub const STATUS: &str = "Task Status";
    pub const STATUS_FALLBACK: &str = "Status";
    pub const PRIORITY: &str = "Task Priority";
    pub const OUTCOME: &str = "Task Outcome";
    pub const VERIFICATION: &str = "Means of Verification";
    pub const COMPLETED_DATE: &str = "Task Completed Date";
    pub const POTENTIAL_RISK: &str = "Potential Risk";
    pub const RISK_MITIGATION: &str = "Risk Mitigation Plan";
    pub const EXPECTED_START: &str = "Expected Start Date";
    pub const EXPECTED_END: &str = "Expected End Date";
    pub const APPROVED_BUDGET: &str = "Approved Budget";
    pub const ACCRUED_BUDGET: &str = "Accrued Budget";
    pub const EXPECTED_COST: &str = "Expected Cost";
    pub const ACTUAL_COST: &str = "Actual Cost";
    pub const ANNUAL_TARGET: &str = "Annual Target";
    pub const PROJECT_NAME: &str = "Project Name";
    pub const KEY: &str = "Project Key";
    pub const PARENT: &str = "Parent Task";
}

/// Read a file into a `String`, gunzipping `.gz` files and decoding with the
/// given `encoding_rs` label. A leading BOM overrides the label.
pub fn read_text(path: &Path, encoding_label: &str) -> DataResult<String> {
    let encoding = encoding_rs::Encoding::for_label(encoding_label.trim().as_bytes())
        .ok_or_else(|| DataError::UnknownEncoding(encoding_label.to_string()))?;

    let raw = std::fs::read(path).map_err(|e| DataError::io(path, e))?;
    let bytes = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut decoded = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|source| DataError::Gzip {
                path: path.to_path_buf(),
                source,
            })?;
        decoded
    } else {
        raw
    };

    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(
            path = %path.display(),
            encoding = used.name(),
            "Replaced undecodable bytes while reading"
        );
    }
    Ok(text.into_owned())
}

/// A parsed CSV file with its header index.
struct Table<'c> {
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
    config: &'c DataConfig,
}

impl<'c> Table<'c> {
    fn read(path: &Path, config: &'c DataConfig) -> DataResult<Self> {
        let text = read_text(path, &config.encoding)?;
        Self::parse(path, &text, config)
    }

    fn parse(path: &Path, text: &str, config: &'c DataConfig) -> DataResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers().map_err(|e| DataError::csv(path, e))?;
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    // Header is line 1
                    warn!(path = %path.display(), line = index + 2, error = %e, "Skipping unreadable record");
                }
            }
        }
        debug!(path = %path.display(), rows = records.len(), "Parsed CSV");

        Ok(Self {
            columns,
            records,
            config,
        })
    }

    fn require(&self, path: &Path, column: &str) -> DataResult<()> {
        if self.columns.contains_key(column) {
            Ok(())
        } else {
            Err(DataError::missing_column(path, column))
        }
    }

    /// Trimmed raw text of a cell, `None` only when the column or cell is absent.
    fn raw(&self, record: &StringRecord, column: &str) -> Option<String> {
        let index = *self.columns.get(column)?;
        record.get(index).map(|s| s.trim().to_string())
    }

    /// Cell value with blanks and missing-value sentinels mapped to `None`.
    fn cell(&self, record: &StringRecord, column: &str) -> Option<String> {
        self.raw(record, column).filter(|value| {
            !value.is_empty() && !self.config.missing_values.iter().any(|m| m == value)
        })
    }

    /// Linking key: normalized, blank means absent.
    fn key(&self, record: &StringRecord, column: &str) -> Option<String> {
        self.cell(record, column)
            .map(|k| normalize_identifier(&k))
            .filter(|k| !k.is_empty())
    }
}

/// Load the project export.
pub fn load_projects(path: &Path, config: &DataConfig) -> DataResult<Vec<Project>> {
    use project_columns as col;

    let table = Table::read(path, config)?;
    table.require(path, col::ID)?;

    let parse_date = |text: &Option<String>| {
        text.as_deref()
            .and_then(|t| parse_date_tolerant(t, &config.date_not_recorded))
    };

    let projects: Vec<Project> = table
        .records
        .iter()
        .map(|record| {
            let id = table.raw(record, col::ID).unwrap_or_default();
            let expected_start = table.cell(record, col::EXPECTED_START);
            let expected_end = table.cell(record, col::EXPECTED_END);
            Project {
                id_clean: normalize_identifier(&id),
                id,
                key: table.key(record, col::KEY),
                status: table.cell(record, col::STATUS),
                priority: table.cell(record, col::PRIORITY),
                project_type: table.cell(record, col::TYPE),
                department: table.cell(record, col::DEPARTMENT),
                funding_agency: table.cell(record, col::FUNDING_AGENCY),
                beneficiary_count: table.cell(record, col::BENEFICIARY_COUNT),
                estimated_cost: table.cell(record, col::ESTIMATED_COST),
                start: parse_date(&expected_start),
                end: parse_date(&expected_end),
                expected_start,
                expected_end,
            }
        })
        .collect();

    let undated = projects
        .iter()
        .filter(|p| p.start.is_none() && p.end.is_none())
        .count();
    info!(
        path = %path.display(),
        projects = projects.len(),
        undated,
        "Loaded projects"
    );
    Ok(projects)
}

/// Load the task export.
pub fn load_tasks(path: &Path, config: &DataConfig) -> DataResult<Vec<Task>> {
    use task_columns as col;

    let table = Table::read(path, config)?;
    table.require(path, col::ID)?;

    let tasks: Vec<Task> = table
        .records
        .iter()
        .map(|record| Task {
            id: table.raw(record, col::ID).unwrap_or_default(),
            subject: table.cell(record, col::SUBJECT),
            description: strip_markup(table.cell(record, col::DESCRIPTION).as_deref()),
            owner: table.cell(record, col::OWNER),
            task_type: table.cell(record, col::TYPE),
            status: table
                .cell(record, col::STATUS)
                .or_else(|| table.cell(record, col::STATUS_FALLBACK)),
            priority: table.cell(record, col::PRIORITY),
            outcome: table.cell(record, col::OUTCOME),
            verification: table.cell(record, col::VERIFICATION),
            completed_date: table.cell(record, col::COMPLETED_DATE),
            potential_risk: table.cell(record, col::POTENTIAL_RISK),
            risk_mitigation: table.cell(record, col::RISK_MITIGATION),
            expected_start: table.cell(record, col::EXPECTED_START),
            expected_end: table.cell(record, col::EXPECTED_END),
            approved_budget: table.cell(record, col::APPROVED_BUDGET),
            accrued_budget: table.cell(record, col::ACCRUED_BUDGET),
            expected_cost: table.cell(record, col::EXPECTED_COST),
            actual_cost: table.cell(record, col::ACTUAL_COST),
            annual_target: table.cell(record, col::ANNUAL_TARGET),
            project_name: table.cell(record, col::PROJECT_NAME),
            key: table.key(record, col::KEY),
            parent: table.cell(record, col::PARENT),
        })
        .collect();

    let standalone = tasks.iter().filter(|t| t.is_standalone()).count();
    info!(
        path = %path.display(),
        tasks = tasks.len(),
        standalone,
        "Loaded tasks"
    );
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_latin1_bytes_decode() {
        let dir = TempDir::new().unwrap();
        // "Caf\xe9" is "Café" in ISO-8859-1 and invalid UTF-8
        let path = write(&dir, "p.csv", b"Project ID,Project Key\nCaf\xe9,K1\n");
        let projects = load_projects(&path, &DataConfig::default()).unwrap();
        assert_eq!(projects[0].id, "Caf\u{e9}");
    }

    #[test]
    fn test_missing_optional_columns_are_none() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "p.csv", b"Project ID\nAlpha\n");
        let projects = load_projects(&path, &DataConfig::default()).unwrap();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].key.is_none());
        assert!(projects[0].status.is_none());
    }

    #[test]
    fn test_missing_required_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.csv", b"Task Subject\nDig\n");
        let err = load_tasks(&path, &DataConfig::default()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "Task ID"));
    }

    #[test]
    fn test_unknown_encoding() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "p.csv", b"Project ID\nA\n");
        let config = DataConfig {
            encoding: "no-such-encoding".into(),
            ..DataConfig::default()
        };
        assert!(matches!(
            load_projects(&path, &config),
            Err(DataError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_sentinels_blanks_and_markup() {
        let dir = TempDir::new().unwrap();
        let csv = "Task ID,Task Subject,Task Description,Project Key,Parent Task,Approved Budget\n\
                   7, Survey ,<p>Walk the <i>site</i></p>,  ,n.a,n.a\n";
        let path = write(&dir, "t.csv", csv.as_bytes());
        let tasks = load_tasks(&path, &DataConfig::default()).unwrap();
        let task = &tasks[0];
        assert_eq!(task.subject.as_deref(), Some("Survey"));
        assert_eq!(task.description.as_deref(), Some("Walk the site"));
        assert!(task.key.is_none());
        assert!(task.parent.is_none());
        assert!(task.approved_budget.is_none());
    }

    #[test]
    fn test_status_falls_back_to_status_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.csv", b"Task ID,Status\n1,Done\n");
        let tasks = load_tasks(&path, &DataConfig::default()).unwrap();
        assert_eq!(tasks[0].status.as_deref(), Some("Done"));
    }

    #[test]
    fn test_project_dates_tolerant() {
        let dir = TempDir::new().unwrap();
        let csv = "Project ID,Expected Start Date,Expected End Date\n\
                   A,2024-01-10,Date not recorded\n\
                   B,garbage,12/31/2024\n";
        let path = write(&dir, "p.csv", csv.as_bytes());
        let projects = load_projects(&path, &DataConfig::default()).unwrap();
        assert_eq!(projects[0].start, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(projects[0].end, None);
        assert_eq!(projects[0].expected_end.as_deref(), Some("Date not recorded"));
        assert_eq!(projects[1].start, None);
        assert_eq!(projects[1].end, NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "p.csv", b"Project ID,Project Key,Status\nA,K1\nB,K2,Open,extra\n");
        let projects = load_projects(&path, &DataConfig::default()).unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects[0].status.is_none());
        assert_eq!(projects[1].status.as_deref(), Some("Open"));
    }

    #[test]
    fn test_gzip_input() {
        let dir = TempDir::new().unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"Task ID,Project Key\n1,K1\n").unwrap();
        let path = write(&dir, "t.csv.gz", &encoder.finish().unwrap());
        let tasks = load_tasks(&path, &DataConfig::default()).unwrap();
        assert_eq!(tasks[0].key.as_deref(), Some("K1"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_projects(Path::new("/nonexistent/p.csv"), &DataConfig::default()).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
