//! Error types for loading the project and task exports.
//!
//! Only loading can fail. Once a [`Dataset`](crate::data::Dataset) exists,
//! every filter and grouping step is total.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading one of the tabular sources.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decompress {}: {source}", .path.display())]
    Gzip {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),
}

impl DataError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(path: impl Into<PathBuf>, column: &str) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.to_string(),
        }
    }
}

/// Result type for data loading.
pub type DataResult<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message() {
        let err = DataError::missing_column("tasks.csv", "Task ID");
        assert_eq!(err.to_string(), "tasks.csv has no 'Task ID' column");
    }

    #[test]
    fn test_unknown_encoding_message() {
        let err = DataError::UnknownEncoding("klingon".into());
        assert_eq!(err.to_string(), "unknown text encoding: klingon");
    }
}
