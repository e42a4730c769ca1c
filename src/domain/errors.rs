//! Domain error types
//!
//! This module defines the error hierarchy for Hourglass. Errors carry the
//! bucket, table and object path they concern so that a failed run can be
//! diagnosed from the log line alone. Third-party error types are flattened
//! into strings at the adapter boundary.

use thiserror::Error;

/// Main Hourglass error type
#[derive(Debug, Error)]
pub enum HourglassError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/connection errors (database pools, object store clients)
    #[error("Connection error: {0}")]
    Connection(String),

    /// No persisted marker row exists for the key
    #[error("No export marker for bucket '{bucket}' and table '{table}'")]
    MarkerNotFound { bucket: String, table: String },

    /// The persisted marker no longer matches the one this run started from
    #[error(
        "Export marker for bucket '{bucket}' and table '{table}' changed concurrently (expected {expected})"
    )]
    MarkerConflict {
        bucket: String,
        table: String,
        expected: String,
    },

    /// Malformed key segments, file names or timestamps
    #[error("Parse error: {0}")]
    Parse(String),

    /// Object store failures
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Query, delete and bulk load failures
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl HourglassError {
    /// Process exit code the CLI reports for this error
    ///
    /// 2 for configuration problems, 4 for connectivity, 5 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            HourglassError::Configuration(_) | HourglassError::Validation(_) => 2,
            HourglassError::Connection(_) => 4,
            HourglassError::Storage(StorageError::ClientBuild(_)) => 2,
            _ => 5,
        }
    }

    /// Short machine-friendly label used in run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            HourglassError::Configuration(_) => "configuration",
            HourglassError::Connection(_) => "connection",
            HourglassError::MarkerNotFound { .. } => "marker_not_found",
            HourglassError::MarkerConflict { .. } => "marker_conflict",
            HourglassError::Parse(_) => "parse",
            HourglassError::Storage(_) => "storage",
            HourglassError::Database(_) => "database",
            HourglassError::Validation(_) => "validation",
            HourglassError::Serialization(_) => "serialization",
            HourglassError::Io(_) => "io",
        }
    }
}

/// Object store errors
///
/// Every variant names the operation, bucket and key involved.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Listing a prefix failed
    #[error("Failed to list '{prefix}' in bucket '{bucket}': {message}")]
    ListFailed {
        bucket: String,
        prefix: String,
        message: String,
    },

    /// Uploading an object failed
    #[error("Failed to upload '{path}' to bucket '{bucket}': {message}")]
    PutFailed {
        bucket: String,
        path: String,
        message: String,
    },

    /// Reading object metadata failed
    #[error("Failed to read metadata of '{path}' in bucket '{bucket}': {message}")]
    HeadFailed {
        bucket: String,
        path: String,
        message: String,
    },

    /// The stored object does not have the size that was uploaded
    #[error("Object '{path}' in bucket '{bucket}' is {actual} bytes, expected {expected}")]
    LengthMismatch {
        bucket: String,
        path: String,
        expected: u64,
        actual: u64,
    },

    /// The object store client could not be constructed
    #[error("Failed to build object store client: {0}")]
    ClientBuild(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for HourglassError {
    fn from(err: std::io::Error) -> Self {
        HourglassError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HourglassError {
    fn from(err: serde_json::Error) -> Self {
        HourglassError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HourglassError {
    fn from(err: toml::de::Error) -> Self {
        HourglassError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hourglass_error_display() {
        let err = HourglassError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_marker_not_found_names_key() {
        let err = HourglassError::MarkerNotFound {
            bucket: "archive".to_string(),
            table: "events".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("archive"));
        assert!(message.contains("events"));
    }

    #[test]
    fn test_storage_error_conversion() {
        let storage_err = StorageError::PutFailed {
            bucket: "archive".to_string(),
            path: "events/2023/06/15/events-2023061509.txt".to_string(),
            message: "connection reset".to_string(),
        };
        let err: HourglassError = storage_err.into();
        assert!(matches!(err, HourglassError::Storage(_)));
        assert!(err.to_string().contains("events-2023061509.txt"));
    }

    #[test]
    fn test_every_kind_label_is_distinct() {
        let errors = [
            HourglassError::Configuration("x".into()),
            HourglassError::Connection("x".into()),
            HourglassError::MarkerNotFound {
                bucket: "archive".into(),
                table: "events".into(),
            },
            HourglassError::MarkerConflict {
                bucket: "archive".into(),
                table: "events".into(),
                expected: "2023-06-15T09".into(),
            },
            HourglassError::Parse("x".into()),
            HourglassError::Storage(StorageError::ClientBuild("x".into())),
            HourglassError::Database("x".into()),
            HourglassError::Validation("x".into()),
            HourglassError::Serialization("x".into()),
            HourglassError::Io("x".into()),
        ];
        let labels: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(labels.len(), errors.len());
        assert!(!labels.contains("other"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(HourglassError::Configuration("x".into()).exit_code(), 2);
        assert_eq!(HourglassError::Validation("x".into()).exit_code(), 2);
        assert_eq!(HourglassError::Connection("x".into()).exit_code(), 4);
        assert_eq!(HourglassError::Database("x".into()).exit_code(), 5);
        assert_eq!(
            HourglassError::Storage(StorageError::ClientBuild("x".into())).exit_code(),
            2
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: HourglassError = io_err.into();
        assert!(matches!(err, HourglassError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: HourglassError = json_err.into();
        assert!(matches!(err, HourglassError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: HourglassError = toml_err.into();
        assert!(matches!(err, HourglassError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_kind_labels() {
        let err = HourglassError::MarkerConflict {
            bucket: "archive".into(),
            table: "events".into(),
            expected: "2023-06-15T09".into(),
        };
        assert_eq!(err.kind(), "marker_conflict");
        let _: &dyn std::error::Error = &err;
    }
}
