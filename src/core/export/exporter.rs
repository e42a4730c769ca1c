//! Write one window's records to its hourly object

use crate::adapters::storage::ObjectStorage;
use crate::core::export::record::TxtRecord;
use crate::core::state::marker::ExportMarker;
use crate::domain::errors::HourglassError;
use crate::domain::Result;
use bytes::Bytes;
use sha2::{Digest, Sha256};

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Object key written
    pub path: String,
    /// Number of records (excluding the header)
    pub record_count: usize,
    /// Size of the uploaded body
    pub bytes: u64,
    /// Hex SHA-256 of the uploaded body
    pub checksum: String,
}

/// Renders records as a delimited text file and uploads it
pub struct Exporter {
    storage: ObjectStorage,
}

impl Exporter {
    pub fn new(storage: ObjectStorage) -> Self {
        Self { storage }
    }

    /// Upload `records` to `marker.full_path()`
    ///
    /// An empty slice produces a zero-byte object, so every exported hour
    /// has a file and the hierarchy stays contiguous. Re-exporting the same
    /// marker overwrites the object.
    ///
    /// # Errors
    ///
    /// Returns a Validation error if the marker names another bucket, and a
    /// Storage error naming the bucket and path if the upload fails.
    pub async fn export<R: TxtRecord>(
        &self,
        marker: &ExportMarker,
        records: &[R],
    ) -> Result<ExportOutcome> {
        self.check_bucket(marker)?;

        let body = render_records(records);
        let path = marker.full_path();
        let outcome = ExportOutcome {
            path: path.clone(),
            record_count: records.len(),
            bytes: body.len() as u64,
            checksum: format!("{:x}", Sha256::digest(&body)),
        };

        self.storage.put_text(&path, Bytes::from(body)).await?;

        tracing::info!(
            bucket = %marker.bucket(),
            table = %marker.table_name(),
            path = %outcome.path,
            records = outcome.record_count,
            bytes = outcome.bytes,
            checksum = %outcome.checksum,
            "Exported window"
        );
        Ok(outcome)
    }

    /// Stored size of the marker's object
    pub async fn object_length(&self, marker: &ExportMarker) -> Result<u64> {
        self.check_bucket(marker)?;
        self.storage.object_length(&marker.full_path()).await
    }

    fn check_bucket(&self, marker: &ExportMarker) -> Result<()> {
        if marker.bucket() != self.storage.bucket() {
            return Err(HourglassError::Validation(format!(
                "Marker {marker} targets bucket '{}' but storage is bound to '{}'",
                marker.bucket(),
                self.storage.bucket()
            )));
        }
        Ok(())
    }
}

/// Render records as header line plus one line per record
///
/// Every line, including the last, ends in `\n`. No records means no bytes.
pub fn render_records<R: TxtRecord>(records: &[R]) -> Vec<u8> {
    let Some(first) = records.first() else {
        return Vec::new();
    };

    let mut body = String::new();
    body.push_str(&first.txt_header());
    body.push('\n');
    for record in records {
        body.push_str(&record.txt_values());
        body.push('\n');
    }
    body.into_bytes()
}
