//! Row models for the marker table

use crate::core::state::marker::ExportMarker;
use crate::domain::ids::{BucketName, TableName};
use crate::domain::{HourglassError, Result};
use tokio_postgres::Row;

/// One row of the marker table
///
/// Integer columns map to `i32`, matching `INTEGER` in the table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgreSQLMarker {
    pub bucket: String,
    pub table_name: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
}

impl PostgreSQLMarker {
    /// Read a row selected as `bucket, table_name, year, month, day, hour`
    pub fn from_row(row: &Row) -> Result<Self> {
        let read = |e: tokio_postgres::Error| {
            HourglassError::Database(format!("Failed to read marker row: {e}"))
        };
        Ok(Self {
            bucket: row.try_get("bucket").map_err(read)?,
            table_name: row.try_get("table_name").map_err(read)?,
            year: row.try_get("year").map_err(read)?,
            month: row.try_get("month").map_err(read)?,
            day: row.try_get("day").map_err(read)?,
            hour: row.try_get("hour").map_err(read)?,
        })
    }

    pub fn from_domain(marker: &ExportMarker) -> Self {
        Self {
            bucket: marker.bucket().to_string(),
            table_name: marker.table_name().to_string(),
            year: marker.year(),
            month: marker.month() as i32,
            day: marker.day() as i32,
            hour: marker.hour() as i32,
        }
    }

    /// Convert to a domain marker
    ///
    /// # Errors
    ///
    /// Returns a Parse error when a stored component is negative, and the
    /// marker's Validation error when the components do not form a real hour.
    pub fn to_domain(&self) -> Result<ExportMarker> {
        let component = |name: &str, value: i32| {
            u32::try_from(value).map_err(|_| {
                HourglassError::Parse(format!(
                    "Marker {}/{} has negative {name}: {value}",
                    self.bucket, self.table_name
                ))
            })
        };

        let bucket = BucketName::new(self.bucket.as_str()).map_err(HourglassError::Validation)?;
        let table =
            TableName::new(self.table_name.as_str()).map_err(HourglassError::Validation)?;
        ExportMarker::new(
            bucket,
            table,
            self.year,
            component("month", self.month)?,
            component("day", self.day)?,
            component("hour", self.hour)?,
        )
    }

    /// Parameters in the order `bucket, table_name, year, month, day, hour`
    pub fn params(&self) -> [&(dyn tokio_postgres::types::ToSql + Sync); 6] {
        [
            &self.bucket,
            &self.table_name,
            &self.year,
            &self.month,
            &self.day,
            &self.hour,
        ]
    }
}
