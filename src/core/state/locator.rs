//! Reconstruct the latest export marker from the bucket hierarchy
//!
//! Exports are laid out as `{table}/{YYYY}/{MM}/{DD}/{table}-{YYYYMMDDHH}.txt`.
//! Because every segment is zero-padded to a fixed width, the lexicographic
//! maximum at each level is also the numeric maximum, so the newest export
//! can be found with one delimiter listing per level. Only the maximal child
//! is parsed; its width and range are checked rather than assumed, so a
//! stray sibling that sorts lower (`_SUCCESS`, a folder marker) is ignored.

use crate::adapters::storage::ObjectStorage;
use crate::core::state::marker::ExportMarker;
use crate::domain::errors::HourglassError;
use crate::domain::ids::{BucketName, TableName};
use crate::domain::Result;
use std::fmt;

/// Levels of the key hierarchy below the table prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Year,
    Month,
    Day,
    Hour,
}

impl Level {
    fn width(self) -> usize {
        match self {
            Level::Year => 4,
            Level::Month | Level::Day | Level::Hour => 2,
        }
    }

    fn range(self) -> std::ops::RangeInclusive<u32> {
        match self {
            Level::Year => 0..=9999,
            Level::Month => 1..=12,
            Level::Day => 1..=31,
            Level::Hour => 0..=23,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Year => "year",
            Level::Month => "month",
            Level::Day => "day",
            Level::Hour => "hour",
        };
        write!(f, "{name}")
    }
}

/// Walks year, month, day and file listings to find the newest export
pub struct HierarchyLocator {
    storage: ObjectStorage,
}

impl HierarchyLocator {
    pub fn new(storage: ObjectStorage) -> Self {
        Self { storage }
    }

    /// Find the most recent export for `table`
    ///
    /// Returns `None` when the table has no year directories at all. When a
    /// deeper level is empty the marker is defaulted from that level down
    /// (month 1, day 1, hour 0).
    ///
    /// # Errors
    ///
    /// Returns a Validation error if `bucket` is not the bucket this locator
    /// lists, a Parse error for any malformed segment or file name, and a
    /// Storage error if a listing fails.
    pub async fn locate_latest(
        &self,
        bucket: &BucketName,
        table: &TableName,
    ) -> Result<Option<ExportMarker>> {
        if bucket != self.storage.bucket() {
            return Err(HourglassError::Validation(format!(
                "Locator is bound to bucket '{}', asked to search '{}'",
                self.storage.bucket(),
                bucket
            )));
        }

        let table_prefix = table.to_string();
        let Some(year) = self.latest_segment(&table_prefix, Level::Year).await? else {
            tracing::info!(
                bucket = %bucket,
                table = %table,
                "No exports found in storage"
            );
            return Ok(None);
        };

        let build = |year: u32, month: u32, day: u32, hour: u32| {
            ExportMarker::new(
                bucket.clone(),
                table.clone(),
                year as i32,
                month,
                day,
                hour,
            )
            .map_err(|e| match e {
                HourglassError::Validation(msg) => HourglassError::Parse(format!(
                    "Latest export under '{table}/' is not a valid hour: {msg}"
                )),
                other => other,
            })
        };

        let year_prefix = format!("{table_prefix}/{year:04}");
        let Some(month) = self.latest_segment(&year_prefix, Level::Month).await? else {
            return build(year, 1, 1, 0).map(Some);
        };

        let month_prefix = format!("{year_prefix}/{month:02}");
        let Some(day) = self.latest_segment(&month_prefix, Level::Day).await? else {
            return build(year, month, 1, 0).map(Some);
        };

        let day_prefix = format!("{month_prefix}/{day:02}");
        let stem = format!("{table}-{year:04}{month:02}{day:02}");
        let files = self.storage.list_children(&day_prefix).await?;
        let latest_hour = match files.iter().max() {
            Some(file) => Some(parse_file_hour(file, &stem)?),
            None => None,
        };

        let marker = build(year, month, day, latest_hour.unwrap_or(0))?;
        tracing::info!(
            bucket = %bucket,
            table = %table,
            marker = %marker,
            "Located latest export in storage"
        );
        Ok(Some(marker))
    }

    async fn latest_segment(&self, prefix: &str, level: Level) -> Result<Option<u32>> {
        let children = self.storage.list_children(prefix).await?;
        children
            .iter()
            .max()
            .map(|child| parse_segment(child, level, prefix))
            .transpose()
    }
}

fn parse_segment(segment: &str, level: Level, prefix: &str) -> Result<u32> {
    if segment.len() != level.width() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HourglassError::Parse(format!(
            "Unexpected {level} segment '{segment}' under '{prefix}': expected {} digits",
            level.width()
        )));
    }
    let value: u32 = segment.parse().map_err(|e| {
        HourglassError::Parse(format!(
            "Unexpected {level} segment '{segment}' under '{prefix}': {e}"
        ))
    })?;
    if !level.range().contains(&value) {
        return Err(HourglassError::Parse(format!(
            "Unexpected {level} segment '{segment}' under '{prefix}': out of range"
        )));
    }
    Ok(value)
}

fn parse_file_hour(file_name: &str, stem: &str) -> Result<u32> {
    let hour = file_name
        .strip_prefix(stem)
        .and_then(|rest| rest.strip_suffix(".txt"))
        .ok_or_else(|| {
            HourglassError::Parse(format!(
                "Unexpected file '{file_name}': expected '{stem}HH.txt'"
            ))
        })?;
    parse_segment(hour, Level::Hour, stem)
}
