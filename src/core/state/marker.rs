//! Export marker: the per-table hourly watermark
//!
//! An [`ExportMarker`] names one hour of one table in one bucket. It derives
//! the object key that hour is archived under and the marker for the hour
//! after it. Markers are values; progress is made by replacing one marker
//! with its successor, never by mutating it.

use crate::domain::errors::HourglassError;
use crate::domain::ids::{BucketName, TableName};
use crate::domain::window::TimeWindow;
use crate::domain::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::fmt;

/// Watermark for one table's hour
///
/// # Examples
///
/// ```
/// use hourglass::core::state::ExportMarker;
/// use hourglass::domain::{BucketName, TableName};
///
/// let marker = ExportMarker::new(
///     BucketName::new("archive").unwrap(),
///     TableName::new("events").unwrap(),
///     2023, 6, 15, 9,
/// ).unwrap();
///
/// assert_eq!(marker.file_name(), "events-2023061509.txt");
/// assert_eq!(marker.full_path(), "events/2023/06/15/events-2023061509.txt");
/// assert_eq!(marker.next().unwrap().hour(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExportMarker {
    bucket: BucketName,
    table_name: TableName,
    start: DateTime<Utc>,
}

impl ExportMarker {
    /// Creates a marker from calendar components
    ///
    /// # Errors
    ///
    /// Returns a Validation error when the components do not name a real UTC
    /// hour (month 13, February 30th, hour 24, a year outside 0..=9999).
    pub fn new(
        bucket: BucketName,
        table_name: TableName,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
    ) -> Result<Self> {
        if !(0..=9999).contains(&year) {
            return Err(HourglassError::Validation(format!(
                "Marker year {year} is outside 0000-9999"
            )));
        }
        if hour > 23 {
            return Err(HourglassError::Validation(format!(
                "Marker hour {hour} is outside 0-23"
            )));
        }
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            HourglassError::Validation(format!(
                "Marker date {year:04}-{month:02}-{day:02} is not a calendar date"
            ))
        })?;
        let naive = date.and_hms_opt(hour, 0, 0).ok_or_else(|| {
            HourglassError::Validation(format!("Marker hour {hour} is outside 0-23"))
        })?;

        Ok(Self {
            bucket,
            table_name,
            start: Utc.from_utc_datetime(&naive),
        })
    }

    /// Creates the marker for the hour containing `instant`
    pub fn from_time(
        bucket: BucketName,
        table_name: TableName,
        instant: DateTime<Utc>,
    ) -> Result<Self> {
        let window = TimeWindow::containing(instant)?;
        let start = window.from();
        Self::new(
            bucket,
            table_name,
            start.year(),
            start.month(),
            start.day(),
            start.hour(),
        )
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    pub fn table_name(&self) -> &TableName {
        &self.table_name
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn day(&self) -> u32 {
        self.start.day()
    }

    pub fn hour(&self) -> u32 {
        self.start.hour()
    }

    /// UTC start of the marked hour
    pub fn time(&self) -> DateTime<Utc> {
        self.start
    }

    /// The window `[time, time + 1h)`
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_aligned(self.start)
    }

    /// `"{table}-{YYYY}{MM}{DD}{HH}.txt"`
    pub fn file_name(&self) -> String {
        format!("{}-{}.txt", self.table_name, self.start.format("%Y%m%d%H"))
    }

    /// Key prefix of the day directory: `"{table}/{YYYY}/{MM}/{DD}"`
    pub fn day_prefix(&self) -> String {
        format!("{}/{}", self.table_name, self.start.format("%Y/%m/%d"))
    }

    /// `"{table}/{YYYY}/{MM}/{DD}/{file_name}"`
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.day_prefix(), self.file_name())
    }

    /// `s3://{bucket}/{full_path}`
    pub fn object_url(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.full_path())
    }

    /// Marker for the following hour
    ///
    /// # Errors
    ///
    /// Returns a Validation error past `9999-12-31T23`, where the key layout
    /// runs out of year digits.
    pub fn next(&self) -> Result<Self> {
        self.with_time(self.start + Duration::hours(1))
    }

    /// Same key, different hour
    pub fn with_time(&self, instant: DateTime<Utc>) -> Result<Self> {
        Self::from_time(self.bucket.clone(), self.table_name.clone(), instant)
    }
}

impl fmt::Display for ExportMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.bucket,
            self.table_name,
            self.start.format("%Y-%m-%dT%H")
        )
    }
}
