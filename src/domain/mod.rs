//! Domain types for Hourglass.
//!
//! The domain layer holds the value types every other layer shares:
//! - **Identifiers** ([`BucketName`], [`TableName`]) validated at construction
//! - **Time windows** ([`TimeWindow`], [`WindowBounds`])
//! - **Error types** ([`HourglassError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! ```rust
//! use hourglass::domain::{BucketName, TableName, TimeWindow};
//! use chrono::{TimeZone, Utc};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bucket = BucketName::new("archive")?;
//! let table = TableName::new("events")?;
//! let window = TimeWindow::starting_at(Utc.with_ymd_and_hms(2023, 6, 15, 9, 0, 0).unwrap())?;
//! # let _ = (bucket, table, window);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod window;

pub use errors::{HourglassError, StorageError};
pub use ids::{BucketName, TableName};
pub use result::Result;
pub use window::{TimeWindow, WindowBounds};
