//! External system integrations for Hourglass.
//!
//! - [`database`] - Database roles as traits, plus factories
//! - [`postgresql`] - PostgreSQL/Redshift implementation of those roles
//! - [`storage`] - Object storage holding the hourly files
//!
//! The pipeline only sees the traits and [`storage::ObjectStorage`], so
//! tests run it against in-memory fakes:
//!
//! ```rust
//! use hourglass::adapters::storage::ObjectStorage;
//! use hourglass::domain::BucketName;
//!
//! let storage = ObjectStorage::in_memory(BucketName::new("archive").unwrap());
//! assert_eq!(storage.bucket().as_str(), "archive");
//! ```

pub mod database;
pub mod postgresql;
pub mod storage;
