//! PostgreSQL integration
//!
//! Serves the source database and the Redshift warehouse, which share the
//! PostgreSQL wire protocol.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::PostgreSQLMarker;
