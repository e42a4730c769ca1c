//! Warehouse reload of archived windows

pub mod importer;

pub use importer::{ImportOutcome, ImportTarget, Importer};
