//! Database abstraction layer
//!
//! Traits for the three database roles plus factories that build the
//! PostgreSQL implementations from configuration.

pub mod factory;
pub mod traits;

pub use factory::{create_source_client, create_warehouse_and_markers};
pub use traits::{
    BulkLoadRequest, DeleteWindowRequest, MarkerStorage, SourceClient, SourceQuery,
    WarehouseClient,
};
