//! Database client factory
//!
//! Builds the trait objects the pipeline runs against from configuration.

use crate::adapters::database::traits::{MarkerStorage, SourceClient, WarehouseClient};
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::HourglassConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the source client
///
/// # Errors
///
/// Returns an error if the client cannot be created
pub fn create_source_client(config: &HourglassConfig) -> Result<Arc<dyn SourceClient>> {
    tracing::info!("Creating PostgreSQL source client");
    let client = PostgreSQLClient::new(config.source.clone())?;
    Ok(Arc::new(PostgreSQLAdapter::new(client)))
}

/// Create the warehouse client and marker storage from one connection pool
///
/// The marker table lives in the warehouse, so both roles share the adapter.
///
/// # Errors
///
/// Returns an error if the client cannot be created
pub fn create_warehouse_and_markers(
    config: &HourglassConfig,
) -> Result<(Arc<dyn WarehouseClient>, Arc<dyn MarkerStorage>)> {
    tracing::info!(
        markers_table = %config.warehouse.markers_table,
        "Creating PostgreSQL warehouse client and marker storage"
    );
    let client = Arc::new(PostgreSQLClient::new(config.warehouse.connection.clone())?);
    let adapter = Arc::new(
        PostgreSQLAdapter::new_with_arc(client)
            .with_markers_table(config.warehouse.markers_table.as_str()),
    );

    Ok((
        adapter.clone() as Arc<dyn WarehouseClient>,
        adapter as Arc<dyn MarkerStorage>,
    ))
}
