//! PostgreSQL client implementation
//!
//! Pooled connections to a PostgreSQL-compatible server. Used for the
//! source database as well as the warehouse (Redshift speaks the same wire
//! protocol).

use crate::config::schema::PostgreSQLConfig;
use crate::config::secret::redact_credentials;
use crate::domain::{HourglassError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// Pooled PostgreSQL client
///
/// Every checked-out connection is prepared with the configured statement
/// timeout and a UTC session time zone before it runs anything.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until the first query.
    ///
    /// # Errors
    ///
    /// Returns a Configuration error for an unparseable connection string or
    /// an unknown `ssl_mode`, and a Database error if the pool cannot be built.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .parse()
            .map_err(|e| {
                HourglassError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode(SslMode::Disable);
                Manager::from_config(pg_config, NoTls, manager_config)
            }
            mode @ ("prefer" | "require") => {
                pg_config.ssl_mode(if mode == "require" {
                    SslMode::Require
                } else {
                    SslMode::Prefer
                });
                let connector = native_tls::TlsConnector::builder().build().map_err(|e| {
                    HourglassError::Configuration(format!("Failed to build TLS connector: {e}"))
                })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
            }
            other => {
                return Err(HourglassError::Configuration(format!(
                    "Invalid ssl_mode '{other}'. Must be one of: disable, prefer, require"
                )))
            }
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                HourglassError::Database(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Check out a connection and run `SELECT 1`
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| HourglassError::Connection(format!("Connection test failed: {e}")))?;

        tracing::info!(
            target = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Check out a prepared connection from the pool
    ///
    /// # Errors
    ///
    /// Returns a Connection error if no connection can be obtained.
    pub async fn get_connection(&self) -> Result<Object> {
        let client = self.pool.get().await.map_err(|e| {
            HourglassError::Connection(format!(
                "Failed to get connection to {}: {e}",
                self.connection_string_safe()
            ))
        })?;
        self.prepare_session(&client).await?;
        Ok(client)
    }

    async fn prepare_session(&self, client: &Object) -> Result<()> {
        client
            .batch_execute(&session_setup(self.config.statement_timeout_seconds))
            .await
            .map_err(|e| HourglassError::Database(format!("Failed to prepare session: {e}")))
    }

    /// Execute a query and return rows
    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;
        client
            .query(query, params)
            .await
            .map_err(|e| HourglassError::Database(format!("Query failed: {e}")))
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(&self, statement: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.get_connection().await?;
        client
            .execute(statement, params)
            .await
            .map_err(|e| HourglassError::Database(format!("Statement execution failed: {e}")))
    }

    /// Execute unparameterized SQL (possibly several statements)
    pub async fn batch_execute(&self, sql: &str) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .batch_execute(sql)
            .await
            .map_err(|e| HourglassError::Database(format!("Batch execution failed: {e}")))
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        redact_credentials(self.config.connection_string.expose_secret().as_ref())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn session_setup(statement_timeout_seconds: u64) -> String {
    format!(
        "SET statement_timeout = {}; SET TIME ZONE 'UTC'",
        statement_timeout_seconds * 1000
    )
}
