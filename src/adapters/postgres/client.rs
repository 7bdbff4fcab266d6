//! PostgreSQL client implementation
//!
//! This module provides the pooled client for the parts database.

use crate::config::schema::DatabaseConfig;
use crate::domain::{PartXmlError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

/// Pooled PostgreSQL client for the parts database
pub struct PostgresClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: DatabaseConfig,
}

impl PostgresClient {
    /// Create a new PostgreSQL client
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for an unparseable connection
    /// string and a `Connection` error if the pool cannot be built.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config.connection_string.parse().map_err(|e| {
            PartXmlError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
        })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(pg_config, NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .create_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .recycle_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .build()
            .map_err(|e| {
                PartXmlError::Connection(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    ///
    /// Attempts to get a connection from the pool and execute a simple query.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| PartXmlError::Connection(format!("Connection test failed: {e}")))?;

        tracing::info!(
            database = %self.config.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    ///
    /// # Errors
    ///
    /// Pool exhaustion and broken connections surface as `Connection`.
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.pool.get().await.map_err(|e| {
            PartXmlError::Connection(format!("Failed to get connection from pool: {e}"))
        })?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client
            .batch_execute(&timeout_query)
            .await
            .map_err(|e| classify_pg_error("Failed to set statement timeout", e))?;

        Ok(client)
    }

    /// Execute a query and return rows
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;

        client
            .query(query, params)
            .await
            .map_err(|e| classify_pg_error("Query failed", e))
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64> {
        let client = self.get_connection().await?;

        client
            .execute(statement, params)
            .await
            .map_err(|e| classify_pg_error("Statement execution failed", e))
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

/// Splits driver errors into the fatal and recoverable halves
///
/// A closed connection means the whole run should stop; anything else
/// (bad column, cancelled statement, timeout) is scoped to the query
/// that caused it.
fn classify_pg_error(context: &str, e: tokio_postgres::Error) -> PartXmlError {
    if e.is_closed() {
        PartXmlError::Connection(format!("{context}: {e}"))
    } else {
        PartXmlError::Query(format!("{context}: {e}"))
    }
}
