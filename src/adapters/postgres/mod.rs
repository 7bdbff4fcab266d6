//! PostgreSQL adapter

pub mod client;
pub mod store;

pub use client::PostgresClient;
pub use store::PostgresPartStore;

use crate::config::schema::DatabaseConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Builds the part store used by the export coordinator
pub fn create_part_store(config: &DatabaseConfig) -> Result<Arc<dyn crate::adapters::database::PartStore>> {
    let client = PostgresClient::new(config.clone())?;
    Ok(Arc::new(PostgresPartStore::new(client)))
}
