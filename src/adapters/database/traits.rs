//! Database abstraction traits
//!
//! The export engine builds its SQL as text (with the entity value always
//! a bound parameter) and hands it to a [`PartStore`]. Keeping the trait
//! this narrow gives the resolver and orchestrator a seam that mock
//! implementations cover completely in tests.

use crate::domain::Result;
use async_trait::async_trait;

/// One fetched row as (column name, textual value) pairs, in select order
///
/// Conversion from native Postgres types to text happens inside the
/// adapter so the engine only ever sees strings or NULLs.
pub type RecordRow = Vec<(String, Option<String>)>;

/// Read/write access to the parts-tracking database
///
/// Error contract: connection-level failures surface as
/// `PartXmlError::Connection` (fatal to the run); statement failures as
/// `PartXmlError::Query` (recoverable at the field boundary).
#[async_trait]
pub trait PartStore: Send + Sync {
    /// Test the database connection with a trivial query
    async fn test_connection(&self) -> Result<()>;

    /// Execute a single-row select with the entity key bound as `$1`
    ///
    /// Returns `Ok(None)` when no row matches.
    async fn fetch_row(&self, sql: &str, key: &str) -> Result<Option<RecordRow>>;

    /// Execute a key-listing select with no parameters
    ///
    /// NULL values in the key column are skipped.
    async fn fetch_names(&self, sql: &str) -> Result<Vec<String>>;

    /// Execute a statement with the entity key bound as `$1`
    ///
    /// Returns the number of affected rows.
    async fn execute_keyed(&self, sql: &str, key: &str) -> Result<u64>;
}
