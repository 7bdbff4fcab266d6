//! Generation tracking
//!
//! After a document is written, the part's row in each tracking table is
//! stamped with the current timestamp. A later run in `untracked` mode
//! restricts its identifier universe to unstamped rows, which is what
//! makes incremental re-exports cheap. The stamp runs strictly after the
//! file write; a failed stamp is logged and never retracts the document.

use crate::adapters::database::PartStore;
use crate::config::schema::TableSpec;
use crate::core::resolve::sql;
use crate::domain::{PartId, PartXmlError, Result};
use std::sync::Arc;

/// Records generated-document markers in the source database
pub struct GenerationTracker {
    store: Arc<dyn PartStore>,
    tables: Vec<TableSpec>,
    tracking_column: String,
}

impl GenerationTracker {
    pub fn new(store: Arc<dyn PartStore>, tables: Vec<TableSpec>, tracking_column: String) -> Self {
        Self {
            store,
            tables,
            tracking_column,
        }
    }

    /// Stamps `part` in every tracking table holding a matching row
    ///
    /// Tables without a matching row are skipped silently (a part may be
    /// registered in one table before it appears in another). Returns the
    /// number of rows stamped.
    ///
    /// # Errors
    ///
    /// A failed update in one table never prevents the remaining tables
    /// from being stamped; the failures are reported together as one
    /// `Tracking` error at the end. Callers log it and keep the
    /// already-written document. Connection loss propagates as-is.
    pub async fn mark_generated(&self, part: &PartId) -> Result<u64> {
        let mut stamped = 0;
        let mut failures = Vec::new();
        for table in &self.tables {
            let statement = sql::tracking_update(table, &self.tracking_column);
            match self.store.execute_keyed(&statement, part.as_str()).await {
                Ok(rows) => {
                    tracing::debug!(
                        part = %part,
                        table = %table.name,
                        rows,
                        "Updated tracking timestamp"
                    );
                    stamped += rows;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        part = %part,
                        table = %table.name,
                        error = %e,
                        "Tracking update failed"
                    );
                    failures.push(format!("{}: {e}", table.name));
                }
            }
        }
        if failures.is_empty() {
            Ok(stamped)
        } else {
            Err(PartXmlError::Tracking(format!(
                "failed to stamp {} in {}",
                part,
                failures.join("; ")
            )))
        }
    }
}
