//! Field resolution for one part
//!
//! Walks the mapping entries for a single part and produces the bindings
//! fed to the template renderer. Resolution order per entry:
//!
//! 1. Reserved `LOCATION`/`INSTITUTION` placeholders bind the configured
//!    facility constant (or the category join when configured).
//! 2. `ID` binds the part identifier itself.
//! 3. Entries with a nested-query fragment run the fragment with the
//!    entity filter appended.
//! 4. Everything else gets a latest-row select against its table.
//! 5. Composite placeholders combine their sub-columns.
//!
//! A query failure for one entry is logged with the part, placeholder,
//! and cause, and that binding is simply absent; connection-level
//! failures propagate as fatal.

use crate::adapters::database::{PartStore, RecordRow};
use crate::config::schema::{PartXmlConfig, TableSpec};
use crate::core::mapping::{Mapping, MappingEntry};
use crate::core::resolve::composite::CompositeRule;
use crate::core::resolve::sql;
use crate::domain::{Bindings, FieldValue, PartId, PartXmlError, Result};
use std::sync::Arc;

/// Reserved placeholders bound to the facility identity
const RESERVED_FACILITY: [&str; 2] = ["LOCATION", "INSTITUTION"];

/// A recovered single-field failure
#[derive(Debug, Clone)]
pub struct FieldFailure {
    /// Placeholder whose lookup failed
    pub placeholder: String,

    /// Underlying cause
    pub cause: String,
}

/// Outcome of resolving one part
#[derive(Debug, Default)]
pub struct Resolution {
    /// Successfully bound placeholders
    pub bindings: Bindings,

    /// Entries whose lookup failed and was skipped
    pub failed_fields: Vec<FieldFailure>,
}

/// Resolves mapping entries to concrete values for one part at a time
///
/// The facility constant and join descriptions are injected through the
/// configuration at construction; the resolver holds no global state.
pub struct FieldResolver {
    store: Arc<dyn PartStore>,
    config: Arc<PartXmlConfig>,
}

impl FieldResolver {
    pub fn new(store: Arc<dyn PartStore>, config: Arc<PartXmlConfig>) -> Self {
        Self { store, config }
    }

    /// Resolves every mapping entry for `part`
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions (connection loss,
    /// configuration inconsistency); per-field query errors are recorded
    /// in the returned [`Resolution`] instead.
    pub async fn resolve(&self, part: &PartId, mapping: &Mapping) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        for entry in mapping.entries() {
            match self.resolve_entry(part, entry).await {
                Ok(Some(value)) => {
                    resolution.bindings.insert(entry.placeholder.clone(), value);
                }
                Ok(None) => {
                    tracing::debug!(
                        part = %part,
                        placeholder = %entry.placeholder,
                        "No value for mapping entry"
                    );
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        part = %part,
                        placeholder = %entry.placeholder,
                        error = %e,
                        "Field lookup failed, skipping entry"
                    );
                    resolution.failed_fields.push(FieldFailure {
                        placeholder: entry.placeholder.clone(),
                        cause: e.to_string(),
                    });
                }
            }
        }

        Ok(resolution)
    }

    /// Resolves a single entry; `Ok(None)` means the entry is skipped
    async fn resolve_entry(
        &self,
        part: &PartId,
        entry: &MappingEntry,
    ) -> Result<Option<FieldValue>> {
        if RESERVED_FACILITY.contains(&entry.placeholder.as_str()) {
            return self.resolve_facility(part, entry).await;
        }

        if entry.placeholder == "ID" {
            return Ok(Some(FieldValue::Text(part.as_str().to_string())));
        }

        if !entry.is_resolvable() {
            return Ok(None);
        }
        let table = self.table_spec(entry)?;

        let row = if let Some(fragment) = &entry.nested_query {
            let query = sql::nested_query(fragment, table);
            self.store.fetch_row(&query, part.as_str()).await?
        } else {
            let query = sql::latest_row_select(table, &entry.columns);
            self.store.fetch_row(&query, part.as_str()).await?
        };

        let Some(row) = row else {
            return Ok(None);
        };

        if entry.nested_query.is_some() {
            // First returned value wins for pre-authored fragments
            return Ok(row.into_iter().next().map(|(_, v)| FieldValue::from(v)));
        }

        if let Some(rule) = CompositeRule::for_placeholder(&entry.placeholder) {
            let values: Vec<Option<String>> = entry
                .columns
                .iter()
                .map(|c| column_value(&row, c))
                .collect();
            return Ok(Some(FieldValue::Text(rule.combine(&values))));
        }

        if entry.columns.len() == 1 {
            return Ok(Some(FieldValue::from(column_value(&row, &entry.columns[0]))));
        }

        Ok(Some(FieldValue::Columns(row)))
    }

    /// Resolves the reserved facility placeholders
    async fn resolve_facility(
        &self,
        part: &PartId,
        entry: &MappingEntry,
    ) -> Result<Option<FieldValue>> {
        if self.config.facility.institution_from_db {
            if let Some(table) = entry.table.as_ref().and_then(|t| self.config.table(t)) {
                let query = sql::institution_select(table, &self.config.joins);
                let row = self.store.fetch_row(&query, part.as_str()).await?;
                let institution = row.and_then(|r| r.into_iter().next()).and_then(|(_, v)| v);
                return Ok(Some(FieldValue::from(institution)));
            }
        }
        Ok(Some(FieldValue::Text(self.config.facility.location.clone())))
    }

    /// Registry lookup; an unregistered table is a configuration error,
    /// never a silent no-op
    fn table_spec(&self, entry: &MappingEntry) -> Result<&TableSpec> {
        let name = entry.table.as_deref().unwrap_or_default();
        self.config.table(name).ok_or_else(|| {
            PartXmlError::Configuration(format!(
                "mapping '{}' references unregistered table '{name}'",
                entry.placeholder
            ))
        })
    }
}

/// Value of a named column within a fetched row
fn column_value(row: &RecordRow, column: &str) -> Option<String> {
    row.iter()
        .find(|(name, _)| name == column)
        .and_then(|(_, value)| value.clone())
}
