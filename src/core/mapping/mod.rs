//! Declarative field mapping
//!
//! A mapping is an ordered list of entries tying a template placeholder to
//! the database columns that populate it. Two source formats are
//! supported: a row-oriented CSV table and a structured YAML list grouped
//! into named collections (one per export variant).

pub mod loader;

use crate::config::schema::PartXmlConfig;
use crate::core::resolve::composite::CompositeRule;
use crate::core::resolve::sql::valid_identifier;
use crate::domain::errors::PartXmlError;
use crate::domain::result::Result;

pub use loader::{load_mapping, load_mapping_collection};

/// One placeholder → source-column(s) association
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Template placeholder name, unique within the mapping
    pub placeholder: String,

    /// Source table; entries without one are skipped during resolution
    pub table: Option<String>,

    /// Source column, or ordered sub-columns for composite placeholders
    pub columns: Vec<String>,

    /// Pre-authored query fragment used instead of the derived lookup.
    /// The resolver appends the entity filter clause.
    pub nested_query: Option<String>,
}

impl MappingEntry {
    /// Whether this entry carries enough source information to resolve
    pub fn is_resolvable(&self) -> bool {
        self.table.is_some() && (!self.columns.is_empty() || self.nested_query.is_some())
    }
}

/// An ordered, immutable set of mapping entries, loaded once per run
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

impl Mapping {
    /// Builds a mapping, rejecting duplicate placeholder names
    pub fn new(entries: Vec<MappingEntry>) -> Result<Self> {
        let mut seen = std::collections::BTreeSet::new();
        for entry in &entries {
            if entry.placeholder.trim().is_empty() {
                return Err(PartXmlError::Configuration(
                    "mapping entry with empty placeholder name".to_string(),
                ));
            }
            if !seen.insert(entry.placeholder.as_str()) {
                return Err(PartXmlError::Configuration(format!(
                    "duplicate mapping placeholder '{}'",
                    entry.placeholder
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates the mapping against the loaded configuration
    ///
    /// Every referenced table must be registered, every identifier must
    /// pass the allow-list grammar, and composite placeholders must
    /// declare exactly the sub-columns their combination rule expects.
    /// Configuration errors here are fatal before the batch starts.
    pub fn validate(&self, config: &PartXmlConfig) -> Result<()> {
        for entry in &self.entries {
            if let Some(table) = &entry.table {
                if !valid_identifier(table) {
                    return Err(PartXmlError::Configuration(format!(
                        "mapping '{}': invalid table identifier '{table}'",
                        entry.placeholder
                    )));
                }
                if config.table(table).is_none() {
                    return Err(PartXmlError::Configuration(format!(
                        "mapping '{}': table '{table}' is not registered in [[tables]]",
                        entry.placeholder
                    )));
                }
            }
            for col in &entry.columns {
                if !valid_identifier(col) {
                    return Err(PartXmlError::Configuration(format!(
                        "mapping '{}': invalid column identifier '{col}'",
                        entry.placeholder
                    )));
                }
            }
            if let Some(rule) = CompositeRule::for_placeholder(&entry.placeholder) {
                if entry.is_resolvable() && !rule.arity_ok(entry.columns.len()) {
                    return Err(PartXmlError::Configuration(format!(
                        "mapping '{}': composite rule expects {} columns, got {}",
                        entry.placeholder,
                        rule.expected_arity(),
                        entry.columns.len()
                    )));
                }
            }
        }
        Ok(())
    }
}
