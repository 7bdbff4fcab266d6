//! Resolved field values and bindings
//!
//! A mapping entry resolves to a [`FieldValue`]: a scalar, an explicit
//! null, or an ordered set of column values when a multi-column entry has
//! no composite rule. The renderer treats each shape differently.

use std::collections::BTreeMap;

/// Value bound to a placeholder after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The database row held NULL for this column. Rendered as an empty
    /// string, never a textual "none".
    Null,

    /// A scalar value, already converted to text
    Text(String),

    /// Column-name → value pairs from a multi-column or nested lookup.
    /// Each sub-key expands to its own template token.
    Columns(Vec<(String, Option<String>)>),
}

impl FieldValue {
    /// Text form used during substitution; `Null` is the empty string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Null => Some(""),
            FieldValue::Columns(_) => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => FieldValue::Text(s),
            None => FieldValue::Null,
        }
    }
}

/// Placeholder → resolved value, computed per part per run and discarded
/// after rendering. BTreeMap keeps iteration deterministic.
pub type Bindings = BTreeMap<String, FieldValue>;
