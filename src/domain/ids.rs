//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through the export
//! engine. The business key of a part is the join key for every query
//! concerning that part, so it gets its own type rather than a bare String.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Part identifier newtype wrapper
///
/// The human-meaningful business key of a tracked hardware part (e.g. a
/// sensor's serial name). Used to scope every query for one document.
///
/// # Examples
///
/// ```
/// use partxml::domain::ids::PartId;
/// use std::str::FromStr;
///
/// let part = PartId::from_str("PM-0042").unwrap();
/// assert_eq!(part.as_str(), "PM-0042");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(String);

impl PartId {
    /// Creates a new PartId from a string
    ///
    /// Returns `Err` if the identifier is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Part ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the part ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PartId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PartId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
