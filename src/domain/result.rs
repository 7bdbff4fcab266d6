//! Result type alias for PartXML
//!
//! Convenience alias using `PartXmlError` as the error type; use this
//! throughout the codebase for fallible operations.

use super::errors::PartXmlError;

/// Result type alias for PartXML operations
pub type Result<T> = std::result::Result<T, PartXmlError>;
