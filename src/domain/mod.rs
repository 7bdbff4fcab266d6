//! Domain models and types for PartXML.
//!
//! This module contains the core domain types shared by the export engine:
//!
//! - **Strongly-typed identifiers** ([`PartId`])
//! - **Resolved values** ([`FieldValue`], [`Bindings`])
//! - **Error types** ([`PartXmlError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`]:
//!
//! ```
//! use partxml::domain::{PartXmlError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(PartXmlError::Query("lookup failed".to_string()))
//! }
//! assert!(example().is_err());
//! ```

pub mod binding;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use binding::{Bindings, FieldValue};
pub use errors::PartXmlError;
pub use ids::PartId;
pub use result::Result;
