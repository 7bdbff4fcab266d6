//! Domain error types
//!
//! This module defines the error hierarchy for PartXML. All errors are
//! domain-specific and don't expose third-party types.
//!
//! The variants map directly onto the failure-handling policy of the export
//! engine: `Configuration` and `Connection` are fatal and abort before or
//! during pool setup; `Query` is recovered at the field boundary; `Render`
//! aborts a single part; `Tracking` is logged and never retracts an
//! already-written document.

use thiserror::Error;

/// Main PartXML error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum PartXmlError {
    /// Malformed mapping, missing template, or invalid configuration.
    /// Fatal: aborts before the batch starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database unreachable or connection pool exhausted. Fatal.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single field lookup failed. Recovered at the field boundary.
    #[error("Query error: {0}")]
    Query(String),

    /// Template parsing or output write failed. Aborts one part.
    #[error("Render error: {0}")]
    Render(String),

    /// Post-success tracking update failed. Logged, never fatal.
    #[error("Tracking error: {0}")]
    Tracking(String),

    /// I/O errors outside the render path
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PartXmlError {
    /// Whether this error must abort the whole run rather than a single
    /// part or field.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PartXmlError::Configuration(_) | PartXmlError::Connection(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PartXmlError {
    fn from(err: std::io::Error) -> Self {
        PartXmlError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PartXmlError {
    fn from(err: toml::de::Error) -> Self {
        PartXmlError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from YAML mapping parse errors
impl From<serde_yaml::Error> for PartXmlError {
    fn from(err: serde_yaml::Error) -> Self {
        PartXmlError::Configuration(format!("YAML parse error: {err}"))
    }
}

// Conversion from CSV mapping parse errors
impl From<csv::Error> for PartXmlError {
    fn from(err: csv::Error) -> Self {
        PartXmlError::Configuration(format!("CSV parse error: {err}"))
    }
}
