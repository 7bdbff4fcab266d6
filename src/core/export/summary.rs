//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Total number of parts discovered across all variants
    pub total_parts: usize,

    /// Number of documents written to disk
    pub documents_written: usize,

    /// Number of parts whose document could not be produced
    pub failed_parts: usize,

    /// Number of individual field lookups that failed but were skipped
    pub field_failures: usize,

    /// Number of tracking updates that failed after a successful write
    pub tracking_failures: usize,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,

    /// Whether the run was cut short by a shutdown signal
    pub interrupted: bool,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            total_parts: 0,
            documents_written: 0,
            failed_parts: 0,
            field_failures: 0,
            tracking_failures: 0,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            interrupted: false,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Fold another summary into this one (per-variant accumulation)
    pub fn merge(&mut self, other: ExportSummary) {
        self.total_parts += other.total_parts;
        self.documents_written += other.documents_written;
        self.failed_parts += other.failed_parts;
        self.field_failures += other.field_failures;
        self.tracking_failures += other.tracking_failures;
        self.errors.extend(other.errors);
        self.interrupted = self.interrupted || other.interrupted;
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed_parts == 0 && self.errors.is_empty() && !self.interrupted
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_parts == 0 {
            return 100.0;
        }
        (self.documents_written as f64 / self.total_parts as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_parts = self.total_parts,
            documents_written = self.documents_written,
            failed = self.failed_parts,
            field_failures = self.field_failures,
            tracking_failures = self.tracking_failures,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            interrupted = self.interrupted,
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or("-"),
                    "Export error"
                );
            }
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Configuration or mapping error
    Configuration,
    /// Database connection error
    Connection,
    /// Field lookup query error
    Query,
    /// Template rendering or file write error
    Render,
    /// Generation-tracking update error
    Tracking,
    /// Unknown error
    Unknown,
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., part name, variant name)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

impl From<&crate::domain::PartXmlError> for ExportErrorType {
    fn from(e: &crate::domain::PartXmlError) -> Self {
        use crate::domain::PartXmlError;
        match e {
            PartXmlError::Configuration(_) => ExportErrorType::Configuration,
            PartXmlError::Connection(_) => ExportErrorType::Connection,
            PartXmlError::Query(_) => ExportErrorType::Query,
            PartXmlError::Render(_) => ExportErrorType::Render,
            PartXmlError::Tracking(_) => ExportErrorType::Tracking,
            _ => ExportErrorType::Unknown,
        }
    }
}
