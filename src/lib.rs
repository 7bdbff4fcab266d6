// PartXML - database-to-XML document export tool

//! # PartXML
//!
//! PartXML exports XML documents from a parts-production PostgreSQL
//! database. A declarative mapping file (CSV or YAML) pairs template
//! placeholders with database columns; the engine resolves the latest
//! values for each part, substitutes them into an XML template, and
//! stamps the source rows so the next run only picks up new parts.
//!
//! ## Architecture
//!
//! PartXML follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (mapping, resolve, render, track, export)
//! - [`adapters`] - External integrations (PostgreSQL)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partxml::adapters::postgres::create_part_store;
//! use partxml::config::load_config;
//! use partxml::core::export::ExportCoordinator;
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("partxml.toml")?;
//!     let store = create_part_store(&config.database)?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let coordinator = ExportCoordinator::new(Arc::new(config), store, shutdown_rx);
//!     let summary = coordinator.execute_export().await?;
//!
//!     println!("Wrote {} documents", summary.documents_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], with
//! [`domain::PartXmlError`] splitting fatal conditions (configuration,
//! connection) from per-part and per-field ones (query, render,
//! tracking).
//!
//! ## Logging
//!
//! PartXML uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting export");
//! warn!(part = "320MLF3TCTT0021", "Field lookup failed, skipping entry");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
