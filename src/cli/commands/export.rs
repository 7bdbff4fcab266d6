//! Export command implementation
//!
//! This module implements the `export` command for producing XML
//! documents from the parts database.

use crate::adapters::postgres::create_part_store;
use crate::config::load_config;
use crate::core::export::ExportCoordinator;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - resolve fields without writing documents
    #[arg(long)]
    pub dry_run: bool,

    /// Restrict the run to these configured variants (comma-separated or
    /// repeated)
    #[arg(long, value_delimiter = ',')]
    pub variant: Vec<String>,

    /// Override export mode (untracked or full)
    #[arg(long)]
    pub mode: Option<String>,

    /// Override the output directory
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if let Some(mode) = &self.mode {
            tracing::info!(mode = %mode, "Overriding export mode from CLI");
            config.export.mode = mode.clone();
        }

        if let Some(output_dir) = &self.output_dir {
            tracing::info!(output_dir = %output_dir, "Overriding output directory from CLI");
            config.export.output_dir = output_dir.clone();
        }

        if !self.variant.is_empty() {
            for name in &self.variant {
                if config.variant(name).is_none() {
                    eprintln!("Unknown variant: {name}");
                    return Ok(2);
                }
            }
            config.variants.retain(|v| self.variant.contains(&v.name));
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if self.dry_run {
            println!("DRY RUN MODE - no documents will be written");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !self.dry_run {
            println!("Export Configuration:");
            println!("  Mode: {}", config.export.mode);
            println!("  Output: {}", config.export.output_dir);
            println!(
                "  Variants: {:?}",
                config.variants.iter().map(|v| &v.name).collect::<Vec<_>>()
            );
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let store = match create_part_store(&config.database) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create database client");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        let coordinator = ExportCoordinator::new(Arc::new(config), store, shutdown_signal)
            .with_dry_run(self.dry_run);

        println!("Starting export...");
        println!();

        let summary = match coordinator.execute_export().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                let code = match &e {
                    crate::domain::PartXmlError::Connection(_) => 4,
                    crate::domain::PartXmlError::Configuration(_) => 2,
                    _ => 5,
                };
                return Ok(code);
            }
        };

        println!();
        println!("Export Summary:");
        println!("  Total Parts: {}", summary.total_parts);
        println!("  Documents Written: {}", summary.documents_written);
        println!("  Failed Parts: {}", summary.failed_parts);
        println!("  Skipped Fields: {}", summary.field_failures);
        println!("  Tracking Failures: {}", summary.tracking_failures);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());
        println!();

        if !summary.errors.is_empty() {
            println!("Errors encountered:");
            for error in &summary.errors {
                println!("  - {:?}: {}", error.error_type, error.message);
                if let Some(context) = &error.context {
                    println!("    Context: {context}");
                }
            }
            println!();
        }

        if summary.interrupted {
            println!("Export interrupted. Untracked parts will be picked up by the next run.");
            tracing::info!("Export interrupted by user signal");
        } else if summary.is_successful() {
            println!("Export completed successfully.");
        } else {
            println!("Export completed with failures (see summary above).");
        }

        Ok(summary_exit_code(&summary))
    }
}

/// Exit code for a completed run
///
/// Per-part and per-field failures are reported in the summary only; the
/// process exits non-zero for fatal pre-batch failures (handled before the
/// batch starts) and for interruption, never for isolated part failures.
fn summary_exit_code(summary: &crate::core::export::ExportSummary) -> i32 {
    if summary.interrupted {
        130
    } else {
        0
    }
}
