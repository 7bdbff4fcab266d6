//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Beyond the
//! configuration file itself, every variant's mapping source is loaded
//! and checked against the registered tables, and template files are
//! checked for existence.

use crate::config::load_config;
use crate::core::mapping::load_mapping;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("  ok: configuration file loaded");
                c
            }
            Err(e) => {
                println!("  error: failed to load configuration file");
                println!("         {e}");
                return Ok(2);
            }
        };

        let mut defects = 0;

        for variant in &config.variants {
            match load_mapping(&variant.mapping_file, variant.mapping_collection.as_deref()) {
                Ok(mapping) => match mapping.validate(&config) {
                    Ok(_) => {
                        println!(
                            "  ok: variant '{}' mapping ({} entries)",
                            variant.name,
                            mapping.entries().len()
                        );
                    }
                    Err(e) => {
                        println!("  error: variant '{}' mapping invalid: {e}", variant.name);
                        defects += 1;
                    }
                },
                Err(e) => {
                    println!("  error: variant '{}' mapping unreadable: {e}", variant.name);
                    defects += 1;
                }
            }

            if Path::new(&variant.template).is_file() {
                println!("  ok: variant '{}' template {}", variant.name, variant.template);
            } else {
                println!(
                    "  error: variant '{}' template missing: {}",
                    variant.name, variant.template
                );
                defects += 1;
            }
        }

        if defects > 0 {
            println!();
            println!("Configuration validation failed with {defects} defect(s)");
            return Ok(2);
        }

        println!();
        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Database: {}", config.database.connection_string_safe());
        println!("  Facility: {}", config.facility.location);
        println!("  Export Mode: {}", config.export.mode);
        println!("  Output Directory: {}", config.export.output_dir);
        println!("  Tables: {}", config.tables.len());
        println!("  Variants: {}", config.variants.len());
        println!();
        Ok(0)
    }
}
