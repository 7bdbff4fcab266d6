//! Status command implementation
//!
//! This module implements the `status` command, which reports how many
//! parts per contributing table are still waiting for a document.

use crate::adapters::postgres::create_part_store;
use crate::config::load_config;
use crate::core::resolve::sql;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Filter by variant name
    #[arg(long)]
    pub variant: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("Export Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let store = match create_part_store(&config.database) {
            Ok(s) => s,
            Err(e) => {
                println!("Failed to create database client");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        if let Err(e) = store.test_connection().await {
            println!("Failed to connect to database");
            println!("   Error: {e}");
            return Ok(4);
        }

        let variants: Vec<_> = config
            .variants
            .iter()
            .filter(|v| match &self.variant {
                Some(name) => &v.name == name,
                None => true,
            })
            .collect();

        if variants.is_empty() {
            println!("No variants match the specified filter.");
            return Ok(0);
        }

        println!(
            "{:<20} {:<24} {:>10} {:>10}",
            "Variant", "Table", "Total", "Pending"
        );
        println!("{}", "-".repeat(68));

        for variant in variants {
            for table_name in &variant.contributing_tables {
                let table = match config.table(table_name) {
                    Some(t) => t,
                    None => continue,
                };

                let total = match store.fetch_names(&sql::part_names_select(table, None)).await {
                    Ok(names) => names.len(),
                    Err(e) => {
                        println!("Failed to query {table_name}: {e}");
                        return Ok(5);
                    }
                };
                let pending = match store
                    .fetch_names(&sql::part_names_select(
                        table,
                        Some(&config.export.tracking_column),
                    ))
                    .await
                {
                    Ok(names) => names.len(),
                    Err(e) => {
                        println!("Failed to query {table_name}: {e}");
                        return Ok(5);
                    }
                };

                println!(
                    "{:<20} {:<24} {:>10} {:>10}",
                    variant.name, table.name, total, pending
                );
            }
        }

        println!();
        Ok(0)
    }
}
