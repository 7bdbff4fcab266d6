//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for PartXML using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// PartXML - database-to-XML document export tool
#[derive(Parser, Debug)]
#[command(name = "partxml")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "partxml.toml", env = "PARTXML_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PARTXML_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export XML documents for pending parts
    Export(commands::export::ExportArgs),

    /// Validate configuration, mappings, and templates
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show pending and tracked part counts per variant
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
