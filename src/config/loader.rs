//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PartXmlConfig;
use crate::domain::errors::PartXmlError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PartXmlConfig
/// 4. Applies environment variable overrides (PARTXML_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file cannot be read, the TOML is
/// malformed, a referenced environment variable is unset, or validation
/// fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<PartXmlConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PartXmlError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PartXmlError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PartXmlConfig = toml::from_str(&contents)
        .map_err(|e| PartXmlError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        PartXmlError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Returns an error naming every
/// referenced variable that is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PartXmlError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the PARTXML_* prefix
///
/// For example: PARTXML_DATABASE_CONNECTION_STRING, PARTXML_EXPORT_MODE.
fn apply_env_overrides(config: &mut PartXmlConfig) {
    if let Ok(val) = std::env::var("PARTXML_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("PARTXML_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("PARTXML_DATABASE_CONNECTION_STRING") {
        config.database.connection_string = val;
    }
    if let Ok(val) = std::env::var("PARTXML_DATABASE_MAX_CONNECTIONS") {
        if let Ok(n) = val.parse() {
            config.database.max_connections = n;
        }
    }

    if let Ok(val) = std::env::var("PARTXML_FACILITY_LOCATION") {
        config.facility.location = val;
    }

    if let Ok(val) = std::env::var("PARTXML_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Ok(val) = std::env::var("PARTXML_EXPORT_MODE") {
        config.export.mode = val;
    }
    if let Ok(val) = std::env::var("PARTXML_EXPORT_PARALLEL_PARTS") {
        if let Ok(n) = val.parse() {
            config.export.parallel_parts = n;
        }
    }

    if let Ok(val) = std::env::var("PARTXML_LOGGING_FILE_ENABLED") {
        config.logging.file_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PARTXML_LOGGING_FILE_PATH") {
        config.logging.file_path = val;
    }
}
