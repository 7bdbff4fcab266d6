//! Shared test fixtures: an in-memory part store and config builders

use async_trait::async_trait;
use partxml::adapters::database::{PartStore, RecordRow};
use partxml::config::schema::{
    ApplicationConfig, DatabaseConfig, ExportConfig, FacilityConfig, JoinConfig, LoggingConfig,
    PartXmlConfig, TableCategory, TableSpec, VariantConfig,
};
use partxml::domain::{PartXmlError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`PartStore`] with canned responses
///
/// Responses are registered against an SQL substring; the first
/// registered pattern contained in the issued statement wins. Every
/// issued statement is recorded for assertions on query shape.
#[derive(Default)]
pub struct MockStore {
    rows: Vec<(String, RecordRow)>,
    names: Vec<(String, Vec<String>)>,
    failures: Vec<(String, &'static str)>,
    delays: Vec<(String, u64)>,
    issued: Mutex<Vec<(String, Option<String>)>>,
    updates: Mutex<HashMap<String, u64>>,
    connection_ok: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            connection_ok: true,
            ..Self::default()
        }
    }

    pub fn broken_connection() -> Self {
        Self {
            connection_ok: false,
            ..Self::default()
        }
    }

    /// Registers a row for statements containing `pattern`
    pub fn with_row(mut self, pattern: &str, row: RecordRow) -> Self {
        self.rows.push((pattern.to_string(), row));
        self
    }

    /// Registers a name list for statements containing `pattern`
    pub fn with_names(mut self, pattern: &str, names: &[&str]) -> Self {
        self.names
            .push((pattern.to_string(), names.iter().map(|s| s.to_string()).collect()));
        self
    }

    /// Makes statements containing `pattern` fail; `kind` is "query" or
    /// "connection"
    pub fn with_failure(mut self, pattern: &str, kind: &'static str) -> Self {
        self.failures.push((pattern.to_string(), kind));
        self
    }

    /// Delays statements containing `pattern` by `secs` before responding
    pub fn with_delay(mut self, pattern: &str, secs: u64) -> Self {
        self.delays.push((pattern.to_string(), secs));
        self
    }

    /// Every statement issued through the store, with its bound key
    pub fn issued(&self) -> Vec<(String, Option<String>)> {
        self.issued.lock().unwrap().clone()
    }

    /// Number of tracking updates issued for `key`
    pub fn update_count(&self, key: &str) -> u64 {
        *self.updates.lock().unwrap().get(key).unwrap_or(&0)
    }

    fn record(&self, sql: &str, key: Option<&str>) {
        self.issued
            .lock()
            .unwrap()
            .push((sql.to_string(), key.map(str::to_string)));
    }

    async fn apply_delay(&self, sql: &str) {
        for (pattern, secs) in &self.delays {
            if sql.contains(pattern.as_str()) {
                tokio::time::sleep(std::time::Duration::from_secs(*secs)).await;
            }
        }
    }

    fn check_failure(&self, sql: &str) -> Result<()> {
        if !self.connection_ok {
            return Err(PartXmlError::Connection("connection refused".to_string()));
        }
        for (pattern, kind) in &self.failures {
            if sql.contains(pattern.as_str()) {
                return Err(match *kind {
                    "connection" => PartXmlError::Connection("connection lost".to_string()),
                    _ => PartXmlError::Query(format!("canned failure for '{pattern}'")),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PartStore for MockStore {
    async fn test_connection(&self) -> Result<()> {
        if self.connection_ok {
            Ok(())
        } else {
            Err(PartXmlError::Connection("connection refused".to_string()))
        }
    }

    async fn fetch_row(&self, sql: &str, key: &str) -> Result<Option<RecordRow>> {
        self.record(sql, Some(key));
        self.apply_delay(sql).await;
        self.check_failure(sql)?;
        for (pattern, row) in &self.rows {
            if sql.contains(pattern.as_str()) {
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn fetch_names(&self, sql: &str) -> Result<Vec<String>> {
        self.record(sql, None);
        self.check_failure(sql)?;
        for (pattern, names) in &self.names {
            if sql.contains(pattern.as_str()) {
                return Ok(names.clone());
            }
        }
        Ok(Vec::new())
    }

    async fn execute_keyed(&self, sql: &str, key: &str) -> Result<u64> {
        self.record(sql, Some(key));
        self.apply_delay(sql).await;
        self.check_failure(sql)?;
        *self
            .updates
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;
        Ok(1)
    }
}

/// Row helper
pub fn row(cols: &[(&str, Option<&str>)]) -> RecordRow {
    cols.iter()
        .map(|(n, v)| (n.to_string(), v.map(str::to_string)))
        .collect()
}

/// Configuration over one assembly table and one variant
pub fn test_config(mapping_file: &str, template: &str, output_dir: &str) -> PartXmlConfig {
    PartXmlConfig {
        application: ApplicationConfig {
            log_level: "info".to_string(),
            dry_run: false,
        },
        database: DatabaseConfig {
            connection_string: "postgresql://postgres:pw@localhost:5432/hgcdb".to_string(),
            max_connections: 2,
            connection_timeout_seconds: 5,
            statement_timeout_seconds: 5,
        },
        facility: FacilityConfig {
            location: "CMU".to_string(),
            institution_from_db: false,
        },
        joins: JoinConfig::default(),
        export: ExportConfig {
            output_dir: output_dir.to_string(),
            mode: "untracked".to_string(),
            tracking_column: "xml_gen_datetime".to_string(),
            parallel_parts: 1,
            part_timeout_seconds: 30,
        },
        tables: vec![
            TableSpec {
                name: "proto_assembly".to_string(),
                business_key: "proto_name".to_string(),
                recency_columns: vec![
                    "ass_run_date".to_string(),
                    "ass_time_begin".to_string(),
                ],
                category: TableCategory::Assembly,
            },
            TableSpec {
                name: "baseplate".to_string(),
                business_key: "bp_name".to_string(),
                recency_columns: vec!["bp_received".to_string()],
                category: TableCategory::PiecePart,
            },
        ],
        variants: vec![VariantConfig {
            name: "proto_assembly".to_string(),
            mapping_file: mapping_file.to_string(),
            mapping_collection: None,
            template: template.to_string(),
            contributing_tables: vec!["proto_assembly".to_string()],
            tracking_tables: vec!["proto_assembly".to_string()],
            output_subdir: None,
        }],
        logging: LoggingConfig::default(),
    }
}
