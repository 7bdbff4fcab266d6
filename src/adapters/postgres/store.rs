//! [`PartStore`] backed by the pooled PostgreSQL client
//!
//! Every fetched value is flattened to text here, matching what the
//! template renderer consumes. Numeric, boolean, and temporal columns
//! get their canonical string forms; SQL NULL stays `None`.

use crate::adapters::database::{PartStore, RecordRow};
use crate::adapters::postgres::client::PostgresClient;
use crate::domain::{PartXmlError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tokio_postgres::types::Type;
use tokio_postgres::Row;

pub struct PostgresPartStore {
    client: PostgresClient,
}

impl PostgresPartStore {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PartStore for PostgresPartStore {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn fetch_row(&self, sql: &str, key: &str) -> Result<Option<RecordRow>> {
        let rows = self.client.query(sql, &[&key]).await?;
        match rows.first() {
            Some(row) => Ok(Some(row_to_record(row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_names(&self, sql: &str) -> Result<Vec<String>> {
        let rows = self.client.query(sql, &[]).await?;
        let mut names = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = column_to_string(row, 0)? {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn execute_keyed(&self, sql: &str, key: &str) -> Result<u64> {
        self.client.execute(sql, &[&key]).await
    }
}

/// Flattens one driver row into named text values
fn row_to_record(row: &Row) -> Result<RecordRow> {
    let mut record = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        record.push((column.name().to_string(), column_to_string(row, idx)?));
    }
    Ok(record)
}

/// Converts one column to its text form, keeping NULL as `None`
fn column_to_string(row: &Row, idx: usize) -> Result<Option<String>> {
    let column = &row.columns()[idx];
    let value = match *column.type_() {
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx).map_err(conv_err)?
        }
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::TIME => row
            .try_get::<_, Option<NaiveTime>>(idx)
            .map_err(conv_err)?
            .map(|v| v.to_string()),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(conv_err)?
            .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string()),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(conv_err)?
            .map(|v| v.format("%Y-%m-%d %H:%M:%S%z").to_string()),
        ref other => {
            return Err(PartXmlError::Query(format!(
                "unsupported column type {} for {}",
                other,
                column.name()
            )))
        }
    };
    Ok(value)
}

fn conv_err(e: tokio_postgres::Error) -> PartXmlError {
    PartXmlError::Query(format!("column conversion failed: {e}"))
}
