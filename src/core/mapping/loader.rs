//! Mapping source parsers
//!
//! Format A is a row-oriented CSV table of `(placeholder, column-list,
//! table)` rows, where a column-list cell is either a bare column name or
//! a bracketed list literal like `['ass_run_date', 'ass_time_begin']`.
//! The list literal is parsed by a strict splitter; there is no dynamic
//! evaluation of the cell text.
//!
//! Format B is a YAML document of named collections, one per export
//! variant, each a list of `{xml_temp_val, dbase_col, dbase_table,
//! nested_query}` entries.

use super::{Mapping, MappingEntry};
use crate::domain::errors::PartXmlError;
use crate::domain::result::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Loads a mapping from a source file, dispatching on extension
///
/// CSV sources ignore `collection`; YAML sources require it.
pub fn load_mapping(path: impl AsRef<Path>, collection: Option<&str>) -> Result<Mapping> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => load_mapping_csv(path),
        Some("yaml") | Some("yml") => {
            let name = collection.ok_or_else(|| {
                PartXmlError::Configuration(format!(
                    "YAML mapping {} requires a collection name",
                    path.display()
                ))
            })?;
            load_mapping_collection(path, name)
        }
        _ => Err(PartXmlError::Configuration(format!(
            "Unsupported mapping format: {}",
            path.display()
        ))),
    }
}

/// Loads the tabular CSV mapping format
fn load_mapping_csv(path: &Path) -> Result<Mapping> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            PartXmlError::Configuration(format!(
                "Failed to open mapping file {}: {e}",
                path.display()
            ))
        })?;

    let mut entries = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = idx + 1;

        let placeholder = record
            .get(0)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                PartXmlError::Configuration(format!(
                    "mapping row {row}: missing placeholder name"
                ))
            })?;

        let columns = match record.get(1).map(str::trim) {
            Some(cell) if !cell.is_empty() => parse_column_list(cell).map_err(|e| {
                PartXmlError::Configuration(format!("mapping row {row}: {e}"))
            })?,
            _ => Vec::new(),
        };

        let table = record
            .get(2)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        entries.push(MappingEntry {
            placeholder: placeholder.to_string(),
            table,
            columns,
            nested_query: None,
        });
    }

    Mapping::new(entries)
}

/// Parses a column-list cell: a bare name or a bracketed list literal
///
/// Accepts `col`, `['a', 'b']`, `["a", "b"]`, and unquoted bracketed
/// items. Unbalanced brackets, unterminated quotes, and empty items are
/// parse errors.
fn parse_column_list(cell: &str) -> std::result::Result<Vec<String>, String> {
    let cell = cell.trim();
    if !cell.starts_with('[') {
        if cell.contains(']') || cell.contains('\'') || cell.contains('"') {
            return Err(format!("unparseable column list '{cell}'"));
        }
        return Ok(vec![cell.to_string()]);
    }

    let inner = cell
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| format!("unbalanced brackets in column list '{cell}'"))?;

    let mut columns = Vec::new();
    for raw in inner.split(',') {
        let item = raw.trim();
        if item.is_empty() {
            return Err(format!("empty item in column list '{cell}'"));
        }
        let unquoted = if (item.starts_with('\'') && item.ends_with('\'') && item.len() >= 2)
            || (item.starts_with('"') && item.ends_with('"') && item.len() >= 2)
        {
            &item[1..item.len() - 1]
        } else if item.starts_with('\'') || item.starts_with('"') {
            return Err(format!("unterminated quote in column list '{cell}'"));
        } else {
            item
        };
        if unquoted.is_empty() {
            return Err(format!("empty item in column list '{cell}'"));
        }
        columns.push(unquoted.to_string());
    }
    Ok(columns)
}

/// A single column name or an ordered list of names
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColumnSpec {
    One(String),
    Many(Vec<String>),
}

/// Raw YAML entry shape
#[derive(Debug, Deserialize)]
struct YamlEntry {
    xml_temp_val: String,
    #[serde(default)]
    dbase_col: Option<ColumnSpec>,
    #[serde(default)]
    dbase_table: Option<String>,
    #[serde(default)]
    nested_query: Option<String>,
}

/// Loads one named collection from the structured YAML mapping format
pub fn load_mapping_collection(path: impl AsRef<Path>, collection: &str) -> Result<Mapping> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PartXmlError::Configuration(format!(
            "Failed to read mapping file {}: {e}",
            path.display()
        ))
    })?;

    let document: BTreeMap<String, Vec<YamlEntry>> = serde_yaml::from_str(&contents)?;
    let raw = document.get(collection).ok_or_else(|| {
        PartXmlError::Configuration(format!(
            "mapping collection '{collection}' not found in {}",
            path.display()
        ))
    })?;

    let entries = raw
        .iter()
        .map(|e| MappingEntry {
            placeholder: e.xml_temp_val.clone(),
            table: e
                .dbase_table
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            columns: match &e.dbase_col {
                Some(ColumnSpec::One(c)) if !c.trim().is_empty() => vec![c.trim().to_string()],
                Some(ColumnSpec::Many(cs)) => {
                    cs.iter().map(|c| c.trim().to_string()).collect()
                }
                _ => Vec::new(),
            },
            nested_query: e
                .nested_query
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
        .collect();

    Mapping::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_column_list_single() {
        assert_eq!(parse_column_list("comment").unwrap(), vec!["comment"]);
    }

    #[test]
    fn test_parse_column_list_bracketed() {
        assert_eq!(
            parse_column_list("['ass_run_date', 'ass_time_begin']").unwrap(),
            vec!["ass_run_date", "ass_time_begin"]
        );
        assert_eq!(
            parse_column_list(r#"["a", "b", "c"]"#).unwrap(),
            vec!["a", "b", "c"]
        );
        assert_eq!(parse_column_list("[a, b]").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_column_list_malformed() {
        assert!(parse_column_list("['a', 'b'").is_err());
        assert!(parse_column_list("['a', ]").is_err());
        assert!(parse_column_list("['a, b]").is_err());
        assert!(parse_column_list("a]b").is_err());
    }

    #[test]
    fn test_load_csv_mapping() {
        let file = temp_file(
            ".csv",
            "COMMENT,comment,proto_assembly\n\
             RUN_BEGIN_TIMESTAMP_,\"['ass_run_date', 'ass_time_begin']\",proto_assembly\n\
             LOCATION,,\n",
        );
        let mapping = load_mapping(file.path(), None).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.entries()[0].columns, ["comment"]);
        assert_eq!(
            mapping.entries()[1].columns,
            ["ass_run_date", "ass_time_begin"]
        );
        assert!(!mapping.entries()[2].is_resolvable());
    }

    #[test]
    fn test_load_csv_missing_placeholder() {
        let file = temp_file(".csv", ",comment,proto_assembly\n");
        assert!(load_mapping(file.path(), None).is_err());
    }

    #[test]
    fn test_load_yaml_collection() {
        let file = temp_file(
            ".yaml",
            r#"
proto_assembly:
  - xml_temp_val: ID
    dbase_col: ""
    dbase_table: ""
    nested_query: ""
  - xml_temp_val: RUN_BEGIN_TIMESTAMP_
    dbase_col: [ass_run_date, ass_time_begin]
    dbase_table: proto_assembly
    nested_query: ""
  - xml_temp_val: GRADE
    dbase_col: grade
    dbase_table: proto_inspect
    nested_query: "SELECT grade FROM proto_inspect JOIN proto_assembly USING (proto_no)"
sensor_build:
  - xml_temp_val: KIND_OF_PART
    dbase_col: [sen_thickness, geometry]
    dbase_table: sensor
"#,
        );

        let mapping = load_mapping(file.path(), Some("proto_assembly")).unwrap();
        assert_eq!(mapping.len(), 3);
        assert!(!mapping.entries()[0].is_resolvable());
        assert_eq!(
            mapping.entries()[1].columns,
            ["ass_run_date", "ass_time_begin"]
        );
        assert!(mapping.entries()[2].nested_query.is_some());

        let sensor = load_mapping(file.path(), Some("sensor_build")).unwrap();
        assert_eq!(sensor.len(), 1);
    }

    #[test]
    fn test_load_yaml_missing_collection() {
        let file = temp_file(".yaml", "proto_assembly: []\n");
        let err = load_mapping(file.path(), Some("hexaboard")).unwrap_err();
        assert!(err.to_string().contains("hexaboard"));
    }

    #[test]
    fn test_load_yaml_requires_collection_name() {
        let file = temp_file(".yaml", "proto_assembly: []\n");
        assert!(load_mapping(file.path(), None).is_err());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = temp_file(".json", "{}");
        assert!(load_mapping(file.path(), None).is_err());
    }
}
