//! SQL text builders for the export engine
//!
//! All query text is assembled here so identifier handling stays in one
//! place. Table and column names originate from configuration files, so
//! they are validated against a strict identifier grammar before ever
//! reaching query text; the entity value itself is always a bound
//! parameter (`$1`), never interpolated.

use crate::config::schema::{JoinConfig, TableCategory, TableSpec};

/// Whether `s` is acceptable as a bare SQL identifier
///
/// ASCII letters, digits, and underscores, not starting with a digit.
/// Quoted or schema-qualified identifiers are deliberately rejected: the
/// mapping sources never produce them.
pub fn valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Latest-row lookup for one mapping entry
///
/// `SELECT <cols> FROM <table> WHERE <key> = $1 ORDER BY <recency> DESC,
/// ... LIMIT 1` — a part may have many historical rows (re-tests,
/// re-assemblies); the most recent one wins.
pub fn latest_row_select(table: &TableSpec, columns: &[String]) -> String {
    let order = table
        .recency_columns
        .iter()
        .map(|c| format!("{c} DESC"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} FROM {} WHERE {} = $1 ORDER BY {} LIMIT 1",
        columns.join(", "),
        table.name,
        table.business_key,
        order
    )
}

/// Completes a pre-authored nested-query fragment
///
/// Fragments are stored without their filter; the trailing
/// `WHERE <table>.<key> = $1` clause is appended here.
pub fn nested_query(fragment: &str, table: &TableSpec) -> String {
    format!(
        "{} WHERE {}.{} = $1",
        fragment.trim_end().trim_end_matches(';'),
        table.name,
        table.business_key
    )
}

/// Institution lookup joined through the module-info chain
///
/// The join path branches on the closed table category: piece-part tables
/// need two hops through the assembly-linking table; assembly-like tables
/// join module info directly on the shared module key. The match is
/// exhaustive with no default arm.
pub fn institution_select(table: &TableSpec, joins: &JoinConfig) -> String {
    match table.category {
        TableCategory::PiecePart => format!(
            "SELECT {mt}.{inst} FROM {t} \
             JOIN {lt} ON {t}.{lk} = {lt}.{lk} \
             JOIN {mt} ON {lt}.{mk} = {mt}.{mk} \
             WHERE {t}.{key} = $1",
            mt = joins.module_table,
            inst = joins.institution_column,
            t = table.name,
            lt = joins.link_table,
            lk = joins.link_key,
            mk = joins.module_key,
            key = table.business_key,
        ),
        TableCategory::Assembly => format!(
            "SELECT {mt}.{inst} FROM {mt} \
             INNER JOIN {t} ON {t}.{mk} = {mt}.{mk} \
             WHERE {t}.{key} = $1",
            mt = joins.module_table,
            inst = joins.institution_column,
            t = table.name,
            mk = joins.module_key,
            key = table.business_key,
        ),
    }
}

/// Distinct business keys registered in one table
///
/// With `untracked_column` set, restricts to rows not yet stamped by the
/// generation tracker, which is what makes incremental re-runs cheap.
pub fn part_names_select(table: &TableSpec, untracked_column: Option<&str>) -> String {
    match untracked_column {
        Some(col) => format!(
            "SELECT DISTINCT {key} FROM {t} WHERE {col} IS NULL",
            key = table.business_key,
            t = table.name,
        ),
        None => format!(
            "SELECT DISTINCT {key} FROM {t}",
            key = table.business_key,
            t = table.name,
        ),
    }
}

/// Generation-tracking timestamp update for one table
pub fn tracking_update(table: &TableSpec, tracking_column: &str) -> String {
    format!(
        "UPDATE {t} SET {col} = now() WHERE {key} = $1",
        t = table.name,
        col = tracking_column,
        key = table.business_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TableCategory;

    fn proto_assembly() -> TableSpec {
        TableSpec {
            name: "proto_assembly".to_string(),
            business_key: "proto_name".to_string(),
            recency_columns: vec!["ass_run_date".to_string(), "ass_time_begin".to_string()],
            category: TableCategory::Assembly,
        }
    }

    fn sensor() -> TableSpec {
        TableSpec {
            name: "sensor".to_string(),
            business_key: "sen_name".to_string(),
            recency_columns: vec!["sen_received".to_string()],
            category: TableCategory::PiecePart,
        }
    }

    #[test]
    fn test_valid_identifier() {
        assert!(valid_identifier("proto_name"));
        assert!(valid_identifier("_hidden"));
        assert!(valid_identifier("col2"));
        assert!(!valid_identifier(""));
        assert!(!valid_identifier("2col"));
        assert!(!valid_identifier("name; DROP TABLE parts"));
        assert!(!valid_identifier("public.sensor"));
        assert!(!valid_identifier("a b"));
    }

    #[test]
    fn test_latest_row_select_shape() {
        let sql = latest_row_select(
            &proto_assembly(),
            &["ass_run_date".to_string(), "ass_time_begin".to_string()],
        );
        assert_eq!(
            sql,
            "SELECT ass_run_date, ass_time_begin FROM proto_assembly \
             WHERE proto_name = $1 \
             ORDER BY ass_run_date DESC, ass_time_begin DESC LIMIT 1"
        );
    }

    #[test]
    fn test_nested_query_appends_filter() {
        let sql = nested_query(
            "SELECT count(*) FROM proto_inspect JOIN proto_assembly USING (proto_no)",
            &proto_assembly(),
        );
        assert!(sql.ends_with("WHERE proto_assembly.proto_name = $1"));
    }

    #[test]
    fn test_nested_query_strips_trailing_semicolon() {
        let sql = nested_query("SELECT grade FROM proto_inspect;", &proto_assembly());
        assert!(!sql.contains(';'));
    }

    #[test]
    fn test_institution_join_assembly() {
        let sql = institution_select(&proto_assembly(), &JoinConfig::default());
        assert!(sql.contains("FROM module_info"));
        assert!(sql.contains("INNER JOIN proto_assembly"));
        assert!(sql.contains("proto_assembly.module_no = module_info.module_no"));
        assert!(sql.ends_with("WHERE proto_assembly.proto_name = $1"));
    }

    #[test]
    fn test_institution_join_piece_part_two_hops() {
        let sql = institution_select(&sensor(), &JoinConfig::default());
        assert!(sql.contains("JOIN proto_assembly ON sensor.proto_no = proto_assembly.proto_no"));
        assert!(sql.contains("JOIN module_info ON proto_assembly.module_no = module_info.module_no"));
        assert!(sql.ends_with("WHERE sensor.sen_name = $1"));
    }

    #[test]
    fn test_part_names_select_untracked() {
        let sql = part_names_select(&proto_assembly(), Some("xml_gen_datetime"));
        assert_eq!(
            sql,
            "SELECT DISTINCT proto_name FROM proto_assembly WHERE xml_gen_datetime IS NULL"
        );
    }

    #[test]
    fn test_part_names_select_full() {
        let sql = part_names_select(&proto_assembly(), None);
        assert_eq!(sql, "SELECT DISTINCT proto_name FROM proto_assembly");
    }

    #[test]
    fn test_tracking_update() {
        let sql = tracking_update(&proto_assembly(), "xml_gen_datetime");
        assert_eq!(
            sql,
            "UPDATE proto_assembly SET xml_gen_datetime = now() WHERE proto_name = $1"
        );
    }
}
