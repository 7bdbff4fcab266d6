//! Integration tests for the export coordinator
//!
//! A temp directory holds the mapping, template, and output tree; the
//! in-memory store supplies part names and rows. The tests cover the
//! untracked universe, per-part failure isolation, dry-run behavior,
//! and graceful shutdown.

mod common;

use common::{row, test_config, MockStore};
use partxml::core::export::ExportCoordinator;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

const TEMPLATE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
    <ROOT><PART><SERIAL_NUMBER>{{ ID }}</SERIAL_NUMBER>\
    <LOCATION>{{ LOCATION }}</LOCATION>\
    <COMMENT>{{ COMMENT }}</COMMENT></PART></ROOT>";

const MAPPING: &str = "ID,,\nLOCATION,,\nCOMMENT,comment,proto_assembly\n";

struct Fixture {
    _dir: TempDir,
    mapping_path: String,
    template_path: String,
    output_dir: String,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let mapping_path = dir.path().join("proto_assembly.csv");
    let template_path = dir.path().join("assembly_upload.xml");
    let output_dir = dir.path().join("output");

    fs::write(&mapping_path, MAPPING).unwrap();
    fs::write(&template_path, TEMPLATE).unwrap();

    Fixture {
        mapping_path: mapping_path.to_string_lossy().into_owned(),
        template_path: template_path.to_string_lossy().into_owned(),
        output_dir: output_dir.to_string_lossy().into_owned(),
        _dir: dir,
    }
}

fn store_with_parts(parts: &[&str]) -> MockStore {
    MockStore::new()
        .with_names("SELECT DISTINCT proto_name FROM proto_assembly", parts)
        .with_row(
            "SELECT comment FROM proto_assembly",
            row(&[("comment", Some("looks good"))]),
        )
}

#[tokio::test]
async fn test_export_writes_documents_and_tracks() {
    let fx = fixture();
    let config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    let store = Arc::new(store_with_parts(&["P1", "P2"]));
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store.clone(), rx);
    let summary = coordinator.execute_export().await.unwrap();

    assert_eq!(summary.total_parts, 2);
    assert_eq!(summary.documents_written, 2);
    assert_eq!(summary.failed_parts, 0);
    assert!(summary.is_successful());

    for part in ["P1", "P2"] {
        let path = Path::new(&fx.output_dir).join(format!("{part}_assembly_upload.xml"));
        let document = fs::read_to_string(&path).unwrap();
        assert!(document.contains(&format!("<SERIAL_NUMBER>{part}</SERIAL_NUMBER>")));
        assert!(document.contains("<LOCATION>CMU</LOCATION>"));
        assert!(document.contains("<COMMENT>looks good</COMMENT>"));
        assert_eq!(store.update_count(part), 1);
    }
}

#[tokio::test]
async fn test_untracked_mode_filters_universe() {
    let fx = fixture();
    let config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    let store = Arc::new(store_with_parts(&["P1"]));
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store.clone(), rx);
    coordinator.execute_export().await.unwrap();

    let names_sql = &store.issued()[0].0;
    assert_eq!(
        names_sql,
        "SELECT DISTINCT proto_name FROM proto_assembly WHERE xml_gen_datetime IS NULL"
    );
}

#[tokio::test]
async fn test_full_mode_takes_every_part() {
    let fx = fixture();
    let mut config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    config.export.mode = "full".to_string();
    let store = Arc::new(store_with_parts(&["P1"]));
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store.clone(), rx);
    coordinator.execute_export().await.unwrap();

    let names_sql = &store.issued()[0].0;
    assert_eq!(names_sql, "SELECT DISTINCT proto_name FROM proto_assembly");
}

#[tokio::test]
async fn test_one_failing_part_does_not_abort_batch() {
    let fx = fixture();
    let mut config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    config.export.mode = "full".to_string();
    let store = Arc::new(
        MockStore::new()
            .with_names(
                "SELECT DISTINCT proto_name FROM proto_assembly",
                &["P1", "P2", "P3"],
            )
            .with_failure("WHERE proto_name = $1 ORDER BY", "query"),
    );
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store.clone(), rx);
    let summary = coordinator.execute_export().await.unwrap();

    // Field lookups fail per part but the parts still render with the
    // unmatched token left in place, so all three documents are written.
    assert_eq!(summary.total_parts, 3);
    assert_eq!(summary.documents_written, 3);
    assert_eq!(summary.field_failures, 3);
    assert_eq!(summary.failed_parts, 0);
}

#[tokio::test]
async fn test_tracking_failure_keeps_document() {
    let fx = fixture();
    let config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    let store = Arc::new(
        store_with_parts(&["P1"]).with_failure("UPDATE proto_assembly SET", "query"),
    );
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store.clone(), rx);
    let summary = coordinator.execute_export().await.unwrap();

    assert_eq!(summary.documents_written, 1);
    assert_eq!(summary.tracking_failures, 1);
    assert_eq!(summary.failed_parts, 0);

    let path = Path::new(&fx.output_dir).join("P1_assembly_upload.xml");
    assert!(path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_part_timeout_counts_as_part_failure() {
    use partxml::core::export::ExportErrorType;

    let fx = fixture();
    let config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    // Field lookups hang far past the configured per-part timeout.
    let store = Arc::new(store_with_parts(&["P1"]).with_delay("SELECT comment", 600));
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store, rx);
    let summary = coordinator.execute_export().await.unwrap();

    assert_eq!(summary.failed_parts, 1);
    assert_eq!(summary.documents_written, 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].message.contains("timed out"));
    // A timeout is not a field query failure.
    assert!(!matches!(summary.errors[0].error_type, ExportErrorType::Query));
}

#[tokio::test]
async fn test_tracking_failure_in_one_table_still_stamps_the_rest() {
    use partxml::core::track::GenerationTracker;
    use partxml::domain::{PartId, PartXmlError};

    let fx = fixture();
    let config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    let store = Arc::new(MockStore::new().with_failure("UPDATE proto_assembly SET", "query"));
    let tracker = GenerationTracker::new(
        store.clone(),
        config.tables.clone(),
        config.export.tracking_column.clone(),
    );

    let part = PartId::new("P1").unwrap();
    let err = tracker.mark_generated(&part).await.unwrap_err();
    assert!(matches!(err, PartXmlError::Tracking(_)));

    // The baseplate update was issued even though the first table failed.
    let issued = store.issued();
    assert!(issued.iter().any(|(sql, _)| sql.contains("UPDATE baseplate SET")));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let fx = fixture();
    let mut config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    config.application.dry_run = true;
    let store = Arc::new(store_with_parts(&["P1"]));
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store.clone(), rx);
    let summary = coordinator.execute_export().await.unwrap();

    assert_eq!(summary.total_parts, 1);
    assert_eq!(summary.documents_written, 0);
    assert_eq!(summary.failed_parts, 0);
    assert_eq!(store.update_count("P1"), 0);
    assert!(!Path::new(&fx.output_dir).exists());
}

#[tokio::test]
async fn test_broken_connection_is_fatal() {
    let fx = fixture();
    let config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    let store = Arc::new(MockStore::broken_connection());
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store, rx);
    let err = coordinator.execute_export().await.unwrap_err();
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_missing_template_recorded_not_fatal() {
    let fx = fixture();
    let mut config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    config.variants[0].template = format!("{}.missing", fx.template_path);
    let store = Arc::new(store_with_parts(&["P1"]));
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store, rx);
    let summary = coordinator.execute_export().await.unwrap();

    assert_eq!(summary.documents_written, 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(!summary.is_successful());
}

#[tokio::test]
async fn test_shutdown_before_start_interrupts() {
    let fx = fixture();
    let config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    let store = Arc::new(store_with_parts(&["P1"]));
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let coordinator = ExportCoordinator::new(Arc::new(config), store, rx);
    let summary = coordinator.execute_export().await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.documents_written, 0);
}

#[tokio::test]
async fn test_parallel_parts_all_processed() {
    let fx = fixture();
    let mut config = test_config(&fx.mapping_path, &fx.template_path, &fx.output_dir);
    config.export.parallel_parts = 4;
    let parts: Vec<String> = (0..10).map(|i| format!("P{i:02}")).collect();
    let part_refs: Vec<&str> = parts.iter().map(String::as_str).collect();
    let store = Arc::new(store_with_parts(&part_refs));
    let (_tx, rx) = watch::channel(false);

    let coordinator = ExportCoordinator::new(Arc::new(config), store, rx);
    let summary = coordinator.execute_export().await.unwrap();

    assert_eq!(summary.total_parts, 10);
    assert_eq!(summary.documents_written, 10);
    assert!(summary.is_successful());
}
