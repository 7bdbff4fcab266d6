//! Export coordinator - main orchestrator for the export process
//!
//! This module coordinates the whole export workflow: discovering the
//! part universe for each variant, resolving fields, rendering
//! documents, and stamping generation timestamps. One part failing
//! never aborts the batch; only connection loss or a configuration
//! defect does.

use crate::adapters::database::PartStore;
use crate::config::schema::{PartXmlConfig, TableSpec, VariantConfig};
use crate::core::export::summary::{ExportError, ExportErrorType, ExportSummary};
use crate::core::mapping::{self, Mapping};
use crate::core::render::TemplateRenderer;
use crate::core::resolve::{sql, FieldResolver};
use crate::core::track::GenerationTracker;
use crate::domain::{PartId, PartXmlError, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Outcome of processing a single part
struct PartOutcome {
    part: PartId,
    written: bool,
    field_failures: usize,
    tracking_failed: bool,
    error: Option<PartXmlError>,
}

/// Export coordinator
pub struct ExportCoordinator {
    config: Arc<PartXmlConfig>,
    store: Arc<dyn PartStore>,
    shutdown_rx: watch::Receiver<bool>,
    dry_run: bool,
}

impl ExportCoordinator {
    /// Create a new export coordinator over an already-built store
    pub fn new(
        config: Arc<PartXmlConfig>,
        store: Arc<dyn PartStore>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let dry_run = config.application.dry_run;
        Self {
            config,
            store,
            shutdown_rx,
            dry_run,
        }
    }

    /// Force dry-run mode regardless of configuration
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = self.dry_run || dry_run;
        self
    }

    /// Execute the export
    ///
    /// Verifies database connectivity, then processes every configured
    /// variant in order. Variant-level defects (unreadable mapping,
    /// missing template) are recorded and the next variant still runs;
    /// connection loss aborts the whole run.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();

        tracing::info!(dry_run = self.dry_run, "Starting export process");

        self.store.test_connection().await?;

        for variant in &self.config.variants {
            if *self.shutdown_rx.borrow() {
                summary.interrupted = true;
                break;
            }

            tracing::info!(variant = %variant.name, "Processing variant");

            match self.export_variant(variant).await {
                Ok(variant_summary) => summary.merge(variant_summary),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!(
                        variant = %variant.name,
                        error = %e,
                        "Variant failed"
                    );
                    summary.add_error(
                        ExportError::new(ExportErrorType::from(&e), e.to_string())
                            .with_context(format!("variant={}", variant.name)),
                    );
                }
            }
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }

    /// Export all pending parts for one variant
    async fn export_variant(&self, variant: &VariantConfig) -> Result<ExportSummary> {
        let mut summary = ExportSummary::new();

        let mapping = self.load_variant_mapping(variant)?;

        let template = Path::new(&variant.template);
        if !template.is_file() {
            return Err(PartXmlError::Configuration(format!(
                "template not found: {}",
                variant.template
            )));
        }

        let renderer = TemplateRenderer::new(template, self.variant_output_dir(variant));
        let resolver = FieldResolver::new(self.store.clone(), self.config.clone());
        let tracker = GenerationTracker::new(
            self.store.clone(),
            self.tracking_specs(variant),
            self.config.export.tracking_column.clone(),
        );

        let parts = self.collect_parts(variant).await?;
        summary.total_parts = parts.len();

        tracing::info!(
            variant = %variant.name,
            parts = parts.len(),
            mode = %self.config.export.mode,
            "Discovered part universe"
        );

        let timeout = Duration::from_secs(self.config.export.part_timeout_seconds);
        let parallel = self.config.export.parallel_parts.max(1);

        let mut queue = parts.into_iter();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < parallel && !*self.shutdown_rx.borrow() {
                match queue.next() {
                    Some(part) => in_flight.push(self.process_part(
                        part,
                        &mapping,
                        &resolver,
                        &renderer,
                        &tracker,
                        timeout,
                    )),
                    None => break,
                }
            }

            if in_flight.is_empty() {
                summary.interrupted =
                    summary.interrupted || (*self.shutdown_rx.borrow() && queue.len() > 0);
                break;
            }

            match in_flight.next().await {
                Some(Ok(outcome)) => self.record_outcome(outcome, &mut summary),
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }

        Ok(summary)
    }

    /// Resolve, render, and stamp one part
    ///
    /// Only fatal conditions surface as `Err`; anything scoped to this
    /// part comes back inside the outcome.
    async fn process_part(
        &self,
        part: PartId,
        mapping: &Mapping,
        resolver: &FieldResolver,
        renderer: &TemplateRenderer,
        tracker: &GenerationTracker,
        timeout: Duration,
    ) -> Result<PartOutcome> {
        let work = async {
            let resolution = resolver.resolve(&part, mapping).await?;
            let field_failures = resolution.failed_fields.len();

            if self.dry_run {
                tracing::info!(part = %part, "Dry run, skipping write and tracking");
                return Ok(PartOutcome {
                    part: part.clone(),
                    written: false,
                    field_failures,
                    tracking_failed: false,
                    error: None,
                });
            }

            renderer.render(&part, &resolution.bindings)?;

            let tracking_failed = match tracker.mark_generated(&part).await {
                Ok(_) => false,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        part = %part,
                        error = %e,
                        "Tracking update failed, document kept"
                    );
                    true
                }
            };

            Ok(PartOutcome {
                part: part.clone(),
                written: true,
                field_failures,
                tracking_failed,
                error: None,
            })
        };

        let outcome = match tokio::time::timeout(timeout, work).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) if e.is_fatal() => return Err(e),
            Ok(Err(e)) => PartOutcome {
                part,
                written: false,
                field_failures: 0,
                tracking_failed: false,
                error: Some(e),
            },
            Err(_) => PartOutcome {
                part,
                written: false,
                field_failures: 0,
                tracking_failed: false,
                error: Some(PartXmlError::Other(format!(
                    "part processing timed out after {}s",
                    timeout.as_secs()
                ))),
            },
        };

        Ok(outcome)
    }

    fn record_outcome(&self, outcome: PartOutcome, summary: &mut ExportSummary) {
        summary.field_failures += outcome.field_failures;
        if outcome.tracking_failed {
            summary.tracking_failures += 1;
        }
        match outcome.error {
            None => {
                if outcome.written {
                    summary.documents_written += 1;
                }
            }
            Some(e) => {
                tracing::error!(part = %outcome.part, error = %e, "Part failed");
                summary.failed_parts += 1;
                summary.add_error(
                    ExportError::new(ExportErrorType::from(&e), e.to_string())
                        .with_context(format!("part={}", outcome.part)),
                );
            }
        }
    }

    /// Union of distinct business keys across the variant's tables
    ///
    /// In `untracked` mode each table contributes only rows whose
    /// tracking column is still NULL; `full` mode takes everything. The
    /// set union means a part pending in any one contributing table is
    /// exported once.
    async fn collect_parts(&self, variant: &VariantConfig) -> Result<Vec<PartId>> {
        let untracked = match self.config.export.mode.as_str() {
            "untracked" => Some(self.config.export.tracking_column.as_str()),
            _ => None,
        };

        let mut universe = BTreeSet::new();
        for table_name in &variant.contributing_tables {
            let table = self.table_spec(table_name)?;
            let names = self
                .store
                .fetch_names(&sql::part_names_select(table, untracked))
                .await?;
            tracing::debug!(
                table = %table.name,
                count = names.len(),
                "Fetched part names"
            );
            for name in names {
                match PartId::new(name) {
                    Ok(part) => {
                        universe.insert(part);
                    }
                    Err(e) => {
                        tracing::warn!(table = %table.name, error = %e, "Skipping bad key")
                    }
                }
            }
        }

        Ok(universe.into_iter().collect())
    }

    fn load_variant_mapping(&self, variant: &VariantConfig) -> Result<Mapping> {
        let mapping = mapping::load_mapping(
            &variant.mapping_file,
            variant.mapping_collection.as_deref(),
        )?;
        mapping.validate(&self.config)?;
        Ok(mapping)
    }

    fn variant_output_dir(&self, variant: &VariantConfig) -> PathBuf {
        let base = PathBuf::from(&self.config.export.output_dir);
        match &variant.output_subdir {
            Some(sub) => base.join(sub),
            None => base,
        }
    }

    fn tracking_specs(&self, variant: &VariantConfig) -> Vec<TableSpec> {
        variant
            .tracking_tables
            .iter()
            .filter_map(|name| self.config.table(name).cloned())
            .collect()
    }

    fn table_spec(&self, name: &str) -> Result<&TableSpec> {
        self.config.table(name).ok_or_else(|| {
            PartXmlError::Configuration(format!("table not registered: {name}"))
        })
    }
}
