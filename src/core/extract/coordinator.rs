//! Extract coordinator - main orchestrator for the extraction process
//!
//! This module coordinates the whole run: it resolves the fetch window, pulls
//! every page of every configured endpoint through the store client, feeds each
//! record to the endpoint's writer tree, and finally declares the produced
//! tables in manifests and persists the column state for the next run.

use super::summary::{EndpointSummary, ExtractSummary};
use super::window::resolve_window;
use crate::adapters::storage::{CsvSinkFactory, DataLayout, ManifestWriter};
use crate::adapters::woocommerce::{FetchFilter, WooCommerceClient};
use crate::config::StrataConfig;
use crate::core::state::StateManager;
use crate::core::transform::CatalogOptions;
use crate::core::writer::{record_id, EntityWriter, WriterContext};
use crate::domain::ids::Endpoint;
use crate::domain::{Linkage, Result, StrataError, TableDescriptor};
use chrono::Local;
use std::time::Instant;
use uuid::Uuid;

/// Format of the `extraction_time` column
pub const EXTRACTION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Entity id logged for records without a usable identifier
const UNKNOWN_ENTITY: &str = "unknown";

/// Extract coordinator
pub struct ExtractCoordinator {
    config: StrataConfig,
    client: WooCommerceClient,
    layout: DataLayout,
}

impl ExtractCoordinator {
    /// Create a coordinator and open a session with the store
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the store rejects the
    /// session, e.g. with a 401.
    pub async fn new(config: StrataConfig) -> Result<Self> {
        let client = WooCommerceClient::connect(&config.store).await?;
        let layout = DataLayout::new(&config.application.data_dir);

        Ok(Self {
            config,
            client,
            layout,
        })
    }

    /// Output layout of the run
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Execute the extraction
    ///
    /// Endpoints are processed one after another in configured order. Records
    /// that cannot be decomposed are logged and skipped; any other error
    /// aborts the run before manifests and state are written.
    pub async fn execute(&self) -> Result<ExtractSummary> {
        let start_time = Instant::now();
        let now = Local::now();
        let extraction_time = now.format(EXTRACTION_TIME_FORMAT).to_string();
        let mut summary = ExtractSummary::new(Uuid::new_v4(), extraction_time.clone());

        let extraction = &self.config.extraction;
        let endpoints = extraction
            .endpoints()
            .map_err(StrataError::Configuration)?;
        let filter = resolve_window(&extraction.window, now.naive_local())?;

        tracing::info!(
            run_id = %summary.run_id,
            endpoints = ?endpoints,
            filter = ?filter,
            page_size = extraction.page_size,
            "Starting extraction"
        );

        let mut state = StateManager::load(Box::new(self.layout.state_store())).await?;
        let sinks = CsvSinkFactory::new(self.layout.tables_dir())?;
        let options = CatalogOptions {
            flatten_meta_data: extraction.flatten_meta_data,
        };

        for endpoint in endpoints {
            let ctx = WriterContext {
                sinks: &sinks,
                state: state.previous(),
                extraction_time: &extraction_time,
            };
            let (counts, descriptors) = self
                .extract_endpoint(endpoint, &filter, options, &ctx)
                .await?;

            state.record(&descriptors);
            summary.endpoints.push(counts);
            summary.tables.extend(descriptors);
        }

        let manifests = ManifestWriter::new(self.layout.tables_dir());
        let incremental = extraction.load_type.is_incremental();
        for table in &summary.tables {
            manifests.write(table, incremental)?;
        }
        state.save().await?;

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn extract_endpoint(
        &self,
        endpoint: Endpoint,
        filter: &FetchFilter,
        options: CatalogOptions,
        ctx: &WriterContext<'_>,
    ) -> Result<(EndpointSummary, Vec<TableDescriptor>)> {
        if !endpoint.supports_date_filter() && *filter != FetchFilter::All {
            tracing::info!(endpoint = %endpoint, "Endpoint does not support windows, fetching all records");
        }
        tracing::info!(endpoint = %endpoint, "Extracting endpoint");

        let mut counts = EndpointSummary::new(endpoint);
        let mut writer = EntityWriter::for_endpoint(endpoint, options, ctx)?;
        let mut pages = self
            .client
            .fetch(endpoint, filter, self.config.extraction.page_size);

        while let Some(page) = pages.next_page().await? {
            counts.pages += 1;

            for record in page.records {
                let entity_id = record_id(&record);
                match writer.write(record, &Linkage::root()) {
                    Ok(()) => counts.records_written += 1,
                    Err(e) if e.is_record_local() => {
                        crate::log_record_skipped!(
                            endpoint,
                            entity_id.as_deref().unwrap_or(UNKNOWN_ENTITY),
                            e
                        );
                        counts.records_skipped += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            endpoint = %endpoint,
                            page = page.number,
                            error = %e,
                            "Aborting extraction"
                        );
                        return Err(e);
                    }
                }
            }
        }

        let descriptors = writer.close()?;

        tracing::info!(
            endpoint = %endpoint,
            pages = counts.pages,
            records = counts.records_written,
            skipped = counts.records_skipped,
            tables = descriptors.len(),
            "Endpoint completed"
        );

        Ok((counts, descriptors))
    }
}
