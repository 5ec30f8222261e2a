use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::archive::Archiver;
use crate::blob::{Storage, StorageError};
use crate::config::{Config, ConfigError};
use crate::fetch::{FetchError, Fetcher};
use crate::flatten::{flatten, FlatRecord, FlattenError};
use crate::load::schema::{FieldMapping, TableSchema};
use crate::load::{LoadError, Loader};

/// Per-stage error tags. Every variant is fatal to the invocation and is
/// re-signaled to the caller after being logged; there is no retry loop
/// and no partial-success mode.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fetch stage failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Archive stage failed: {0}")]
    Archive(#[from] StorageError),

    #[error("Flatten stage failed: {0}")]
    Flatten(#[from] FlattenError),

    #[error("Load stage failed: {0}")]
    Load(#[from] LoadError),
}

/// Outcome of one successful invocation
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub archive_key: String,
    pub rows_loaded: u64,
}

/// Sequences one invocation: fetch, archive the raw payload, flatten,
/// ensure the destination table, load rows. Any stage failure aborts the
/// remaining stages; archiving is never skipped to reach the load.
pub struct Pipeline<F: Fetcher, S: Storage, L: Loader> {
    fetcher: F,
    archiver: Archiver<S>,
    loader: L,
    api_url: String,
    schema: TableSchema,
    mapping: FieldMapping,
}

impl<F: Fetcher, S: Storage, L: Loader> Pipeline<F, S, L> {
    /// Assemble a pipeline, validating the schema and field mapping up
    /// front so configuration mistakes never surface mid-run.
    pub fn new(fetcher: F, storage: S, loader: L, config: &Config) -> Result<Self, ConfigError> {
        config.schema.validate()?;
        config.mapping.validate(&config.schema)?;

        let archiver = Archiver::new(
            storage,
            &config.pipeline.container,
            &config.pipeline.archive_prefix,
        );

        Ok(Pipeline {
            fetcher,
            archiver,
            loader,
            api_url: config.pipeline.api_url.clone(),
            schema: config.schema.clone(),
            mapping: config.mapping.clone(),
        })
    }

    pub async fn run(&self, logical_date: NaiveDate) -> Result<RunSummary, PipelineError> {
        let run_id = Uuid::new_v4();
        info!("[run {}] Pipeline started for {}", run_id, logical_date);

        let payload = match self.fetcher.fetch(&self.api_url).await {
            Ok(payload) => payload,
            Err(e) => {
                error!("[run {}] Fetch failed: {}", run_id, e);
                return Err(e.into());
            }
        };

        // Archive before anything downstream looks at the payload, so the
        // bronze copy exists even when flattening or loading fails
        let archive_key = match self.archiver.archive(logical_date, &payload).await {
            Ok(key) => key,
            Err(e) => {
                error!("[run {}] Archive failed: {}", run_id, e);
                return Err(e.into());
            }
        };

        let records: Vec<FlatRecord> = match flatten(&payload) {
            Ok(records) => records.collect(),
            Err(e) => {
                error!("[run {}] Flatten failed: {}", run_id, e);
                return Err(e.into());
            }
        };
        info!("[run {}] Flattened payload into {} records", run_id, records.len());

        if let Err(e) = self.loader.ensure_schema(&self.schema).await {
            error!("[run {}] Schema check failed: {}", run_id, e);
            return Err(e.into());
        }

        let rows_loaded = match self
            .loader
            .load_rows(&self.schema, &self.mapping, &records)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                error!("[run {}] Load failed: {}", run_id, e);
                return Err(e.into());
            }
        };

        info!(
            "[run {}] Pipeline finished: archived {} and loaded {} rows into '{}'",
            run_id, archive_key, rows_loaded, self.schema.table
        );

        Ok(RunSummary {
            run_id,
            archive_key,
            rows_loaded,
        })
    }
}
