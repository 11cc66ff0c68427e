// Extract, transform and load stages, run strictly in sequence

pub mod loader;
pub mod sink;
pub mod transform;

pub use loader::load_csv;
pub use sink::{load_data_to_db, LoadReport};
pub use transform::transform_data;

use tracing::{info, instrument};

use crate::config::EtlConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::storage::{PostgresSink, TableSink};

/// Loads and cleans the configured input; `None` when loading failed
pub fn extract_and_transform(config: &EtlConfig) -> Option<Dataset> {
    let dataset = load_csv(&config.input.path, &config.input);
    transform_data(dataset, &config.transform)
}

/// Runs load → transform → sink.
///
/// `connect` is only called once a dataset has survived loading and
/// transformation, so a failed load opens no connection and touches no table.
#[instrument(skip_all, fields(input = %config.input.path.display(), table = %config.output.table))]
pub fn etl_process<S, F>(config: &EtlConfig, connect: F) -> Result<Option<LoadReport>>
where
    S: TableSink,
    F: FnOnce() -> Result<S>,
{
    let Some(dataset) = extract_and_transform(config) else {
        return Ok(None);
    };

    let mut sink = connect()?;
    load_data_to_db(Some(&dataset), &mut sink, &config.output.table)
}

/// Runs the pipeline against PostgreSQL.
///
/// The connection is opened through [`etl_process`], so a failed load never
/// connects. It is closed explicitly on success and released by drop on every
/// error path.
#[instrument(skip_all, fields(input = %config.input.path.display(), table = %config.output.table))]
pub fn run(config: &EtlConfig) -> Result<Option<LoadReport>> {
    let mut connection: Option<PostgresSink> = None;
    let slot = &mut connection;
    let report = etl_process(config, move || {
        // Take the borrow by value so the sink can outlive this closure
        let slot = slot;
        Ok(slot.insert(PostgresSink::connect(&config.database)?))
    })?;

    if let Some(sink) = connection {
        sink.close()?;
    }

    if let Some(report) = &report {
        info!(
            "Pipeline finished: {} rows into {}",
            report.rows_written, report.table
        );
    }
    Ok(report)
}
