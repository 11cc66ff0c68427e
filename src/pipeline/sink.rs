use tracing::{error, info, instrument};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema::{infer_schema, TableSchema};
use crate::storage::TableSink;

/// Outcome of one sink run
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub table: String,
    pub schema: TableSchema,
    pub rows_written: u64,
    pub write_error: Option<String>,
}

impl LoadReport {
    pub fn succeeded(&self) -> bool {
        self.write_error.is_none()
    }
}

/// Replaces `table_name` with the dataset's inferred schema and writes every
/// row into it.
///
/// `None` is a no-op. A failure while creating the table is returned to the
/// caller; a failure while writing rows is logged and recorded in the report
/// instead.
#[instrument(skip(dataset, sink))]
pub fn load_data_to_db<S: TableSink + ?Sized>(
    dataset: Option<&Dataset>,
    sink: &mut S,
    table_name: &str,
) -> Result<Option<LoadReport>> {
    let Some(dataset) = dataset else {
        return Ok(None);
    };

    let schema = infer_schema(dataset);
    sink.replace_table(table_name, &schema)?;

    // Write failures stop here; table creation failures do not
    let report = match sink.write_rows(table_name, &schema, dataset) {
        Ok(rows_written) => {
            info!("Data loaded into table {} successfully!", table_name);
            LoadReport {
                table: table_name.to_string(),
                schema,
                rows_written,
                write_error: None,
            }
        }
        Err(e) => {
            error!("Error loading data into PostgreSQL: {}", e);
            LoadReport {
                table: table_name.to_string(),
                schema,
                rows_written: 0,
                write_error: Some(e.to_string()),
            }
        }
    };
    Ok(Some(report))
}
