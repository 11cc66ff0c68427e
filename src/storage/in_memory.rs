use std::collections::HashMap;
use tracing::debug;

use super::TableSink;
use crate::dataset::{Dataset, Value};
use crate::error::{EtlError, Result};
use crate::schema::TableSchema;

/// A table as the in-memory sink stores it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredTable {
    pub schema: TableSchema,
    pub rows: Vec<Vec<Value>>,
}

/// In-memory sink for development/testing.
///
/// Applies the same replace semantics as the database sink and counts the
/// calls it receives. Either call can be made to fail on demand.
#[derive(Debug, Default)]
pub struct InMemorySink {
    tables: HashMap<String, StoredTable>,
    pub replace_calls: usize,
    pub write_calls: usize,
    pub fail_replace: bool,
    pub fail_write: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose `write_rows` always fails
    pub fn failing_writes() -> Self {
        Self {
            fail_write: true,
            ..Self::default()
        }
    }

    /// Sink whose `replace_table` always fails
    pub fn failing_replace() -> Self {
        Self {
            fail_replace: true,
            ..Self::default()
        }
    }

    pub fn table(&self, name: &str) -> Option<&StoredTable> {
        self.tables.get(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

impl TableSink for InMemorySink {
    fn replace_table(&mut self, table: &str, schema: &TableSchema) -> Result<()> {
        self.replace_calls += 1;
        if self.fail_replace {
            return Err(EtlError::Sink {
                message: format!("cannot create table {}", table),
            });
        }

        let previous = self.tables.insert(
            table.to_string(),
            StoredTable {
                schema: schema.clone(),
                rows: Vec::new(),
            },
        );
        debug!(
            "Created table {} (replaced existing: {})",
            table,
            previous.is_some()
        );
        Ok(())
    }

    fn write_rows(&mut self, table: &str, schema: &TableSchema, dataset: &Dataset) -> Result<u64> {
        self.write_calls += 1;
        if self.fail_write {
            return Err(EtlError::Sink {
                message: format!("connection lost while writing {}", table),
            });
        }

        let stored = self.tables.get_mut(table).ok_or_else(|| EtlError::Sink {
            message: format!("relation \"{}\" does not exist", table),
        })?;
        if stored.schema != *schema {
            return Err(EtlError::Sink {
                message: format!("column layout of {} does not match the rows", table),
            });
        }

        let mut rows = Vec::with_capacity(dataset.row_count());
        for idx in 0..dataset.row_count() {
            let row = dataset.row(idx).ok_or_else(|| EtlError::Sink {
                message: format!("row {} is out of range", idx),
            })?;
            rows.push(row);
        }
        // All or nothing, like the transactional database write
        stored.rows.extend(rows);

        debug!("Wrote {} rows into {}", dataset.row_count(), table);
        Ok(dataset.row_count() as u64)
    }
}
