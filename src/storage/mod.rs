// Destinations for a cleaned dataset

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemorySink;
pub use postgres::PostgresSink;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema::TableSchema;

/// A place a dataset can be written to as a table
pub trait TableSink {
    /// Drops `table` if it exists and creates it with `schema`
    fn replace_table(&mut self, table: &str, schema: &TableSchema) -> Result<()>;

    /// Writes every row of `dataset` into `table`; returns the rows written
    fn write_rows(&mut self, table: &str, schema: &TableSchema, dataset: &Dataset) -> Result<u64>;
}

impl<T: TableSink + ?Sized> TableSink for &mut T {
    fn replace_table(&mut self, table: &str, schema: &TableSchema) -> Result<()> {
        (**self).replace_table(table, schema)
    }

    fn write_rows(&mut self, table: &str, schema: &TableSchema, dataset: &Dataset) -> Result<u64> {
        (**self).write_rows(table, schema, dataset)
    }
}
