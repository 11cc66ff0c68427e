use postgres::types::ToSql;
use postgres::{Client, NoTls};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::TableSink;
use crate::config::DatabaseConfig;
use crate::dataset::{ColumnData, Dataset};
use crate::error::Result;
use crate::schema::TableSchema;

/// PostgreSQL destination holding one connection for the whole run.
///
/// The connection is closed by [`PostgresSink::close`], or when the sink is
/// dropped on any other path.
pub struct PostgresSink {
    client: Client,
}

impl PostgresSink {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, database = %config.database))]
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut pg = postgres::Config::new();
        pg.user(&config.user)
            .password(&config.password)
            .host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .application_name("csv_etl");
        if let Some(secs) = config.connect_timeout_secs {
            pg.connect_timeout(Duration::from_secs(secs));
        }

        let client = pg.connect(NoTls)?;
        info!("Connected to PostgreSQL");
        Ok(Self { client })
    }

    pub fn close(self) -> Result<()> {
        self.client.close()?;
        debug!("PostgreSQL connection closed");
        Ok(())
    }
}

impl TableSink for PostgresSink {
    fn replace_table(&mut self, table: &str, schema: &TableSchema) -> Result<()> {
        let mut tx = self.client.transaction()?;
        tx.batch_execute(&TableSchema::drop_table_sql(table))?;
        tx.batch_execute(&schema.create_table_sql(table))?;
        tx.commit()?;
        debug!("Created table {} with {} columns", table, schema.columns.len());
        Ok(())
    }

    fn write_rows(&mut self, table: &str, schema: &TableSchema, dataset: &Dataset) -> Result<u64> {
        let mut tx = self.client.transaction()?;
        let statement = tx.prepare(&schema.insert_sql(table))?;

        let mut written = 0u64;
        for row in 0..dataset.row_count() {
            let params: Vec<Box<dyn ToSql + Sync>> = dataset
                .columns()
                .iter()
                .map(|c| cell_param(&c.data, row))
                .collect();
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| &**p).collect();
            written += tx.execute(&statement, &refs)?;
        }

        // Dropping an uncommitted transaction rolls it back
        tx.commit()?;
        Ok(written)
    }
}

fn cell_param(data: &ColumnData, row: usize) -> Box<dyn ToSql + Sync> {
    match data {
        ColumnData::Integer(values) => Box::new(values.get(row).copied()),
        ColumnData::Real(values) => Box::new(values.get(row).copied().flatten()),
        ColumnData::Text(values) => Box::new(values.get(row).cloned().flatten()),
        ColumnData::Date(values) => Box::new(values.get(row).copied().flatten()),
    }
}
