use std::fmt;

use crate::dataset::{ColumnType, Dataset};

/// Column type in the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationType {
    Integer,
    Numeric,
    Date,
    Varchar,
}

impl DestinationType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            DestinationType::Integer => "BIGINT",
            DestinationType::Numeric => "NUMERIC",
            DestinationType::Date => "DATE",
            DestinationType::Varchar => "VARCHAR",
        }
    }
}

impl fmt::Display for DestinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Maps a column tag to its destination type. Text falls through to `Varchar`.
pub fn destination_type(tag: ColumnType) -> DestinationType {
    match tag {
        ColumnType::Integer => DestinationType::Integer,
        ColumnType::Real => DestinationType::Numeric,
        ColumnType::Date => DestinationType::Date,
        ColumnType::Text => DestinationType::Varchar,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DestinationType,
}

/// Ordered column definitions for the destination table. No keys,
/// constraints or indexes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn drop_table_sql(table_name: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(table_name))
    }

    pub fn create_table_sql(&self, table_name: &str) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.data_type.sql_name()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({})", quote_ident(table_name), columns)
    }

    /// Parameterised single-row insert. Each placeholder carries an explicit
    /// cast so the bound Rust type decides the wire type.
    pub fn insert_sql(&self, table_name: &str) -> String {
        if self.columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table_name));
        }
        let names = self
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let params = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("${}::{}", i + 1, bind_type(c.data_type)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table_name),
            names,
            params
        )
    }
}

// Wire type of the bound parameter; NUMERIC is assigned from FLOAT8
fn bind_type(data_type: DestinationType) -> &'static str {
    match data_type {
        DestinationType::Integer => "BIGINT",
        DestinationType::Numeric => "FLOAT8",
        DestinationType::Date => "DATE",
        DestinationType::Varchar => "VARCHAR",
    }
}

/// Derives the destination schema from the dataset's column tags
pub fn infer_schema(dataset: &Dataset) -> TableSchema {
    let columns = dataset
        .columns()
        .iter()
        .map(|c| ColumnDef {
            name: c.name.clone(),
            data_type: destination_type(c.column_type()),
        })
        .collect();
    TableSchema { columns }
}

/// Double-quoted identifier. Table and column names are used verbatim, so any
/// string is a valid name once quoted.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
