use chrono::NaiveDate;
use std::fmt;

/// Type tag attached to every column once it has been read or coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
        };
        f.write_str(label)
    }
}

/// Homogeneous column storage. Integer columns never hold missing values.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<i64>),
    Real(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
}

impl ColumnData {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Real(_) => ColumnType::Real,
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::Date(_) => ColumnType::Date,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Real(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at `row`, or `None` when out of range
    pub fn value(&self, row: usize) -> Option<Value> {
        let value = match self {
            ColumnData::Integer(v) => Value::Integer(*v.get(row)?),
            ColumnData::Real(v) => v.get(row)?.map_or(Value::Missing, Value::Real),
            ColumnData::Text(v) => v
                .get(row)?
                .as_ref()
                .map_or(Value::Missing, |s| Value::Text(s.clone())),
            ColumnData::Date(v) => v.get(row)?.map_or(Value::Missing, Value::Date),
        };
        Some(value)
    }
}

/// A single cell, detached from its column
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }
}

/// Ordered, column-oriented table held in memory between pipeline stages.
///
/// Every column has `row_count` values and column names are unique. Both are
/// checked when a dataset is built through [`Dataset::new`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, String> {
        let row_count = columns.first().map_or(0, |c| c.data.len());
        for column in &columns {
            if column.data.len() != row_count {
                return Err(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.data.len(),
                    row_count
                ));
            }
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(format!("duplicate column name '{}'", column.name));
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Renames every column through `rename`, suffixing `.N` onto any name
    /// that would collide with an earlier one.
    pub fn rename_columns<F>(&mut self, mut rename: F)
    where
        F: FnMut(&str) -> String,
    {
        let mut taken: Vec<String> = Vec::with_capacity(self.columns.len());
        for column in &mut self.columns {
            let name = unique_name(rename(&column.name), &taken);
            taken.push(name.clone());
            column.name = name;
        }
    }

    /// Removes the named columns that exist; returns the names removed
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let mut dropped = Vec::new();
        self.columns.retain(|c| {
            if names.iter().any(|n| n.as_ref() == c.name) {
                dropped.push(c.name.clone());
                false
            } else {
                true
            }
        });
        dropped
    }

    /// Row `idx` as a vector of cells, in column order
    pub fn row(&self, idx: usize) -> Option<Vec<Value>> {
        if idx >= self.row_count {
            return None;
        }
        self.columns.iter().map(|c| c.data.value(idx)).collect()
    }
}

/// `base`, or `base.1`, `base.2`, ... whichever is not yet taken
pub(crate) fn unique_name(base: String, taken: &[String]) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}.{}", base, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new("id", ColumnData::Integer(vec![1, 2])),
            Column::new("Sales", ColumnData::Real(vec![Some(10.5), None])),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Dataset::new(vec![
            Column::new("a", ColumnData::Integer(vec![1, 2])),
            Column::new("b", ColumnData::Integer(vec![1])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = Dataset::new(vec![
            Column::new("a", ColumnData::Integer(vec![1])),
            Column::new("a", ColumnData::Integer(vec![2])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rename_columns_keeps_names_unique() {
        let mut dataset = Dataset::new(vec![
            Column::new(" a", ColumnData::Integer(vec![1])),
            Column::new("a ", ColumnData::Integer(vec![2])),
        ])
        .unwrap();
        dataset.rename_columns(|name| name.trim().to_string());
        assert_eq!(dataset.column_names(), vec!["a", "a.1"]);
    }

    #[test]
    fn test_drop_columns_ignores_absent_names() {
        let mut dataset = sample();
        let dropped = dataset.drop_columns(&["id", "Country"]);
        assert_eq!(dropped, vec!["id".to_string()]);
        assert_eq!(dataset.column_names(), vec!["Sales"]);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_row_reports_missing_cells() {
        let dataset = sample();
        assert_eq!(
            dataset.row(1),
            Some(vec![Value::Integer(2), Value::Missing])
        );
        assert_eq!(dataset.row(2), None);
    }
}
