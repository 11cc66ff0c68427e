use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument, warn};

use crate::config::TransformConfig;
use crate::dataset::{Column, ColumnData, Dataset};

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateFormat {
    Rfc3339,
    DateTime(&'static str),
    Date(&'static str),
}

// Tried in order; month-first wins over day-first for ambiguous values
const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::Rfc3339,
    DateFormat::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    DateFormat::DateTime("%Y-%m-%d %H:%M"),
    DateFormat::DateTime("%m/%d/%Y %H:%M:%S"),
    DateFormat::DateTime("%m/%d/%Y %H:%M"),
    DateFormat::Date("%Y-%m-%d"),
    DateFormat::Date("%Y/%m/%d"),
    DateFormat::Date("%m/%d/%y"),
    DateFormat::Date("%m/%d/%Y"),
    DateFormat::Date("%d/%m/%Y"),
    DateFormat::Date("%m-%d-%Y"),
    DateFormat::Date("%d-%m-%Y"),
    DateFormat::Date("%d.%m.%Y"),
    DateFormat::Date("%Y%m%d"),
    DateFormat::Date("%d %B %Y"),
    DateFormat::Date("%d %b %Y"),
    DateFormat::Date("%B %d, %Y"),
    DateFormat::Date("%b %d, %Y"),
];

impl DateFormat {
    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive()),
            DateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| dt.date()),
            DateFormat::Date(fmt) => NaiveDate::parse_from_str(raw, fmt).ok(),
        }
    }
}

/// Cleans a loaded dataset: trims column names, drops the configured
/// columns, and coerces the date column. `None` passes straight through.
#[instrument(skip_all)]
pub fn transform_data(dataset: Option<Dataset>, config: &TransformConfig) -> Option<Dataset> {
    let mut dataset = dataset?;
    info!("Columns: {:?}", dataset.column_names());

    dataset.rename_columns(|name| name.trim().to_string());

    let dropped = dataset.drop_columns(&config.drop_columns);
    if !dropped.is_empty() {
        debug!("Dropped columns: {:?}", dropped);
    }

    if let Some(column) = dataset.column_mut(&config.date_column) {
        coerce_to_dates(column);
    }

    Some(dataset)
}

/// Replaces the column's values with dates. Values that do not parse become
/// missing; the column is never rejected as a whole.
pub fn coerce_to_dates(column: &mut Column) {
    let raw: Vec<Option<String>> = match &column.data {
        ColumnData::Date(_) => return,
        ColumnData::Text(values) => values.clone(),
        ColumnData::Integer(values) => values.iter().map(|v| Some(v.to_string())).collect(),
        ColumnData::Real(values) => values.iter().map(|v| v.map(|f| f.to_string())).collect(),
    };

    let dates = parse_dates(&raw);
    let failed = raw
        .iter()
        .zip(&dates)
        .filter(|(raw, date)| raw.is_some() && date.is_none())
        .count();
    if failed > 0 {
        warn!(
            "{} value(s) in '{}' could not be read as dates and were set to null",
            failed, column.name
        );
    }
    column.data = ColumnData::Date(dates);
}

/// Infers one format from the first present value and applies it to every
/// value. When nothing fits the first value, each value is tried on its own.
pub fn parse_dates(values: &[Option<String>]) -> Vec<Option<NaiveDate>> {
    let first = values.iter().flatten().map(|s| s.trim()).next();
    let inferred = first.and_then(|raw| DATE_FORMATS.iter().find(|f| f.parse(raw).is_some()));

    values
        .iter()
        .map(|value| {
            let raw = value.as_deref()?.trim();
            match inferred {
                Some(format) => format.parse(raw),
                None => parse_date(raw),
            }
        })
        .collect()
}

/// First format in the list that reads `raw`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS.iter().find_map(|f| f.parse(raw))
}
