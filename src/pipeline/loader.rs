use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, instrument};

use crate::config::InputConfig;
use crate::constants::is_missing_token;
use crate::dataset::{unique_name, Column, ColumnData, Dataset};
use crate::error::{EtlError, Result};

// Labels decoded as true ISO-8859-1 (every byte is its own code point)
const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "iso_8859_1",
    "iso88591",
    "latin1",
    "latin-1",
    "l1",
    "8859",
    "cp819",
];

/// Loads a delimited file into a dataset.
///
/// Any failure is logged and reported as `None`, which every later stage
/// treats as "nothing to do".
#[instrument(skip(input), fields(encoding = %input.encoding))]
pub fn load_csv(file_path: &Path, input: &InputConfig) -> Option<Dataset> {
    match read_csv(file_path, input) {
        Ok(dataset) => {
            info!("CSV file loaded successfully.");
            debug!(
                "Loaded {} rows x {} columns from {}",
                dataset.row_count(),
                dataset.column_count(),
                file_path.display()
            );
            Some(dataset)
        }
        Err(e) => {
            error!("Error loading CSV file: {}", e);
            None
        }
    }
}

/// Fallible form of [`load_csv`]
pub fn read_csv(file_path: &Path, input: &InputConfig) -> Result<Dataset> {
    let delimiter = input.delimiter_byte()?;
    let bytes = fs::read(file_path)?;
    let text = decode(&bytes, &input.encoding)?;
    parse_csv(&text, delimiter)
}

/// Decodes raw file bytes using an encoding label
pub fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let normalized = label.trim().to_ascii_lowercase();
    if LATIN1_LABELS.contains(&normalized.as_str()) {
        return Ok(encoding_rs::mem::decode_latin1(bytes).into_owned());
    }

    let encoding = Encoding::for_label(normalized.as_bytes())
        .ok_or_else(|| EtlError::UnsupportedEncoding(label.to_string()))?;
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| EtlError::Decode {
            encoding: encoding.name().to_string(),
        })
}

/// Parses decoded text with a header row into a typed dataset
pub fn parse_csv(text: &str, delimiter: u8) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(EtlError::EmptyInput),
    };
    let names = header_names(&header);
    let width = names.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for record in records {
        let record = record?;
        if record.len() > width {
            return Err(EtlError::Malformed {
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            let cell = record
                .get(idx)
                .filter(|raw| !is_missing_token(raw))
                .map(str::to_string);
            column.push(cell);
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, infer_column(values)))
        .collect();
    Dataset::new(columns).map_err(EtlError::InvalidDataset)
}

// Empty header cells become "Unnamed: N"; repeats get ".1", ".2", ...
fn header_names(header: &StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (idx, raw) in header.iter().enumerate() {
        let base = if raw.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            raw.to_string()
        };
        let name = unique_name(base, &names);
        names.push(name);
    }
    names
}

/// Picks the narrowest tag that holds every value in the column.
///
/// Integer needs every cell present; an all-missing column reads as real.
/// A column with no rows reads as text.
pub fn infer_column(values: Vec<Option<String>>) -> ColumnData {
    if values.is_empty() {
        return ColumnData::Text(values);
    }

    if values.iter().all(Option::is_some) {
        let ints: Option<Vec<i64>> = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok()))
            .collect();
        if let Some(ints) = ints {
            return ColumnData::Integer(ints);
        }
    }

    let reals: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|v| match v {
            None => Some(None),
            Some(s) => s.trim().parse::<f64>().ok().map(Some),
        })
        .collect();
    if let Some(reals) = reals {
        return ColumnData::Real(reals);
    }

    ColumnData::Text(values)
}
