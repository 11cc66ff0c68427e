use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed row at line {line}: expected {expected} fields, saw {found}")]
    Malformed {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Input is not valid {encoding}")]
    Decode { encoding: String },

    #[error("Unsupported encoding label: {0}")]
    UnsupportedEncoding(String),

    #[error("No columns to parse from file")]
    EmptyInput,

    #[error("Inconsistent dataset: {0}")]
    InvalidDataset(String),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] postgres::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sink error: {message}")]
    Sink { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;
