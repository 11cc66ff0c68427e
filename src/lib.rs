pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod schema;
pub mod storage;

pub use config::EtlConfig;
pub use dataset::{Column, ColumnData, ColumnType, Dataset, Value};
pub use error::{EtlError, Result};
pub use pipeline::{etl_process, run, LoadReport};
