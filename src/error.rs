/*!
Error type shared by the flattening and reconstruction halves and their file adapters.
 */
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is neither a feature collection nor a path to a supported format
    #[error("Unsupported input : {0}")]
    TypeUsage(String),

    #[error("Invalid geometry : {0}")]
    InvalidGeometry(String),

    #[error("Missing column : {0}")]
    MissingColumn(String),

    /// A metadata attribute shadows one of the structural columns of the table
    #[error("Metadata attribute '{0}' collides with a reserved table column")]
    ReservedColumn(String),

    #[error("Invalid value {value} in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: Value,
    },

    #[error("Column '{column}' has {found} values, the table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Polygon part {polygon_id} of feature {row_id} has interior rings but no exterior ring")]
    MissingExterior { row_id: i64, polygon_id: i64 },

    #[error("IO error : {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error : {0}")]
    Json(#[from] serde_json::Error),

    #[error("Table error : {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, Error>;
