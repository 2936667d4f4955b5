// Merge Engine Errors
//
// Errors raised while building pagination contexts, reading merged cursors
// or extracting pagination segments from SQL text.

use thiserror::Error;

pub type Result<T, E = MergeError> = std::result::Result<T, E>;

/// Error types of the merge engine
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Parameter index {index} out of range ({len} parameters bound)")]
    ParameterIndexOutOfRange { index: usize, len: usize },

    #[error("Parameter {index} is not an integer: {value}")]
    InvalidParameter { index: usize, value: String },

    #[error("Column index {index} out of range ({len} columns)")]
    ColumnIndexOutOfRange { index: usize, len: usize },

    #[error("Cursor is not positioned on a row")]
    NoCurrentRow,

    #[error("Invalid SQL: {0}")]
    InvalidSql(String),

    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    #[error("Merged result exceeds the limit of {limit} rows")]
    RowLimitExceeded { limit: usize },
}
