use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading the table and writing the image.
#[derive(Debug, Error)]
pub enum VolcanoError {
    #[error("failed to load table from {}: {reason}", .path.display())]
    DataLoad { path: PathBuf, reason: String },

    #[error("column '{column}' not found (available: {})", .available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("invalid value '{value}' in column '{column}' at data row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("no plottable rows (all rows empty or missing values)")]
    NoPlottableRows,

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("render error: {0}")]
    Render(String),
}

impl VolcanoError {
    pub(crate) fn data_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        VolcanoError::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        VolcanoError::Configuration(msg.into())
    }
}

pub type VolcanoResult<T> = std::result::Result<T, VolcanoError>;
