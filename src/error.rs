use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::DType;

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Every failure the EDA pipeline can report.
///
/// `FileAccess` and `Parse` are fatal (they stop the run at load time); all
/// other variants are scoped to the stage that produced them.
#[derive(Debug, Error)]
pub enum EdaError {
    #[error("cannot read '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("column '{column}' not found (available: {})", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("column '{column}' has dtype {actual}, expected {expected}")]
    WrongColumnType {
        column: String,
        expected: &'static str,
        actual: DType,
    },

    #[error("column '{column}', row {row}: cannot parse '{value}' as a date")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("'{subject}' needs at least {required} observations, got {actual}")]
    InsufficientData {
        subject: String,
        required: usize,
        actual: usize,
    },

    #[error("'{subject}' has zero variance")]
    ZeroVariance { subject: String },

    #[error("{capability} capability not available")]
    OptionalDependencyMissing { capability: &'static str },

    #[error("invalid distribution parameters: {0}")]
    Distribution(#[from] statrs::StatsError),

    #[error("failed to format table: {0}")]
    Format(#[from] arrow::error::ArrowError),

    #[error("display error: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, EdaError>;

impl EdaError {
    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EdaError::FileAccess { .. } | EdaError::Parse { .. })
    }
}
