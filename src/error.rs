//! Error taxonomy surfaced across the engine boundary.

/// Errors produced while normalizing an export.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// One or more required columns are missing from the input header.
    #[error("schema mismatch: missing required column(s) {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// Input could not be read as tabular data.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A date cell could not be parsed by any configured strategy.
    #[error("unparseable date {value:?} in column {column} (record {row})")]
    DateParse {
        column: String,
        value: String,
        row: usize,
    },

    /// Unknown preset or unreadable schema file.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl NormalizeError {
    /// Process exit code the CLI reports for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            NormalizeError::SchemaMismatch { .. } => 2,
            NormalizeError::MalformedInput(_) => 3,
            NormalizeError::DateParse { .. } => 4,
            NormalizeError::Config(_) | NormalizeError::Csv(_) | NormalizeError::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
