use thiserror::Error;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("{column} column not found in {table}")]
    MissingColumn { column: String, table: String },

    #[error("Invalid number in column '{column}' at row {row}: '{value}'")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Please enter an event name before downloading")]
    EmptyEventName,

    #[error("Unknown category '{0}' (expected Student, Church, Section or Region)")]
    UnknownCategory(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ResultsError {
    pub fn missing_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        ResultsError::MissingColumn {
            column: column.into(),
            table: table.into(),
        }
    }
}
