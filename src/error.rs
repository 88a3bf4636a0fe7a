use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinboardError {
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Join key column '{column}' is missing from the {side} rows")]
    MergeKey { column: String, side: &'static str },

    #[error("Unparseable issue date {value:?} in sheet '{sheet}', row {row}")]
    DateParse {
        sheet: String,
        row: usize,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FinboardError>;
