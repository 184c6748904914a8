use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeizureError {
    #[error("Invalid EDF data: {0}")]
    InvalidEdf(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid model checkpoint: {0}")]
    Checkpoint(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<rust_xlsxwriter::XlsxError> for SeizureError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SeizureError::Spreadsheet(err.to_string())
    }
}

impl From<calamine::Error> for SeizureError {
    fn from(err: calamine::Error) -> Self {
        SeizureError::Spreadsheet(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SeizureError>;
