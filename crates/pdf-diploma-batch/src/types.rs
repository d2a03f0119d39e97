use pdf_diploma::DiplomaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Diploma(#[from] DiplomaError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Unexpected CSV location: {0}")]
    Location(String),
    #[error("No signature found for profesor='{0}'")]
    SignatureNotFound(String),
    #[error("Asset not available: {0}")]
    Asset(String),
    #[error("Invalid event: {0}")]
    Event(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BatchError>;
