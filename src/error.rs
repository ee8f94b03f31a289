use thiserror::Error;

/// Run-fatal errors. Everything else in the scan (malformed markup, missing
/// fields, unreadable archive members) degrades to empty values or skipped
/// items instead of surfacing here.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("download failed after {attempts} attempts: {url}")]
    Retrieval {
        url: String,
        attempts: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;
