use thiserror::Error;

/// Failures talking to the remote directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("stream from {url} broke off: {reason}")]
    Stream { url: String, reason: String },

    #[error("malformed JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV header has no Name column")]
    MissingNameColumn,
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Failures surfaced to the user when saving an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no search term found")]
    NoSearchTerm,

    #[error("an export is already in progress")]
    InProgress,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
