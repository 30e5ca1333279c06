use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid entry #{index} ({id}): missing {field}")]
    InvalidEntry {
        index: usize,
        id: String,
        field: &'static str,
    },

    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("{0} is required and cannot be removed from the selection")]
    RequiredEntry(String),

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SetupError>;
