//! Error types shared by the library modules

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    /// Network or HTTP status failure while talking to the content source
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Malformed feed or document payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// The slug does not correspond to any document
    #[error("Post not resolved: {slug}")]
    NotResolved { slug: String },

    #[error("No more pages to load")]
    NoMorePages,

    #[error("A load is already in progress")]
    LoadInProgress,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for BlogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BlogError::Parse(err.to_string())
        } else {
            BlogError::Fetch(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BlogError {
    fn from(err: serde_json::Error) -> Self {
        BlogError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for BlogError {
    fn from(err: url::ParseError) -> Self {
        BlogError::Fetch(format!("invalid url: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
