//! Error types for the CMS client, the feed allocator and page assembly.

use thiserror::Error;

/// Errors raised while talking to the CMS API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx HTTP status.
    #[error("HTTP error (status {status}) for {endpoint}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Endpoint path that failed
        endpoint: String,
    },

    /// Envelope carried `success: false`, even if the status was 200.
    #[error("API rejected request: {0}")]
    Rejected(String),

    /// Response body was not a JSON envelope.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors raised by "load more" continuation.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A continuation for this section is already in flight.
    #[error("section {0} is already loading")]
    Busy(&'static str),

    /// The page has no cursor for this section.
    #[error("section {0} is not part of the current page")]
    UnknownSection(&'static str),

    /// The page was re-rendered while this continuation was in flight.
    #[error("section {0} belongs to a page that was replaced")]
    Superseded(&'static str),
}

/// Fatal page-level conditions.
#[derive(Debug, Error)]
pub enum PageError {
    /// The primary record of a single-entity page is missing.
    #[error("{0} tidak ditemukan")]
    NotFound(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors raised while loading the optional YAML config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
