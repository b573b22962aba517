//! Typed errors for each boundary of the crawl.
//!
//! None of these escape a pipeline stage: stages log them and fall back to
//! empty output or the `NOT_AVAILABLE` sentinel. Only `ConfigError` reaches
//! the binary.

use thiserror::Error;

/// Failure to obtain a page body
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no page registered for {0}")]
    Missing(String),
}

/// Failure of a postcode lookup against the geocoding service
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("postcode service returned HTTP {0}")]
    Status(u16),

    #[error("postcode request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid postcode endpoint: {0}")]
    Endpoint(String),

    #[error("unexpected postcode response: {0}")]
    Body(String),
}

/// Failure to read a floor-plan dimension block
#[derive(Debug, Error)]
pub enum DimensionError {
    #[error("invalid floor selector for {floor_id}")]
    Selector { floor_id: String },

    #[error("no accordion block for {floor_id}")]
    MissingBlock { floor_id: String },

    #[error("accordion block for {floor_id} has no dimensions attribute")]
    MissingAttribute { floor_id: String },

    #[error("malformed dimensions JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to load or validate configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
