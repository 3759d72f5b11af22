//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying HTTP, JSON, XML and URL errors, and provides semantic variants
//! for unmet layer preconditions and service-side failures.
use thiserror::Error;

use crate::types::ApiType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service responded with {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("API type {api} is not supported by this layer")]
    UnsupportedApiType { api: ApiType },

    #[error("Not supported: {0}")]
    NotSupported(&'static str),

    #[error("Missing required configuration: {0}")]
    MissingConfiguration(String),

    #[error("Must be authenticated to use {0}")]
    NotAuthenticated(&'static str),

    #[error("Layer {layer_id} not found")]
    LayerNotFound { layer_id: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Could not fetch all the tiles in {requests} requests of {tiles_per_request} tiles")]
    TooManyTiles {
        requests: u32,
        tiles_per_request: u32,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn missing<S: Into<String>>(what: S) -> Self {
        Error::MissingConfiguration(what.into())
    }
}
