use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported CRS: {crs}. Use EPSG:4326 or EPSG:3857")]
    UnsupportedCrs { crs: String },

    #[error("Invalid time `{value}` for {arg}: {source}")]
    InvalidTime {
        arg: &'static str,
        value: String,
        source: sentinelhub::Error,
    },

    #[error("Time range is empty: {from} is after {to}")]
    EmptyTimeRange { from: String, to: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Service(#[from] sentinelhub::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}
