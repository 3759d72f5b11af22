//! Network side of the crate: client configuration, OAuth token exchange, the
//! `ShClient` transport and the JSON records of the service's search and
//! configuration endpoints.
pub mod auth;
pub mod client;
pub mod config;
pub mod responses;

pub use client::ShClient;
pub use config::ClientConfig;
pub use responses::{DatasourceDefaults, LayerParams, RawTile, TileSearchRequest};
