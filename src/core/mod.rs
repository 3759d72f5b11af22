//! Core request-building blocks: bounding boxes, map parameters, dataset catalog,
//! Processing API payloads, WMS URLs and tile/flyover records. These are pure,
//! network-free primitives consumed by the `layer` module.
pub mod bbox;
pub mod dataset;
pub mod params;
pub mod processing;
pub mod tiles;
pub mod time;
pub mod wms;
