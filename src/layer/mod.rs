//! Layers: the objects callers render maps and search imagery through.
//!
//! Every layer implements [`Layer`]. Plain WMS servers are served by [`WmsLayer`],
//! Sentinel Hub datasets by [`ShLayer`] parameterized with a [`DatasetKind`], and
//! multi-source composition by [`ProcessingDataFusionLayer`].
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::bbox::BBox;
use crate::core::dataset::Dataset;
use crate::core::params::GetMapParams;
use crate::core::processing::ProcessingDatasource;
use crate::core::tiles::{Flyover, PaginatedTiles, group_tiles_into_flyovers};
use crate::error::{Error, Result};
use crate::io::client::ShClient;
use crate::types::ApiType;

pub mod byoc;
pub mod factory;
pub mod fusion;
pub mod optical;
pub mod sentinel1;
pub mod sh;
pub mod wms;

pub use byoc::{Byoc, ByocLayer};
pub use factory::LayersFactory;
pub use fusion::{DataFusionLayerInfo, ProcessingDataFusionLayer};
pub use optical::{Optical, OpticalLayer};
pub use sentinel1::{S1GrdAwsEuLayer, S1GrdEoCloudLayer, Sentinel1Grd, Sentinel1GrdEoCloud};
pub use sh::{DatasetKind, LayerContext, LayerOptions, ShLayer};
pub use wms::WmsLayer;

pub const DEFAULT_FIND_TILES_MAX_COUNT: u32 = 50;

#[async_trait]
pub trait Layer: Send + Sync + std::fmt::Debug {
    fn title(&self) -> Option<&str>;

    fn description(&self) -> Option<&str>;

    /// Identifier of the layer on its service, when it has one.
    fn layer_id(&self) -> Option<&str> {
        None
    }

    /// Catalog dataset behind the layer; `None` for plain WMS and fusion layers.
    fn dataset(&self) -> Option<&'static Dataset>;

    fn supports_api_type(&self, api: ApiType) -> bool;

    /// URL that renders `params`. Only WMS requests can be expressed as a URL.
    fn get_map_url(&self, params: &GetMapParams, api: ApiType) -> Result<String>;

    /// Rendered image bytes.
    async fn get_map(
        &self,
        client: &ShClient,
        params: &GetMapParams,
        api: ApiType,
    ) -> Result<Vec<u8>>;

    /// One page of tiles intersecting `bbox`; `max_count` defaults to 50 and `offset` to 0.
    async fn find_tiles(
        &self,
        client: &ShClient,
        bbox: &BBox,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_count: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PaginatedTiles>;

    async fn find_dates_utc(
        &self,
        client: &ShClient,
        bbox: &BBox,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>>;

    /// Tiles grouped by satellite pass.
    ///
    /// Pages through `find_tiles` and fails with `TooManyTiles` when more tiles remain
    /// after `max_find_tiles_requests` pages.
    async fn find_flyovers(
        &self,
        client: &ShClient,
        bbox: &BBox,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_find_tiles_requests: u32,
        tiles_per_request: u32,
    ) -> Result<Vec<Flyover>> {
        let orbit_time_minutes = self
            .dataset()
            .and_then(|d| d.orbit_time_minutes)
            .ok_or(Error::NotSupported("flyovers need a dataset with a known orbit time"))?;

        let mut tiles = Vec::new();
        for request in 0..max_find_tiles_requests {
            let offset = request.checked_mul(tiles_per_request).ok_or_else(|| {
                Error::InvalidArgument {
                    arg: "tiles_per_request",
                    value: format!("{tiles_per_request} (offset of page {request} overflows)"),
                }
            })?;
            let page = self
                .find_tiles(client, bbox, from, to, Some(tiles_per_request), Some(offset))
                .await?;
            tiles.extend(page.tiles);
            if !page.has_more {
                debug!("Grouping {} tile(s) into flyovers", tiles.len());
                return Ok(group_tiles_into_flyovers(tiles, orbit_time_minutes));
            }
        }
        Err(Error::TooManyTiles {
            requests: max_find_tiles_requests,
            tiles_per_request,
        })
    }

    /// Merge this layer's dataset filters and processing options into `datasource`.
    async fn update_processing_datasource(
        &self,
        _client: &ShClient,
        _datasource: &mut ProcessingDatasource,
    ) -> Result<()> {
        Ok(())
    }
}
