//! Machinery shared by every Sentinel Hub layer.
//!
//! `ShLayer<K>` implements [`Layer`] once; everything that differs between datasets
//! (filters, search parameters, tile metadata) lives in the [`DatasetKind`] `K`.
//! Layer settings stored in the configuration service are fetched at most once per
//! layer and shared through [`LayerContext`].
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::core::bbox::BBox;
use crate::core::dataset::{Dataset, ServiceVersion};
use crate::core::params::GetMapParams;
use crate::core::processing::{ProcessingDatasource, create_processing_payload};
use crate::core::tiles::{PaginatedTiles, Tile, TileMeta};
use crate::core::time::{parse_utc, to_iso_millis};
use crate::core::wms::{WmsExtras, wms_get_map_url};
use crate::error::{Error, Result};
use crate::io::client::ShClient;
use crate::io::responses::{LayerParams, RawTile, TileSearchRequest};
use crate::layer::{DEFAULT_FIND_TILES_MAX_COUNT, Layer};
use crate::types::ApiType;

/// Identification and rendering options common to all Sentinel Hub layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerOptions {
    pub instance_id: Option<String>,
    pub layer_id: Option<String>,
    pub evalscript: Option<String>,
    pub evalscript_url: Option<String>,
    pub data_product: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl LayerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options of a layer configured in `instance_id`.
    pub fn configured(instance_id: impl Into<String>, layer_id: impl Into<String>) -> Self {
        Self::new()
            .with_instance_id(instance_id)
            .with_layer_id(layer_id)
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    pub fn with_layer_id(mut self, layer_id: impl Into<String>) -> Self {
        self.layer_id = Some(layer_id.into());
        self
    }

    pub fn with_evalscript(mut self, evalscript: impl Into<String>) -> Self {
        self.evalscript = Some(evalscript.into());
        self
    }

    pub fn with_evalscript_url(mut self, url: impl Into<String>) -> Self {
        self.evalscript_url = Some(url.into());
        self
    }

    pub fn with_data_product(mut self, data_product: impl Into<String>) -> Self {
        self.data_product = Some(data_product.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What a dataset adds to a search-index request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParameters {
    pub max_cloud_coverage: Option<f64>,
    pub dataset_parameters: Option<Value>,
}

/// Per-call view of a layer handed to its [`DatasetKind`].
pub struct LayerContext<'a> {
    pub client: &'a ShClient,
    pub options: &'a LayerOptions,
    dataset: &'static Dataset,
    layer_params: &'a OnceCell<LayerParams>,
}

impl<'a> LayerContext<'a> {
    pub fn dataset(&self) -> &'static Dataset {
        self.dataset
    }

    /// Layer settings from the configuration service, fetched on first use.
    pub async fn layer_params(&self) -> Result<&'a LayerParams> {
        let (Some(instance_id), Some(layer_id)) = (
            self.options.instance_id.as_deref(),
            self.options.layer_id.as_deref(),
        ) else {
            return Err(Error::missing(
                "instance id and layer id are needed to fetch layer settings",
            ));
        };
        let client = self.client;
        let dataset = self.dataset;
        self.layer_params
            .get_or_try_init(|| client.fetch_layer_params(dataset, instance_id, layer_id))
            .await
    }
}

/// Dataset-specific behaviour of an [`ShLayer`].
#[async_trait]
pub trait DatasetKind: Send + Sync + std::fmt::Debug {
    fn dataset(&self) -> &'static Dataset;

    /// `evalsource` sent to v1/v2 WMS services.
    fn wms_evalsource(&self) -> &'static str {
        self.dataset().sh_wms_evalsource
    }

    /// Extra GetMap parameters, appended after the standard ones.
    fn wms_additional_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Merge dataset filters and processing options into a Processing API datasource.
    async fn update_datasource(
        &self,
        _ctx: &LayerContext<'_>,
        _datasource: &mut ProcessingDatasource,
    ) -> Result<()> {
        Ok(())
    }

    async fn search_parameters(&self, _ctx: &LayerContext<'_>) -> Result<SearchParameters> {
        Ok(SearchParameters::default())
    }

    /// Members merged into the find-dates request body.
    async fn find_dates_parameters(&self, _ctx: &LayerContext<'_>) -> Result<Map<String, Value>> {
        Ok(Map::new())
    }

    fn map_tile(&self, raw: RawTile) -> Result<Tile> {
        tile_with_geometry(&raw.sensing_time, raw.data_geometry, TileMeta::default())
    }
}

/// Tile from a raw search result; the geometry must be present.
pub(crate) fn tile_with_geometry(
    sensing_time: &str,
    geometry: Option<Value>,
    meta: TileMeta,
) -> Result<Tile> {
    let geometry =
        geometry.ok_or_else(|| Error::Parse(format!("tile sensed at {sensing_time} has no geometry")))?;
    Ok(Tile {
        geometry,
        sensing_time: parse_utc(sensing_time)?,
        meta,
    })
}

/// Insert `value` under `key` unless it is `None`.
pub(crate) fn insert_opt<T: ToString>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

#[derive(Debug)]
pub struct ShLayer<K: DatasetKind> {
    options: LayerOptions,
    kind: K,
    layer_params: OnceCell<LayerParams>,
}

impl<K: DatasetKind> ShLayer<K> {
    pub fn new(options: LayerOptions, kind: K) -> Self {
        Self {
            options,
            kind,
            layer_params: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn context<'a>(&'a self, client: &'a ShClient) -> LayerContext<'a> {
        LayerContext {
            client,
            options: &self.options,
            dataset: self.kind.dataset(),
            layer_params: &self.layer_params,
        }
    }

    /// Layer settings from the configuration service, fetched once per layer.
    pub async fn layer_params<'a>(&'a self, client: &'a ShClient) -> Result<&'a LayerParams> {
        self.context(client).layer_params().await
    }

    /// GetMap URL against `hostname`.
    pub fn wms_url(&self, hostname: &str, params: &GetMapParams) -> Result<String> {
        let instance_id = self
            .options
            .instance_id
            .as_deref()
            .ok_or_else(|| Error::missing("instance id"))?;
        let layer_id = self
            .options
            .layer_id
            .as_deref()
            .ok_or_else(|| Error::missing("layer id"))?;
        let dataset = self.kind.dataset();
        let base_url = format!("{hostname}{}{instance_id}", dataset.service_version.wms_path());
        let extras = WmsExtras {
            evalscript: self.options.evalscript.as_deref(),
            evalscript_url: self.options.evalscript_url.as_deref(),
            evalsource: match dataset.service_version {
                ServiceVersion::V1OrV2 => Some(self.kind.wms_evalsource()),
                ServiceVersion::V3 => None,
            },
            additional: self.kind.wms_additional_params(),
        };
        Ok(wms_get_map_url(&base_url, layer_id, params, &extras))
    }

    /// Evalscript and data product for a Processing request.
    ///
    /// Explicit evalscript, then the script at `evalscript_url`, then the explicit data
    /// product, then whatever the configuration service holds for the layer.
    async fn resolve_evalscript(
        &self,
        client: &ShClient,
    ) -> Result<(Option<String>, Option<String>)> {
        if let Some(evalscript) = &self.options.evalscript {
            return Ok((Some(evalscript.clone()), None));
        }
        if let Some(url) = &self.options.evalscript_url {
            return Ok((Some(client.get_text(url).await?), None));
        }
        if let Some(data_product) = &self.options.data_product {
            return Ok((None, Some(data_product.clone())));
        }
        let params = self.layer_params(client).await?;
        Ok((params.evalscript.clone(), params.data_product.clone()))
    }
}

#[async_trait]
impl<K: DatasetKind> Layer for ShLayer<K> {
    fn title(&self) -> Option<&str> {
        self.options.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.options.description.as_deref()
    }

    fn layer_id(&self) -> Option<&str> {
        self.options.layer_id.as_deref()
    }

    fn dataset(&self) -> Option<&'static Dataset> {
        Some(self.kind.dataset())
    }

    fn supports_api_type(&self, api: ApiType) -> bool {
        match api {
            ApiType::Wms => true,
            ApiType::Processing => self.kind.dataset().supports_processing_api(),
        }
    }

    fn get_map_url(&self, params: &GetMapParams, api: ApiType) -> Result<String> {
        if api != ApiType::Wms {
            return Err(Error::UnsupportedApiType { api });
        }
        self.wms_url(self.kind.dataset().sh_service_hostname, params)
    }

    async fn get_map(
        &self,
        client: &ShClient,
        params: &GetMapParams,
        api: ApiType,
    ) -> Result<Vec<u8>> {
        if !self.supports_api_type(api) {
            return Err(Error::UnsupportedApiType { api });
        }
        let dataset = self.kind.dataset();
        match api {
            ApiType::Wms => {
                let url = self.wms_url(client.service_hostname(dataset), params)?;
                client.get_bytes(&url).await
            }
            ApiType::Processing => {
                let (evalscript, data_product) = self.resolve_evalscript(client).await?;
                let mut payload = create_processing_payload(
                    dataset,
                    params,
                    evalscript.as_deref(),
                    data_product.as_deref(),
                )?;
                for datasource in payload.input.data.iter_mut() {
                    self.update_processing_datasource(client, datasource).await?;
                }
                client.processing_get_map(dataset, &payload).await
            }
        }
    }

    async fn find_tiles(
        &self,
        client: &ShClient,
        bbox: &BBox,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_count: Option<u32>,
        offset: Option<u32>,
    ) -> Result<PaginatedTiles> {
        let ctx = self.context(client);
        let search = self.kind.search_parameters(&ctx).await?;
        let request = TileSearchRequest {
            clipping: bbox.to_geojson(),
            max_count: max_count.unwrap_or(DEFAULT_FIND_TILES_MAX_COUNT),
            max_cloud_coverage: search.max_cloud_coverage,
            time_from: to_iso_millis(&from),
            time_to: to_iso_millis(&to),
            offset: offset.unwrap_or(0),
            dataset_parameters: search.dataset_parameters,
        };
        let response = client.fetch_tiles(self.kind.dataset(), &request).await?;
        let tiles = response
            .tiles
            .into_iter()
            .map(|raw| self.kind.map_tile(raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(PaginatedTiles {
            tiles,
            has_more: response.has_more,
        })
    }

    async fn find_dates_utc(
        &self,
        client: &ShClient,
        bbox: &BBox,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let ctx = self.context(client);
        let additional = self.kind.find_dates_parameters(&ctx).await?;
        let dates = client
            .fetch_dates(self.kind.dataset(), bbox, &from, &to, additional)
            .await?;
        info!("Found {} date(s) for {}", dates.len(), self.kind.dataset().id);
        Ok(dates)
    }

    async fn update_processing_datasource(
        &self,
        client: &ShClient,
        datasource: &mut ProcessingDatasource,
    ) -> Result<()> {
        debug!("Applying {} filters to datasource", self.kind.dataset().id);
        self.kind
            .update_datasource(&self.context(client), datasource)
            .await
    }
}
