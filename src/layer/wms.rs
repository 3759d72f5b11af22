//! Layer of an arbitrary WMS server.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::bbox::BBox;
use crate::core::dataset::Dataset;
use crate::core::params::GetMapParams;
use crate::core::tiles::PaginatedTiles;
use crate::core::wms::{
    WmsExtras, expand_time_dimension, get_capabilities_url, parse_capabilities_layers,
    wms_get_map_url,
};
use crate::error::{Error, Result};
use crate::io::client::ShClient;
use crate::layer::Layer;
use crate::types::ApiType;

#[derive(Debug, Clone, PartialEq)]
pub struct WmsLayer {
    pub base_url: String,
    pub layer_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl WmsLayer {
    pub fn new(base_url: impl Into<String>, layer_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            layer_id: layer_id.into(),
            title: None,
            description: None,
        }
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

#[async_trait]
impl Layer for WmsLayer {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn layer_id(&self) -> Option<&str> {
        Some(&self.layer_id)
    }

    fn dataset(&self) -> Option<&'static Dataset> {
        None
    }

    fn supports_api_type(&self, api: ApiType) -> bool {
        api == ApiType::Wms
    }

    fn get_map_url(&self, params: &GetMapParams, api: ApiType) -> Result<String> {
        if api != ApiType::Wms {
            return Err(Error::UnsupportedApiType { api });
        }
        Ok(wms_get_map_url(
            &self.base_url,
            &self.layer_id,
            params,
            &WmsExtras::default(),
        ))
    }

    async fn get_map(
        &self,
        client: &ShClient,
        params: &GetMapParams,
        api: ApiType,
    ) -> Result<Vec<u8>> {
        let url = self.get_map_url(params, api)?;
        client.get_bytes(&url).await
    }

    async fn find_tiles(
        &self,
        _client: &ShClient,
        _bbox: &BBox,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        _max_count: Option<u32>,
        _offset: Option<u32>,
    ) -> Result<PaginatedTiles> {
        Err(Error::NotSupported("WMS servers have no tile search"))
    }

    async fn find_dates_utc(
        &self,
        client: &ShClient,
        _bbox: &BBox,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let xml = client.get_text(&get_capabilities_url(&self.base_url)).await?;
        let layers = parse_capabilities_layers(&xml)?;
        let layer = layers
            .into_iter()
            .find(|l| l.name.as_deref() == Some(self.layer_id.as_str()))
            .ok_or_else(|| Error::LayerNotFound {
                layer_id: self.layer_id.clone(),
            })?;
        match layer.time_dimension {
            Some(value) => expand_time_dimension(&value, &from, &to),
            None => {
                debug!("Layer {} has no time dimension", self.layer_id);
                Ok(Vec::new())
            }
        }
    }
}
