//! Processing API data fusion: one evalscript over several datasources.
//!
//! Searching only makes sense per dataset, so the `find_*` operations are
//! disabled here; use the individual layers instead.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::bbox::BBox;
use crate::core::dataset::Dataset;
use crate::core::params::GetMapParams;
use crate::core::processing::{ProcessingDatasource, ProcessingPayload, create_processing_payload};
use crate::core::tiles::PaginatedTiles;
use crate::core::time::to_iso_millis;
use crate::error::{Error, Result};
use crate::io::client::ShClient;
use crate::layer::Layer;
use crate::types::{ApiType, Interpolator, PreviewMode};

/// One source of a fusion request with its per-source overrides.
#[derive(Debug, Clone)]
pub struct DataFusionLayerInfo {
    pub layer: Arc<dyn Layer>,
    /// Identifier the evalscript refers to this source by.
    pub id: Option<String>,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
    pub preview: Option<PreviewMode>,
    pub upsampling: Option<Interpolator>,
    pub downsampling: Option<Interpolator>,
}

impl DataFusionLayerInfo {
    pub fn new(layer: Arc<dyn Layer>) -> Self {
        Self {
            layer,
            id: None,
            from_time: None,
            to_time: None,
            preview: None,
            upsampling: None,
            downsampling: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_time_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from_time = Some(from);
        self.to_time = Some(to);
        self
    }

    pub fn with_preview(mut self, preview: PreviewMode) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_upsampling(mut self, upsampling: Interpolator) -> Self {
        self.upsampling = Some(upsampling);
        self
    }

    pub fn with_downsampling(mut self, downsampling: Interpolator) -> Self {
        self.downsampling = Some(downsampling);
        self
    }
}

fn processing_dataset(layer: &dyn Layer) -> Result<&'static Dataset> {
    layer
        .dataset()
        .filter(|d| d.supports_processing_api())
        .ok_or(Error::UnsupportedApiType {
            api: ApiType::Processing,
        })
}

#[derive(Debug, Clone)]
pub struct ProcessingDataFusionLayer {
    pub evalscript: String,
    pub layers: Vec<DataFusionLayerInfo>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ProcessingDataFusionLayer {
    pub fn new(evalscript: impl Into<String>, layers: Vec<DataFusionLayerInfo>) -> Self {
        Self {
            evalscript: evalscript.into(),
            layers,
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

    fn first_dataset(&self) -> Result<&'static Dataset> {
        let first = self
            .layers
            .first()
            .ok_or_else(|| Error::missing("data fusion needs at least one layer"))?;
        processing_dataset(first.layer.as_ref())
    }

    /// Composite payload with one datasource per layer, in order.
    pub async fn build_payload(
        &self,
        client: &ShClient,
        params: &GetMapParams,
    ) -> Result<ProcessingPayload> {
        let mut payload =
            create_processing_payload(self.first_dataset()?, params, Some(&self.evalscript), None)?;

        let mut data = Vec::with_capacity(self.layers.len());
        for info in &self.layers {
            let dataset = processing_dataset(info.layer.as_ref())?;
            let abbreviation = dataset
                .sh_processing_api_datasource_abbreviation
                .ok_or(Error::UnsupportedApiType {
                    api: ApiType::Processing,
                })?;
            let mut datasource = ProcessingDatasource::new(
                abbreviation,
                to_iso_millis(&info.from_time.unwrap_or(params.from_time)),
                to_iso_millis(&info.to_time.unwrap_or(params.to_time)),
            );
            datasource.id = info.id.clone();
            datasource.data_filter.preview_mode = info.preview.or(params.preview);
            datasource.processing.upsampling = info.upsampling.or(params.upsampling);
            datasource.processing.downsampling = info.downsampling.or(params.downsampling);

            info.layer
                .update_processing_datasource(client, &mut datasource)
                .await?;
            data.push(datasource);
        }
        payload.input.data = data;
        Ok(payload)
    }
}

#[async_trait]
impl Layer for ProcessingDataFusionLayer {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn dataset(&self) -> Option<&'static Dataset> {
        None
    }

    fn supports_api_type(&self, api: ApiType) -> bool {
        api == ApiType::Processing
    }

    fn get_map_url(&self, _params: &GetMapParams, api: ApiType) -> Result<String> {
        Err(Error::UnsupportedApiType { api })
    }

    async fn get_map(
        &self,
        client: &ShClient,
        params: &GetMapParams,
        api: ApiType,
    ) -> Result<Vec<u8>> {
        if api != ApiType::Processing {
            return Err(Error::UnsupportedApiType { api });
        }
        let payload = self.build_payload(client, params).await?;
        debug!("Fusing {} datasource(s)", payload.input.data.len());
        client
            .processing_get_map(self.first_dataset()?, &payload)
            .await
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
        Err(Error::NotSupported(
            "use individual layers when searching for tiles or flyovers",
        ))
    }

    async fn find_dates_utc(
        &self,
        _client: &ShClient,
        _bbox: &BBox,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        Err(Error::NotSupported(
            "use individual layers when searching for available dates",
        ))
    }
}
