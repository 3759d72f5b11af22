//! Optical datasets filtered by cloud coverage: Sentinel-2 L1C/L2A and Landsat 8.
use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::core::dataset::{DATASET_AWS_L8L1C, DATASET_S2L1C, DATASET_S2L2A, Dataset};
use crate::core::processing::ProcessingDatasource;
use crate::core::tiles::{Tile, TileMeta};
use crate::error::Result;
use crate::io::responses::RawTile;
use crate::layer::sh::{
    DatasetKind, LayerContext, SearchParameters, ShLayer, tile_with_geometry,
};

/// The dataset is chosen by the [`Optical`] kind, e.g. `OpticalLayer::new(options, Optical::s2l2a())`.
pub type OpticalLayer = ShLayer<Optical>;

#[derive(Debug, Clone, PartialEq)]
pub struct Optical {
    dataset: &'static Dataset,
    /// 0-100; unset means no filtering
    pub max_cloud_cover_percent: Option<f64>,
}

impl Optical {
    pub fn new(dataset: &'static Dataset) -> Self {
        Self {
            dataset,
            max_cloud_cover_percent: None,
        }
    }

    pub fn s2l1c() -> Self {
        Self::new(&DATASET_S2L1C)
    }

    pub fn s2l2a() -> Self {
        Self::new(&DATASET_S2L2A)
    }

    pub fn landsat8() -> Self {
        Self::new(&DATASET_AWS_L8L1C)
    }

    pub fn with_max_cloud_cover_percent(mut self, percent: f64) -> Self {
        self.max_cloud_cover_percent = Some(percent);
        self
    }

    // search endpoints take a 0-1 fraction
    fn max_cloud_coverage_fraction(&self) -> Option<f64> {
        self.max_cloud_cover_percent.map(|p| p / 100.0)
    }
}

#[async_trait]
impl DatasetKind for Optical {
    fn dataset(&self) -> &'static Dataset {
        self.dataset
    }

    fn wms_additional_params(&self) -> Vec<(&'static str, String)> {
        self.max_cloud_cover_percent
            .map(|p| vec![("maxcc", p.to_string())])
            .unwrap_or_default()
    }

    async fn update_datasource(
        &self,
        _ctx: &LayerContext<'_>,
        datasource: &mut ProcessingDatasource,
    ) -> Result<()> {
        if self.max_cloud_cover_percent.is_some() {
            datasource.data_filter.max_cloud_coverage = self.max_cloud_cover_percent;
        }
        Ok(())
    }

    async fn search_parameters(&self, _ctx: &LayerContext<'_>) -> Result<SearchParameters> {
        Ok(SearchParameters {
            max_cloud_coverage: self.max_cloud_coverage_fraction(),
            dataset_parameters: None,
        })
    }

    async fn find_dates_parameters(&self, _ctx: &LayerContext<'_>) -> Result<Map<String, Value>> {
        let mut params = Map::new();
        if let Some(fraction) = self.max_cloud_coverage_fraction() {
            params.insert("maxCloudCoverage".to_string(), json!(fraction));
        }
        Ok(params)
    }

    fn map_tile(&self, raw: RawTile) -> Result<Tile> {
        tile_with_geometry(
            &raw.sensing_time,
            raw.data_geometry,
            TileMeta {
                cloud_cover_percent: raw.cloud_cover_percentage,
                ..TileMeta::default()
            },
        )
    }
}
