//! Sentinel-1 GRD radar layers.
//!
//! Two deployments: AWS EU (service v3, Processing API capable) and EOCloud
//! (v1/v2, WMS only). Both filter by acquisition mode, polarization and orbit
//! direction; AWS EU additionally by resolution and supports backscatter
//! normalization and orthorectification.
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::dataset::{DATASET_AWSEU_S1GRD, DATASET_EOCLOUD_S1GRD, Dataset};
use crate::core::processing::ProcessingDatasource;
use crate::core::tiles::{Tile, TileMeta};
use crate::error::{Error, Result};
use crate::io::responses::RawTile;
use crate::layer::sh::{
    DatasetKind, LayerContext, SearchParameters, ShLayer, insert_opt, tile_with_geometry,
};
use crate::types::{AcquisitionMode, BackscatterCoeff, OrbitDirection, Polarization, Resolution};

pub type S1GrdAwsEuLayer = ShLayer<Sentinel1Grd>;
pub type S1GrdEoCloudLayer = ShLayer<Sentinel1GrdEoCloud>;

fn tile_meta(raw: &RawTile) -> TileMeta {
    TileMeta {
        orbit_direction: raw.orbit_direction,
        polarization: raw.polarization,
        acquisition_mode: raw.acquisition_mode,
        resolution: raw.resolution,
        ..TileMeta::default()
    }
}

fn dataset_parameters(dataset: &Dataset) -> Map<String, Value> {
    let mut params = Map::new();
    insert_opt(&mut params, "type", dataset.dataset_parameters_type);
    params
}

/// Settings a Sentinel-1 GRD AWS EU request is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct S1GrdSettings {
    pub acquisition_mode: Option<AcquisitionMode>,
    pub polarization: Option<Polarization>,
    pub resolution: Option<Resolution>,
    pub orbit_direction: Option<OrbitDirection>,
    pub orthorectify: Option<bool>,
    pub backscatter_coeff: Option<BackscatterCoeff>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentinel1Grd {
    pub acquisition_mode: Option<AcquisitionMode>,
    pub polarization: Option<Polarization>,
    pub resolution: Option<Resolution>,
    pub orbit_direction: Option<OrbitDirection>,
    pub orthorectify: bool,
    pub backscatter_coeff: BackscatterCoeff,
}

impl Default for Sentinel1Grd {
    fn default() -> Self {
        Self {
            acquisition_mode: None,
            polarization: None,
            resolution: None,
            orbit_direction: None,
            orthorectify: false,
            backscatter_coeff: BackscatterCoeff::Gamma0Ellipsoid,
        }
    }
}

impl Sentinel1Grd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_acquisition_mode(mut self, mode: AcquisitionMode) -> Self {
        self.acquisition_mode = Some(mode);
        self
    }

    pub fn with_polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = Some(polarization);
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_orbit_direction(mut self, direction: OrbitDirection) -> Self {
        self.orbit_direction = Some(direction);
        self
    }

    pub fn with_orthorectify(mut self, orthorectify: bool) -> Self {
        self.orthorectify = orthorectify;
        self
    }

    pub fn with_backscatter_coeff(mut self, coeff: BackscatterCoeff) -> Self {
        self.backscatter_coeff = coeff;
        self
    }

    /// Configured settings when mode, polarization and resolution are all given,
    /// otherwise the layer's settings from the configuration service, which replace
    /// every one of them.
    pub async fn settings(&self, ctx: &LayerContext<'_>) -> Result<S1GrdSettings> {
        if self.acquisition_mode.is_some() && self.polarization.is_some() && self.resolution.is_some()
        {
            return Ok(S1GrdSettings {
                acquisition_mode: self.acquisition_mode,
                polarization: self.polarization,
                resolution: self.resolution,
                orbit_direction: self.orbit_direction,
                orthorectify: Some(self.orthorectify),
                backscatter_coeff: Some(self.backscatter_coeff),
            });
        }
        let defaults = &ctx.layer_params().await?.defaults;
        Ok(S1GrdSettings {
            acquisition_mode: defaults.acquisition_mode,
            polarization: defaults.polarization,
            resolution: defaults.resolution,
            orbit_direction: defaults.orbit_direction,
            orthorectify: defaults.orthorectify,
            backscatter_coeff: defaults.back_coeff,
        })
    }

    fn dataset_parameters(&self, settings: &S1GrdSettings) -> Map<String, Value> {
        let mut params = dataset_parameters(self.dataset());
        insert_opt(&mut params, "acquisitionMode", settings.acquisition_mode);
        insert_opt(&mut params, "polarization", settings.polarization);
        insert_opt(&mut params, "orbitDirection", settings.orbit_direction);
        insert_opt(&mut params, "resolution", settings.resolution);
        params
    }
}

#[async_trait]
impl DatasetKind for Sentinel1Grd {
    fn dataset(&self) -> &'static Dataset {
        &DATASET_AWSEU_S1GRD
    }

    async fn update_datasource(
        &self,
        ctx: &LayerContext<'_>,
        datasource: &mut ProcessingDatasource,
    ) -> Result<()> {
        let settings = self.settings(ctx).await?;
        let filter = &mut datasource.data_filter;
        filter.acquisition_mode = settings.acquisition_mode;
        filter.polarization = settings.polarization;
        filter.resolution = settings.resolution;
        if settings.orbit_direction.is_some() {
            filter.orbit_direction = settings.orbit_direction;
        }
        datasource.processing.back_coeff = settings.backscatter_coeff;
        datasource.processing.orthorectify = settings.orthorectify;
        Ok(())
    }

    async fn search_parameters(&self, ctx: &LayerContext<'_>) -> Result<SearchParameters> {
        let settings = self.settings(ctx).await?;
        Ok(SearchParameters {
            max_cloud_coverage: None,
            dataset_parameters: Some(Value::Object(self.dataset_parameters(&settings))),
        })
    }

    async fn find_dates_parameters(&self, ctx: &LayerContext<'_>) -> Result<Map<String, Value>> {
        let settings = self.settings(ctx).await?;
        let mut params = Map::new();
        params.insert(
            "datasetParameters".to_string(),
            Value::Object(self.dataset_parameters(&settings)),
        );
        Ok(params)
    }

    fn map_tile(&self, raw: RawTile) -> Result<Tile> {
        let meta = tile_meta(&raw);
        tile_with_geometry(&raw.sensing_time, raw.data_geometry, meta)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sentinel1GrdEoCloud {
    pub acquisition_mode: Option<AcquisitionMode>,
    pub polarization: Option<Polarization>,
    pub orbit_direction: Option<OrbitDirection>,
}

impl Sentinel1GrdEoCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_acquisition_mode(mut self, mode: AcquisitionMode) -> Self {
        self.acquisition_mode = Some(mode);
        self
    }

    pub fn with_polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = Some(polarization);
        self
    }

    pub fn with_orbit_direction(mut self, direction: OrbitDirection) -> Self {
        self.orbit_direction = Some(direction);
        self
    }

    fn dataset_parameters(&self) -> Result<Map<String, Value>> {
        let mode = self
            .acquisition_mode
            .ok_or_else(|| Error::missing("acquisition mode"))?;
        let polarization = self
            .polarization
            .ok_or_else(|| Error::missing("polarization"))?;
        let mut params = dataset_parameters(self.dataset());
        insert_opt(&mut params, "acquisitionMode", Some(mode));
        insert_opt(&mut params, "polarization", Some(polarization));
        insert_opt(&mut params, "orbitDirection", self.orbit_direction);
        Ok(params)
    }
}

#[async_trait]
impl DatasetKind for Sentinel1GrdEoCloud {
    fn dataset(&self) -> &'static Dataset {
        &DATASET_EOCLOUD_S1GRD
    }

    fn wms_evalsource(&self) -> &'static str {
        match self.acquisition_mode {
            Some(AcquisitionMode::Ew) => "S1_EW",
            _ => "S1",
        }
    }

    async fn search_parameters(&self, _ctx: &LayerContext<'_>) -> Result<SearchParameters> {
        Ok(SearchParameters {
            max_cloud_coverage: None,
            dataset_parameters: Some(Value::Object(self.dataset_parameters()?)),
        })
    }

    async fn find_dates_parameters(&self, _ctx: &LayerContext<'_>) -> Result<Map<String, Value>> {
        let mut params = Map::new();
        params.insert(
            "datasetParameters".to_string(),
            Value::Object(self.dataset_parameters()?),
        );
        Ok(params)
    }

    fn map_tile(&self, raw: RawTile) -> Result<Tile> {
        let meta = tile_meta(&raw);
        tile_with_geometry(&raw.sensing_time, raw.tile_draw_region_geometry, meta)
    }
}
