//! High-level entry points: build a layer from a flat description and save rendered
//! maps to disk. Prefer these over wiring `layer` types by hand when the dataset is
//! only known at runtime (CLI flags, configuration files).
use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::params::GetMapParams;
use crate::error::{Error, Result};
use crate::io::client::ShClient;
use crate::layer::{
    Byoc, Layer, LayerOptions, Optical, Sentinel1Grd, Sentinel1GrdEoCloud, ShLayer, WmsLayer,
};
use crate::types::{
    AcquisitionMode, ApiType, BackscatterCoeff, OrbitDirection, Polarization, Resolution,
};

/// Kind of layer to build.
#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetChoice {
    /// Any WMS server, needs a base URL
    Wms,
    S2l1c,
    S2l2a,
    /// Sentinel-1 GRD on AWS EU
    S1grd,
    /// Sentinel-1 GRD on EOCloud
    S1grdEocloud,
    L8l1c,
    Byoc,
}

/// Flat description of a layer and its dataset filters.
///
/// Filters that do not apply to the chosen dataset are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub dataset: DatasetChoice,
    pub options: LayerOptions,
    /// WMS server URL; only used with `DatasetChoice::Wms`
    pub base_url: Option<String>,
    pub max_cloud_cover_percent: Option<f64>,
    pub acquisition_mode: Option<AcquisitionMode>,
    pub polarization: Option<Polarization>,
    pub resolution: Option<Resolution>,
    pub orbit_direction: Option<OrbitDirection>,
    pub orthorectify: bool,
    pub backscatter_coeff: Option<BackscatterCoeff>,
    pub collection_id: Option<String>,
}

impl LayerSpec {
    pub fn new(dataset: DatasetChoice, options: LayerOptions) -> Self {
        Self {
            dataset,
            options,
            base_url: None,
            max_cloud_cover_percent: None,
            acquisition_mode: None,
            polarization: None,
            resolution: None,
            orbit_direction: None,
            orthorectify: false,
            backscatter_coeff: None,
            collection_id: None,
        }
    }
}

fn optical(spec: &LayerSpec, kind: Optical) -> Arc<dyn Layer> {
    let kind = match spec.max_cloud_cover_percent {
        Some(percent) => kind.with_max_cloud_cover_percent(percent),
        None => kind,
    };
    Arc::new(ShLayer::new(spec.options.clone(), kind))
}

/// Build the layer `spec` describes.
pub fn build_layer(spec: &LayerSpec) -> Result<Arc<dyn Layer>> {
    let layer: Arc<dyn Layer> = match spec.dataset {
        DatasetChoice::Wms => {
            let base_url = spec
                .base_url
                .clone()
                .ok_or_else(|| Error::missing("base URL of the WMS server"))?;
            let layer_id = spec
                .options
                .layer_id
                .clone()
                .ok_or_else(|| Error::missing("layer id"))?;
            let mut layer = WmsLayer::new(base_url, layer_id);
            layer.title = spec.options.title.clone();
            layer.description = spec.options.description.clone();
            Arc::new(layer)
        }
        DatasetChoice::S2l1c => optical(spec, Optical::s2l1c()),
        DatasetChoice::S2l2a => optical(spec, Optical::s2l2a()),
        DatasetChoice::L8l1c => optical(spec, Optical::landsat8()),
        DatasetChoice::S1grd => {
            let kind = Sentinel1Grd {
                acquisition_mode: spec.acquisition_mode,
                polarization: spec.polarization,
                resolution: spec.resolution,
                orbit_direction: spec.orbit_direction,
                orthorectify: spec.orthorectify,
                backscatter_coeff: spec
                    .backscatter_coeff
                    .unwrap_or(BackscatterCoeff::Gamma0Ellipsoid),
            };
            Arc::new(ShLayer::new(spec.options.clone(), kind))
        }
        DatasetChoice::S1grdEocloud => {
            let kind = Sentinel1GrdEoCloud {
                acquisition_mode: spec.acquisition_mode,
                polarization: spec.polarization,
                orbit_direction: spec.orbit_direction,
            };
            Arc::new(ShLayer::new(spec.options.clone(), kind))
        }
        DatasetChoice::Byoc => {
            let kind = Byoc {
                collection_id: spec.collection_id.clone(),
            };
            Arc::new(ShLayer::new(spec.options.clone(), kind))
        }
    };
    Ok(layer)
}

/// Render `params` through `layer` and write the image to `output`.
pub async fn save_map(
    layer: &dyn Layer,
    client: &ShClient,
    params: &GetMapParams,
    api: ApiType,
    output: &Path,
) -> Result<usize> {
    let bytes = layer.get_map(client, params, api).await?;
    tokio::fs::write(output, &bytes).await?;
    info!("Wrote {} bytes to {:?}", bytes.len(), output);
    Ok(bytes.len())
}
