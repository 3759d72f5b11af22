//! JSON records exchanged with the service's search and configuration endpoints.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AcquisitionMode, BackscatterCoeff, OrbitDirection, Polarization, Resolution};

/// `datasourceDefaults` of a configured layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceDefaults {
    #[serde(default)]
    pub acquisition_mode: Option<AcquisitionMode>,
    #[serde(default)]
    pub polarization: Option<Polarization>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub back_coeff: Option<BackscatterCoeff>,
    #[serde(default)]
    pub orthorectify: Option<bool>,
    #[serde(default)]
    pub orbit_direction: Option<OrbitDirection>,
    #[serde(default)]
    pub collection_id: Option<String>,
}

/// Layer settings as stored in the configuration service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerParams {
    pub layer_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub evalscript: Option<String>,
    pub data_product: Option<String>,
    pub defaults: DatasourceDefaults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfiguredLayer {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub styles: Vec<ConfiguredStyle>,
    #[serde(default)]
    pub datasource_defaults: DatasourceDefaults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfiguredStyle {
    #[serde(default)]
    pub eval_script: Option<String>,
    #[serde(default)]
    pub data_product: Option<Value>,
}

impl From<ConfiguredLayer> for LayerParams {
    fn from(layer: ConfiguredLayer) -> Self {
        let style = layer.styles.into_iter().next();
        let (evalscript, data_product) = match style {
            Some(style) => {
                // either a plain identifier or a `{"@id": ...}` reference
                let data_product = style.data_product.and_then(|p| match p {
                    Value::String(s) => Some(s),
                    Value::Object(map) => map.get("@id").and_then(Value::as_str).map(String::from),
                    _ => None,
                });
                (style.eval_script.filter(|s| !s.trim().is_empty()), data_product)
            }
            None => (None, None),
        };
        LayerParams {
            layer_id: layer.id,
            title: layer.title,
            description: layer.description,
            evalscript,
            data_product,
            defaults: layer.datasource_defaults,
        }
    }
}

/// Body of a search-index request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSearchRequest {
    pub clipping: Value,
    #[serde(rename = "maxcount")]
    pub max_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cloud_coverage: Option<f64>,
    pub time_from: String,
    pub time_to: String,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_parameters: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSearchResponse {
    #[serde(default)]
    pub tiles: Vec<RawTile>,
    #[serde(default)]
    pub has_more: bool,
}

/// A tile as returned by a search index, before dataset-specific mapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTile {
    pub sensing_time: String,
    #[serde(default)]
    pub data_geometry: Option<Value>,
    #[serde(default)]
    pub tile_draw_region_geometry: Option<Value>,
    #[serde(default)]
    pub cloud_cover_percentage: Option<f64>,
    #[serde(default)]
    pub orbit_direction: Option<OrbitDirection>,
    #[serde(default)]
    pub polarization: Option<Polarization>,
    #[serde(default)]
    pub acquisition_mode: Option<AcquisitionMode>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
}

/// JSON GetCapabilities entry of a Sentinel Hub instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilitiesLayer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CapabilitiesJson {
    #[serde(default)]
    pub layers: Vec<CapabilitiesLayer>,
}
