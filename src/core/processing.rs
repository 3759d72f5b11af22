//! Typed Processing API request payload and its construction from map parameters.
//!
//! Optional members are omitted from the serialized JSON rather than sent as `null`.
use serde::{Deserialize, Serialize};

use crate::core::dataset::Dataset;
use crate::core::params::GetMapParams;
use crate::core::time::to_iso_millis;
use crate::error::{Error, Result};
use crate::types::{
    AcquisitionMode, ApiType, BackscatterCoeff, Interpolator, MimeType, MosaickingOrder,
    OrbitDirection, Polarization, PreviewMode, Resolution,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingPayload {
    pub input: ProcessingInput,
    pub output: ProcessingOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evalscript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingInput {
    pub bounds: ProcessingBounds,
    pub data: Vec<ProcessingDatasource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingBounds {
    pub bbox: [f64; 4],
    pub properties: BoundsProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsProperties {
    pub crs: String,
}

/// One entry of `input.data`; data fusion sends several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingDatasource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub data_filter: DataFilter,
    pub processing: DatasourceProcessing,
    #[serde(rename = "type")]
    pub datasource_type: String,
}

impl ProcessingDatasource {
    /// A datasource for `datasource_type` covering `[from, to]`, most recent first.
    pub fn new(datasource_type: &str, from: String, to: String) -> Self {
        Self {
            id: None,
            data_filter: DataFilter {
                time_range: TimeRange { from, to },
                mosaicking_order: MosaickingOrder::MostRecent,
                preview_mode: None,
                max_cloud_coverage: None,
                acquisition_mode: None,
                polarization: None,
                resolution: None,
                orbit_direction: None,
                collection_id: None,
            },
            processing: DatasourceProcessing::default(),
            datasource_type: datasource_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFilter {
    pub time_range: TimeRange,
    pub mosaicking_order: MosaickingOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_mode: Option<PreviewMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cloud_coverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_mode: Option<AcquisitionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarization: Option<Polarization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbit_direction: Option<OrbitDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceProcessing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsampling: Option<Interpolator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downsampling: Option<Interpolator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_coeff: Option<BackscatterCoeff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orthorectify: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOutput {
    pub width: u32,
    pub height: u32,
    pub responses: Vec<OutputResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputResponse {
    pub identifier: String,
    pub format: OutputResponseFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputResponseFormat {
    #[serde(rename = "type")]
    pub mime_type: MimeType,
}

/// Build the single-datasource payload shell for `dataset`.
///
/// The evalscript wins over the data product; one of them must be present.
pub fn create_processing_payload(
    dataset: &Dataset,
    params: &GetMapParams,
    evalscript: Option<&str>,
    data_product: Option<&str>,
) -> Result<ProcessingPayload> {
    let datasource_type = dataset
        .sh_processing_api_datasource_abbreviation
        .ok_or(Error::UnsupportedApiType {
            api: ApiType::Processing,
        })?;

    let mut datasource = ProcessingDatasource::new(
        datasource_type,
        to_iso_millis(&params.from_time),
        to_iso_millis(&params.to_time),
    );
    datasource.data_filter.preview_mode = params.preview;
    datasource.processing.upsampling = params.upsampling;
    datasource.processing.downsampling = params.downsampling;

    let (evalscript, data_product) = match (evalscript, data_product) {
        (Some(script), _) => (Some(script.to_string()), None),
        (None, Some(product)) => (None, Some(product.to_string())),
        (None, None) => {
            return Err(Error::missing(
                "either evalscript or dataProduct is required with Processing API",
            ));
        }
    };

    Ok(ProcessingPayload {
        input: ProcessingInput {
            bounds: ProcessingBounds {
                bbox: params.bbox.as_array(),
                properties: BoundsProperties {
                    crs: params.bbox.crs.opengis_url(),
                },
            },
            data: vec![datasource],
        },
        output: ProcessingOutput {
            width: params.width,
            height: params.height,
            responses: vec![OutputResponse {
                identifier: "default".to_string(),
                format: OutputResponseFormat {
                    mime_type: params.format,
                },
            }],
        },
        evalscript,
        data_product,
    })
}
