//! Static descriptors of the datasets the service exposes.
//!
//! URLs of dataset-specific endpoints are kept relative to the service hostname so
//! that a configured hostname override applies to every request of a dataset.
use serde::Serialize;

/// Generation of the Sentinel Hub service a dataset lives on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum ServiceVersion {
    /// EOCloud and other legacy deployments: WMS under `v1/wms/`, evalsource required.
    V1OrV2,
    /// Current deployments: WMS under `ogc/wms/`, Processing API available.
    V3,
}

impl ServiceVersion {
    pub fn wms_path(&self) -> &'static str {
        match self {
            ServiceVersion::V1OrV2 => "v1/wms/",
            ServiceVersion::V3 => "ogc/wms/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub id: &'static str,
    /// Always ends with `/`.
    pub sh_service_hostname: &'static str,
    pub sh_wms_evalsource: &'static str,
    pub sh_processing_api_datasource_abbreviation: Option<&'static str>,
    pub dataset_parameters_type: Option<&'static str>,
    pub search_index_path: Option<&'static str>,
    pub find_dates_utc_path: Option<&'static str>,
    pub orbit_time_minutes: Option<f64>,
    pub service_version: ServiceVersion,
}

impl Dataset {
    pub fn supports_processing_api(&self) -> bool {
        self.sh_processing_api_datasource_abbreviation.is_some()
    }
}

pub const DATASET_S2L1C: Dataset = Dataset {
    id: "AWS_S2L1C",
    sh_service_hostname: "https://services.sentinel-hub.com/",
    sh_wms_evalsource: "S2L1C",
    sh_processing_api_datasource_abbreviation: Some("S2L1C"),
    dataset_parameters_type: Some("S2"),
    search_index_path: Some("index/v3/collections/S2L1C/searchIndex"),
    find_dates_utc_path: Some("index/v3/collections/S2L1C/findAvailableData"),
    orbit_time_minutes: Some(100.6),
    service_version: ServiceVersion::V3,
};

pub const DATASET_S2L2A: Dataset = Dataset {
    id: "AWS_S2L2A",
    sh_service_hostname: "https://services.sentinel-hub.com/",
    sh_wms_evalsource: "S2L2A",
    sh_processing_api_datasource_abbreviation: Some("S2L2A"),
    dataset_parameters_type: Some("S2"),
    search_index_path: Some("index/v3/collections/S2L2A/searchIndex"),
    find_dates_utc_path: Some("index/v3/collections/S2L2A/findAvailableData"),
    orbit_time_minutes: Some(100.6),
    service_version: ServiceVersion::V3,
};

pub const DATASET_AWSEU_S1GRD: Dataset = Dataset {
    id: "AWSEU_S1GRD",
    sh_service_hostname: "https://services.sentinel-hub.com/",
    sh_wms_evalsource: "S1GRD",
    sh_processing_api_datasource_abbreviation: Some("S1GRD"),
    dataset_parameters_type: Some("S1GRD"),
    search_index_path: Some("index/v3/collections/S1GRD/searchIndex"),
    find_dates_utc_path: Some("index/v3/collections/S1GRD/findAvailableData"),
    orbit_time_minutes: Some(98.6),
    service_version: ServiceVersion::V3,
};

pub const DATASET_EOCLOUD_S1GRD: Dataset = Dataset {
    id: "EOC_S1GRD",
    sh_service_hostname: "https://eocloud.sentinel-hub.com/",
    sh_wms_evalsource: "S1",
    sh_processing_api_datasource_abbreviation: None,
    dataset_parameters_type: Some("S1"),
    search_index_path: Some("index/s1/v1/search"),
    find_dates_utc_path: Some("index/s1/v1/finddates"),
    orbit_time_minutes: Some(98.6),
    service_version: ServiceVersion::V1OrV2,
};

pub const DATASET_AWS_L8L1C: Dataset = Dataset {
    id: "AWS_L8L1C",
    sh_service_hostname: "https://services-uswest2.sentinel-hub.com/",
    sh_wms_evalsource: "L8L1C",
    sh_processing_api_datasource_abbreviation: Some("L8L1C"),
    dataset_parameters_type: Some("L8"),
    search_index_path: Some("index/v3/collections/L8L1C/searchIndex"),
    find_dates_utc_path: Some("index/v3/collections/L8L1C/findAvailableData"),
    orbit_time_minutes: Some(99.0),
    service_version: ServiceVersion::V3,
};

pub const DATASET_BYOC: Dataset = Dataset {
    id: "BYOC",
    sh_service_hostname: "https://services.sentinel-hub.com/",
    sh_wms_evalsource: "CUSTOM",
    sh_processing_api_datasource_abbreviation: Some("CUSTOM"),
    dataset_parameters_type: Some("BYOC"),
    search_index_path: Some("byoc/v3/collections/CUSTOM/searchIndex"),
    find_dates_utc_path: Some("byoc/v3/collections/CUSTOM/findAvailableData"),
    orbit_time_minutes: None,
    service_version: ServiceVersion::V3,
};

pub const ALL_DATASETS: [&Dataset; 6] = [
    &DATASET_S2L1C,
    &DATASET_S2L2A,
    &DATASET_AWSEU_S1GRD,
    &DATASET_EOCLOUD_S1GRD,
    &DATASET_AWS_L8L1C,
    &DATASET_BYOC,
];

/// Catalog entry served under `version` whose WMS evalsource is `evalsource`.
pub fn dataset_by_evalsource(version: ServiceVersion, evalsource: &str) -> Option<&'static Dataset> {
    ALL_DATASETS
        .iter()
        .copied()
        .find(|d| d.service_version == version && d.sh_wms_evalsource == evalsource)
}
