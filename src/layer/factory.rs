//! Build layer objects from a service's GetCapabilities document.
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::dataset::{
    DATASET_AWSEU_S1GRD, DATASET_BYOC, DATASET_EOCLOUD_S1GRD, Dataset, ServiceVersion,
    dataset_by_evalsource,
};
use crate::core::wms::{get_capabilities_url, parse_capabilities_layers};
use crate::error::{Error, Result};
use crate::io::client::ShClient;
use crate::io::responses::{CapabilitiesJson, CapabilitiesLayer};
use crate::layer::byoc::Byoc;
use crate::layer::optical::Optical;
use crate::layer::sentinel1::{Sentinel1Grd, Sentinel1GrdEoCloud};
use crate::layer::sh::{LayerOptions, ShLayer};
use crate::layer::wms::WmsLayer;
use crate::layer::Layer;
use crate::types::AcquisitionMode;

/// Decides which layers to build, by layer id and catalog dataset.
pub type LayerFilter<'a> = &'a (dyn Fn(&str, Option<&'static Dataset>) -> bool + Sync);

/// Service version and instance id of a Sentinel Hub WMS endpoint URL.
pub fn parse_sh_wms_url(base_url: &str) -> Option<(ServiceVersion, String)> {
    for version in [ServiceVersion::V3, ServiceVersion::V1OrV2] {
        let marker = format!("/{}", version.wms_path());
        if let Some(pos) = base_url.find(&marker) {
            let rest = &base_url[pos + marker.len()..];
            let instance_id = rest
                .split(['?', '/', '#'])
                .next()
                .unwrap_or_default();
            if !instance_id.is_empty() {
                return Some((version, instance_id.to_string()));
            }
        }
    }
    None
}

fn capabilities_json_url(base_url: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}request=GetCapabilities&format=application/json")
}

pub struct LayersFactory;

impl LayersFactory {
    /// One layer per entry of the capabilities of `base_url`.
    ///
    /// Sentinel Hub endpoints yield dataset-specific layers, any other WMS server
    /// yields [`WmsLayer`]s. `filter` keeps only the layers it returns true for.
    pub async fn make_layers(
        client: &ShClient,
        base_url: &str,
        filter: Option<LayerFilter<'_>>,
    ) -> Result<Vec<Arc<dyn Layer>>> {
        let keep = |layer_id: &str, dataset: Option<&'static Dataset>| {
            filter.is_none_or(|f| f(layer_id, dataset))
        };

        let layers = match parse_sh_wms_url(base_url).filter(|_| client.is_service_url(base_url)) {
            Some((version, instance_id)) => {
                let capabilities: CapabilitiesJson =
                    client.get_json(&capabilities_json_url(base_url)).await?;
                let mut layers = Vec::new();
                for entry in capabilities.layers {
                    let Some((dataset, layer)) = sh_layer(version, &instance_id, &entry) else {
                        warn!(
                            "Skipping layer {}: unknown dataset {:?}",
                            entry.id, entry.dataset
                        );
                        continue;
                    };
                    if keep(&entry.id, Some(dataset)) {
                        layers.push(layer);
                    }
                }
                layers
            }
            None => {
                let xml = client.get_text(&get_capabilities_url(base_url)).await?;
                parse_capabilities_layers(&xml)?
                    .into_iter()
                    .filter_map(|info| {
                        let name = info.name?;
                        if !keep(&name, None) {
                            return None;
                        }
                        let mut layer = WmsLayer::new(base_url, name);
                        layer.title = info.title;
                        layer.description = info.abstract_text;
                        Some(Arc::new(layer) as Arc<dyn Layer>)
                    })
                    .collect()
            }
        };
        info!("Built {} layer(s) from {}", layers.len(), base_url);
        Ok(layers)
    }

    /// The single layer `layer_id` of `base_url`.
    pub async fn make_layer(
        client: &ShClient,
        base_url: &str,
        layer_id: &str,
    ) -> Result<Arc<dyn Layer>> {
        let filter: LayerFilter<'_> = &|id: &str, _: Option<&'static Dataset>| id == layer_id;
        Self::make_layers(client, base_url, Some(filter))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::LayerNotFound {
                layer_id: layer_id.to_string(),
            })
    }
}

fn sh_layer(
    version: ServiceVersion,
    instance_id: &str,
    entry: &CapabilitiesLayer,
) -> Option<(&'static Dataset, Arc<dyn Layer>)> {
    let evalsource = entry.dataset.as_deref()?;
    let mut options = LayerOptions::configured(instance_id, entry.id.as_str());
    options.title = entry.name.clone();
    options.description = entry.description.clone();

    // EOCloud advertises EW acquisitions as a dataset of their own
    if version == ServiceVersion::V1OrV2 && evalsource == "S1_EW" {
        let kind = Sentinel1GrdEoCloud::new().with_acquisition_mode(AcquisitionMode::Ew);
        return Some((&DATASET_EOCLOUD_S1GRD, Arc::new(ShLayer::new(options, kind))));
    }

    let dataset = dataset_by_evalsource(version, evalsource)?;
    let layer: Arc<dyn Layer> = match dataset.id {
        id if id == DATASET_AWSEU_S1GRD.id => Arc::new(ShLayer::new(options, Sentinel1Grd::new())),
        id if id == DATASET_EOCLOUD_S1GRD.id => {
            Arc::new(ShLayer::new(options, Sentinel1GrdEoCloud::new()))
        }
        id if id == DATASET_BYOC.id => Arc::new(ShLayer::new(options, Byoc::new())),
        _ => Arc::new(ShLayer::new(options, Optical::new(dataset))),
    };
    Some((dataset, layer))
}
