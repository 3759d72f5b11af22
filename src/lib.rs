#![doc = r#"
sentinelhub: a typed client for the Sentinel Hub satellite imagery service.

This crate builds and sends the requests the service understands (WMS GetMap URLs
and Processing API JSON payloads), and parses the responses into typed values:
image bytes, tiles with their metadata, and dates with available data. Datasets
are parameterized the way the service expects: Sentinel-1 acquisition mode,
polarization, resolution, orbit direction and backscatter coefficient, optical
cloud coverage, and BYOC collections. Several layers can be combined into one
Processing API "data fusion" request.

Stability
---------
The public library API is experimental in initial releases and may evolve.

Add dependency
--------------
```toml
[dependencies]
sentinelhub = "0.1"
```

Quick start: render a Sentinel-2 image through the Processing API
-----------------------------------------------------------------
```rust,no_run
use chrono::{TimeZone, Utc};
use sentinelhub::{
    ApiType, BBox, ClientConfig, GetMapParams, Layer, LayerOptions, MimeType, Optical,
    OpticalLayer, ShClient, CRS_EPSG4326,
};

#[tokio::main]
async fn main() -> sentinelhub::Result<()> {
    let mut client = ShClient::new(
        ClientConfig::new().with_client_credentials("my-client-id", "my-client-secret"),
    )?;
    client.authenticate().await?;

    let layer = OpticalLayer::new(
        LayerOptions::configured("my-instance-id", "TRUE-COLOR")
            .with_evalscript("//VERSION=3\nfunction setup() { return { input: ['B04','B03','B02'], output: { bands: 3 } }; }\nfunction evaluatePixel(s) { return [2.5*s.B04, 2.5*s.B03, 2.5*s.B02]; }"),
        Optical::s2l2a().with_max_cloud_cover_percent(20.0),
    );

    let params = GetMapParams::new(
        BBox::new(CRS_EPSG4326, 19.0, 20.0, 20.0, 21.0)?,
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2020, 1, 10, 23, 59, 59).unwrap(),
        512,
        512,
        MimeType::Png,
    );
    let png = layer.get_map(&client, &params, ApiType::Processing).await?;
    tokio::fs::write("/out/s2.png", png).await?;
    Ok(())
}
```

Sentinel-1 and data fusion
--------------------------
```rust,no_run
use std::sync::Arc;
use chrono::{TimeZone, Utc};
use sentinelhub::{
    AcquisitionMode, ApiType, BBox, DataFusionLayerInfo, GetMapParams, Layer, LayerOptions,
    MimeType, Optical, OpticalLayer, Polarization, ProcessingDataFusionLayer, Resolution,
    S1GrdAwsEuLayer, Sentinel1Grd, ShClient, CRS_EPSG4326,
};

async fn fused(client: &ShClient) -> sentinelhub::Result<Vec<u8>> {
    let s1 = S1GrdAwsEuLayer::new(
        LayerOptions::new(),
        Sentinel1Grd::new()
            .with_acquisition_mode(AcquisitionMode::Iw)
            .with_polarization(Polarization::Dv)
            .with_resolution(Resolution::High),
    );
    let s2 = OpticalLayer::new(LayerOptions::new(), Optical::s2l2a());

    let fusion = ProcessingDataFusionLayer::new(
        "//VERSION=3 ...",
        vec![
            DataFusionLayerInfo::new(Arc::new(s1)).with_id("s1"),
            DataFusionLayerInfo::new(Arc::new(s2)).with_id("l2a"),
        ],
    );
    let params = GetMapParams::new(
        BBox::new(CRS_EPSG4326, 19.0, 20.0, 20.0, 21.0)?,
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2020, 1, 10, 23, 59, 59).unwrap(),
        512,
        512,
        MimeType::Jpeg,
    );
    fusion.get_map(client, &params, ApiType::Processing).await
}
```

Searching
---------
`Layer::find_tiles`, `Layer::find_dates_utc` and `Layer::find_flyovers` query the
dataset's search index. Plain WMS layers only support `find_dates_utc`, read from the
server's GetCapabilities `time` dimension.

Error handling
--------------
All public functions return `sentinelhub::Result<T>`; match on `sentinelhub::Error`
to handle specific cases.

```rust,no_run
use sentinelhub::{ApiType, Error, GetMapParams, Layer, ShClient};

async fn render(layer: &dyn Layer, client: &ShClient, params: &GetMapParams) {
    match layer.get_map(client, params, ApiType::Processing).await {
        Ok(bytes) => println!("{} bytes", bytes.len()),
        Err(Error::UnsupportedApiType { api }) => eprintln!("layer cannot use {api}"),
        Err(Error::Status { status, message, .. }) => eprintln!("service said {status}: {message}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Configuration
-------------
`ClientConfig::from_env()` reads `SH_AUTH_TOKEN`, `SH_CLIENT_ID`, `SH_CLIENT_SECRET`,
`SH_AUTH_URL`, `SH_SERVICE_HOSTNAME` and `SH_REQUEST_TIMEOUT_MS`. A service hostname
routes every dataset request to one host (proxies, test servers).

Useful modules
--------------
- [`api`]: build layers from a flat description, save maps to disk.
- [`layer`]: the `Layer` trait and every layer type.
- [`core`]: bounding boxes, map parameters, the dataset catalog, payload and URL builders.
- [`io`]: `ShClient`, its configuration and the service's JSON records.
- [`types`]: wire enums (`ApiType`, `MimeType`, Sentinel-1 filters, ...).
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod layer;
pub mod types;

// Curated public API surface
// Types
pub use core::bbox::{BBox, CRS_EPSG3857, CRS_EPSG4326, Crs};
pub use core::dataset::{
    ALL_DATASETS, DATASET_AWS_L8L1C, DATASET_AWSEU_S1GRD, DATASET_BYOC, DATASET_EOCLOUD_S1GRD,
    DATASET_S2L1C, DATASET_S2L2A, Dataset, ServiceVersion,
};
pub use core::params::GetMapParams;
pub use core::processing::{ProcessingDatasource, ProcessingPayload, create_processing_payload};
pub use core::tiles::{Flyover, PaginatedTiles, Tile, TileMeta};
pub use error::{Error, Result};
pub use types::{
    AcquisitionMode, ApiType, BackscatterCoeff, Interpolator, MimeType, MosaickingOrder,
    OrbitDirection, Polarization, PreviewMode, Resolution,
};

// Transport
pub use io::{ClientConfig, ShClient};

// Layers
pub use layer::{
    Byoc, ByocLayer, DataFusionLayerInfo, DatasetKind, Layer, LayerOptions, LayersFactory,
    Optical, OpticalLayer, ProcessingDataFusionLayer, S1GrdAwsEuLayer, S1GrdEoCloudLayer,
    Sentinel1Grd, Sentinel1GrdEoCloud, ShLayer, WmsLayer,
};

// High-level API re-exports
pub use api::{DatasetChoice, LayerSpec, build_layer, save_map};
