use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use sentinelhub::types::{
    AcquisitionMode, ApiType, BackscatterCoeff, Interpolator, MimeType, OrbitDirection,
    Polarization, PreviewMode, Resolution,
};
use sentinelhub::{Crs, DatasetChoice};

#[derive(Parser)]
#[command(name = "sentinelhub", version, about = "Sentinel Hub imagery client")]
pub struct CliArgs {
    /// Enable logging (filter with RUST_LOG, default: debug)
    #[arg(long, default_value_t = false, global = true)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the WMS GetMap URL of a layer
    MapUrl {
        #[command(flatten)]
        layer: LayerArgs,
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        image: ImageArgs,
    },

    /// Render a map and write it to a file
    GetMap {
        #[command(flatten)]
        layer: LayerArgs,
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        image: ImageArgs,
        /// API the map is rendered through
        #[arg(long, value_enum, default_value_t = ApiType::Wms)]
        api: ApiType,
        /// Output filename
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List tiles intersecting the area
    FindTiles {
        #[command(flatten)]
        layer: LayerArgs,
        #[command(flatten)]
        area: AreaArgs,
        /// Page size
        #[arg(long)]
        max_count: Option<u32>,
        /// Number of tiles to skip
        #[arg(long)]
        offset: Option<u32>,
    },

    /// List dates with available data
    FindDates {
        #[command(flatten)]
        layer: LayerArgs,
        #[command(flatten)]
        area: AreaArgs,
    },

    /// Group tiles into satellite passes
    FindFlyovers {
        #[command(flatten)]
        layer: LayerArgs,
        #[command(flatten)]
        area: AreaArgs,
        /// Maximum number of search requests
        #[arg(long, default_value_t = 20)]
        max_requests: u32,
        /// Tiles fetched per search request
        #[arg(long, default_value_t = 50)]
        tiles_per_request: u32,
    },

    /// List the layers advertised by a WMS endpoint
    ListLayers {
        /// WMS endpoint, e.g. https://services.sentinel-hub.com/ogc/wms/<instance-id>
        #[arg(long)]
        base_url: String,
    },
}

/// Which layer to use and its dataset filters
#[derive(Args, Debug, Clone)]
pub struct LayerArgs {
    /// Dataset of the layer
    #[arg(long, value_enum)]
    pub dataset: DatasetChoice,

    /// Configuration instance id (Sentinel Hub datasets)
    #[arg(long)]
    pub instance_id: Option<String>,

    /// Layer id
    #[arg(long)]
    pub layer_id: Option<String>,

    /// WMS server URL (wms dataset only)
    #[arg(long)]
    pub base_url: Option<String>,

    /// File containing the evalscript
    #[arg(long)]
    pub evalscript: Option<PathBuf>,

    /// URL of the evalscript
    #[arg(long)]
    pub evalscript_url: Option<String>,

    /// Data product id
    #[arg(long)]
    pub data_product: Option<String>,

    /// Maximum cloud coverage in percent (optical datasets)
    #[arg(long)]
    pub max_cloud_cover: Option<f64>,

    /// Acquisition mode (Sentinel-1)
    #[arg(long, value_enum)]
    pub acquisition_mode: Option<AcquisitionMode>,

    /// Polarization (Sentinel-1)
    #[arg(long, value_enum)]
    pub polarization: Option<Polarization>,

    /// Resolution (Sentinel-1 AWS EU)
    #[arg(long, value_enum)]
    pub resolution: Option<Resolution>,

    /// Orbit direction (Sentinel-1)
    #[arg(long, value_enum)]
    pub orbit_direction: Option<OrbitDirection>,

    /// Orthorectify (Sentinel-1 AWS EU)
    #[arg(long, default_value_t = false)]
    pub orthorectify: bool,

    /// Backscatter coefficient (Sentinel-1 AWS EU)
    #[arg(long, value_enum)]
    pub backscatter_coeff: Option<BackscatterCoeff>,

    /// BYOC collection id
    #[arg(long)]
    pub collection_id: Option<String>,
}

/// Area and time range of the query
#[derive(Args, Debug, Clone)]
pub struct AreaArgs {
    /// Bounding box as minX,minY,maxX,maxY
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: String,

    /// CRS of the bounding box
    #[arg(long, default_value = "EPSG:4326")]
    pub crs: String,

    /// Start of the time range (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub from: String,

    /// End of the time range (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub to: String,
}

impl AreaArgs {
    pub fn crs(&self) -> Option<Crs> {
        Crs::from_auth_id(&self.crs)
    }
}

/// Output image options
#[derive(Args, Debug, Clone)]
pub struct ImageArgs {
    #[arg(long, default_value_t = 512)]
    pub width: u32,

    #[arg(long, default_value_t = 512)]
    pub height: u32,

    /// Image format
    #[arg(short = 'f', long, value_enum, default_value_t = MimeType::Jpeg)]
    pub format: MimeType,

    #[arg(long, value_enum)]
    pub preview: Option<PreviewMode>,

    #[arg(long, value_enum)]
    pub upsampling: Option<Interpolator>,

    #[arg(long, value_enum)]
    pub downsampling: Option<Interpolator>,

    /// Show the service logo (WMS only)
    #[arg(long)]
    pub show_logo: Option<bool>,

    /// Transparent background (WMS only)
    #[arg(long)]
    pub transparent: Option<bool>,
}
