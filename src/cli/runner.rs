use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sentinelhub::core::time::parse_utc;
use sentinelhub::{
    BBox, GetMapParams, Layer, LayerOptions, LayerSpec, LayersFactory, ShClient, build_layer,
    save_map,
};

use super::args::{AreaArgs, CliArgs, Command, ImageArgs, LayerArgs};
use super::errors::AppError;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_time(arg: &'static str, value: &str) -> Result<DateTime<Utc>, AppError> {
    parse_utc(value).map_err(|source| AppError::InvalidTime {
        arg,
        value: value.to_string(),
        source,
    })
}

struct Area {
    bbox: BBox,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

fn area(args: &AreaArgs) -> Result<Area, AppError> {
    let crs = args.crs().ok_or_else(|| AppError::UnsupportedCrs {
        crs: args.crs.clone(),
    })?;
    let bbox = BBox::parse(crs, &args.bbox)?;
    let from = parse_time("--from", &args.from)?;
    let to = parse_time("--to", &args.to)?;
    if from > to {
        return Err(AppError::EmptyTimeRange {
            from: args.from.clone(),
            to: args.to.clone(),
        });
    }
    Ok(Area { bbox, from, to })
}

fn map_params(area: &Area, image: &ImageArgs) -> GetMapParams {
    let mut params = GetMapParams::new(
        area.bbox,
        area.from,
        area.to,
        image.width,
        image.height,
        image.format,
    );
    params.preview = image.preview;
    params.upsampling = image.upsampling;
    params.downsampling = image.downsampling;
    params.show_logo = image.show_logo;
    params.transparent = image.transparent;
    params
}

fn layer(args: &LayerArgs) -> Result<Arc<dyn Layer>, AppError> {
    let evalscript = match &args.evalscript {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };
    let options = LayerOptions {
        instance_id: args.instance_id.clone(),
        layer_id: args.layer_id.clone(),
        evalscript,
        evalscript_url: args.evalscript_url.clone(),
        data_product: args.data_product.clone(),
        title: None,
        description: None,
    };
    let mut spec = LayerSpec::new(args.dataset, options);
    spec.base_url = args.base_url.clone();
    spec.max_cloud_cover_percent = args.max_cloud_cover;
    spec.acquisition_mode = args.acquisition_mode;
    spec.polarization = args.polarization;
    spec.resolution = args.resolution;
    spec.orbit_direction = args.orbit_direction;
    spec.orthorectify = args.orthorectify;
    spec.backscatter_coeff = args.backscatter_coeff;
    spec.collection_id = args.collection_id.clone();
    Ok(build_layer(&spec)?)
}

#[derive(Serialize)]
struct LayerSummary<'a> {
    id: Option<&'a str>,
    title: Option<&'a str>,
    description: Option<&'a str>,
    dataset: Option<&'static str>,
}

pub async fn run(args: CliArgs) -> Result<(), AppError> {
    if args.log {
        init_logging();
    }

    let mut client = ShClient::from_env()?;
    if client.auth_token().is_none()
        && client.config().client_id.is_some()
        && client.config().client_secret.is_some()
    {
        client.authenticate().await?;
    }

    match args.command {
        Command::MapUrl { layer: l, area: a, image } => {
            let layer = layer(&l)?;
            let area = area(&a)?;
            let url = layer.get_map_url(&map_params(&area, &image), sentinelhub::ApiType::Wms)?;
            println!("{url}");
        }
        Command::GetMap {
            layer: l,
            area: a,
            image,
            api,
            output,
        } => {
            let layer = layer(&l)?;
            let area = area(&a)?;
            let written = save_map(
                layer.as_ref(),
                &client,
                &map_params(&area, &image),
                api,
                &output,
            )
            .await?;
            info!("Successfully rendered {} bytes -> {:?}", written, output);
        }
        Command::FindTiles {
            layer: l,
            area: a,
            max_count,
            offset,
        } => {
            let layer = layer(&l)?;
            let area = area(&a)?;
            let tiles = layer
                .find_tiles(&client, &area.bbox, area.from, area.to, max_count, offset)
                .await?;
            print_json(&tiles)?;
        }
        Command::FindDates { layer: l, area: a } => {
            let layer = layer(&l)?;
            let area = area(&a)?;
            let dates = layer
                .find_dates_utc(&client, &area.bbox, area.from, area.to)
                .await?;
            print_json(&dates)?;
        }
        Command::FindFlyovers {
            layer: l,
            area: a,
            max_requests,
            tiles_per_request,
        } => {
            let layer = layer(&l)?;
            let area = area(&a)?;
            let flyovers = layer
                .find_flyovers(
                    &client,
                    &area.bbox,
                    area.from,
                    area.to,
                    max_requests,
                    tiles_per_request,
                )
                .await?;
            print_json(&flyovers)?;
        }
        Command::ListLayers { base_url } => {
            let layers = LayersFactory::make_layers(&client, &base_url, None).await?;
            let summaries: Vec<LayerSummary<'_>> = layers
                .iter()
                .map(|l| LayerSummary {
                    id: l.layer_id(),
                    title: l.title(),
                    description: l.description(),
                    dataset: l.dataset().map(|d| d.id),
                })
                .collect();
            print_json(&summaries)?;
        }
    }

    Ok(())
}
