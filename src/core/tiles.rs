//! Tile search results and their grouping into satellite flyovers.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AcquisitionMode, OrbitDirection, Polarization, Resolution};

/// Dataset-specific metadata of a tile; only the fields a dataset reports are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbit_direction: Option<OrbitDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarization: Option<Polarization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_mode: Option<AcquisitionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// GeoJSON geometry of the tile's data footprint
    pub geometry: Value,
    pub sensing_time: DateTime<Utc>,
    pub meta: TileMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedTiles {
    pub tiles: Vec<Tile>,
    pub has_more: bool,
}

/// Consecutive tiles acquired during one pass of a satellite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flyover {
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    pub tile_count: usize,
    pub meta: TileMeta,
}

/// Group tiles into flyovers.
///
/// Tiles are ordered by sensing time; a new flyover starts when the gap to the previous
/// tile exceeds `orbit_time_minutes` or the orbit direction changes.
pub fn group_tiles_into_flyovers(mut tiles: Vec<Tile>, orbit_time_minutes: f64) -> Vec<Flyover> {
    tiles.sort_by_key(|t| t.sensing_time);
    let max_gap = Duration::milliseconds((orbit_time_minutes * 60_000.0).round() as i64);

    let mut flyovers: Vec<Flyover> = Vec::new();
    for tile in tiles {
        if let Some(current) = flyovers.last_mut() {
            let same_pass = tile.sensing_time - current.to_time <= max_gap
                && tile.meta.orbit_direction == current.meta.orbit_direction;
            if same_pass {
                current.to_time = tile.sensing_time;
                current.tile_count += 1;
                continue;
            }
        }
        flyovers.push(Flyover {
            from_time: tile.sensing_time,
            to_time: tile.sensing_time,
            tile_count: 1,
            meta: tile.meta,
        });
    }
    flyovers
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn tile(h: u32, m: u32, dir: Option<OrbitDirection>) -> Tile {
        Tile {
            geometry: json!({"type": "Polygon", "coordinates": []}),
            sensing_time: Utc.with_ymd_and_hms(2020, 1, 1, h, m, 0).unwrap(),
            meta: TileMeta {
                orbit_direction: dir,
                ..Default::default()
            },
        }
    }

    #[test]
    fn close_tiles_share_a_flyover() {
        let tiles = vec![
            tile(10, 2, None),
            tile(10, 0, None),
            tile(10, 1, None),
            tile(14, 0, None),
        ];
        let flyovers = group_tiles_into_flyovers(tiles, 50.0);
        assert_eq!(flyovers.len(), 2);
        assert_eq!(flyovers[0].tile_count, 3);
        assert_eq!(
            flyovers[0].from_time,
            Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(
            flyovers[0].to_time,
            Utc.with_ymd_and_hms(2020, 1, 1, 10, 2, 0).unwrap()
        );
        assert_eq!(flyovers[1].tile_count, 1);
    }

    #[test]
    fn orbit_direction_change_splits_flyovers() {
        let tiles = vec![
            tile(5, 0, Some(OrbitDirection::Ascending)),
            tile(5, 1, Some(OrbitDirection::Descending)),
        ];
        let flyovers = group_tiles_into_flyovers(tiles, 98.6);
        assert_eq!(flyovers.len(), 2);
        assert_eq!(flyovers[1].meta.orbit_direction, Some(OrbitDirection::Descending));
    }

    #[test]
    fn no_tiles_no_flyovers() {
        assert!(group_tiles_into_flyovers(Vec::new(), 50.0).is_empty());
    }
}
