//! Bounding boxes and the coordinate reference systems the service accepts.
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Error, Result};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Crs {
    /// WGS 84, longitude/latitude in degrees.
    Epsg4326,
    /// Web Mercator, meters.
    Epsg3857,
}

pub const CRS_EPSG4326: Crs = Crs::Epsg4326;
pub const CRS_EPSG3857: Crs = Crs::Epsg3857;

impl Crs {
    pub fn srid(&self) -> u32 {
        match self {
            Crs::Epsg4326 => 4326,
            Crs::Epsg3857 => 3857,
        }
    }

    /// `EPSG:<srid>`, as used by WMS `srs`.
    pub fn auth_id(&self) -> String {
        format!("EPSG:{}", self.srid())
    }

    /// OGC URN, as used in GeoJSON named CRS members.
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.srid())
    }

    /// OpenGIS URL, as used by the Processing API.
    pub fn opengis_url(&self) -> String {
        format!("http://www.opengis.net/def/crs/EPSG/0/{}", self.srid())
    }

    pub fn from_auth_id(auth_id: &str) -> Option<Crs> {
        match auth_id.trim().to_ascii_uppercase().as_str() {
            "EPSG:4326" | "4326" => Some(Crs::Epsg4326),
            "EPSG:3857" | "3857" => Some(Crs::Epsg3857),
            _ => None,
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.auth_id())
    }
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BBox {
    pub crs: Crs,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn new(crs: Crs, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if min_x > max_x {
            return Err(Error::InvalidArgument {
                arg: "min_x",
                value: format!("{min_x} > max_x {max_x}"),
            });
        }
        if min_y > max_y {
            return Err(Error::InvalidArgument {
                arg: "min_y",
                value: format!("{min_y} > max_y {max_y}"),
            });
        }
        Ok(Self {
            crs,
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Parse `minX,minY,maxX,maxY`.
    pub fn parse(crs: Crs, s: &str) -> Result<Self> {
        let coords = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidArgument {
                arg: "bbox",
                value: s.to_string(),
            })?;
        match coords.as_slice() {
            [min_x, min_y, max_x, max_y] => Self::new(crs, *min_x, *min_y, *max_x, *max_y),
            _ => Err(Error::InvalidArgument {
                arg: "bbox",
                value: s.to_string(),
            }),
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Comma-joined coordinates for the WMS `bbox` parameter.
    pub fn to_wms_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Closed GeoJSON polygon ring with a named CRS member.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Polygon",
            "crs": {
                "type": "name",
                "properties": { "name": self.crs.urn() },
            },
            "coordinates": [[
                [self.min_x, self.min_y],
                [self.max_x, self.min_y],
                [self.max_x, self.max_y],
                [self.min_x, self.max_y],
                [self.min_x, self.min_y],
            ]],
        })
    }
}
