//! Shared wire enums used across the crate.
//! Includes `ApiType`, `MimeType`, `PreviewMode`, `Interpolator`, `MosaickingOrder`
//! and the Sentinel-1 filters (`AcquisitionMode`, `Polarization`, `Resolution`,
//! `OrbitDirection`, `BackscatterCoeff`). Every enum renders to the exact string the
//! service expects, both through `as_str()`/`Display` and through serde.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which service API a request goes through.
#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum ApiType {
    #[serde(rename = "WMS")]
    Wms,
    #[serde(rename = "PROCESSING")]
    Processing,
}

impl ApiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiType::Wms => "WMS",
            ApiType::Processing => "PROCESSING",
        }
    }
}

impl std::fmt::Display for ApiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/tiff")]
    Tiff,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Jpeg => "image/jpeg",
            MimeType::Png => "image/png",
            MimeType::Tiff => "image/tiff",
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade-off between detail and speed for large areas.
///
/// WMS takes the numeric code, the Processing API takes the name.
#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreviewMode {
    Detail,
    Preview,
    ExtendedPreview,
}

impl PreviewMode {
    pub fn wms_code(&self) -> u8 {
        match self {
            PreviewMode::Detail => 0,
            PreviewMode::Preview => 1,
            PreviewMode::ExtendedPreview => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewMode::Detail => "DETAIL",
            PreviewMode::Preview => "PREVIEW",
            PreviewMode::ExtendedPreview => "EXTENDED_PREVIEW",
        }
    }
}

impl std::fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolator {
    Bilinear,
    Bicubic,
    Lanczos,
    Box,
    Nearest,
}

impl Interpolator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolator::Bilinear => "BILINEAR",
            Interpolator::Bicubic => "BICUBIC",
            Interpolator::Lanczos => "LANCZOS",
            Interpolator::Box => "BOX",
            Interpolator::Nearest => "NEAREST",
        }
    }
}

impl std::fmt::Display for Interpolator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum MosaickingOrder {
    #[serde(rename = "mostRecent")]
    MostRecent,
    #[serde(rename = "leastRecent")]
    LeastRecent,
    #[serde(rename = "leastCC")]
    LeastCc,
}

impl MosaickingOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            MosaickingOrder::MostRecent => "mostRecent",
            MosaickingOrder::LeastRecent => "leastRecent",
            MosaickingOrder::LeastCc => "leastCC",
        }
    }
}

impl std::fmt::Display for MosaickingOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrbitDirection {
    Ascending,
    Descending,
}

impl OrbitDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitDirection::Ascending => "ASCENDING",
            OrbitDirection::Descending => "DESCENDING",
        }
    }
}

impl std::fmt::Display for OrbitDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radiometric normalization applied to Sentinel-1 backscatter.
#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum BackscatterCoeff {
    #[serde(rename = "BETA0")]
    Beta0,
    #[serde(rename = "SIGMA0_ELLIPSOID")]
    Sigma0Ellipsoid,
    #[serde(rename = "GAMMA0_ELLIPSOID")]
    Gamma0Ellipsoid,
}

impl BackscatterCoeff {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackscatterCoeff::Beta0 => "BETA0",
            BackscatterCoeff::Sigma0Ellipsoid => "SIGMA0_ELLIPSOID",
            BackscatterCoeff::Gamma0Ellipsoid => "GAMMA0_ELLIPSOID",
        }
    }
}

impl std::fmt::Display for BackscatterCoeff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Usual combinations are IW + DV/SV + HIGH and EW + DH/SH + MEDIUM.

#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcquisitionMode {
    Iw,
    Ew,
}

impl AcquisitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionMode::Iw => "IW",
            AcquisitionMode::Ew => "EW",
        }
    }
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentinel-1 polarization product: dual (DV/DH) or single (SV/SH).
#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Polarization {
    Dv,
    Sh,
    Dh,
    Sv,
}

impl Polarization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarization::Dv => "DV",
            Polarization::Sh => "SH",
            Polarization::Dh => "DH",
            Polarization::Sv => "SV",
        }
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    High,
    Medium,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::High => "HIGH",
            Resolution::Medium => "MEDIUM",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_display() {
        assert_eq!(
            serde_json::to_value(BackscatterCoeff::Gamma0Ellipsoid).unwrap(),
            serde_json::json!(BackscatterCoeff::Gamma0Ellipsoid.to_string())
        );
        assert_eq!(
            serde_json::to_value(PreviewMode::ExtendedPreview).unwrap(),
            serde_json::json!("EXTENDED_PREVIEW")
        );
        assert_eq!(
            serde_json::to_value(MosaickingOrder::LeastCc).unwrap(),
            serde_json::json!("leastCC")
        );
        assert_eq!(
            serde_json::to_value(MimeType::Jpeg).unwrap(),
            serde_json::json!("image/jpeg")
        );
    }

    #[test]
    fn sentinel1_filters_parse_from_service_strings() {
        let mode: AcquisitionMode = serde_json::from_str("\"EW\"").unwrap();
        let pol: Polarization = serde_json::from_str("\"DH\"").unwrap();
        let res: Resolution = serde_json::from_str("\"MEDIUM\"").unwrap();
        let dir: OrbitDirection = serde_json::from_str("\"DESCENDING\"").unwrap();
        assert_eq!(mode, AcquisitionMode::Ew);
        assert_eq!(pol, Polarization::Dh);
        assert_eq!(res, Resolution::Medium);
        assert_eq!(dir, OrbitDirection::Descending);
    }

    #[test]
    fn preview_codes() {
        assert_eq!(PreviewMode::Detail.wms_code(), 0);
        assert_eq!(PreviewMode::Preview.wms_code(), 1);
        assert_eq!(PreviewMode::ExtendedPreview.wms_code(), 2);
    }
}
