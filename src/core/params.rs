use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::bbox::BBox;
use crate::types::{Interpolator, MimeType, PreviewMode};

/// Parameters of a single map request, shared by WMS and the Processing API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetMapParams {
    pub bbox: BBox,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub format: MimeType,
    pub preview: Option<PreviewMode>,
    pub upsampling: Option<Interpolator>,
    pub downsampling: Option<Interpolator>,
    /// WMS only; omitted from the request when None
    pub show_logo: Option<bool>,
    /// WMS only; omitted from the request when None
    pub transparent: Option<bool>,
    pub gain: Option<f64>,
    pub gamma: Option<f64>,
}

impl GetMapParams {
    pub fn new(
        bbox: BBox,
        from_time: DateTime<Utc>,
        to_time: DateTime<Utc>,
        width: u32,
        height: u32,
        format: MimeType,
    ) -> Self {
        Self {
            bbox,
            from_time,
            to_time,
            width,
            height,
            format,
            preview: None,
            upsampling: None,
            downsampling: None,
            show_logo: None,
            transparent: None,
            gain: None,
            gamma: None,
        }
    }

    pub fn with_preview(mut self, preview: PreviewMode) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_upsampling(mut self, upsampling: Interpolator) -> Self {
        self.upsampling = Some(upsampling);
        self
    }

    pub fn with_downsampling(mut self, downsampling: Interpolator) -> Self {
        self.downsampling = Some(downsampling);
        self
    }

    pub fn with_show_logo(mut self, show_logo: bool) -> Self {
        self.show_logo = Some(show_logo);
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = Some(transparent);
        self
    }
}
