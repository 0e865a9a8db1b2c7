use std::io::Cursor;

use image::{imageops, ImageFormat, RgbaImage};
use snapsig_models::{CaptureConfig, CaptureRegion};
use tracing::debug;
use xcap::Monitor;

use crate::error::CaptureError;

/// Produces an in-memory image of the screen. Mockable for testing.
pub trait ScreenCapture: Send + Sync {
    fn capture(&self) -> Result<RgbaImage, CaptureError>;
}

/// Captures a monitor through the platform screenshot API.
pub struct XcapCapture {
    config: CaptureConfig,
}

impl XcapCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

impl ScreenCapture for XcapCapture {
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        let monitor = match self.config.monitor {
            Some(index) => monitors
                .into_iter()
                .nth(index)
                .ok_or(CaptureError::NoMonitorAt(index))?,
            None => monitors
                .into_iter()
                .find(|m| m.is_primary())
                .ok_or(CaptureError::NoPrimaryMonitor)?,
        };

        let image = monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        debug!(width = image.width(), height = image.height(), "Screen captured");

        match self.config.region {
            Some(region) => crop_region(&image, region),
            None => Ok(image),
        }
    }
}

/// Crop to `region`, clamping its far edges to the image bounds.
pub fn crop_region(image: &RgbaImage, region: CaptureRegion) -> Result<RgbaImage, CaptureError> {
    let (w, h) = image.dimensions();
    if region.x >= w || region.y >= h || region.width == 0 || region.height == 0 {
        return Err(CaptureError::EmptyRegion(region, w, h));
    }
    let width = region.width.min(w - region.x);
    let height = region.height.min(h - region.y);
    Ok(imageops::crop_imm(image, region.x, region.y, width, height).to_image())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
