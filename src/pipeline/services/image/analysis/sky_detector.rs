//! Detector for sky regions, which are excluded from vegetation candidates.
use tracing::debug;

use crate::pipeline::types::Mask;

use super::config::{DetectionConfig, HsvRange};
use super::core::{DetectionContext, MaskDetector};

/// Marks blue sky and bright, overcast sky.
#[derive(Debug, Clone)]
pub struct SkyDetector {
    /// Hue/saturation/value box for clear blue sky.
    pub blue_range: HsvRange,
    /// Gray level a pixel must exceed to count as bright sky.
    pub bright_threshold: u8,
    /// Radius of the square used to grow the mask over sky edges.
    pub dilation_radius: u8,
}

impl SkyDetector {
    pub fn new() -> Self {
        Self::from_config(&DetectionConfig::default())
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            blue_range: config.color_thresholds.sky_blue,
            bright_threshold: config.color_thresholds.bright_sky_threshold,
            dilation_radius: config.sky_dilation_radius,
        }
    }

    fn bright_mask(&self, context: &DetectionContext) -> Mask {
        let (width, height) = context.dimensions;
        Mask::from_fn(width, height, |x, y| {
            context.gray.get_pixel(x, y)[0] > self.bright_threshold
        })
    }
}

impl Default for SkyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskDetector for SkyDetector {
    fn detect_mask(&self, context: &DetectionContext) -> Mask {
        let blue = context.in_range(&self.blue_range);
        let bright = self.bright_mask(context);
        let sky = blue.union(&bright).dilate(self.dilation_radius);

        debug!(
            "Sky mask: {} blue, {} bright, {} after dilation",
            blue.count(),
            bright.count(),
            sky.count()
        );
        sky
    }

    fn name(&self) -> &'static str {
        "SkyDetector"
    }
}
