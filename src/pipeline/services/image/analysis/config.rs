use serde::Deserialize;

use crate::error::ConfigError;

use super::core::Hsv;

/// Largest hue value on the 8-bit hue scale (degrees / 2).
pub const MAX_HUE: u8 = 180;

/// Tunable parameters for sky and vegetation detection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum growth in vegetation pixels before a new tree counts as detected.
    pub min_green_threshold: u64,
    /// Blobs whose border encloses this area or less are dropped.
    pub min_blob_area: f64,
    /// Laplacian magnitude a pixel must exceed to count as textured.
    pub texture_threshold: u8,
    pub sky_dilation_radius: u8,
    pub open_radius: u8,
    pub close_radius: u8,
    pub color_thresholds: ColorThresholds,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorThresholds {
    pub sky_blue: HsvRange,
    /// Gray intensity above which a pixel is treated as bright or overcast sky.
    pub bright_sky_threshold: u8,
    pub green_bands: Vec<HsvRange>,
}

/// Inclusive hue/saturation/value box, hue on the 0..=180 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        let channels = [hsv.hue, hsv.saturation, hsv.value];
        channels
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(c, (lo, hi))| c >= lo && c <= hi)
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_green_threshold: 1000,
            min_blob_area: 100.0,
            texture_threshold: 10,
            sky_dilation_radius: 2, // 5x5
            open_radius: 1,         // 3x3
            close_radius: 2,        // 5x5
            color_thresholds: ColorThresholds::default(),
        }
    }
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            sky_blue: HsvRange::new([100, 80, 80], [130, 255, 255]),
            bright_sky_threshold: 220,
            green_bands: vec![
                // standard green
                HsvRange::new([35, 40, 40], [85, 255, 255]),
                // yellow-green
                HsvRange::new([25, 30, 30], [45, 255, 255]),
                // dark green
                HsvRange::new([40, 40, 20], [80, 255, 200]),
            ],
        }
    }
}

impl DetectionConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_blob_area.is_finite() || self.min_blob_area < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_blob_area must be a non-negative number, got {}",
                self.min_blob_area
            )));
        }

        if self.color_thresholds.green_bands.is_empty() {
            return Err(ConfigError::Invalid(
                "At least one green band must be configured".to_string(),
            ));
        }

        let ranges = std::iter::once(("sky_blue", &self.color_thresholds.sky_blue)).chain(
            self.color_thresholds
                .green_bands
                .iter()
                .map(|band| ("green_bands", band)),
        );
        for (name, range) in ranges {
            if range.upper[0] > MAX_HUE {
                return Err(ConfigError::Invalid(format!(
                    "{name}: hue bound {} exceeds {MAX_HUE}",
                    range.upper[0]
                )));
            }
            if range.lower.iter().zip(range.upper.iter()).any(|(lo, hi)| lo > hi) {
                return Err(ConfigError::Invalid(format!(
                    "{name}: lower bound {:?} exceeds upper bound {:?}",
                    range.lower, range.upper
                )));
            }
        }

        Ok(())
    }

    pub fn with_min_green_threshold(mut self, threshold: u64) -> Self {
        self.min_green_threshold = threshold;
        self
    }

    pub fn with_min_blob_area(mut self, area: f64) -> Self {
        self.min_blob_area = area;
        self
    }
}
