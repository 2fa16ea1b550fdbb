use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::pipeline::types::Mask;

use super::config::{HsvRange, MAX_HUE};

/// 8-bit hue/saturation/value triple. Hue is degrees / 2, so it spans `0..180`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    pub const fn new(hue: u8, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    pub fn from_rgb(pixel: &Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = (max - min) as f32;

        let saturation = if max == 0 {
            0.0
        } else {
            255.0 * delta / max as f32
        };

        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let mut degrees = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (gf - bf) / delta
        } else if max == g {
            120.0 + 60.0 * (bf - rf) / delta
        } else {
            240.0 + 60.0 * (rf - gf) / delta
        };
        if degrees < 0.0 {
            degrees += 360.0;
        }

        let hue = (degrees / 2.0).round() as u16 % MAX_HUE as u16;

        Self {
            hue: hue as u8,
            saturation: saturation.round() as u8,
            value: max,
        }
    }
}

/// Rec. 601 luma, the weighting photographic grayscale conversions use.
pub fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().min(255.0) as u8
}

pub fn grayscale(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| Luma([luma(image.get_pixel(x, y))]))
}

/// Per-raster data shared by every detector, computed once.
pub struct DetectionContext {
    pub dimensions: (u32, u32),
    pub gray: GrayImage,
    hsv: Vec<Hsv>,
}

impl DetectionContext {
    pub fn new(rgb: &RgbImage) -> Self {
        let dimensions = rgb.dimensions();
        let hsv = rgb.pixels().map(Hsv::from_rgb).collect();

        Self {
            dimensions,
            gray: grayscale(rgb),
            hsv,
        }
    }

    #[inline]
    pub fn hsv_at(&self, x: u32, y: u32) -> Hsv {
        self.hsv[(y * self.dimensions.0 + x) as usize]
    }

    /// Cells whose HSV value falls inside `range`.
    pub fn in_range(&self, range: &HsvRange) -> Mask {
        let (width, height) = self.dimensions;
        Mask::from_fn(width, height, |x, y| range.contains(self.hsv_at(x, y)))
    }

    /// Cells whose HSV value falls inside any of `ranges`.
    pub fn in_any_range(&self, ranges: &[HsvRange]) -> Mask {
        let (width, height) = self.dimensions;
        Mask::from_fn(width, height, |x, y| {
            let hsv = self.hsv_at(x, y);
            ranges.iter().any(|range| range.contains(hsv))
        })
    }
}

/// A detector that marks the pixels of one class in a raster.
pub trait MaskDetector: Send + Sync {
    fn detect_mask(&self, context: &DetectionContext) -> Mask;
    fn name(&self) -> &'static str;
}
