//! Detector for tree-like vegetation: green, textured, not sky, and big enough.
use image::RgbImage;
use tracing::debug;

use crate::pipeline::types::Mask;

use super::blob_filter::BlobFilter;
use super::config::{DetectionConfig, HsvRange};
use super::core::{DetectionContext, MaskDetector};
use super::sky_detector::SkyDetector;
use super::texture_detector::TextureDetector;

/// Final vegetation mask of one raster and its pixel count.
#[derive(Debug, Clone, PartialEq)]
pub struct VegetationDetection {
    pub count: u64,
    pub mask: Mask,
}

#[derive(Debug, Clone)]
pub struct VegetationDetector {
    green_bands: Vec<HsvRange>,
    sky_detector: SkyDetector,
    texture_detector: TextureDetector,
    open_radius: u8,
    close_radius: u8,
    blob_filter: BlobFilter,
}

impl VegetationDetector {
    pub fn new() -> Self {
        Self::from_config(&DetectionConfig::default())
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            green_bands: config.color_thresholds.green_bands.clone(),
            sky_detector: SkyDetector::from_config(config),
            texture_detector: TextureDetector::new(config.texture_threshold),
            open_radius: config.open_radius,
            close_radius: config.close_radius,
            blob_filter: BlobFilter::new(config.min_blob_area),
        }
    }

    pub fn detect(&self, image: &RgbImage) -> VegetationDetection {
        let context = DetectionContext::new(image);
        let mask = self.detect_mask(&context);

        VegetationDetection {
            count: mask.count(),
            mask,
        }
    }

    /// Same as [`detect`](Self::detect), but a missing raster yields `(0, None)`.
    pub fn detect_optional(&self, image: Option<&RgbImage>) -> (u64, Option<Mask>) {
        match image {
            Some(image) => {
                let detection = self.detect(image);
                (detection.count, Some(detection.mask))
            }
            None => (0, None),
        }
    }
}

impl Default for VegetationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskDetector for VegetationDetector {
    fn detect_mask(&self, context: &DetectionContext) -> Mask {
        let green = context.in_any_range(&self.green_bands);
        let sky = self.sky_detector.detect_mask(context);
        let green = green.subtract(&sky);

        let texture = self.texture_detector.detect_mask(context);
        let candidates = green
            .intersect(&texture)
            .open(self.open_radius)
            .close(self.close_radius);

        let vegetation = self.blob_filter.filter(&candidates);

        debug!(
            "{}: {} green, {} candidates, {} kept",
            self.name(),
            green.count(),
            candidates.count(),
            vegetation.count()
        );
        vegetation
    }

    fn name(&self) -> &'static str {
        "VegetationDetector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    const SKY: Rgb<u8> = Rgb([70, 130, 230]);
    const LEAF_DARK: Rgb<u8> = Rgb([40, 160, 40]);
    const LEAF_LIGHT: Rgb<u8> = Rgb([60, 200, 60]);
    const GROUND: Rgb<u8> = Rgb([110, 90, 70]);

    /// Textured green square on a uniform background.
    fn foliage_patch(size: u32, x0: u32, y0: u32, side: u32, background: Rgb<u8>) -> RgbImage {
        ImageBuffer::from_fn(size, size, |x, y| {
            let inside = x >= x0 && x < x0 + side && y >= y0 && y < y0 + side;
            match (inside, (x + y) % 2 == 0) {
                (true, true) => LEAF_DARK,
                (true, false) => LEAF_LIGHT,
                (false, _) => background,
            }
        })
    }

    #[test]
    fn test_black_and_white_images_have_no_vegetation() {
        let detector = VegetationDetector::new();
        let black = ImageBuffer::from_pixel(50, 50, Rgb([0, 0, 0]));
        let white = ImageBuffer::from_pixel(50, 50, Rgb([255, 255, 255]));

        assert_eq!(detector.detect(&black).count, 0);
        assert_eq!(detector.detect(&white).count, 0);
    }

    #[test]
    fn test_flat_green_is_rejected() {
        let image = ImageBuffer::from_pixel(60, 60, LEAF_DARK);
        assert_eq!(VegetationDetector::new().detect(&image).count, 0);
    }

    #[test]
    fn test_textured_green_on_ground_is_kept() {
        let image = foliage_patch(80, 20, 20, 30, GROUND);
        let detection = VegetationDetector::new().detect(&image);

        assert_eq!(detection.count, 900);
        assert_eq!(detection.count, detection.mask.count());
        assert!(detection.mask.get(35, 35));
        assert!(!detection.mask.get(5, 5));
    }

    #[test]
    fn test_foliage_at_image_border_is_kept() {
        let detector = VegetationDetector::new();

        let left = foliage_patch(80, 0, 20, 30, GROUND);
        assert_eq!(detector.detect(&left).count, 900);

        let corner = foliage_patch(80, 0, 0, 30, GROUND);
        let detection = detector.detect(&corner);
        assert_eq!(detection.count, 900);
        assert!(detection.mask.get(0, 0));
    }

    #[test]
    fn test_full_frame_foliage() {
        let image = foliage_patch(60, 0, 0, 60, GROUND);
        assert_eq!(VegetationDetector::new().detect(&image).count, 3600);
    }

    #[test]
    fn test_sky_margin_is_removed() {
        // the dilated sky eats two pixels from every side of the patch
        let image = foliage_patch(100, 25, 25, 50, SKY);
        let detection = VegetationDetector::new().detect(&image);

        assert_eq!(detection.count, 46 * 46);
        assert!(!detection.mask.get(26, 50));
        assert!(detection.mask.get(27, 50));
    }

    #[test]
    fn test_small_patch_is_dropped() {
        let image = foliage_patch(60, 20, 20, 9, GROUND);
        assert_eq!(VegetationDetector::new().detect(&image).count, 0);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let image = foliage_patch(80, 10, 30, 40, GROUND);
        let detector = VegetationDetector::new();
        assert_eq!(detector.detect(&image), detector.detect(&image));
    }

    #[test]
    fn test_missing_raster() {
        let (count, mask) = VegetationDetector::new().detect_optional(None);
        assert_eq!(count, 0);
        assert!(mask.is_none());

        let image = foliage_patch(80, 20, 20, 30, GROUND);
        let (count, mask) = VegetationDetector::new().detect_optional(Some(&image));
        assert_eq!(count, 900);
        assert!(mask.is_some());
    }
}
