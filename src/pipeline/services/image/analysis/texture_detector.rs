//! Detector for textured (high second-derivative) pixels.
use image::GrayImage;
use imageproc::filter::laplacian_filter;

use crate::pipeline::types::Mask;

use super::core::{DetectionContext, MaskDetector};

/// Marks pixels where the 4-neighbour Laplacian of the gray image is strong.
///
/// Foliage is busy at pixel scale, while painted walls, signs and lawns seen
/// from afar are flat, so this separates leaves from other green surfaces.
#[derive(Debug, Clone)]
pub struct TextureDetector {
    /// Magnitude a pixel must exceed, after saturating to 8 bits.
    pub threshold: u8,
}

impl TextureDetector {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl Default for TextureDetector {
    fn default() -> Self {
        Self::new(10)
    }
}

impl MaskDetector for TextureDetector {
    fn detect_mask(&self, context: &DetectionContext) -> Mask {
        let (width, height) = context.dimensions;
        if width == 0 || height == 0 {
            return Mask::new(width, height);
        }

        let laplacian = laplacian_filter(&reflect_101(&context.gray));
        Mask::from_fn(width, height, |x, y| {
            let magnitude = laplacian.get_pixel(x + 1, y + 1)[0].unsigned_abs().min(255) as u8;
            magnitude > self.threshold
        })
    }

    fn name(&self) -> &'static str {
        "TextureDetector"
    }
}

/// Grows the image by one pixel per side, mirroring without repeating the
/// edge row (`cb|abc|ba`).
fn reflect_101(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width + 2, height + 2, |x, y| {
        *gray.get_pixel(mirror(x as i64 - 1, width), mirror(y as i64 - 1, height))
    })
}

fn mirror(i: i64, len: u32) -> u32 {
    let last = len as i64 - 1;
    let i = if i < 0 {
        -i
    } else if i > last {
        2 * last - i
    } else {
        i
    };
    i.clamp(0, last) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    #[test]
    fn test_flat_image_has_no_texture() {
        let image = ImageBuffer::from_pixel(12, 12, Rgb([40, 160, 40]));
        let mask = TextureDetector::default().detect_mask(&DetectionContext::new(&image));
        assert!(mask.is_empty());
    }

    #[test]
    fn test_checkerboard_is_fully_textured() {
        let image: RgbImage = ImageBuffer::from_fn(12, 12, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([40, 160, 40])
            } else {
                Rgb([60, 200, 60])
            }
        });
        let mask = TextureDetector::default().detect_mask(&DetectionContext::new(&image));
        assert_eq!(mask.count(), 144);
    }

    #[test]
    fn test_border_is_mirrored_without_repeating_edge() {
        // a faint line in column 1: mirrored, column 0 sees it on both sides
        let image: RgbImage = ImageBuffer::from_fn(8, 8, |x, _| {
            let v = if x == 1 { 8 } else { 0 };
            Rgb([v, v, v])
        });
        let mask = TextureDetector::default().detect_mask(&DetectionContext::new(&image));

        for y in 0..8 {
            assert!(mask.get(0, y));
            assert!(mask.get(1, y));
            assert!(!mask.get(2, y));
        }
        assert_eq!(mask.count(), 16);
    }

    #[test]
    fn test_single_pixel_image() {
        let image = ImageBuffer::from_pixel(1, 1, Rgb([200, 10, 10]));
        let mask = TextureDetector::default().detect_mask(&DetectionContext::new(&image));
        assert!(mask.is_empty());
    }

    #[test]
    fn test_weak_ripple_stays_below_threshold() {
        // gray steps of 1 give a Laplacian magnitude of at most 4
        let image: RgbImage = ImageBuffer::from_fn(12, 12, |x, y| {
            let v = 100 + ((x + y) % 2) as u8;
            Rgb([v, v, v])
        });
        let mask = TextureDetector::default().detect_mask(&DetectionContext::new(&image));
        assert!(mask.is_empty());
    }
}
