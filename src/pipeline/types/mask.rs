use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

const ON: Luma<u8> = Luma([255]);
const OFF: Luma<u8> = Luma([0]);

/// Binary pixel grid, same shape as the raster it was derived from.
///
/// Cells are stored as 0 / 255 in a `GrayImage` so the mask can be handed
/// straight to `imageproc` operators.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        Self {
            image: GrayImage::from_fn(width, height, |x, y| if f(x, y) { ON } else { OFF }),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] != 0
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        self.image.put_pixel(x, y, if value { ON } else { OFF });
    }

    /// Number of set cells.
    pub fn count(&self) -> u64 {
        self.image.pixels().filter(|p| p[0] != 0).count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.image.pixels().all(|p| p[0] == 0)
    }

    pub fn union(&self, other: &Mask) -> Mask {
        self.combine(other, |a, b| a || b)
    }

    pub fn intersect(&self, other: &Mask) -> Mask {
        self.combine(other, |a, b| a && b)
    }

    /// Cells set in `self` and clear in `other`.
    pub fn subtract(&self, other: &Mask) -> Mask {
        self.combine(other, |a, b| a && !b)
    }

    fn combine<F>(&self, other: &Mask, op: F) -> Mask
    where
        F: Fn(bool, bool) -> bool,
    {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        let (width, height) = self.dimensions();
        Mask::from_fn(width, height, |x, y| op(self.get(x, y), other.get(x, y)))
    }

    /// Dilation with a (2r+1)x(2r+1) square structuring element.
    pub fn dilate(&self, radius: u8) -> Mask {
        Mask {
            image: morphology::dilate(&self.image, Norm::LInf, radius),
        }
    }

    /// Erosion then dilation with a (2r+1)x(2r+1) square.
    pub fn open(&self, radius: u8) -> Mask {
        Mask {
            image: morphology::open(&self.image, Norm::LInf, radius),
        }
    }

    /// Dilation then erosion with a (2r+1)x(2r+1) square.
    pub fn close(&self, radius: u8) -> Mask {
        Mask {
            image: morphology::close(&self.image, Norm::LInf, radius),
        }
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}
