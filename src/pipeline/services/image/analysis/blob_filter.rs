use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::point::Point;
use tracing::debug;

use crate::pipeline::types::Mask;

/// Keeps only the outermost blobs of a mask whose border encloses more than
/// `min_area` pixels. Kept blobs are redrawn filled, holes included; small
/// blobs are dropped whole.
#[derive(Debug, Clone)]
pub struct BlobFilter {
    pub min_area: f64,
}

impl BlobFilter {
    pub fn new(min_area: f64) -> Self {
        Self { min_area }
    }

    pub fn filter(&self, mask: &Mask) -> Mask {
        let (width, height) = mask.dimensions();
        let mut filtered = Mask::new(width, height);
        let mut kept = 0usize;
        let mut dropped = 0usize;

        let contours = find_contours::<i32>(&padded(mask));
        for contour in contours.iter().filter(|c| is_external(c)) {
            let points: Vec<Point<i32>> = contour
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();

            if contour_area(&points) > self.min_area {
                fill_contour(&mut filtered, &points);
                kept += 1;
            } else {
                dropped += 1;
            }
        }

        debug!("Blob filter kept {} blobs, dropped {}", kept, dropped);
        filtered
    }
}

impl Default for BlobFilter {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Copy of the mask inside a one-pixel background frame. The contour tracer
/// only starts an outer border after a background pixel on the left, so
/// blobs touching column 0 would otherwise come back as parentless holes.
fn padded(mask: &Mask) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut framed = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut framed, mask.as_image(), 1, 1);
    framed
}

fn is_external(contour: &Contour<i32>) -> bool {
    matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
}

/// Area of the polygon through the border pixel centres (shoelace formula).
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    (twice_area as f64 / 2.0).abs()
}

/// Sets the border pixels and everything they enclose.
fn fill_contour(mask: &mut Mask, points: &[Point<i32>]) {
    let (width, height) = mask.dimensions();
    let in_bounds = |x: i32, y: i32| x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height;

    for p in points {
        if in_bounds(p.x, p.y) {
            mask.set(p.x as u32, p.y as u32, true);
        }
    }

    let (Some(min_y), Some(max_y)) = (
        points.iter().map(|p| p.y).min(),
        points.iter().map(|p| p.y).max(),
    ) else {
        return;
    };

    // Even-odd scanline fill; each edge covers the half-open row range [lo.y, hi.y).
    let mut crossings: Vec<Vec<f64>> = vec![Vec::new(); (max_y - min_y + 1) as usize];
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        if a.y == b.y {
            continue;
        }
        let (lo, hi) = if a.y < b.y { (a, b) } else { (b, a) };
        for y in lo.y..hi.y {
            let t = (y - lo.y) as f64 / (hi.y - lo.y) as f64;
            crossings[(y - min_y) as usize].push(lo.x as f64 + t * (hi.x - lo.x) as f64);
        }
    }

    for (row, xs) in crossings.iter_mut().enumerate() {
        xs.sort_by(|a, b| a.total_cmp(b));
        let y = min_y + row as i32;
        for span in xs.chunks_exact(2) {
            for x in span[0].ceil() as i32..=span[1].floor() as i32 {
                if in_bounds(x, y) {
                    mask.set(x as u32, y as u32, true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(mask: &mut Mask, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.set(x, y, true);
            }
        }
    }

    #[test]
    fn test_contour_area_of_square_border() {
        let square = [
            Point::new(0, 0),
            Point::new(9, 0),
            Point::new(9, 9),
            Point::new(0, 9),
        ];
        assert_eq!(contour_area(&square), 81.0);
        assert_eq!(contour_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_large_blob_kept_small_blob_dropped() {
        let mut mask = Mask::new(60, 60);
        block(&mut mask, 5, 5, 20, 20); // border area 19*19 = 361
        block(&mut mask, 40, 40, 10, 10); // border area 9*9 = 81

        let filtered = BlobFilter::default().filter(&mask);
        assert_eq!(filtered.count(), 400);
        assert!(filtered.get(10, 10));
        assert!(!filtered.get(45, 45));
    }

    #[test]
    fn test_area_threshold_is_exclusive() {
        let mut mask = Mask::new(30, 30);
        block(&mut mask, 5, 5, 11, 11); // border area exactly 100

        assert!(BlobFilter::new(100.0).filter(&mask).is_empty());
        assert_eq!(BlobFilter::new(99.0).filter(&mask).count(), 121);
    }

    #[test]
    fn test_holes_are_filled() {
        let mut mask = Mask::new(40, 40);
        block(&mut mask, 5, 5, 20, 20);
        for y in 10..15 {
            for x in 10..15 {
                mask.set(x, y, false);
            }
        }
        assert_eq!(mask.count(), 375);

        let filtered = BlobFilter::default().filter(&mask);
        assert_eq!(filtered.count(), 400);
        assert!(filtered.get(12, 12));
    }

    #[test]
    fn test_irregular_blob_fills_to_its_own_pixels() {
        // L-shaped blob
        let mut mask = Mask::new(50, 50);
        block(&mut mask, 5, 5, 30, 6);
        block(&mut mask, 5, 11, 6, 24);

        let filtered = BlobFilter::default().filter(&mask);
        assert_eq!(filtered, mask);
    }

    #[test]
    fn test_blobs_touching_each_edge_are_kept() {
        let placements = [(0, 15), (15, 0), (30, 15), (15, 30), (0, 0), (30, 30)];
        for (x0, y0) in placements {
            let mut mask = Mask::new(50, 50);
            block(&mut mask, x0, y0, 20, 20);

            let filtered = BlobFilter::default().filter(&mask);
            assert_eq!(filtered, mask, "block at ({}, {})", x0, y0);
        }
    }

    #[test]
    fn test_left_edge_blob_with_hole_is_filled() {
        let mut mask = Mask::new(40, 40);
        block(&mut mask, 0, 5, 20, 20);
        for y in 10..15 {
            for x in 5..10 {
                mask.set(x, y, false);
            }
        }

        let filtered = BlobFilter::default().filter(&mask);
        assert_eq!(filtered.count(), 400);
        assert!(filtered.get(7, 12));
    }

    #[test]
    fn test_small_edge_blob_still_dropped() {
        let mut mask = Mask::new(30, 30);
        block(&mut mask, 0, 0, 10, 10);
        assert!(BlobFilter::default().filter(&mask).is_empty());
    }

    #[test]
    fn test_full_frame_mask_is_kept() {
        let mask = Mask::from_fn(60, 60, |_, _| true);
        assert_eq!(BlobFilter::default().filter(&mask).count(), 3600);
    }

    #[test]
    fn test_empty_mask() {
        assert!(BlobFilter::default().filter(&Mask::new(10, 10)).is_empty());
    }
}
