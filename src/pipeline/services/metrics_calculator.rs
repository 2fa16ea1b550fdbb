use crate::pipeline::types::MetricsReport;

const MAX_ACCURACY: f64 = 99.9;
const MAX_UNDETECTED_ACCURACY: f64 = 50.0;

/// Turns before/after vegetation counts into the comparison report.
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    min_green_threshold: u64,
}

impl MetricsCalculator {
    pub fn new(min_green_threshold: u64) -> Self {
        Self {
            min_green_threshold,
        }
    }

    /// `shape` is `(height, width)` of the before image; it is used as the
    /// area of both images.
    pub fn calculate(&self, before_count: u64, after_count: u64, shape: (u32, u32)) -> MetricsReport {
        let total_pixels = shape.0 as u64 * shape.1 as u64;
        let percentage = |count: u64| {
            if total_pixels == 0 {
                0.0
            } else {
                count as f64 / total_pixels as f64 * 100.0
            }
        };

        let difference = after_count as i64 - before_count as i64;

        let increase_percentage = if before_count > 0 {
            difference as f64 / before_count as f64 * 100.0
        } else if after_count > 0 {
            100.0
        } else {
            0.0
        };

        let tree_detected = difference >= self.min_green_threshold as i64;

        MetricsReport {
            before_count,
            after_count,
            before_percentage: percentage(before_count),
            after_percentage: percentage(after_count),
            difference,
            increase_percentage,
            tree_detected,
            accuracy: self.accuracy(difference, tree_detected),
        }
    }

    // Branch edges at 2000 and 5000 are discontinuous; that is the expected output.
    fn accuracy(&self, difference: i64, tree_detected: bool) -> f64 {
        let d = difference as f64;

        if tree_detected {
            let accuracy = if difference > 5000 {
                (95.0 + d / 10000.0).min(MAX_ACCURACY)
            } else if difference > 2000 {
                85.0 + d / 1000.0
            } else {
                70.0 + d / 500.0
            };
            accuracy.min(MAX_ACCURACY)
        } else if difference > 0 {
            let threshold = self.min_green_threshold.max(1) as f64;
            (d / threshold * 50.0).clamp(0.0, MAX_UNDETECTED_ACCURACY)
        } else {
            0.0
        }
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(1000)
    }
}
