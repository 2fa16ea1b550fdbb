use image::RgbImage;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{info, instrument, warn};

use crate::error::{AppError, ImageLoadError};
use crate::pipeline::services::image::analysis::{DetectionConfig, VegetationDetector};
use crate::pipeline::services::image::load_image;
use crate::pipeline::services::MetricsCalculator;
use crate::pipeline::types::AnalysisReport;

/// Compares a before and an after photo of the same scene and reports how
/// much tree-like vegetation appeared.
///
/// Load, mask and count stages for the two photos are independent, so each
/// stage runs both photos on the blocking pool at once.
#[derive(Debug, Clone)]
pub struct VegetationChangeAnalyzer {
    detector: VegetationDetector,
    metrics: MetricsCalculator,
}

impl VegetationChangeAnalyzer {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            detector: VegetationDetector::from_config(config),
            metrics: MetricsCalculator::new(config.min_green_threshold),
        }
    }

    #[instrument(skip_all, fields(before = %before.display(), after = %after.display()))]
    pub async fn analyze_images(
        &self,
        before: &Path,
        after: &Path,
    ) -> Result<AnalysisReport, AppError> {
        let (before_img, after_img) = tokio::try_join!(
            load_blocking(before.to_path_buf()),
            load_blocking(after.to_path_buf())
        )?;

        let (before_img, after_img) = match (before_img, after_img) {
            (Ok(before_img), Ok(after_img)) => (before_img, after_img),
            (before_result, after_result) => {
                let failed = [before_result.err(), after_result.err()]
                    .into_iter()
                    .flatten()
                    .count();
                warn!("{} of 2 images failed to load, skipping analysis", failed);
                return Ok(AnalysisReport::load_failure());
            }
        };

        let shape = (before_img.height(), before_img.width());
        if before_img.dimensions() != after_img.dimensions() {
            warn!(
                "Image sizes differ ({}x{} vs {}x{}); percentages use the before image area",
                before_img.width(),
                before_img.height(),
                after_img.width(),
                after_img.height()
            );
        }

        let (before_count, after_count) = tokio::try_join!(
            self.count_blocking(before_img),
            self.count_blocking(after_img)
        )?;

        let report = self.metrics.calculate(before_count, after_count, shape);
        info!(
            "Vegetation pixels: before={}, after={}, difference={}, tree_detected={}",
            report.before_count, report.after_count, report.difference, report.tree_detected
        );

        Ok(AnalysisReport::from(report))
    }

    async fn count_blocking(&self, image: RgbImage) -> Result<u64, AppError> {
        let detector = self.detector.clone();
        let count = spawn_blocking(move || detector.detect(&image).count).await?;
        Ok(count)
    }
}

impl Default for VegetationChangeAnalyzer {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

async fn load_blocking(path: PathBuf) -> Result<Result<RgbImage, ImageLoadError>, AppError> {
    Ok(spawn_blocking(move || load_image(&path)).await?)
}
