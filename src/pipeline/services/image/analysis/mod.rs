pub mod blob_filter;
pub mod config;
pub mod core;
pub mod sky_detector;
pub mod texture_detector;
pub mod vegetation_detector;

pub use blob_filter::BlobFilter;
pub use self::config::{ColorThresholds, DetectionConfig, HsvRange};
pub use self::core::{DetectionContext, Hsv, MaskDetector};
pub use sky_detector::SkyDetector;
pub use texture_detector::TextureDetector;
pub use vegetation_detector::{VegetationDetection, VegetationDetector};
