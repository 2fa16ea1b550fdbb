pub mod analysis; // Sky, texture and vegetation detectors
pub mod image_loader;

pub use analysis::{DetectionConfig, VegetationDetector};
pub use image_loader::load_image;
