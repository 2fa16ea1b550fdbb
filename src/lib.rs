pub mod config;
pub mod error;
pub mod pipeline;

pub use crate::config::Configuration;
pub use error::{AppError, ConfigError, ImageLoadError};

pub use pipeline::{AnalysisReport, Mask, MetricsReport, VegetationChangeAnalyzer};
