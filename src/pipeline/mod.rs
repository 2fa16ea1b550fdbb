pub mod orchestration;
pub mod services;
pub mod types;

pub use orchestration::VegetationChangeAnalyzer;
pub use services::MetricsCalculator;
pub use types::{AnalysisReport, Mask, MetricsReport};
