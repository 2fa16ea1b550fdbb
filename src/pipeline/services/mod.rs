pub mod image;
pub mod metrics_calculator;

pub use metrics_calculator::MetricsCalculator;
