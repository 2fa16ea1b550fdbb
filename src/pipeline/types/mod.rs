mod mask;
mod metrics_report;

pub use mask::Mask;
pub use metrics_report::{AnalysisReport, LOAD_FAILURE_MESSAGE, MetricsReport};
