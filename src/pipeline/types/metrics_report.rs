use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

use crate::error::AppError;

pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load images";

/// Before/after vegetation comparison, serialized field-for-field as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub before_count: u64,
    pub after_count: u64,
    pub before_percentage: f64,
    pub after_percentage: f64,
    /// `after_count - before_count`
    pub difference: i64,
    pub increase_percentage: f64,
    pub tree_detected: bool,
    /// Heuristic confidence in `[0, 99.9]`.
    pub accuracy: f64,
}

/// What a run prints: either the metrics or a structured error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Completed(MetricsReport),
    Failed { error: String },
}

impl AnalysisReport {
    pub fn load_failure() -> Self {
        AnalysisReport::Failed {
            error: LOAD_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn metrics(&self) -> Option<&MetricsReport> {
        match self {
            AnalysisReport::Completed(metrics) => Some(metrics),
            AnalysisReport::Failed { .. } => None,
        }
    }

    /// Metrics as pretty JSON with two-space indentation; errors on one line.
    pub fn to_json(&self) -> Result<String, AppError> {
        match self {
            AnalysisReport::Completed(metrics) => Ok(serde_json::to_string_pretty(metrics)?),
            AnalysisReport::Failed { .. } => {
                let mut out = Vec::new();
                let mut serializer =
                    serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
                self.serialize(&mut serializer)?;
                Ok(String::from_utf8_lossy(&out).into_owned())
            }
        }
    }
}

impl From<MetricsReport> for AnalysisReport {
    fn from(metrics: MetricsReport) -> Self {
        AnalysisReport::Completed(metrics)
    }
}

/// One-line JSON with a space after every `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_report_json() {
        let json = AnalysisReport::load_failure().to_json().unwrap();
        assert_eq!(json, r#"{"error": "Failed to load images"}"#);
    }

    #[test]
    fn test_failed_report_escapes_message() {
        let report = AnalysisReport::Failed {
            error: "bad \"path\"".to_string(),
        };
        assert_eq!(report.to_json().unwrap(), r#"{"error": "bad \"path\""}"#);
    }

    #[test]
    fn test_completed_report_keeps_field_order_and_types() {
        let report = AnalysisReport::from(MetricsReport {
            before_count: 0,
            after_count: 0,
            before_percentage: 0.0,
            after_percentage: 0.0,
            difference: 0,
            increase_percentage: 0.0,
            tree_detected: false,
            accuracy: 0.0,
        });
        let json = report.to_json().unwrap();
        let expected = "{\n  \"before_count\": 0,\n  \"after_count\": 0,\n  \"before_percentage\": 0.0,\n  \"after_percentage\": 0.0,\n  \"difference\": 0,\n  \"increase_percentage\": 0.0,\n  \"tree_detected\": false,\n  \"accuracy\": 0.0\n}";
        assert_eq!(json, expected);
        assert!(report.metrics().is_some());
    }
}
