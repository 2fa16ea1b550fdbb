pub mod analyzer;

pub use analyzer::VegetationChangeAnalyzer;
