use std::path::PathBuf;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Image Loading Error Type
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl ImageLoadError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ImageLoadError::Read { path, .. } | ImageLoadError::Decode { path, .. } => path,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Source(#[from] ::config::ConfigError),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
