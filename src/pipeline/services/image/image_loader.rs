use image::RgbImage;
use std::path::Path;
use tracing::{debug, error};

use crate::error::ImageLoadError;

/// Reads an image file as raw bytes and decodes it into an 8-bit RGB raster.
///
/// The path is never converted to text, so non-ASCII and non-UTF-8 file
/// names load the same as any other. Failures are logged before they are
/// returned so the caller can report a structured error without repeating
/// the cause.
pub fn load_image(path: &Path) -> Result<RgbImage, ImageLoadError> {
    let result = read_and_decode(path);
    match &result {
        Ok(image) => debug!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        ),
        Err(e) => error!("Error loading image: {}", e),
    }
    result
}

fn read_and_decode(path: &Path) -> Result<RgbImage, ImageLoadError> {
    let bytes = std::fs::read(path).map_err(|source| ImageLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let image = image::load_from_memory(&bytes).map_err(|source| ImageLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(image.to_rgb8())
}
