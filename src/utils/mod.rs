//! Utility functions: image loading and logging setup.

use crate::core::errors::{SplitError, SplitResult};
use image::{DynamicImage, GrayImage, RgbImage};
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Converts a DynamicImage to a GrayImage.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Loads an image from a file path and converts it to an RgbImage.
///
/// # Errors
///
/// Returns `SplitError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> SplitResult<RgbImage> {
    let img = image::open(path).map_err(SplitError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Initializes the tracing subscriber for logging.
///
/// Sets up an environment-filtered formatting layer; typically called once at
/// application startup.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image(Path::new("/nonexistent/scan.png"));
        assert!(matches!(result, Err(SplitError::ImageLoad(_))));
    }

    #[test]
    fn test_dynamic_conversions() {
        let img = DynamicImage::new_rgb8(7, 5);
        assert_eq!(dynamic_to_rgb(img.clone()).dimensions(), (7, 5));
        assert_eq!(dynamic_to_gray(img).dimensions(), (7, 5));
    }
}
