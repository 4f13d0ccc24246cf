//! Contrast-enhanced contour detection with shape-quality filtering.
//!
//! The default strategy. Compared to the legacy detector it adds localized
//! contrast equalization before thresholding, scales the morphology kernel
//! with the frame resolution, optionally fits rectangles to contour convex
//! hulls, and runs the solidity / aspect / extent cascade to reject blobs
//! that are not photo-shaped.

use crate::core::config::DetectionConfig;
use crate::core::errors::SplitResult;
use crate::detectors::{FilterMode, PhotoDetector, regions_from_mask};
use crate::domain::region::{DetectorKind, PhotoRegion};
use crate::processors::preprocess;
use image::RgbImage;
use tracing::debug;

/// Tile grid used for localized contrast equalization.
const CONTRAST_GRID: u32 = 8;
/// Clip limit for the tile histograms, as a multiple of the mean bin height.
const CONTRAST_CLIP_LIMIT: f32 = 3.0;

/// The default contour detector.
#[derive(Debug, Default)]
pub struct ContourDetector;

impl PhotoDetector for ContourDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Contour
    }

    fn detect(&self, frame: &RgbImage, config: &DetectionConfig) -> SplitResult<Vec<PhotoRegion>> {
        let gray = preprocess::to_grayscale(frame);
        let equalized =
            preprocess::equalize_local_contrast(&gray, CONTRAST_GRID, CONTRAST_CLIP_LIMIT);
        let blurred = preprocess::blur(&equalized, config.blur_sigma);
        let binary = preprocess::adaptive_mean_threshold(
            &blurred,
            config.threshold_block_radius,
            config.threshold_offset,
        );

        let kernel_radius = preprocess::adaptive_kernel_radius(
            frame.width(),
            frame.height(),
            config.kernel_fraction,
            config.kernel_radius_bounds,
        );
        let cleaned = preprocess::close_then_open(&binary, kernel_radius);

        debug!(
            "contour detection on {}x{} frame, kernel radius {}, hull {}",
            frame.width(),
            frame.height(),
            kernel_radius,
            config.use_convex_hull
        );

        Ok(regions_from_mask(
            &cleaned,
            frame.dimensions(),
            config,
            FilterMode::Strict,
        ))
    }
}
