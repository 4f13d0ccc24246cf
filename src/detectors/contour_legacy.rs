//! Fixed-morphology contour detection.
//!
//! The original detection strategy: grayscale, blur, adaptive threshold, a
//! morphology kernel that does not scale with resolution, and no shape
//! filtering beyond the area band. It under- or over-smooths depending on
//! scan DPI and accepts noise blobs sized within the band, but its behavior
//! is easy to predict, which keeps it useful as a fallback.

use crate::core::config::DetectionConfig;
use crate::core::errors::SplitResult;
use crate::detectors::{FilterMode, PhotoDetector, regions_from_mask};
use crate::domain::region::{DetectorKind, PhotoRegion};
use crate::processors::preprocess;
use image::RgbImage;
use tracing::debug;

/// Contour detector with a fixed morphology kernel and area filtering only.
#[derive(Debug, Default)]
pub struct ContourLegacyDetector;

impl PhotoDetector for ContourLegacyDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ContourLegacy
    }

    fn detect(&self, frame: &RgbImage, config: &DetectionConfig) -> SplitResult<Vec<PhotoRegion>> {
        let gray = preprocess::to_grayscale(frame);
        let blurred = preprocess::blur(&gray, config.blur_sigma);
        let binary = preprocess::adaptive_mean_threshold(
            &blurred,
            config.threshold_block_radius,
            config.threshold_offset,
        );
        let cleaned = preprocess::close_then_open(&binary, config.fixed_kernel_radius);

        debug!(
            "legacy contour detection on {}x{} frame, kernel radius {}",
            frame.width(),
            frame.height(),
            config.fixed_kernel_radius
        );

        Ok(regions_from_mask(
            &cleaned,
            frame.dimensions(),
            config,
            FilterMode::AreaOnly,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::synthetic_scan;

    #[test]
    fn test_detects_two_rectangles_and_excludes_tiny_one() {
        // 400x400 scan: ~10 and ~30 percent rectangles plus a ~1 percent one
        let frame = synthetic_scan(
            400,
            400,
            &[(30, 30, 130, 120), (200, 160, 180, 230), (40, 330, 40, 40)],
        );

        let config = DetectionConfig::default().with_area_band(5.0, 80.0);
        let regions = ContourLegacyDetector.detect(&frame, &config).unwrap();

        assert_eq!(regions.len(), 2);
        for region in &regions {
            let pct = region.area_fraction(400, 400);
            assert!((5.0..=80.0).contains(&pct), "area fraction {} out of band", pct);
        }
    }

    #[test]
    fn test_blank_scan_yields_no_regions() {
        let frame = synthetic_scan(300, 300, &[]);
        let config = DetectionConfig::default();
        let regions = ContourLegacyDetector.detect(&frame, &config).unwrap();
        assert!(regions.is_empty());
    }
}
