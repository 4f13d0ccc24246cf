//! Saliency-mask-driven detection.
//!
//! Instead of thresholding raw pixels, this strategy consumes a per-pixel
//! foreground map produced by an external segmentation model. The mask's
//! production is the provider's responsibility; this detector aligns it to
//! the frame, binarizes it, and reuses the shared contour machinery. Shape
//! filters are skipped because the mask is already foreground-pure.

use crate::core::config::DetectionConfig;
use crate::core::errors::SplitResult;
use crate::detectors::{FilterMode, PhotoDetector, regions_from_mask};
use crate::domain::region::{DetectorKind, PhotoRegion};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use tracing::debug;

/// Supplies a saliency mask for a frame.
///
/// The mask marks pixels likely to belong to a foreground object, with 255
/// meaning certain foreground. It may be produced at a lower resolution than
/// the frame; the detector upsamples it before use. Implementations must be
/// safe to call from multiple threads.
pub trait MaskProvider: Send + Sync {
    /// Computes (or retrieves) the saliency mask for the given frame.
    fn saliency_mask(&self, frame: &RgbImage) -> SplitResult<GrayImage>;
}

/// Detector driven by an externally supplied saliency mask.
pub struct SalientMaskDetector<'a> {
    provider: &'a dyn MaskProvider,
}

impl<'a> SalientMaskDetector<'a> {
    /// Creates a detector over the given mask provider.
    pub fn new(provider: &'a dyn MaskProvider) -> Self {
        Self { provider }
    }
}

impl PhotoDetector for SalientMaskDetector<'_> {
    fn kind(&self) -> DetectorKind {
        DetectorKind::SalientMask
    }

    fn detect(&self, frame: &RgbImage, config: &DetectionConfig) -> SplitResult<Vec<PhotoRegion>> {
        let mask = self.provider.saliency_mask(frame)?;

        let mask = if mask.dimensions() == frame.dimensions() {
            mask
        } else {
            debug!(
                "upsampling saliency mask from {:?} to {:?}",
                mask.dimensions(),
                frame.dimensions()
            );
            imageops::resize(&mask, frame.width(), frame.height(), FilterType::Nearest)
        };

        let cutoff = (config.mask_cutoff * 255.0).round() as u8;
        let mut binary = GrayImage::new(mask.width(), mask.height());
        for (x, y, pixel) in mask.enumerate_pixels() {
            let value = if pixel[0] >= cutoff { 255 } else { 0 };
            binary.put_pixel(x, y, Luma([value]));
        }

        Ok(regions_from_mask(
            &binary,
            frame.dimensions(),
            config,
            FilterMode::AreaOnly,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Provider returning a fixed mask regardless of the frame.
    struct StaticMask(GrayImage);

    impl MaskProvider for StaticMask {
        fn saliency_mask(&self, _frame: &RgbImage) -> SplitResult<GrayImage> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_mask_blob_becomes_region() {
        let mut mask = GrayImage::from_pixel(200, 200, Luma([10]));
        for y in 60..140 {
            for x in 40..160 {
                mask.put_pixel(x, y, Luma([230]));
            }
        }
        let provider = StaticMask(mask);
        let frame = RgbImage::from_pixel(200, 200, Rgb([128, 128, 128]));

        let regions = SalientMaskDetector::new(&provider)
            .detect(&frame, &DetectionConfig::default())
            .unwrap();

        assert_eq!(regions.len(), 1);
        assert!((regions[0].center.x - 99.5).abs() < 2.0);
        assert!((regions[0].center.y - 99.5).abs() < 2.0);
    }

    #[test]
    fn test_low_resolution_mask_is_upsampled_to_frame_coordinates() {
        // Half-resolution mask: a blob at (20..80, 30..70) maps to
        // (40..160, 60..140) in frame coordinates
        let mut mask = GrayImage::from_pixel(100, 100, Luma([0]));
        for y in 30..70 {
            for x in 20..80 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let provider = StaticMask(mask);
        let frame = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));

        let regions = SalientMaskDetector::new(&provider)
            .detect(&frame, &DetectionConfig::default())
            .unwrap();

        assert_eq!(regions.len(), 1);
        let region = &regions[0];
        assert!((region.center.x - 99.0).abs() < 4.0);
        assert!((region.center.y - 99.0).abs() < 4.0);
        assert!((region.width - 130.0).abs() < 6.0);
        assert!((region.height - 90.0).abs() < 6.0);
    }

    #[test]
    fn test_soft_mask_values_below_cutoff_are_background() {
        let mask = GrayImage::from_pixel(100, 100, Luma([100]));
        let provider = StaticMask(mask);
        let frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));

        // 100 < 0.5 * 255, so the whole mask is background
        let regions = SalientMaskDetector::new(&provider)
            .detect(&frame, &DetectionConfig::default())
            .unwrap();
        assert!(regions.is_empty());
    }
}
