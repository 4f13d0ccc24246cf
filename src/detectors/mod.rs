//! Detection strategies.
//!
//! The three detectors share one skeleton — extract outer contours from a
//! binary mask, fit a minimum-area rotated rectangle per contour, filter —
//! and differ in how the mask is produced and which filters run. The shared
//! part lives in [`regions_from_mask`]; the strategies are thin drivers over
//! it behind the [`PhotoDetector`] trait.

pub mod contour;
pub mod contour_legacy;
pub mod saliency;

use crate::core::config::DetectionConfig;
use crate::core::errors::SplitResult;
use crate::domain::region::{DetectorKind, PhotoRegion};
use crate::processors::geometry::Polygon;
use image::{GrayImage, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use tracing::debug;

pub use contour::ContourDetector;
pub use contour_legacy::ContourLegacyDetector;
pub use saliency::{MaskProvider, SalientMaskDetector};

/// A photo detection strategy.
///
/// Implementations are pure and stateless over the frame: the same input
/// produces the same candidate list, and concurrent calls need no
/// synchronization.
pub trait PhotoDetector {
    /// Identity of this detector, carried in results for diagnostics.
    fn kind(&self) -> DetectorKind;

    /// Finds candidate photo regions in the frame. An empty vector is a
    /// valid outcome, not an error.
    fn detect(&self, frame: &RgbImage, config: &DetectionConfig) -> SplitResult<Vec<PhotoRegion>>;
}

/// Which filters [`regions_from_mask`] applies beyond the area band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterMode {
    /// Area-fraction band only. Used by the legacy detector and, because the
    /// mask is already foreground-pure, by the salient-mask detector.
    AreaOnly,
    /// Full cascade: minimum side, solidity, aspect ratio, extent, then the
    /// area band.
    Strict,
}

/// Converts a binary mask into filtered photo regions.
///
/// Traces the outer boundary of each connected foreground component, fits a
/// minimum-area rotated rectangle (optionally to the contour's convex hull,
/// which bridges gaps from torn photo edges), and applies the filter cascade.
/// Cheap geometric checks run before the polygon-area ratios; all predicates
/// are independent, so ordering only affects cost.
pub(crate) fn regions_from_mask(
    mask: &GrayImage,
    frame_dims: (u32, u32),
    config: &DetectionConfig,
    filter_mode: FilterMode,
) -> Vec<PhotoRegion> {
    let (frame_w, frame_h) = frame_dims;
    let contours = find_contours::<u32>(mask);

    let mut regions = Vec::new();
    let mut considered = 0usize;

    for contour in &contours {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        if considered >= config.max_candidates {
            debug!(
                "candidate cap of {} reached, ignoring remaining contours",
                config.max_candidates
            );
            break;
        }
        considered += 1;

        if contour.points.len() < 3 {
            continue;
        }

        let polygon = Polygon::from_contour(contour);
        let fit = if config.use_convex_hull && filter_mode == FilterMode::Strict {
            polygon.convex_hull().min_area_rect()
        } else {
            polygon.min_area_rect()
        };

        if fit.min_side() < config.min_box_side {
            continue;
        }

        if filter_mode == FilterMode::Strict {
            let filters = &config.shape_filters;

            let aspect = fit.width.max(fit.height) / fit.min_side();
            if aspect > filters.max_aspect_ratio {
                continue;
            }

            let contour_area = polygon.area();
            if contour_area / fit.area() < filters.min_extent {
                continue;
            }
            if polygon.solidity() < filters.min_solidity {
                continue;
            }
        }

        let region = PhotoRegion::from_rect_fit(&fit, config.padding);
        let area_pct = region.area_fraction(frame_w, frame_h);
        if area_pct < config.min_area_pct || area_pct > config.max_area_pct {
            continue;
        }

        regions.push(region);
    }

    debug!(
        "{} of {} outer contours passed filtering",
        regions.len(),
        considered
    );

    regions
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgb, RgbImage};

    /// A white scan with dark rectangles painted at the given
    /// `(x, y, width, height)` positions.
    pub fn synthetic_scan(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> RgbImage {
        let mut frame = RgbImage::from_pixel(width, height, Rgb([245, 245, 245]));
        for &(rx, ry, rw, rh) in rects {
            for y in ry..(ry + rh).min(height) {
                for x in rx..(rx + rw).min(width) {
                    frame.put_pixel(x, y, Rgb([70, 75, 80]));
                }
            }
        }
        frame
    }
}
