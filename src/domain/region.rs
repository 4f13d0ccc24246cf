//! Detected photo regions and detection results.

use crate::processors::geometry::{Point, RectFit, normalize_angle, rotate_offset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A detected photo expressed as a rotated rectangle in frame coordinates.
///
/// The `id` is assigned once at creation and survives serialization, so an
/// interactive editor can hand back a modified copy of a region and downstream
/// consumers can still match it to the original detection. Angles are stored
/// normalized to `[0, 360)`, positive clockwise in image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRegion {
    /// Stable identity of the region.
    pub id: String,
    /// Center of the rectangle in frame pixel coordinates.
    pub center: Point,
    /// Extent along the rectangle's own x axis. Always positive.
    pub width: f32,
    /// Extent along the rectangle's own y axis. Always positive.
    pub height: f32,
    /// Rotation in degrees, canonical range `[0, 360)`.
    pub angle: f32,
}

impl PhotoRegion {
    /// Creates a region with a freshly assigned id and a normalized angle.
    pub fn new(center: Point, width: f32, height: f32, angle: f32) -> Self {
        Self {
            id: new_region_id(),
            center,
            width,
            height,
            angle: normalize_angle(angle),
        }
    }

    /// Builds a region from a fitted rectangle, growing each extent by
    /// `2 * padding` pixels.
    ///
    /// The fit is normalized so the long side becomes the width (swapping the
    /// extents adds a quarter turn), and the resulting angle is reduced to
    /// `[0, 180)` since a rectangle is symmetric under a half turn. An
    /// axis-aligned fit therefore always comes out with angle 0.
    pub fn from_rect_fit(fit: &RectFit, padding: f32) -> Self {
        let mut width = fit.width + 2.0 * padding;
        let mut height = fit.height + 2.0 * padding;
        let mut angle = normalize_angle(fit.angle) % 180.0;

        if width < height {
            std::mem::swap(&mut width, &mut height);
            angle = normalize_angle(angle + 90.0) % 180.0;
        }

        Self::new(fit.center, width, height, angle)
    }

    /// Computes the four corners of the rectangle by rotating the half-extent
    /// offsets around the center.
    ///
    /// Corners are returned in the box's own order: top-left, top-right,
    /// bottom-right, bottom-left of the unrotated rectangle.
    pub fn corners(&self) -> [Point; 4] {
        let w2 = self.width / 2.0;
        let h2 = self.height / 2.0;
        [
            rotate_offset(self.center, -w2, -h2, self.angle),
            rotate_offset(self.center, w2, -h2, self.angle),
            rotate_offset(self.center, w2, h2, self.angle),
            rotate_offset(self.center, -w2, h2, self.angle),
        ]
    }

    /// Area of the rectangle in square pixels.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Area of the rectangle as a percentage of the frame area.
    pub fn area_fraction(&self, frame_width: u32, frame_height: u32) -> f32 {
        let frame_area = frame_width as f32 * frame_height as f32;
        if frame_area <= 0.0 {
            return 0.0;
        }
        self.area() / frame_area * 100.0
    }

    /// True when either extent is non-positive.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Generates a short stable identifier for a region.
fn new_region_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Identity of the detector that produced a result, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Fixed-morphology contour detection.
    ContourLegacy,
    /// Contrast-enhanced contour detection with shape filtering.
    Contour,
    /// Saliency-mask-driven detection.
    SalientMask,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorKind::ContourLegacy => write!(f, "contour_legacy"),
            DetectorKind::Contour => write!(f, "contour"),
            DetectorKind::SalientMask => write!(f, "salient_mask"),
        }
    }
}

/// The outcome of running a detector over a frame.
///
/// Regions are ordered larger-area-first. An empty region list is a valid
/// outcome meaning no photos were found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// The detected regions.
    pub regions: Vec<PhotoRegion>,
    /// Which detector produced them.
    pub detector: DetectorKind,
}

impl Detection {
    /// True when no qualifying regions were found.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_ids_are_unique_and_short() {
        let a = PhotoRegion::new(Point::new(0.0, 0.0), 10.0, 10.0, 0.0);
        let b = PhotoRegion::new(Point::new(0.0, 0.0), 10.0, 10.0, 0.0);
        assert_eq!(a.id.len(), 8);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_angle_normalized_at_creation() {
        let region = PhotoRegion::new(Point::new(0.0, 0.0), 10.0, 5.0, -10.0);
        assert!((region.angle - 350.0).abs() < 1e-4);
    }

    #[test]
    fn test_from_rect_fit_swaps_to_long_side_first() {
        let fit = RectFit {
            center: Point::new(50.0, 50.0),
            width: 20.0,
            height: 40.0,
            angle: 0.0,
        };
        let region = PhotoRegion::from_rect_fit(&fit, 5.0);
        assert_eq!(region.width, 50.0);
        assert_eq!(region.height, 30.0);
        assert_eq!(region.angle, 90.0);
    }

    #[test]
    fn test_from_rect_fit_axis_aligned_gets_zero_angle() {
        let fit = RectFit {
            center: Point::new(50.0, 50.0),
            width: 40.0,
            height: 20.0,
            angle: 180.0,
        };
        let region = PhotoRegion::from_rect_fit(&fit, 0.0);
        assert_eq!(region.angle, 0.0);
        assert_eq!(region.width, 40.0);
    }

    #[test]
    fn test_corners_axis_aligned() {
        let region = PhotoRegion::new(Point::new(10.0, 10.0), 4.0, 2.0, 0.0);
        let corners = region.corners();
        assert_eq!(corners[0], Point::new(8.0, 9.0));
        assert_eq!(corners[1], Point::new(12.0, 9.0));
        assert_eq!(corners[2], Point::new(12.0, 11.0));
        assert_eq!(corners[3], Point::new(8.0, 11.0));
    }

    #[test]
    fn test_corners_quarter_turn() {
        let region = PhotoRegion::new(Point::new(0.0, 0.0), 4.0, 2.0, 90.0);
        let corners = region.corners();
        // Clockwise quarter turn maps (-2, -1) to (1, -2)
        assert!((corners[0].x - 1.0).abs() < 1e-4);
        assert!((corners[0].y - -2.0).abs() < 1e-4);
    }

    #[test]
    fn test_area_fraction_percentage() {
        let region = PhotoRegion::new(Point::new(0.0, 0.0), 10.0, 10.0, 0.0);
        assert!((region.area_fraction(100, 100) - 1.0).abs() < 1e-4);
        assert_eq!(region.area_fraction(0, 100), 0.0);
    }

    #[test]
    fn test_id_survives_serde_round_trip() {
        let region = PhotoRegion::new(Point::new(3.0, 4.0), 10.0, 5.0, 30.0);
        let json = serde_json::to_string(&region).unwrap();
        let back: PhotoRegion = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, region.id);
        assert_eq!(back, region);
    }
}
