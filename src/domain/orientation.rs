//! Orientation decisions and rotation application.
//!
//! A photo crop is presented upright by rotating it by one of four quarter
//! turns. The decision carries a confidence and a source tag so diagnostics
//! can tell model output from the heuristic fallback, although both are
//! applied identically downstream.

use image::{RgbImage, imageops};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A quarter-turn rotation, clockwise in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Already upright.
    #[default]
    Deg0,
    /// Rotate 90 degrees clockwise.
    Deg90,
    /// Rotate 180 degrees.
    Deg180,
    /// Rotate 270 degrees clockwise.
    Deg270,
}

impl Orientation {
    /// All orientations in ascending order of rotation.
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    /// The rotation in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Builds an orientation from whole degrees, accepting only quarter turns.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Orientation::Deg0),
            90 => Some(Orientation::Deg90),
            180 => Some(Orientation::Deg180),
            270 => Some(Orientation::Deg270),
            _ => None,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Where an orientation decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The classification model's top class.
    Model,
    /// The deterministic edge heuristic.
    Heuristic,
}

/// The rotation needed to present a photo upright, with provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationDecision {
    /// The rotation to apply.
    pub orientation: Orientation,
    /// Confidence in the decision, in `[0, 1]`.
    pub confidence: f32,
    /// Whether the decision came from the model or the heuristic.
    pub source: DecisionSource,
}

/// Rotates an image by the given orientation.
///
/// Quarter turns are lossless pixel shuffles; no resampling occurs.
pub fn apply_orientation(image: &RgbImage, orientation: Orientation) -> RgbImage {
    match orientation {
        Orientation::Deg0 => image.clone(),
        Orientation::Deg90 => imageops::rotate90(image),
        Orientation::Deg180 => imageops::rotate180(image),
        Orientation::Deg270 => imageops::rotate270(image),
    }
}

/// Parses an orientation from a numeric label, warning on anything outside
/// the quarter-turn set and falling back to upright.
pub fn parse_orientation_label(label: u32) -> Orientation {
    match Orientation::from_degrees(label) {
        Some(orientation) => orientation,
        None => {
            warn!("unknown orientation label {}, defaulting to 0°", label);
            Orientation::Deg0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_from_degrees() {
        assert_eq!(Orientation::from_degrees(0), Some(Orientation::Deg0));
        assert_eq!(Orientation::from_degrees(90), Some(Orientation::Deg90));
        assert_eq!(Orientation::from_degrees(450), Some(Orientation::Deg90));
        assert_eq!(Orientation::from_degrees(45), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Orientation::Deg270.to_string(), "270°");
    }

    #[test]
    fn test_parse_orientation_label_fallback() {
        assert_eq!(parse_orientation_label(180), Orientation::Deg180);
        assert_eq!(parse_orientation_label(45), Orientation::Deg0);
    }

    #[test]
    fn test_apply_orientation_all_angles() {
        // 3x2 image with a red marker at the top-left
        let mut img = RgbImage::from_pixel(3, 2, Rgb([0, 0, 0]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));

        let same = apply_orientation(&img, Orientation::Deg0);
        assert_eq!(same.get_pixel(0, 0), &Rgb([255, 0, 0]));

        // Clockwise quarter turn: top-left moves to the top-right corner
        let quarter = apply_orientation(&img, Orientation::Deg90);
        assert_eq!(quarter.dimensions(), (2, 3));
        assert_eq!(quarter.get_pixel(1, 0), &Rgb([255, 0, 0]));

        let half = apply_orientation(&img, Orientation::Deg180);
        assert_eq!(half.dimensions(), (3, 2));
        assert_eq!(half.get_pixel(2, 1), &Rgb([255, 0, 0]));

        let three_quarter = apply_orientation(&img, Orientation::Deg270);
        assert_eq!(three_quarter.dimensions(), (2, 3));
        assert_eq!(three_quarter.get_pixel(0, 2), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_four_quarter_turns_restore_image() {
        let mut img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        img.put_pixel(1, 2, Rgb([200, 100, 50]));

        let mut rotated = img.clone();
        for _ in 0..4 {
            rotated = apply_orientation(&rotated, Orientation::Deg90);
        }
        assert_eq!(rotated, img);
    }
}
