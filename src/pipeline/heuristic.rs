//! Deterministic edge-based orientation fallback.
//!
//! Scores each quarter-turn hypothesis and picks the best. The score favors
//! rotations that make detected lines horizontal (horizons, table edges,
//! building silhouettes) and that put the brighter band at the top of the
//! image (sky, studio backdrops). Self-contained: no model files, no
//! network, identical output for identical input.

use crate::domain::orientation::{
    DecisionSource, Orientation, OrientationDecision, apply_orientation,
};
use crate::processors::preprocess;
use image::{GrayImage, RgbImage};
use imageproc::edges::canny;
use imageproc::hough::{LineDetectionOptions, detect_lines};
use tracing::debug;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
/// Polar lines within this many degrees of 90 count as horizontal.
const HORIZONTAL_TOLERANCE: u32 = 10;
/// Weight of one horizontal line against one luma level of top-bottom bias.
const LINE_WEIGHT: f32 = 10.0;
const VOTE_THRESHOLD: u32 = 60;
const SUPPRESSION_RADIUS: u32 = 8;

/// Scores how upright an image looks.
///
/// Combines the number of near-horizontal Hough lines in a Canny edge map
/// with the luma difference between the top and bottom thirds. Higher is
/// more upright.
fn score_alignment(gray: &GrayImage) -> f32 {
    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: VOTE_THRESHOLD,
            suppression_radius: SUPPRESSION_RADIUS,
        },
    );

    // r = x cos(theta) + y sin(theta): a horizontal line has theta near 90
    let horizontal = lines
        .iter()
        .filter(|line| line.angle_in_degrees.abs_diff(90) <= HORIZONTAL_TOLERANCE)
        .count();

    horizontal as f32 * LINE_WEIGHT + top_bottom_bias(gray)
}

/// Mean luma of the top third minus mean luma of the bottom third.
fn top_bottom_bias(gray: &GrayImage) -> f32 {
    let (width, height) = gray.dimensions();
    let band = height / 3;
    if band == 0 || width == 0 {
        return 0.0;
    }

    let band_mean = |y0: u32, y1: u32| -> f32 {
        let mut sum = 0u64;
        for y in y0..y1 {
            for x in 0..width {
                sum += gray.get_pixel(x, y)[0] as u64;
            }
        }
        sum as f32 / ((y1 - y0) as u64 * width as u64) as f32
    };

    band_mean(0, band) - band_mean(height - band, height)
}

/// Picks the quarter turn that maximizes the alignment score.
///
/// All four hypotheses are evaluated; ties prefer the smaller rotation, so a
/// featureless image comes back as already upright. The confidence is the
/// winning hypothesis' share of the total (shifted) score mass.
pub fn detect_rotation_by_edges(image: &RgbImage) -> OrientationDecision {
    let mut scores = [0.0f32; 4];
    for (i, orientation) in Orientation::ALL.into_iter().enumerate() {
        let rotated = apply_orientation(image, orientation);
        let gray = preprocess::to_grayscale(&rotated);
        scores[i] = score_alignment(&gray);
    }

    let mut best_idx = 0;
    for i in 1..4 {
        if scores[i] > scores[best_idx] {
            best_idx = i;
        }
    }

    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let shifted_sum: f32 = scores.iter().map(|s| s - min).sum();
    let confidence = if shifted_sum > f32::EPSILON {
        (scores[best_idx] - min) / shifted_sum
    } else {
        0.25
    };

    let orientation = Orientation::ALL[best_idx];
    debug!(
        "edge heuristic scores {:?}, picked {} ({:.2})",
        scores, orientation, confidence
    );

    OrientationDecision {
        orientation,
        confidence,
        source: DecisionSource::Heuristic,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::striped_landscape;
    use super::*;

    #[test]
    fn test_upright_image_scores_zero_rotation() {
        let decision = detect_rotation_by_edges(&striped_landscape());
        assert_eq!(decision.orientation, Orientation::Deg0);
        assert_eq!(decision.source, DecisionSource::Heuristic);
        assert!(decision.confidence > 0.25);
    }

    #[test]
    fn test_injected_rotation_is_recovered_and_correction_is_idempotent() {
        let upright = striped_landscape();

        for injected in [Orientation::Deg90, Orientation::Deg180, Orientation::Deg270] {
            let rotated = apply_orientation(&upright, injected);

            let decision = detect_rotation_by_edges(&rotated);
            let expected = Orientation::from_degrees(360 - injected.degrees()).unwrap();
            assert_eq!(decision.orientation, expected, "injected {}", injected);

            // Applying the decision and re-classifying reports upright
            let corrected = apply_orientation(&rotated, decision.orientation);
            let second = detect_rotation_by_edges(&corrected);
            assert_eq!(second.orientation, Orientation::Deg0);
        }
    }

    #[test]
    fn test_featureless_image_defaults_to_upright() {
        let blank = RgbImage::from_pixel(60, 60, image::Rgb([200, 200, 200]));
        let decision = detect_rotation_by_edges(&blank);
        assert_eq!(decision.orientation, Orientation::Deg0);
    }

    #[test]
    fn test_top_bottom_bias_sign() {
        let mut gray = GrayImage::from_pixel(30, 30, image::Luma([200]));
        for y in 20..30 {
            for x in 0..30 {
                gray.put_pixel(x, y, image::Luma([50]));
            }
        }
        assert!(top_bottom_bias(&gray) > 100.0);
    }
}
