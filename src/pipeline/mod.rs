//! Detection orchestration.
//!
//! The orchestrator is the crate's front door: it validates inputs, picks
//! the detector for the requested mode, orders the results, and exposes
//! cropping and orientation correction with the model-to-heuristic fallback
//! contract. Every function here is a pure synchronous computation over the
//! caller's frame; separate calls are independent and freely parallelizable.

pub mod heuristic;

use crate::core::config::{DetectionConfig, DetectionMode, OrientationConfig};
use crate::core::errors::{SplitError, SplitResult};
use crate::detectors::{
    ContourDetector, ContourLegacyDetector, MaskProvider, PhotoDetector, SalientMaskDetector,
};
use crate::domain::orientation::OrientationDecision;
use crate::domain::region::{Detection, DetectorKind, PhotoRegion};
use crate::models::OrientationClassifier;
use crate::processors::crop::extract_rotated;
use image::RgbImage;
use tracing::{debug, warn};

/// Detects photo regions in a scanned frame.
///
/// Dispatches to the detector selected by `config.mode`. Salient-mask mode
/// requires a mask provider: if none is supplied the call fails with
/// `ModelUnavailable` rather than silently running a different strategy, so
/// an explicit mode selection is never overridden. Finding nothing is a
/// valid outcome and yields an empty [`Detection`].
///
/// Regions come back ordered larger-area-first with a deterministic
/// tie-break on position.
pub fn detect(
    frame: &RgbImage,
    config: &DetectionConfig,
    mask_provider: Option<&dyn MaskProvider>,
) -> SplitResult<Detection> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(SplitError::invalid_image(format!(
            "frame has zero dimension ({}x{})",
            frame.width(),
            frame.height()
        )));
    }
    config.validate()?;

    let (detector, mut regions): (DetectorKind, Vec<PhotoRegion>) = match config.mode {
        DetectionMode::ContourLegacy => {
            let detector = ContourLegacyDetector;
            (detector.kind(), detector.detect(frame, config)?)
        }
        DetectionMode::Contour => {
            let detector = ContourDetector;
            (detector.kind(), detector.detect(frame, config)?)
        }
        DetectionMode::SalientMask => {
            let provider = mask_provider.ok_or_else(|| {
                SplitError::model_unavailable(
                    "saliency mask provider",
                    "salient_mask mode requires a mask provider; supply one or \
                     select another detection mode explicitly",
                )
            })?;
            let detector = SalientMaskDetector::new(provider);
            (detector.kind(), detector.detect(frame, config)?)
        }
    };

    // Larger regions first, to aid presentation downstream
    regions.sort_by(|a, b| {
        b.area()
            .partial_cmp(&a.area())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.center
                    .y
                    .partial_cmp(&b.center.y)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(
                a.center
                    .x
                    .partial_cmp(&b.center.x)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    debug!("{} detected {} region(s)", detector, regions.len());

    Ok(Detection { regions, detector })
}

/// Extracts the pixel content of a region as an axis-aligned image.
///
/// See [`extract_rotated`] for the clamping and error contract.
pub fn crop(frame: &RgbImage, region: &PhotoRegion) -> SplitResult<RgbImage> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(SplitError::invalid_image("cannot crop from an empty frame"));
    }
    extract_rotated(frame, region)
}

/// Decides the rotation needed to present a cropped photo upright.
///
/// When a classifier is supplied and enabled, its top class is used as long
/// as the prediction clears the configured confidence threshold. The edge
/// heuristic takes over when the model is absent, disabled, fails, or is not
/// confident enough; every fallback is logged. The returned decision's
/// source tag records which path produced it.
pub fn classify_orientation(
    image: &RgbImage,
    classifier: Option<&OrientationClassifier>,
    config: &OrientationConfig,
) -> OrientationDecision {
    if config.use_model
        && let Some(model) = classifier
    {
        match model.classify(image) {
            Ok(decision) => {
                let confident = config
                    .confidence_threshold
                    .is_none_or(|threshold| decision.confidence >= threshold);
                if confident {
                    return decision;
                }
                debug!(
                    "orientation model confidence {:.3} below threshold {:?}, \
                     using edge heuristic",
                    decision.confidence, config.confidence_threshold
                );
            }
            Err(error) => {
                warn!(
                    "orientation model failed ({}), falling back to edge heuristic",
                    error
                );
            }
        }
    }

    heuristic::detect_rotation_by_edges(image)
}

/// Detects and crops in one step.
///
/// When no region qualifies, the whole frame is returned as the single crop,
/// so a scan that already contains exactly one borderless photo still
/// produces output.
pub fn detect_and_crop(
    frame: &RgbImage,
    config: &DetectionConfig,
    mask_provider: Option<&dyn MaskProvider>,
) -> SplitResult<Vec<RgbImage>> {
    let detection = detect(frame, config, mask_provider)?;

    if detection.is_empty() {
        debug!("no regions detected, returning the whole frame");
        return Ok(vec![frame.clone()]);
    }

    detection
        .regions
        .iter()
        .map(|region| crop(frame, region))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::synthetic_scan;

    #[test]
    fn test_zero_dimension_frame_is_invalid_image() {
        let frame = RgbImage::new(0, 0);
        let result = detect(&frame, &DetectionConfig::default(), None);
        assert!(matches!(result, Err(SplitError::InvalidImage { .. })));
    }

    #[test]
    fn test_mask_mode_without_provider_is_model_unavailable() {
        let frame = synthetic_scan(100, 100, &[]);
        let config = DetectionConfig::default().with_mode(DetectionMode::SalientMask);
        let result = detect(&frame, &config, None);
        assert!(matches!(result, Err(SplitError::ModelUnavailable { .. })));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let frame = synthetic_scan(100, 100, &[]);
        let config = DetectionConfig::default().with_area_band(50.0, 10.0);
        assert!(matches!(
            detect(&frame, &config, None),
            Err(SplitError::Config { .. })
        ));
    }

    #[test]
    fn test_zero_detections_is_empty_result_not_error() {
        let frame = synthetic_scan(300, 300, &[]);
        let detection = detect(&frame, &DetectionConfig::default(), None).unwrap();
        assert!(detection.is_empty());
        assert_eq!(detection.detector, DetectorKind::Contour);
    }

    #[test]
    fn test_regions_ordered_larger_first() {
        let frame = synthetic_scan(400, 400, &[(30, 30, 80, 70), (180, 180, 190, 170)]);
        let detection = detect(&frame, &DetectionConfig::default(), None).unwrap();

        assert_eq!(detection.regions.len(), 2);
        assert!(detection.regions[0].area() > detection.regions[1].area());
    }

    #[test]
    fn test_detected_regions_respect_area_band_after_orchestration() {
        let frame = synthetic_scan(
            400,
            400,
            &[(30, 30, 130, 120), (200, 160, 180, 230), (40, 330, 40, 40)],
        );

        for mode in [DetectionMode::ContourLegacy, DetectionMode::Contour] {
            let config = DetectionConfig::default()
                .with_mode(mode)
                .with_area_band(5.0, 80.0);
            let detection = detect(&frame, &config, None).unwrap();
            assert_eq!(detection.regions.len(), 2, "mode {:?}", mode);
            for region in &detection.regions {
                let pct = region.area_fraction(400, 400);
                assert!((5.0..=80.0).contains(&pct));
            }
        }
    }

    #[test]
    fn test_detect_and_crop_falls_back_to_whole_frame() {
        let frame = synthetic_scan(200, 200, &[]);
        let crops = detect_and_crop(&frame, &DetectionConfig::default(), None).unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].dimensions(), frame.dimensions());
    }

    #[test]
    fn test_detect_and_crop_produces_one_crop_per_region() {
        let frame = synthetic_scan(400, 400, &[(40, 40, 120, 100), (220, 220, 150, 130)]);
        let crops = detect_and_crop(&frame, &DetectionConfig::default(), None).unwrap();
        assert_eq!(crops.len(), 2);
        for crop in &crops {
            assert!(crop.width() > 0 && crop.height() > 0);
        }
    }

    #[test]
    fn test_classify_orientation_without_model_uses_heuristic() {
        let image = heuristic::test_support::striped_landscape();
        let decision = classify_orientation(&image, None, &OrientationConfig::default());
        assert_eq!(decision.source, crate::domain::DecisionSource::Heuristic);
        assert_eq!(decision.orientation, crate::domain::Orientation::Deg0);
    }

    #[test]
    fn test_classify_orientation_with_model_disabled_uses_heuristic() {
        let image = heuristic::test_support::striped_landscape();
        let mut config = OrientationConfig::default();
        config.use_model = false;
        let decision = classify_orientation(&image, None, &config);
        assert_eq!(decision.source, crate::domain::DecisionSource::Heuristic);
    }

    #[test]
    fn test_region_ids_survive_detect_edit_crop_round_trip() {
        let frame = synthetic_scan(400, 400, &[(60, 60, 160, 140)]);
        let detection = detect(&frame, &DetectionConfig::default(), None).unwrap();
        assert_eq!(detection.regions.len(), 1);

        // Simulate an external editor adjusting the box and handing it back
        let mut edited = detection.regions[0].clone();
        edited.width += 12.0;
        edited.angle = crate::processors::normalize_angle(edited.angle + 3.0);

        assert_eq!(edited.id, detection.regions[0].id);
        let cropped = crop(&frame, &edited).unwrap();
        assert_eq!(
            cropped.dimensions(),
            (edited.width.round() as u32, edited.height.round() as u32)
        );
    }
}
