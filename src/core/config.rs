//! Configuration for detection and orientation correction.
//!
//! Every tuned constant in the pipeline lives here as a field with a default,
//! so thresholds can be calibrated against representative scans instead of
//! being baked into the algorithms.

use crate::core::errors::{SplitError, SplitResult};
use serde::{Deserialize, Serialize};

/// Which detection strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Fixed-morphology contour detection. Predictable, no contrast
    /// enhancement, no shape filtering; kept as the simple fallback.
    ContourLegacy,
    /// Contrast-enhanced contour detection with adaptive morphology and
    /// shape-quality filtering.
    #[default]
    Contour,
    /// Detection driven by an externally supplied saliency mask.
    SalientMask,
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMode::ContourLegacy => write!(f, "contour_legacy"),
            DetectionMode::Contour => write!(f, "contour"),
            DetectionMode::SalientMask => write!(f, "salient_mask"),
        }
    }
}

/// Shape-quality thresholds applied by the default contour detector.
///
/// Each filter targets a distinct failure mode: solidity rejects ragged
/// non-photo blobs, the aspect bound rejects slivers, and extent rejects
/// L-shaped or highly concave regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeFilterConfig {
    /// Minimum ratio of contour area to convex-hull area.
    pub min_solidity: f32,
    /// Minimum ratio of contour area to fitted-rectangle area.
    pub min_extent: f32,
    /// Maximum ratio of the fitted rectangle's long side to its short side.
    pub max_aspect_ratio: f32,
}

impl Default for ShapeFilterConfig {
    fn default() -> Self {
        Self {
            min_solidity: 0.80,
            min_extent: 0.65,
            max_aspect_ratio: 6.0,
        }
    }
}

/// Configuration for the detection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Which detection strategy to run.
    pub mode: DetectionMode,
    /// Minimum region area as a percentage of the frame area.
    pub min_area_pct: f32,
    /// Maximum region area as a percentage of the frame area.
    pub max_area_pct: f32,
    /// Sigma of the Gaussian blur applied before thresholding.
    pub blur_sigma: f32,
    /// Radius of the local-mean window used for adaptive thresholding
    /// (the window is a square of side `2 * radius + 1`).
    pub threshold_block_radius: u32,
    /// Offset subtracted from the local mean before comparison; pixels darker
    /// than `mean - offset` become foreground.
    pub threshold_offset: i16,
    /// Morphology kernel radius used by the legacy detector.
    pub fixed_kernel_radius: u8,
    /// Fraction of the shorter frame dimension used to derive the morphology
    /// kernel radius in the default detector.
    pub kernel_fraction: f32,
    /// Inclusive bounds clamping the derived kernel radius.
    pub kernel_radius_bounds: (u8, u8),
    /// Replace each contour with its convex hull before rectangle fitting,
    /// bridging gaps from torn or irregular photo edges.
    pub use_convex_hull: bool,
    /// Shape-quality thresholds for the default detector.
    pub shape_filters: ShapeFilterConfig,
    /// Extra pixels added to each side of a fitted rectangle.
    pub padding: f32,
    /// Confidence cutoff in `(0, 1)` at which a saliency mask is binarized.
    pub mask_cutoff: f32,
    /// Minimum side length of a fitted rectangle, below which the candidate
    /// is discarded as degenerate.
    pub min_box_side: f32,
    /// Maximum number of contours considered per frame.
    pub max_candidates: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::default(),
            min_area_pct: 2.0,
            max_area_pct: 80.0,
            blur_sigma: 1.2,
            threshold_block_radius: 5,
            threshold_offset: 2,
            fixed_kernel_radius: 2,
            kernel_fraction: 0.004,
            kernel_radius_bounds: (1, 6),
            use_convex_hull: false,
            shape_filters: ShapeFilterConfig::default(),
            padding: 5.0,
            mask_cutoff: 0.5,
            min_box_side: 3.0,
            max_candidates: 1000,
        }
    }
}

impl DetectionConfig {
    /// Validates the configuration, returning a configuration error for any
    /// out-of-range field.
    pub fn validate(&self) -> SplitResult<()> {
        if !(0.0..=100.0).contains(&self.min_area_pct)
            || !(0.0..=100.0).contains(&self.max_area_pct)
        {
            return Err(SplitError::config(
                "area percentages must be within [0, 100]",
            ));
        }
        if self.min_area_pct >= self.max_area_pct {
            return Err(SplitError::config(format!(
                "min_area_pct ({}) must be below max_area_pct ({})",
                self.min_area_pct, self.max_area_pct
            )));
        }
        if self.blur_sigma <= 0.0 {
            return Err(SplitError::config("blur_sigma must be positive"));
        }
        if self.threshold_block_radius == 0 {
            return Err(SplitError::config(
                "threshold_block_radius must be at least 1",
            ));
        }
        if self.kernel_fraction <= 0.0 {
            return Err(SplitError::config("kernel_fraction must be positive"));
        }
        let (lo, hi) = self.kernel_radius_bounds;
        if lo == 0 || lo > hi {
            return Err(SplitError::config(
                "kernel_radius_bounds must satisfy 1 <= lo <= hi",
            ));
        }
        let filters = &self.shape_filters;
        if !(0.0..=1.0).contains(&filters.min_solidity)
            || !(0.0..=1.0).contains(&filters.min_extent)
        {
            return Err(SplitError::config(
                "min_solidity and min_extent must be within [0, 1]",
            ));
        }
        if filters.max_aspect_ratio < 1.0 {
            return Err(SplitError::config("max_aspect_ratio must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.mask_cutoff) || self.mask_cutoff == 0.0 {
            return Err(SplitError::config("mask_cutoff must be within (0, 1)"));
        }
        if self.min_box_side <= 0.0 {
            return Err(SplitError::config("min_box_side must be positive"));
        }
        if self.max_candidates == 0 {
            return Err(SplitError::config("max_candidates must be at least 1"));
        }
        Ok(())
    }

    /// Returns a copy of this configuration with the given area band,
    /// expressed as percentages of the frame area.
    pub fn with_area_band(mut self, min_area_pct: f32, max_area_pct: f32) -> Self {
        self.min_area_pct = min_area_pct;
        self.max_area_pct = max_area_pct;
        self
    }

    /// Returns a copy of this configuration with the given detection mode.
    pub fn with_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Configuration for orientation correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientationConfig {
    /// Whether the orientation model should be consulted at all. When false,
    /// the edge heuristic is used directly.
    pub use_model: bool,
    /// Confidence threshold for accepting model predictions; predictions
    /// below it fall back to the heuristic. `None` accepts any prediction.
    pub confidence_threshold: Option<f32>,
    /// Clockwise correction, in degrees, that each model class index maps to.
    pub class_rotations: [u32; 4],
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            use_model: true,
            confidence_threshold: Some(0.5),
            class_rotations: [0, 90, 180, 270],
        }
    }
}

impl OrientationConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> SplitResult<()> {
        if let Some(threshold) = self.confidence_threshold
            && !(0.0..=1.0).contains(&threshold)
        {
            return Err(SplitError::config(
                "confidence_threshold must be between 0.0 and 1.0",
            ));
        }
        for rotation in self.class_rotations {
            if rotation % 90 != 0 || rotation >= 360 {
                return Err(SplitError::config(format!(
                    "class rotation {} is not one of 0, 90, 180, 270",
                    rotation
                )));
            }
        }
        Ok(())
    }
}
