//! # scansplit
//!
//! Detects discrete photographs embedded in a single scanned raster image,
//! expresses each as a rotated rectangle, and produces correctly oriented
//! crops from those rectangles.
//!
//! ## Features
//!
//! - Three interchangeable detection strategies behind one orchestrator:
//!   a fixed-morphology legacy contour detector, a contrast-enhanced contour
//!   detector with shape-quality filtering (the default), and a
//!   saliency-mask-driven detector fed by an external segmentation model
//! - Rotated-rectangle geometry with one consistent rotation convention from
//!   detection through cropping
//! - Deskewing crops via inverse-mapped affine warping with bilinear
//!   sampling
//! - Orientation correction through a 4-class ONNX model with a
//!   deterministic edge-heuristic fallback
//!
//! ## Modules
//!
//! * [`core`] - Error types and configuration
//! * [`domain`] - Photo regions, detection results, orientation decisions
//! * [`processors`] - Geometry, preprocessing, and rotated-crop extraction
//! * [`detectors`] - The detection strategies
//! * [`models`] - ONNX-backed orientation and saliency models
//! * [`pipeline`] - The orchestrator
//! * [`utils`] - Image loading and logging helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scansplit::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = load_image(Path::new("scan.jpg"))?;
//!
//! let config = DetectionConfig::default().with_area_band(2.0, 80.0);
//! let detection = detect(&frame, &config, None)?;
//!
//! for region in &detection.regions {
//!     let photo = crop(&frame, region)?;
//!     let decision = classify_orientation(&photo, None, &OrientationConfig::default());
//!     let upright = apply_orientation(&photo, decision.orientation);
//!     upright.save(format!("photo-{}.png", region.id))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod detectors;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Brings the orchestrator entry points, the central types, and the
/// essential configuration into scope with a single use statement.
pub mod prelude {
    pub use crate::core::{
        DetectionConfig, DetectionMode, OrientationConfig, SplitError, SplitResult,
    };
    pub use crate::detectors::MaskProvider;
    pub use crate::domain::{
        Detection, DetectorKind, Orientation, OrientationDecision, PhotoRegion, apply_orientation,
    };
    pub use crate::pipeline::{classify_orientation, crop, detect, detect_and_crop};
    pub use crate::utils::load_image;
}
