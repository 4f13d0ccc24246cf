//! Domain types: detected regions, detection results, and orientation
//! decisions.

pub mod orientation;
pub mod region;

pub use orientation::{DecisionSource, Orientation, OrientationDecision, apply_orientation};
pub use region::{Detection, DetectorKind, PhotoRegion};
