//! Model-backed orientation classification.
//!
//! Wraps a 4-class image classification model that predicts which quarter
//! turn presents a photo upright. Preprocessing follows the usual
//! classification recipe: resize to the model's input size, scale to `[0, 1]`,
//! normalize with ImageNet statistics, CHW layout.

use crate::core::config::OrientationConfig;
use crate::core::errors::{SimpleError, SplitError, SplitResult};
use crate::domain::orientation::{
    DecisionSource, OrientationDecision, parse_orientation_label,
};
use crate::models::inference::{OnnxSession, Tensor4D};
use image::{RgbImage, imageops::FilterType};
use std::path::Path;
use tracing::debug;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Input size used when the model does not declare static spatial dimensions.
const DEFAULT_INPUT_SIZE: (u32, u32) = (224, 224);

/// A 4-class orientation classification model.
#[derive(Debug)]
pub struct OrientationClassifier {
    session: OnnxSession,
    input_size: (u32, u32),
    class_rotations: [u32; 4],
}

impl OrientationClassifier {
    /// Loads the classifier from an ONNX model file.
    ///
    /// The input size is taken from the model when it declares static
    /// dimensions, falling back to 224x224.
    pub fn load(model_path: impl AsRef<Path>, config: &OrientationConfig) -> SplitResult<Self> {
        config.validate()?;
        let session = OnnxSession::load(model_path)?;
        let input_size = session.input_hw().unwrap_or(DEFAULT_INPUT_SIZE);
        debug!(
            "loaded orientation model '{}' with input size {:?}",
            session.model_name(),
            input_size
        );
        Ok(Self {
            session,
            input_size,
            class_rotations: config.class_rotations,
        })
    }

    /// Resizes and normalizes an image into an NCHW batch of one.
    fn preprocess(&self, image: &RgbImage) -> Tensor4D {
        let (height, width) = self.input_size;
        let resized = image::imageops::resize(image, width, height, FilterType::Lanczos3);

        let mut tensor = Tensor4D::zeros((1, 3, height as usize, width as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                let value = pixel.0[c] as f32 / 255.0;
                tensor[[0, c, y as usize, x as usize]] =
                    (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            }
        }
        tensor
    }

    /// Classifies the rotation needed to present the image upright.
    pub fn classify(&self, image: &RgbImage) -> SplitResult<OrientationDecision> {
        let tensor = self.preprocess(image);
        let logits = self.session.infer_2d(&tensor)?;

        if logits.ncols() != 4 || logits.nrows() == 0 {
            return Err(SplitError::inference(
                self.session.model_name(),
                &format!(
                    "expected a 1x4 class output, got {}x{}",
                    logits.nrows(),
                    logits.ncols()
                ),
                SimpleError::new("unexpected class count"),
            ));
        }

        let row: Vec<f32> = logits.row(0).to_vec();
        let probabilities = softmax(&row);
        let (class_id, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or((0, 0.0));

        let orientation = parse_orientation_label(self.class_rotations[class_id]);
        debug!(
            "orientation model predicted {} with confidence {:.3}",
            orientation, confidence
        );

        Ok(OrientationDecision {
            orientation,
            confidence,
            source: DecisionSource::Model,
        })
    }
}

/// Numerically stable softmax.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 {
        return vec![1.0 / logits.len().max(1) as f32; logits.len()];
    }
    exps.iter().map(|&v| v / sum).collect()
}
