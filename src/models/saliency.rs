//! Model-backed saliency mask provider.
//!
//! Wraps a U2-Net-style salient object detection model: the frame is resized
//! to the model's input resolution, the predicted saliency map is min-max
//! normalized into an 8-bit mask, and the detector upsamples it back to frame
//! coordinates. The mask stays at model resolution here on purpose; alignment
//! is the consumer's concern.

use crate::core::errors::{SimpleError, SplitError, SplitResult};
use crate::detectors::saliency::MaskProvider;
use crate::models::inference::{OnnxSession, Tensor4D};
use image::{GrayImage, RgbImage, imageops::FilterType};
use ndarray::ArrayView2;
use std::path::Path;
use tracing::debug;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Input size used when the model does not declare static spatial dimensions.
/// 320x320 is the resolution U2-Net variants are trained at.
const DEFAULT_INPUT_SIZE: (u32, u32) = (320, 320);

/// Salient object segmentation model producing foreground masks.
#[derive(Debug)]
pub struct U2NetMaskProvider {
    session: OnnxSession,
    input_size: (u32, u32),
}

impl U2NetMaskProvider {
    /// Loads the segmentation model from an ONNX model file.
    pub fn load(model_path: impl AsRef<Path>) -> SplitResult<Self> {
        let session = OnnxSession::load(model_path)?;
        let input_size = session.input_hw().unwrap_or(DEFAULT_INPUT_SIZE);
        debug!(
            "loaded saliency model '{}' with input size {:?}",
            session.model_name(),
            input_size
        );
        Ok(Self {
            session,
            input_size,
        })
    }

    fn preprocess(&self, frame: &RgbImage) -> Tensor4D {
        let (height, width) = self.input_size;
        let resized = image::imageops::resize(frame, width, height, FilterType::Triangle);

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
}

impl MaskProvider for U2NetMaskProvider {
    fn saliency_mask(&self, frame: &RgbImage) -> SplitResult<GrayImage> {
        let tensor = self.preprocess(frame);
        let output = self.session.infer_4d(&tensor)?;

        let shape = output.shape();
        if shape[0] < 1 || shape[1] < 1 {
            return Err(SplitError::inference(
                self.session.model_name(),
                &format!("saliency output has empty batch or channel: {:?}", shape),
                SimpleError::new("unexpected output shape"),
            ));
        }

        // The fused prediction map is the first channel of the first output
        let map = output.index_axis(ndarray::Axis(0), 0);
        let map = map.index_axis(ndarray::Axis(0), 0);
        Ok(map_to_gray(&map))
    }
}

/// Min-max normalizes a saliency map into an 8-bit grayscale mask.
pub(crate) fn map_to_gray(map: &ArrayView2<'_, f32>) -> GrayImage {
    let (height, width) = map.dim();
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &value in map.iter() {
        min = min.min(value);
        max = max.max(value);
    }
    let range = (max - min).max(f32::EPSILON);

    let mut mask = GrayImage::new(width as u32, height as u32);
    for ((y, x), &value) in map.indexed_iter() {
        let scaled = ((value - min) / range * 255.0).round().clamp(0.0, 255.0) as u8;
        mask.put_pixel(x as u32, y as u32, image::Luma([scaled]));
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_map_to_gray_spans_full_range() {
        let map = Array2::from_shape_fn((4, 8), |(y, x)| (y * 8 + x) as f32);
        let mask = map_to_gray(&map.view());
        assert_eq!(mask.dimensions(), (8, 4));
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(7, 3)[0], 255);
    }

    #[test]
    fn test_map_to_gray_constant_map_does_not_divide_by_zero() {
        let map = Array2::from_elem((3, 3), 0.7f32);
        let mask = map_to_gray(&map.view());
        assert_eq!(mask.get_pixel(1, 1)[0], 0);
    }

    #[test]
    fn test_load_missing_model_is_model_unavailable() {
        let result = U2NetMaskProvider::load("/nonexistent/u2netp.onnx");
        assert!(matches!(result, Err(SplitError::ModelUnavailable { .. })));
    }
}
