//! Thin wrapper around an ONNX Runtime session.
//!
//! Input and output tensor names are discovered from the session itself, the
//! session sits behind a mutex so a loaded model can be shared across
//! threads, and extraction helpers validate output ranks before handing
//! tensors back to callers.

use crate::core::errors::{SimpleError, SplitError, SplitResult};
use ndarray::{Array2, Array4};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 4D tensor in NCHW layout.
pub type Tensor4D = Array4<f32>;
/// 2D tensor, batch by classes.
pub type Tensor2D = Array2<f32>;

/// An ONNX model loaded into an ONNX Runtime session.
pub struct OnnxSession {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_shape: Option<Vec<i64>>,
    model_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSession")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OnnxSession {
    /// Loads a model from a file path.
    ///
    /// A missing file or a failure to build the session both surface as
    /// `SplitError::ModelUnavailable`, so callers can distinguish "the model
    /// is not usable" from a failure while running it.
    pub fn load(model_path: impl AsRef<Path>) -> SplitResult<Self> {
        let path = model_path.as_ref();
        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        if !path.exists() {
            return Err(SplitError::model_unavailable(
                model_name,
                format!("model file not found at '{}'", path.display()),
            ));
        }

        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .commit_from_file(path)
            .map_err(|e| {
                SplitError::model_unavailable(
                    model_name.clone(),
                    format!("failed to create ONNX session: {}", e),
                )
            })?;

        let input = session.inputs.first().ok_or_else(|| {
            SplitError::model_unavailable(model_name.clone(), "model declares no inputs")
        })?;
        let input_name = input.name.clone();
        let input_shape = match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        };

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                SplitError::model_unavailable(model_name.clone(), "model declares no outputs")
            })?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_shape,
            model_name,
            model_path: path.to_path_buf(),
        })
    }

    /// Returns the model name derived from the file stem.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model path this session was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the declared `(height, width)` of an NCHW input, when the
    /// model carries static spatial dimensions.
    pub fn input_hw(&self) -> Option<(u32, u32)> {
        let shape = self.input_shape.as_ref()?;
        if shape.len() != 4 {
            return None;
        }
        let (h, w) = (shape[2], shape[3]);
        if h > 0 && w > 0 {
            Some((h as u32, w as u32))
        } else {
            None
        }
    }

    fn run_with<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> SplitResult<T>,
    ) -> SplitResult<T> {
        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            SplitError::inference(
                &self.model_name,
                &format!("failed to convert input tensor with shape {:?}", x.shape()),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let outputs = session.run(inputs).map_err(|e| {
            SplitError::inference(
                &self.model_name,
                &format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                SplitError::inference(
                    &self.model_name,
                    &format!("failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        processor(shape, data)
    }

    /// Runs the model and returns a 2D output (batch by classes).
    pub fn infer_2d(&self, x: &Tensor4D) -> SplitResult<Tensor2D> {
        self.run_with(x, |shape, data| {
            if shape.len() != 2 {
                return Err(SplitError::inference(
                    &self.model_name,
                    &format!("expected a 2D output tensor, got shape {:?}", shape),
                    SimpleError::new("unexpected output rank"),
                ));
            }
            Ok(Tensor2D::from_shape_vec(
                (shape[0] as usize, shape[1] as usize),
                data.to_vec(),
            )?)
        })
    }

    /// Runs the model and returns a 4D output (NCHW maps).
    pub fn infer_4d(&self, x: &Tensor4D) -> SplitResult<Tensor4D> {
        self.run_with(x, |shape, data| {
            if shape.len() != 4 {
                return Err(SplitError::inference(
                    &self.model_name,
                    &format!("expected a 4D output tensor, got shape {:?}", shape),
                    SimpleError::new("unexpected output rank"),
                ));
            }
            Ok(Tensor4D::from_shape_vec(
                (
                    shape[0] as usize,
                    shape[1] as usize,
                    shape[2] as usize,
                    shape[3] as usize,
                ),
                data.to_vec(),
            )?)
        })
    }
}
