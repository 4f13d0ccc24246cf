//! Error types for the scan-splitting pipeline.
//!
//! This module defines the error taxonomy shared by detection, cropping, and
//! orientation correction, along with helper constructors for attaching
//! context to failures deep inside the processing stages.

use thiserror::Error;

/// Enum representing different stages of processing in the detection pipeline.
///
/// Used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during grayscale conversion, blurring, or thresholding.
    Preprocess,
    /// Error occurred during contour extraction or rectangle fitting.
    ContourExtraction,
    /// Error occurred during rotated-crop extraction.
    Crop,
    /// Error occurred while preparing or reading model tensors.
    TensorOperation,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Preprocess => write!(f, "preprocess"),
            ProcessingStage::ContourExtraction => write!(f, "contour extraction"),
            ProcessingStage::Crop => write!(f, "crop"),
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur while splitting a scan.
#[derive(Error, Debug)]
pub enum SplitError {
    /// Error occurred while loading or decoding an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// The input frame is unusable (zero dimensions, undecodable content).
    #[error("invalid image: {message}")]
    InvalidImage {
        /// A message describing why the frame was rejected.
        message: String,
    },

    /// A degenerate or malformed box was supplied for cropping.
    #[error("invalid box: {message}")]
    InvalidBox {
        /// A message describing why the box was rejected.
        message: String,
    },

    /// A required model or mask provider is not available.
    ///
    /// This is distinct from an inference failure: the resource was never
    /// usable in the first place (missing file, no provider configured), and
    /// the caller decides whether to supply it or pick another detection mode.
    #[error("model unavailable: {resource}: {reason}")]
    ModelUnavailable {
        /// The resource that is missing (model name or provider role).
        resource: String,
        /// Why it is unavailable.
        reason: String,
    },

    /// Error occurred during a processing stage.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage of the pipeline where the error occurred.
        stage: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during model inference.
    #[error("inference with '{model_name}' failed: {context}")]
    Inference {
        /// The model that failed.
        model_name: String,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for scan-splitting operations.
pub type SplitResult<T> = Result<T, SplitError>;

impl SplitError {
    /// Creates a SplitError for an unusable input frame.
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
        }
    }

    /// Creates a SplitError for a degenerate or malformed box.
    pub fn invalid_box(message: impl Into<String>) -> Self {
        Self::InvalidBox {
            message: message.into(),
        }
    }

    /// Creates a SplitError for a missing model or provider.
    pub fn model_unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Creates a SplitError for a failed processing stage.
    pub fn processing(
        stage: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a SplitError for a failed model inference.
    pub fn inference(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a SplitError for a configuration problem.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for SplitError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

/// A plain string error for wrapping message-only failures as an error source.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SplitError::invalid_box("width must be positive");
        assert_eq!(err.to_string(), "invalid box: width must be positive");

        let err = SplitError::model_unavailable("saliency mask provider", "no provider configured");
        assert_eq!(
            err.to_string(),
            "model unavailable: saliency mask provider: no provider configured"
        );
    }

    #[test]
    fn test_processing_stage_display() {
        assert_eq!(ProcessingStage::Preprocess.to_string(), "preprocess");
        assert_eq!(
            ProcessingStage::ContourExtraction.to_string(),
            "contour extraction"
        );
    }

    #[test]
    fn test_processing_constructor_keeps_stage() {
        let err = SplitError::processing(
            ProcessingStage::Crop,
            "output size overflow",
            SimpleError::new("too large"),
        );
        match err {
            SplitError::Processing { stage, .. } => assert_eq!(stage, ProcessingStage::Crop),
            _ => panic!("expected Processing variant"),
        }
    }
}
