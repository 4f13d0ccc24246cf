//! Model loading and the process-scoped model cache.
//!
//! Both models are loaded lazily on first use and cached for the process
//! lifetime. The cache lock is held across the load, so concurrent callers
//! block on a single in-flight load instead of each building their own
//! session. Model file acquisition (downloading, verifying) belongs to the
//! embedding application; a missing or unloadable file surfaces as
//! [`SplitError::ModelUnavailable`](crate::core::errors::SplitError).

pub mod inference;
pub mod orientation;
pub mod saliency;

pub use inference::{OnnxSession, Tensor2D, Tensor4D};
pub use orientation::OrientationClassifier;
pub use saliency::U2NetMaskProvider;

use crate::core::config::OrientationConfig;
use crate::core::errors::SplitResult;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

static ORIENTATION_CACHE: Lazy<Mutex<Option<Arc<OrientationClassifier>>>> =
    Lazy::new(|| Mutex::new(None));
static SALIENCY_CACHE: Lazy<Mutex<Option<Arc<U2NetMaskProvider>>>> =
    Lazy::new(|| Mutex::new(None));

/// Returns the process-wide orientation classifier, loading it on first use.
///
/// The first successful load wins: later calls return the cached model even
/// if they pass a different path. Use [`clear_model_cache`] to force a
/// reload.
pub fn orientation_classifier(
    model_path: impl AsRef<Path>,
    config: &OrientationConfig,
) -> SplitResult<Arc<OrientationClassifier>> {
    let mut cache = ORIENTATION_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(model) = cache.as_ref() {
        return Ok(model.clone());
    }
    let model = Arc::new(OrientationClassifier::load(model_path, config)?);
    debug!("orientation classifier cached for process lifetime");
    *cache = Some(model.clone());
    Ok(model)
}

/// Returns the process-wide saliency mask provider, loading it on first use.
///
/// Caching behaves as in [`orientation_classifier`].
pub fn salient_mask_provider(model_path: impl AsRef<Path>) -> SplitResult<Arc<U2NetMaskProvider>> {
    let mut cache = SALIENCY_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(model) = cache.as_ref() {
        return Ok(model.clone());
    }
    let model = Arc::new(U2NetMaskProvider::load(model_path)?);
    debug!("saliency mask provider cached for process lifetime");
    *cache = Some(model.clone());
    Ok(model)
}

/// Drops both cached models so the next call reloads them. Intended for
/// tests and for applications that replace model files at runtime.
pub fn clear_model_cache() {
    *ORIENTATION_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    *SALIENCY_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}
