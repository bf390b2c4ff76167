//! Text region detection for table images.
//!
//! [`TextDetector`] is the capability the table pipeline consumes: an image in,
//! polygons in that image's pixel frame out. [`build_detector`] constructs the
//! backend selected by [`DetectorKind`]; backends compiled out of this build
//! report [`DetectorError::Unsupported`].

mod backends;
mod config;
mod engine;
mod error;
pub mod postprocess;
pub mod preprocess;

#[cfg(feature = "detector-onnx")]
pub use backends::onnx::OnnxDbDetector;
pub use config::{
    DEFAULT_DB_BOX_THRESH, DEFAULT_DB_THRESH, DEFAULT_DB_UNCLIP_RATIO, DEFAULT_LIMIT_SIDE_LEN,
    DEFAULT_MAX_CANDIDATES, DEFAULT_MIN_SIZE, DetectorConfig, DetectorKind, LimitType,
};
pub use engine::TextDetector;
pub use error::DetectorError;

/// Checks that `kind` can be built with `config` without keeping a detector.
pub fn preflight_detector(kind: DetectorKind, config: &DetectorConfig) -> Result<(), DetectorError> {
    match kind {
        DetectorKind::OnnxDb => {
            #[cfg(feature = "detector-onnx")]
            {
                backends::onnx::ensure_model_ready(config.model_path.as_deref())
            }
            #[cfg(not(feature = "detector-onnx"))]
            {
                let _ = config;
                Err(DetectorError::unsupported(kind.as_str()))
            }
        }
    }
}

pub fn build_detector(
    kind: DetectorKind,
    config: DetectorConfig,
) -> Result<Box<dyn TextDetector>, DetectorError> {
    match kind {
        DetectorKind::OnnxDb => {
            #[cfg(feature = "detector-onnx")]
            {
                Ok(Box::new(OnnxDbDetector::new(config)?))
            }
            #[cfg(not(feature = "detector-onnx"))]
            {
                let _ = config;
                Err(DetectorError::unsupported(kind.as_str()))
            }
        }
    }
}
