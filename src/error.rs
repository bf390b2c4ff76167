use table_text_detector::DetectorError;
use table_text_types::ImageError;
use thiserror::Error;

/// Failure of a single detection call. Never folded into an empty result.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("invalid region of interest: {0}")]
    InvalidRegion(#[from] ImageError),
    #[error("text detection failed: {0}")]
    Detector(#[from] DetectorError),
}
