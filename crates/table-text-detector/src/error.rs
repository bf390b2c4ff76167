use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("model file not found: {path}")]
    ModelNotFound { path: PathBuf },
    #[error("no detection model path configured; provide --model or set `model` in the configuration file")]
    MissingModelPath,
    #[error("failed to initialize onnx runtime environment: {0}")]
    Environment(String),
    #[error("failed to create inference session: {0}")]
    Session(String),
    #[error("failed to prepare model input: {0}")]
    Input(String),
    #[error("model inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output shape")]
    InvalidOutputShape,
    #[error(
        "onnxruntime schema registration conflict detected. Ensure only one ONNX Runtime version is present and that it matches the crate (suggest reinstalling onnxruntime 1.16.x). Original error: {message}"
    )]
    RuntimeSchemaConflict { message: String },
    #[error("{backend} detector is not supported in this build")]
    Unsupported { backend: &'static str },
}

impl DetectorError {
    pub fn unsupported(backend: &'static str) -> Self {
        Self::Unsupported { backend }
    }
}
