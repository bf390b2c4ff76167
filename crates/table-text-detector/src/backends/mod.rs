#[cfg(feature = "detector-onnx")]
pub mod onnx;
