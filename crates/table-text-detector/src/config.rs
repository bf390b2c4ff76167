use std::path::PathBuf;

pub const DEFAULT_LIMIT_SIDE_LEN: u32 = 960;
pub const DEFAULT_DB_THRESH: f32 = 0.3;
pub const DEFAULT_DB_BOX_THRESH: f32 = 0.5;
pub const DEFAULT_DB_UNCLIP_RATIO: f32 = 1.6;
pub const DEFAULT_MAX_CANDIDATES: usize = 1000;
pub const DEFAULT_MIN_SIZE: usize = 3;

/// Which side of the input `limit_side_len` applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitType {
    /// Shrink so the longer side does not exceed the limit.
    Max,
    /// Enlarge so the shorter side is at least the limit.
    Min,
}

impl LimitType {
    pub fn as_str(self) -> &'static str {
        match self {
            LimitType::Max => "max",
            LimitType::Min => "min",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "max" => Some(LimitType::Max),
            "min" => Some(LimitType::Min),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    OnnxDb,
}

impl DetectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectorKind::OnnxDb => "onnx-db",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "onnx-db" | "onnx" | "db" => Some(DetectorKind::OnnxDb),
            _ => None,
        }
    }
}

/// Text detection parameters for DB (differentiable binarization) models.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub model_path: Option<PathBuf>,
    pub limit_side_len: u32,
    pub limit_type: LimitType,
    /// Probability above which a map pixel counts as text.
    pub db_thresh: f32,
    /// Minimum mean probability for a candidate region to be kept.
    pub db_box_thresh: f32,
    pub db_unclip_ratio: f32,
    pub max_candidates: usize,
    /// Candidates with a side shorter than this (in map pixels) are dropped.
    pub min_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            limit_side_len: DEFAULT_LIMIT_SIDE_LEN,
            limit_type: LimitType::Max,
            db_thresh: DEFAULT_DB_THRESH,
            db_box_thresh: DEFAULT_DB_BOX_THRESH,
            db_unclip_ratio: DEFAULT_DB_UNCLIP_RATIO,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

impl DetectorConfig {
    pub fn with_model(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Self::default()
        }
    }
}
