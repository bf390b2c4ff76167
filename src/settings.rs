use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use table_text_detector::{DetectorConfig, DetectorKind, LimitType};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cli::CliArgs;

const PROJECT_CONFIG_FILE: &str = "table-text.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    enabled: Option<bool>,
    detector: Option<String>,
    model: Option<String>,
    limit_side_len: Option<u32>,
    limit_type: Option<String>,
    db_thresh: Option<f32>,
    db_box_thresh: Option<f32>,
    db_unclip_ratio: Option<f32>,
}

/// Everything needed to construct a [`crate::DetectionService`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    pub enabled: bool,
    pub kind: DetectorKind,
    pub detector: DetectorConfig,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: DetectorKind::OnnxDb,
            detector: DetectorConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct EffectiveSettings {
    pub detection: DetectionSettings,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for '{field}'{}", location(.path.as_deref()))]
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    #[error("config file {path} does not exist")]
    NotFound { path: PathBuf },
}

fn location(path: Option<&Path>) -> String {
    path.map(|path| format!(" in {}", path.display()))
        .unwrap_or_default()
}

pub fn resolve_settings(cli: &CliArgs) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        return read_config(path).map(|config| (config, Some(path.to_path_buf())));
    }

    for candidate in [project_config_path(), default_config_path()]
        .into_iter()
        .flatten()
    {
        if candidate.exists() {
            let config = read_config(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }
    Ok((FileConfig::default(), None))
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

fn merge(
    cli: &CliArgs,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let config_dir = config_path
        .as_ref()
        .and_then(|path| path.parent().map(Path::to_path_buf));

    let FileConfig {
        enabled: file_enabled,
        detector: file_detector,
        model: file_model,
        limit_side_len: file_limit_side_len,
        limit_type: file_limit_type,
        db_thresh: file_db_thresh,
        db_box_thresh: file_db_box_thresh,
        db_unclip_ratio: file_db_unclip_ratio,
    } = file;

    let enabled = !cli.disable_detection && file_enabled.unwrap_or(true);

    let kind = match normalize_string(cli.detector.clone()) {
        Some(value) => parse_detector(&value, None)?,
        None => match normalize_string(file_detector) {
            Some(value) => parse_detector(&value, config_path.as_deref())?,
            None => DetectorKind::OnnxDb,
        },
    };

    let model_path = match cli.model.clone() {
        Some(path) => Some(expand_pathbuf(path)),
        None => normalize_string(file_model)
            .map(|value| resolve_path_from_config(&value, config_dir.as_deref())),
    };
    if enabled && model_path.is_none() {
        warn!("text detection is enabled but no model path is configured");
    }

    let mut detector = DetectorConfig {
        model_path,
        ..DetectorConfig::default()
    };

    if let Some(value) = cli.limit_side_len.or(file_limit_side_len) {
        if value < 32 {
            return Err(ConfigError::InvalidValue {
                path: config_path,
                field: "limit_side_len",
                value: value.to_string(),
            });
        }
        detector.limit_side_len = value;
    }

    match normalize_string(cli.limit_type.clone()) {
        Some(value) => detector.limit_type = parse_limit_type(&value, None)?,
        None => {
            if let Some(value) = normalize_string(file_limit_type) {
                detector.limit_type = parse_limit_type(&value, config_path.as_deref())?;
            }
        }
    }

    if let Some(value) = probability(
        "db_thresh",
        cli.db_thresh,
        file_db_thresh,
        config_path.as_deref(),
    )? {
        detector.db_thresh = value;
    }
    if let Some(value) = probability(
        "db_box_thresh",
        cli.db_box_thresh,
        file_db_box_thresh,
        config_path.as_deref(),
    )? {
        detector.db_box_thresh = value;
    }

    if let Some(value) = cli.db_unclip_ratio.or(file_db_unclip_ratio) {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidValue {
                path: config_path,
                field: "db_unclip_ratio",
                value: value.to_string(),
            });
        }
        detector.db_unclip_ratio = value;
    }

    Ok(EffectiveSettings {
        detection: DetectionSettings {
            enabled,
            kind,
            detector,
        },
        config_path,
    })
}

/// CLI value, else file value, checked to lie in `[0, 1]`.
fn probability(
    field: &'static str,
    cli_value: Option<f32>,
    file_value: Option<f32>,
    config_path: Option<&Path>,
) -> Result<Option<f32>, ConfigError> {
    let (value, path) = match (cli_value, file_value) {
        (Some(value), _) => (value, None),
        (None, Some(value)) => (value, config_path.map(Path::to_path_buf)),
        (None, None) => return Ok(None),
    };
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            path,
            field,
            value: value.to_string(),
        });
    }
    Ok(Some(value))
}

fn parse_detector(value: &str, path: Option<&Path>) -> Result<DetectorKind, ConfigError> {
    DetectorKind::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        path: path.map(Path::to_path_buf),
        field: "detector",
        value: value.to_string(),
    })
}

fn parse_limit_type(value: &str, path: Option<&Path>) -> Result<LimitType, ConfigError> {
    LimitType::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        path: path.map(Path::to_path_buf),
        field: "limit_type",
        value: value.to_string(),
    })
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "table-text", "table-text")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir()
        .ok()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
}

fn normalize_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn expand_pathbuf(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_home_path(s),
        None => path,
    }
}

fn resolve_path_from_config(value: &str, base: Option<&Path>) -> PathBuf {
    let expanded = expand_home_path(value);
    match base {
        Some(base) if !expanded.is_absolute() => base.join(expanded),
        _ => expanded,
    }
}

fn expand_home_path(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().to_path_buf();
        }
    } else if let Some(stripped) = value.strip_prefix("~/") {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(stripped);
        }
    }
    PathBuf::from(value)
}
