use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use table_text::cli::parse_cli;
use table_text::settings::resolve_settings;
use table_text::{
    BorderBox, ConfigError, DetectionError, DetectionService, DetectorError, ImageError,
    ImageFrame,
};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    // stdout carries the JSON result
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let args = parse_cli();
    let settings = resolve_settings(&args)?;
    if let Some(path) = settings.config_path.as_ref() {
        info!(config = %path.display(), "using configuration file");
    }

    let service = DetectionService::from_config(&settings.detection)?;
    service.warm_up()?;

    let image = load_image(&args.input)?;
    let regions = if args.regions.is_empty() {
        vec![full_region(&image)]
    } else {
        args.regions.clone()
    };

    let fields = service.extract_text_regions_batch(&image, &regions)?;
    info!(
        regions = regions.len(),
        fields = fields.len(),
        enabled = service.is_enabled(),
        "detection finished"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut out, &fields)?;
    } else {
        serde_json::to_writer(&mut out, &fields)?;
    }
    writeln!(out)?;
    Ok(())
}

fn load_image(path: &Path) -> Result<ImageFrame, AppError> {
    let decoded = image::open(path).map_err(|source| AppError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(ImageFrame::from_owned(width, height, 3, rgb.into_raw())?)
}

fn full_region(image: &ImageFrame) -> BorderBox {
    BorderBox::new(0, 0, image.width() as i32, image.height() as i32)
}
