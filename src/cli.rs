use std::path::PathBuf;

use clap::Parser;
use table_text_types::BorderBox;

#[derive(Debug, Parser)]
#[command(
    name = "table-text",
    about = "Locate text regions inside table areas of an image",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Text detection model (ONNX export of a DB detector)
    #[arg(long = "model", value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Detection backend to use
    #[arg(long = "detector", value_name = "KIND")]
    pub detector: Option<String>,

    /// Skip detection entirely; every region reports no text
    #[arg(long = "disable-detection")]
    pub disable_detection: bool,

    /// Side length limit applied before inference
    #[arg(long = "limit-side-len", value_parser = clap::value_parser!(u32).range(32..))]
    pub limit_side_len: Option<u32>,

    /// Apply the side limit to the longer ("max") or shorter ("min") side
    #[arg(long = "limit-type")]
    pub limit_type: Option<String>,

    /// Probability threshold for text pixels
    #[arg(long = "db-thresh")]
    pub db_thresh: Option<f32>,

    /// Minimum mean probability for a region to be reported
    #[arg(long = "db-box-thresh")]
    pub db_box_thresh: Option<f32>,

    /// Expansion applied to detected regions
    #[arg(long = "db-unclip-ratio")]
    pub db_unclip_ratio: Option<f32>,

    /// Region of interest as x1,y1,x2,y2 (repeatable); defaults to the whole image
    #[arg(long = "region", value_name = "X1,Y1,X2,Y2", value_parser = parse_region)]
    pub regions: Vec<BorderBox>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Input image path
    pub input: PathBuf,
}

pub fn parse_cli() -> CliArgs {
    CliArgs::parse()
}

pub fn parse_region(value: &str) -> Result<BorderBox, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid coordinate in '{value}': {err}"))?;
    match parts.as_slice() {
        [x1, y1, x2, y2] => Ok(BorderBox::new(*x1, *y1, *x2, *y2)),
        _ => Err(format!(
            "expected four comma-separated integers, got '{value}'"
        )),
    }
}
