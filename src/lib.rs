//! Text region extraction for table images.
//!
//! [`DetectionService`] crops an image to a region of interest, runs a
//! [`TextDetector`] on the crop, and maps every detected polygon back to an
//! axis-aligned [`BorderBox`] in the full image's coordinates. The service can
//! be built disabled, in which case no detector is ever constructed.

pub mod cli;
mod error;
pub mod mapper;
mod service;
pub mod settings;

pub use error::DetectionError;
pub use mapper::{RegionMapper, bounding_boxes, polygon_bounds};
pub use service::DetectionService;
pub use settings::{ConfigError, DetectionSettings};
pub use table_text_detector::{DetectorConfig, DetectorError, DetectorKind, TextDetector};
pub use table_text_types::{BorderBox, ImageError, ImageFrame, Point, Polygon, TextField};
