use table_text_types::{ImageFrame, Polygon};

use crate::error::DetectorError;

/// Locates candidate text regions in an image.
///
/// Returned polygons are in the pixel frame of the image passed in.
pub trait TextDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn warm_up(&self) -> Result<(), DetectorError> {
        Ok(())
    }

    fn detect(&self, image: &ImageFrame) -> Result<Vec<Polygon>, DetectorError>;
}
