use std::fmt;

use table_text_detector::{DetectorError, TextDetector, build_detector};
use table_text_types::{BorderBox, ImageFrame, TextField};
use tracing::{debug, info};

use crate::error::DetectionError;
use crate::mapper::bounding_boxes;
use crate::settings::DetectionSettings;

/// Finds text regions inside a region of interest and reports them in the
/// coordinate frame of the full image.
///
/// Whether detection runs is fixed at construction. A disabled service never
/// builds a detector and answers every call with an empty list.
pub struct DetectionService {
    detector: Option<Box<dyn TextDetector>>,
}

impl fmt::Debug for DetectionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionService")
            .field("enabled", &self.is_enabled())
            .field("detector", &self.detector_name())
            .finish()
    }
}

impl DetectionService {
    pub fn disabled() -> Self {
        Self { detector: None }
    }

    pub fn enabled(detector: Box<dyn TextDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// Runs `build` only when `enabled` is set.
    pub fn new<F>(enabled: bool, build: F) -> Result<Self, DetectorError>
    where
        F: FnOnce() -> Result<Box<dyn TextDetector>, DetectorError>,
    {
        if !enabled {
            return Ok(Self::disabled());
        }
        Ok(Self::enabled(build()?))
    }

    pub fn from_config(settings: &DetectionSettings) -> Result<Self, DetectorError> {
        Self::new(settings.enabled, || {
            let detector = build_detector(settings.kind, settings.detector.clone())?;
            info!(backend = detector.name(), "text detection enabled");
            Ok(detector)
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.detector.is_some()
    }

    pub fn detector_name(&self) -> Option<&'static str> {
        self.detector.as_ref().map(|detector| detector.name())
    }

    pub fn warm_up(&self) -> Result<(), DetectorError> {
        match self.detector.as_ref() {
            Some(detector) => detector.warm_up(),
            None => Ok(()),
        }
    }

    /// Text fields found inside `region`, with boxes in `image` coordinates.
    ///
    /// The region is not validated here; cropping rejects one that falls
    /// outside the image. Text is left empty for a later recognition pass.
    pub fn extract_text_regions(
        &self,
        image: &ImageFrame,
        region: &BorderBox,
    ) -> Result<Vec<TextField>, DetectionError> {
        let Some(detector) = self.detector.as_ref() else {
            return Ok(Vec::new());
        };

        let crop = image.crop(region)?;
        let polygons = detector.detect(&crop)?;
        let fields: Vec<TextField> = bounding_boxes(&polygons, region.x1, region.y1)
            .into_iter()
            .map(TextField::empty_text)
            .collect();
        debug!(%region, fields = fields.len(), "extracted text regions");
        Ok(fields)
    }

    /// Runs [`Self::extract_text_regions`] for each region in order, stopping
    /// at the first failure.
    pub fn extract_text_regions_batch(
        &self,
        image: &ImageFrame,
        regions: &[BorderBox],
    ) -> Result<Vec<TextField>, DetectionError> {
        let mut fields = Vec::new();
        for region in regions {
            fields.extend(self.extract_text_regions(image, region)?);
        }
        Ok(fields)
    }
}
