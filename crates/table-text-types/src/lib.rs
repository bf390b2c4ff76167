//! Shared value types for the table-text workspace.
//!
//! Geometry (points, polygons, boxes), the text field emitted for each located
//! region, and an in-memory image frame that can be cropped to a region of
//! interest. Keep this crate free of model and decoding dependencies so both the
//! detector backends and the table pipeline can depend on it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ImageResult<T> = Result<T, ImageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Raw detector output for one candidate text region.
///
/// Always holds at least one vertex. Convexity, closure and vertex count are
/// not constrained beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { points })
    }

    pub fn from_coords(coords: &[(i32, i32)]) -> Option<Self> {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Axis-aligned rectangle `(x1, y1)`..`(x2, y2)` in a single coordinate frame.
///
/// Boxes produced by this workspace satisfy `x1 <= x2` and `y1 <= y2`. Boxes
/// supplied by callers are stored verbatim so an invalid region can reach the
/// crop that rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BorderBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

impl fmt::Display for BorderBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A located text region. Recognition happens elsewhere, so `text` starts empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextField {
    pub bbox: BorderBox,
    pub text: String,
}

impl TextField {
    pub fn new(bbox: BorderBox, text: String) -> Self {
        Self { bbox, text }
    }

    pub fn empty_text(bbox: BorderBox) -> Self {
        Self {
            bbox,
            text: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("region {region} lies outside the {width}x{height} image")]
    RegionOutOfBounds {
        region: BorderBox,
        width: u32,
        height: u32,
    },
    #[error("image data length {provided} is smaller than width * height * channels ({required})")]
    InsufficientData { provided: usize, required: usize },
    #[error("unsupported channel count {channels}; expected 1, 3 or 4")]
    UnsupportedChannels { channels: u8 },
    #[error("image dimensions overflowed while computing the buffer size")]
    Overflow,
}

/// Interleaved, row-major 8-bit image held in memory.
#[derive(Clone)]
pub struct ImageFrame {
    width: u32,
    height: u32,
    channels: u8,
    data: Arc<[u8]>,
}

impl fmt::Debug for ImageFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl ImageFrame {
    pub fn from_owned(width: u32, height: u32, channels: u8, data: Vec<u8>) -> ImageResult<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ImageError::UnsupportedChannels { channels });
        }
        let required = required_len(width, height, channels)?;
        if data.len() < required {
            return Err(ImageError::InsufficientData {
                provided: data.len(),
                required,
            });
        }
        let mut data = data;
        data.truncate(required);
        Ok(Self {
            width,
            height,
            channels,
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Pixel at `(x, y)` as a slice of `channels` bytes.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.channels as usize;
        let start = y as usize * self.stride() + x as usize * channels;
        self.data.get(start..start + channels)
    }

    /// Copies `[x1, x2) x [y1, y2)` into a new frame.
    ///
    /// The region must lie inside the image with `x1 <= x2` and `y1 <= y2`.
    /// A zero-width or zero-height region yields an empty frame.
    pub fn crop(&self, region: &BorderBox) -> ImageResult<ImageFrame> {
        let in_bounds = region.x1 >= 0
            && region.y1 >= 0
            && region.is_valid()
            && i64::from(region.x2) <= i64::from(self.width)
            && i64::from(region.y2) <= i64::from(self.height);
        if !in_bounds {
            return Err(ImageError::RegionOutOfBounds {
                region: *region,
                width: self.width,
                height: self.height,
            });
        }

        let x = region.x1 as usize;
        let y = region.y1 as usize;
        let width = region.width() as u32;
        let height = region.height() as u32;
        let channels = self.channels as usize;
        let row_len = width as usize * channels;
        let stride = self.stride();

        let mut out = Vec::with_capacity(row_len * height as usize);
        for row in 0..height as usize {
            let start = (y + row) * stride + x * channels;
            out.extend_from_slice(&self.data[start..start + row_len]);
        }

        Ok(ImageFrame {
            width,
            height,
            channels: self.channels,
            data: Arc::from(out.into_boxed_slice()),
        })
    }
}

fn required_len(width: u32, height: u32, channels: u8) -> ImageResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|area| area.checked_mul(channels as usize))
        .ok_or(ImageError::Overflow)
}
