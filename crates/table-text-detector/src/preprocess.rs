//! Input preparation for DB text detection models.

use table_text_types::ImageFrame;

use crate::config::LimitType;

const SIDE_MULTIPLE: usize = 32;
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Model input size for a `width` x `height` image, as `(width, height)`.
///
/// Both sides end up a multiple of 32 and at least 32.
pub fn resize_target(
    width: usize,
    height: usize,
    limit_side_len: u32,
    limit_type: LimitType,
) -> (usize, usize) {
    let limit = limit_side_len as f32;
    let ratio = match limit_type {
        LimitType::Max => {
            let longest = width.max(height) as f32;
            if longest > limit { limit / longest } else { 1.0 }
        }
        LimitType::Min => {
            let shortest = width.min(height) as f32;
            if shortest > 0.0 && shortest < limit {
                limit / shortest
            } else {
                1.0
            }
        }
    };
    let scaled_w = (width as f32 * ratio) as usize;
    let scaled_h = (height as f32 * ratio) as usize;
    (round_to_multiple(scaled_w), round_to_multiple(scaled_h))
}

fn round_to_multiple(side: usize) -> usize {
    let rounded = (side as f32 / SIDE_MULTIPLE as f32).round() as usize * SIDE_MULTIPLE;
    rounded.max(SIDE_MULTIPLE)
}

/// Resizes `image` to `dst_width` x `dst_height` and returns normalized planes
/// in CHW order.
///
/// PP-OCR detection weights are trained on BGR input, so plane 0 is blue.
/// Gray input is replicated across planes; alpha is dropped.
pub fn normalized_chw(image: &ImageFrame, dst_width: usize, dst_height: usize) -> Vec<f32> {
    let area = dst_width * dst_height;
    let mut out = vec![0.0f32; area * 3];
    if image.is_empty() || area == 0 {
        return out;
    }

    let src_width = image.width() as usize;
    let src_height = image.height() as usize;
    let channels = image.channels() as usize;
    let stride = image.stride();
    let data = image.data();

    let scale_x = if dst_width > 1 {
        (src_width - 1) as f32 / (dst_width - 1) as f32
    } else {
        0.0
    };
    let scale_y = if dst_height > 1 {
        (src_height - 1) as f32 / (dst_height - 1) as f32
    } else {
        0.0
    };

    let sample = |x: usize, y: usize, plane: usize| -> f32 {
        let rgb = if channels == 1 { 0 } else { 2 - plane };
        data[y * stride + x * channels + rgb] as f32
    };

    for dy in 0..dst_height {
        let fy = scale_y * dy as f32;
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(src_height - 1);
        let wy = fy - y0 as f32;
        for dx in 0..dst_width {
            let fx = scale_x * dx as f32;
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let wx = fx - x0 as f32;

            for plane in 0..3 {
                let top_left = sample(x0, y0, plane);
                let top_right = sample(x1, y0, plane);
                let bottom_left = sample(x0, y1, plane);
                let bottom_right = sample(x1, y1, plane);

                let top = top_left + (top_right - top_left) * wx;
                let bottom = bottom_left + (bottom_right - bottom_left) * wx;
                let value = (top + (bottom - top) * wy) / 255.0;
                out[plane * area + dy * dst_width + dx] = (value - MEAN[plane]) / STD[plane];
            }
        }
    }
    out
}
