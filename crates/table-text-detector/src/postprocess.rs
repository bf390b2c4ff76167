//! Turns a DB probability map into text polygons.

use table_text_types::{Point, Polygon};

use crate::config::DetectorConfig;

/// Probability map produced by a DB model, row-major.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityMap<'a> {
    pub data: &'a [f32],
    pub width: usize,
    pub height: usize,
}

impl<'a> ProbabilityMap<'a> {
    /// Interprets `data` using a model output `shape` such as `[1, 1, h, w]`.
    pub fn from_output(data: &'a [f32], shape: &[usize]) -> Option<Self> {
        let (height, width) = match shape {
            [h, w] | [1, h, w] | [1, 1, h, w] => (*h, *w),
            _ => return None,
        };
        if height.checked_mul(width)? > data.len() {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

#[derive(Debug, Clone, Copy)]
struct Component {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    score: f32,
}

/// Extracts quadrilaterals from `map`, scaled to a `dest_width` x `dest_height`
/// image. Polygons run clockwise from the top-left corner and are clipped to the
/// destination bounds.
pub fn polygons_from_map(
    map: &ProbabilityMap<'_>,
    dest_width: usize,
    dest_height: usize,
    config: &DetectorConfig,
) -> Vec<Polygon> {
    if map.width == 0 || map.height == 0 || dest_width == 0 || dest_height == 0 {
        return Vec::new();
    }

    let scale_x = dest_width as f32 / map.width as f32;
    let scale_y = dest_height as f32 / map.height as f32;
    let max_x = dest_width as f32;
    let max_y = dest_height as f32;
    let min_side = config.min_size as f32;

    let mut polygons = Vec::new();
    for component in components(map, config.db_thresh, config.max_candidates) {
        let width = (component.max_x - component.min_x + 1) as f32;
        let height = (component.max_y - component.min_y + 1) as f32;
        if width.min(height) < min_side || component.score < config.db_box_thresh {
            continue;
        }

        let distance = width * height * config.db_unclip_ratio / (2.0 * (width + height));
        let left = component.min_x as f32 - distance;
        let top = component.min_y as f32 - distance;
        let right = component.max_x as f32 + 1.0 + distance;
        let bottom = component.max_y as f32 + 1.0 + distance;
        if (right - left).min(bottom - top) < min_side + 2.0 {
            continue;
        }

        let x1 = (left * scale_x).round().clamp(0.0, max_x) as i32;
        let y1 = (top * scale_y).round().clamp(0.0, max_y) as i32;
        let x2 = (right * scale_x).round().clamp(0.0, max_x) as i32;
        let y2 = (bottom * scale_y).round().clamp(0.0, max_y) as i32;
        let points = vec![
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        ];
        if let Some(polygon) = Polygon::new(points) {
            polygons.push(polygon);
        }
    }
    polygons
}

/// 4-connected regions of pixels above `thresh`, in scan order.
fn components(map: &ProbabilityMap<'_>, thresh: f32, max_candidates: usize) -> Vec<Component> {
    let (width, height) = (map.width, map.height);
    let mut visited = vec![false; width * height];
    let mut found = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if found.len() >= max_candidates {
                return found;
            }
            let idx = y * width + x;
            if visited[idx] || map.at(x, y) <= thresh {
                continue;
            }

            let mut stack = vec![(x, y)];
            let mut component = Component {
                min_x: x,
                max_x: x,
                min_y: y,
                max_y: y,
                score: 0.0,
            };
            let mut sum = 0.0f32;
            let mut count = 0usize;

            while let Some((cx, cy)) = stack.pop() {
                let cidx = cy * width + cx;
                if visited[cidx] {
                    continue;
                }
                visited[cidx] = true;
                sum += map.at(cx, cy);
                count += 1;
                component.min_x = component.min_x.min(cx);
                component.max_x = component.max_x.max(cx);
                component.min_y = component.min_y.min(cy);
                component.max_y = component.max_y.max(cy);

                let neighbors = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx < width && ny < height {
                        let nidx = ny * width + nx;
                        if !visited[nidx] && map.at(nx, ny) > thresh {
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            component.score = sum / count as f32;
            found.push(component);
        }
    }
    found
}
