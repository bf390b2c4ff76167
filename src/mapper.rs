//! Maps detector polygons to axis-aligned boxes in a target frame.

use table_text_types::{BorderBox, Polygon};

/// Stateless namespace for the polygon to box reduction.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionMapper;

impl RegionMapper {
    pub fn bounding_boxes(polygons: &[Polygon], offset_x: i32, offset_y: i32) -> Vec<BorderBox> {
        bounding_boxes(polygons, offset_x, offset_y)
    }
}

/// Smallest box enclosing every vertex of `polygon`.
pub fn polygon_bounds(polygon: &Polygon) -> BorderBox {
    let points = polygon.points();
    // Polygon guarantees at least one vertex.
    let first = points[0];
    points[1..].iter().fold(
        BorderBox::new(first.x, first.y, first.x, first.y),
        |acc, point| BorderBox {
            x1: acc.x1.min(point.x),
            y1: acc.y1.min(point.y),
            x2: acc.x2.max(point.x),
            y2: acc.y2.max(point.y),
        },
    )
}

/// Bounding box of each polygon, shifted by `(offset_x, offset_y)`.
///
/// Order and length follow `polygons`. Boxes are not clipped to any image.
pub fn bounding_boxes(polygons: &[Polygon], offset_x: i32, offset_y: i32) -> Vec<BorderBox> {
    polygons
        .iter()
        .map(|polygon| polygon_bounds(polygon).translate(offset_x, offset_y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(coords: &[(i32, i32)]) -> Polygon {
        Polygon::from_coords(coords).unwrap()
    }

    #[test]
    fn quad_reduces_to_min_max_plus_offset() {
        let quad = polygon(&[(0, 0), (50, 0), (50, 30), (0, 30)]);
        let boxes = bounding_boxes(&[quad], 10, 20);
        assert_eq!(boxes, vec![BorderBox::new(10, 20, 60, 50)]);
    }

    #[test]
    fn rotated_polygon_uses_extreme_vertices() {
        let rotated = polygon(&[(12, 3), (40, 9), (35, 25), (7, 19)]);
        assert_eq!(polygon_bounds(&rotated), BorderBox::new(7, 3, 40, 25));
    }

    #[test]
    fn single_point_yields_zero_area_box() {
        let boxes = bounding_boxes(&[polygon(&[(5, 5)])], 100, 200);
        assert_eq!(boxes, vec![BorderBox::new(105, 205, 105, 205)]);
        assert_eq!(boxes[0].width(), 0);
        assert_eq!(boxes[0].height(), 0);
    }

    #[test]
    fn negative_coordinates_are_not_clipped() {
        let outside = polygon(&[(-8, -3), (4, 10)]);
        let boxes = bounding_boxes(&[outside], 2, 2);
        assert_eq!(boxes, vec![BorderBox::new(-6, -1, 6, 12)]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(bounding_boxes(&[], 7, 9).is_empty());
    }

    #[test]
    fn zero_offset_preserves_coordinates() {
        let polygons = vec![
            polygon(&[(3, 4), (9, 1), (6, 8)]),
            polygon(&[(100, 50), (120, 70)]),
        ];
        let boxes = bounding_boxes(&polygons, 0, 0);
        let expected: Vec<_> = polygons.iter().map(polygon_bounds).collect();
        assert_eq!(boxes, expected);
        assert_eq!(boxes[0], BorderBox::new(3, 1, 9, 8));
    }

    #[test]
    fn order_and_length_follow_input() {
        let polygons: Vec<_> = (0..5)
            .map(|i| polygon(&[(i * 10, 0), (i * 10 + 5, 5)]))
            .collect();
        let boxes = RegionMapper::bounding_boxes(&polygons, 1, 1);
        assert_eq!(boxes.len(), polygons.len());
        for (i, bbox) in boxes.iter().enumerate() {
            assert_eq!(bbox.x1, i as i32 * 10 + 1);
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let polygons = vec![polygon(&[(1, 2), (3, 4)]), polygon(&[(-1, 0)])];
        assert_eq!(
            bounding_boxes(&polygons, 5, -5),
            bounding_boxes(&polygons, 5, -5)
        );
    }
}
