//! Stroke geometry
//!
//! Points, strokes and stroke sets captured from a drawing surface,
//! plus the uniform-scale normalization that maps them into a raster
//! canvas frame.

use serde::{Deserialize, Serialize};

use crate::config::CanvasProfile;

/// A single pointer sample in input coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

/// One continuous pen-down-to-pen-up gesture as an ordered point sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A stroke with fewer than two points has no well-defined bounding
    /// box or orientation and is rejected before rasterization
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}

/// Combined bounding box over a stroke set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// The strokes forming one recognition unit
///
/// All strokes share the same input coordinate space. Stroke order and
/// point order are the drawing order and are preserved through every
/// transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeSet {
    strokes: Vec<Stroke>,
}

impl StrokeSet {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    /// Build a stroke set from raw coordinate pairs as they arrive on
    /// the wire (`[[[x, y], ...], ...]`)
    pub fn from_coords(coords: &[Vec<[f64; 2]>]) -> Self {
        let strokes = coords
            .iter()
            .map(|stroke| Stroke::new(stroke.iter().map(|&p| Point::from(p)).collect()))
            .collect();
        Self { strokes }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total number of points across all strokes
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.len()).sum()
    }

    /// Combined bounding box over every point in every non-degenerate
    /// stroke, or `None` if no drawable stroke remains
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut points = self
            .strokes
            .iter()
            .filter(|s| !s.is_degenerate())
            .flat_map(|s| s.points().iter());

        let first = points.next()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in points {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Arithmetic mean of all points, in the original input coordinate
    /// space. Used as the anchor for annotations so the label sits near
    /// the ink that produced it.
    pub fn centroid(&self) -> Option<Point> {
        let count = self.point_count();
        if count == 0 {
            return None;
        }
        let (sum_x, sum_y) = self
            .strokes
            .iter()
            .flat_map(|s| s.points().iter())
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sum_x / count as f64, sum_y / count as f64))
    }

    /// Map every point into the canvas frame of `profile` with a single
    /// uniform scale factor, preserving the aspect ratio of the input
    /// bounding box.
    ///
    /// Returns `None` when the combined bounding box has zero width or
    /// zero height: a uniform scale is undefined in that case and the
    /// caller surfaces "no image". Degenerate strokes are dropped first.
    pub fn normalize(&self, profile: &CanvasProfile) -> Option<StrokeSet> {
        let bbox = self.bounding_box()?;
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return None;
        }

        let margin = profile.margin;
        let usable_w = profile.width as f64 - 2.0 * margin;
        let usable_h = profile.height as f64 - 2.0 * margin;
        let scale = (usable_w / bbox.width()).min(usable_h / bbox.height());

        let strokes = self
            .strokes
            .iter()
            .filter(|s| !s.is_degenerate())
            .map(|stroke| {
                Stroke::new(
                    stroke
                        .points()
                        .iter()
                        .map(|p| {
                            Point::new(
                                margin + (p.x - bbox.min_x) * scale,
                                margin + (p.y - bbox.min_y) * scale,
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        Some(StrokeSet { strokes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CanvasProfile {
        CanvasProfile {
            width: 200,
            height: 200,
            margin: 10.0,
            line_passes: 3,
            supersample: 1,
        }
    }

    fn zigzag() -> StrokeSet {
        StrokeSet::new(vec![Stroke::new(vec![
            Point::new(100.0, 50.0),
            Point::new(140.0, 130.0),
            Point::new(180.0, 50.0),
        ])])
    }

    #[test]
    fn test_normalize_fits_margins() {
        let normalized = zigzag().normalize(&profile()).unwrap();
        let bbox = normalized.bounding_box().unwrap();

        assert!((bbox.min_x - 10.0).abs() < 1e-9);
        assert!((bbox.min_y - 10.0).abs() < 1e-9);
        assert!(bbox.max_x <= 190.0 + 1e-9);
        assert!(bbox.max_y <= 190.0 + 1e-9);
        // The wider axis spans the full usable area
        assert!((bbox.max_x - 190.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_preserves_aspect_ratio() {
        let input = zigzag();
        let in_bbox = input.bounding_box().unwrap();
        let out_bbox = input.normalize(&profile()).unwrap().bounding_box().unwrap();

        let in_ratio = in_bbox.width() / in_bbox.height();
        let out_ratio = out_bbox.width() / out_bbox.height();
        assert!((in_ratio - out_ratio).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_service_profile() {
        let service = CanvasProfile {
            width: 800,
            height: 600,
            margin: 20.0,
            line_passes: 1,
            supersample: 2,
        };
        let bbox = zigzag()
            .normalize(&service)
            .unwrap()
            .bounding_box()
            .unwrap();
        assert!((bbox.min_x - 20.0).abs() < 1e-9);
        assert!(bbox.max_x <= 780.0 + 1e-9);
        assert!(bbox.max_y <= 580.0 + 1e-9);
    }

    #[test]
    fn test_single_point_yields_no_image() {
        let set = StrokeSet::new(vec![Stroke::new(vec![Point::new(5.0, 5.0)])]);
        assert!(set.normalize(&profile()).is_none());
    }

    #[test]
    fn test_zero_height_box_yields_no_image() {
        // Perfectly horizontal stroke: zero-height bounding box
        let set = StrokeSet::new(vec![Stroke::new(vec![
            Point::new(0.0, 42.0),
            Point::new(50.0, 42.0),
        ])]);
        assert!(set.normalize(&profile()).is_none());
    }

    #[test]
    fn test_degenerate_strokes_dropped() {
        let set = StrokeSet::new(vec![
            Stroke::new(vec![Point::new(7.0, 7.0)]),
            Stroke::new(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 20.0),
            ]),
        ]);
        let normalized = set.normalize(&profile()).unwrap();
        assert_eq!(normalized.strokes().len(), 1);
        assert_eq!(normalized.strokes()[0].len(), 2);
    }

    #[test]
    fn test_normalize_preserves_order() {
        let set = StrokeSet::new(vec![Stroke::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])]);
        let normalized = set.normalize(&profile()).unwrap();
        let pts = normalized.strokes()[0].points();

        // Drawing order unchanged: corners come out in insertion order
        assert!((pts[0].x - 10.0).abs() < 1e-9 && (pts[0].y - 10.0).abs() < 1e-9);
        assert!(pts[1].x > pts[0].x);
        assert!(pts[2].y > pts[1].y);
        assert!(pts[3].x < pts[2].x);
    }

    #[test]
    fn test_centroid() {
        let set = StrokeSet::new(vec![Stroke::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 20.0),
        ])]);
        let c = set.centroid().unwrap();
        assert!((c.x - 5.0).abs() < 1e-9);
        assert!((c.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_set() {
        let set = StrokeSet::default();
        assert!(set.bounding_box().is_none());
        assert!(set.centroid().is_none());
        assert!(set.normalize(&profile()).is_none());
    }
}
