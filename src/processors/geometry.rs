//! Geometric primitives for the detection pipeline.
//!
//! This module provides point and polygon representations together with the
//! algorithms the detectors rely on: shoelace area, convex hulls, and
//! minimum-area rotated rectangles via rotating calipers. A single rotation
//! convention is used throughout the crate: angles are in degrees, positive is
//! clockwise in image coordinates (y grows downward).

use imageproc::point::Point as ImageProcPoint;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use std::f32::consts::PI;

/// Normalizes an angle in degrees into the canonical range `[0, 360)`.
///
/// Idempotent: normalizing an already-normalized angle is a no-op, and
/// values such as `370` and `10`, or `-10` and `350`, map to the same state.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a point from an imageproc contour point.
    pub fn from_contour_point(p: ImageProcPoint<u32>) -> Self {
        Self {
            x: p.x as f32,
            y: p.y as f32,
        }
    }
}

/// A closed polygon represented by its vertices in order.
///
/// Contours extracted from binary masks are converted into this type before
/// rectangle fitting and shape measurement.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// The vertices of the polygon.
    pub points: Vec<Point>,
}

impl Polygon {
    /// Creates a new polygon from a vector of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates a polygon from an imageproc contour.
    pub fn from_contour(contour: &imageproc::contours::Contour<u32>) -> Self {
        let points = contour
            .points
            .iter()
            .map(|p| Point::from_contour_point(*p))
            .collect();
        Self { points }
    }

    /// Calculates the area of the polygon using the shoelace formula.
    ///
    /// Returns 0.0 if the polygon has fewer than 3 points.
    pub fn area(&self) -> f32 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        let n = self.points.len();
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area.abs() / 2.0
    }

    /// Calculates the perimeter of the polygon.
    pub fn perimeter(&self) -> f32 {
        let mut perimeter = 0.0;
        let n = self.points.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let dx = self.points[j].x - self.points[i].x;
            let dy = self.points[j].y - self.points[i].y;
            perimeter += (dx * dx + dy * dy).sqrt();
        }
        perimeter
    }

    /// Computes the convex hull of the polygon using Graham's scan.
    ///
    /// If the polygon has fewer than 3 points, returns a clone of itself.
    pub fn convex_hull(&self) -> Polygon {
        if self.points.len() < 3 {
            return self.clone();
        }

        let mut points = self.points.clone();

        // Find the point with the lowest y-coordinate (and leftmost if tied)
        let mut start_idx = 0;
        for i in 1..points.len() {
            if points[i].y < points[start_idx].y
                || (points[i].y == points[start_idx].y && points[i].x < points[start_idx].x)
            {
                start_idx = i;
            }
        }
        points.swap(0, start_idx);
        let start_point = points[0];

        // Sort the remaining points by polar angle around the start point
        points[1..].sort_by(|a, b| {
            let cross = Self::cross_product(&start_point, a, b);
            if cross == 0.0 {
                let dist_a = (a.x - start_point.x).powi(2) + (a.y - start_point.y).powi(2);
                let dist_b = (b.x - start_point.x).powi(2) + (b.y - start_point.y).powi(2);
                dist_a
                    .partial_cmp(&dist_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
            } else if cross > 0.0 {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Greater
            }
        });

        // Build the hull, discarding points that make clockwise turns
        let mut hull: Vec<Point> = Vec::new();
        for point in points {
            while hull.len() > 1
                && Self::cross_product(&hull[hull.len() - 2], &hull[hull.len() - 1], &point) <= 0.0
            {
                hull.pop();
            }
            hull.push(point);
        }

        Polygon::new(hull)
    }

    /// Computes the solidity of the polygon: its area divided by the area of
    /// its convex hull. A perfect rectangle scores 1.0; ragged shapes less.
    pub fn solidity(&self) -> f32 {
        let hull_area = self.convex_hull().area();
        if hull_area <= f32::EPSILON {
            return 0.0;
        }
        self.area() / hull_area
    }

    fn cross_product(p1: &Point, p2: &Point, p3: &Point) -> f32 {
        (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x)
    }

    /// Computes the minimum-area rectangle enclosing the polygon using
    /// rotating calipers over its convex hull.
    ///
    /// Returns a rectangle with zero dimensions if the polygon is degenerate.
    pub fn min_area_rect(&self) -> RectFit {
        if self.points.len() < 3 {
            return RectFit::empty();
        }

        let hull = self.convex_hull();
        let hull_points = &hull.points;

        // Collinear or near-degenerate input: fall back to the axis-aligned
        // bounding rectangle of the raw points.
        if hull_points.len() < 3 {
            let Some((min_x, max_x)) = self.points.iter().map(|p| p.x).minmax().into_option()
            else {
                return RectFit::empty();
            };
            let Some((min_y, max_y)) = self.points.iter().map(|p| p.y).minmax().into_option()
            else {
                return RectFit::empty();
            };

            return RectFit {
                center: Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
                width: max_x - min_x,
                height: max_y - min_y,
                angle: 0.0,
            };
        }

        let mut min_area = f32::MAX;
        let mut min_rect = RectFit::empty();

        let n = hull_points.len();
        for i in 0..n {
            let j = (i + 1) % n;

            let edge_x = hull_points[j].x - hull_points[i].x;
            let edge_y = hull_points[j].y - hull_points[i].y;
            let edge_length = (edge_x * edge_x + edge_y * edge_y).sqrt();

            if edge_length < f32::EPSILON {
                continue;
            }

            // Unit edge direction and its perpendicular
            let nx = edge_x / edge_length;
            let ny = edge_y / edge_length;
            let px = -ny;
            let py = nx;

            // Project every hull point onto the edge frame
            let mut min_n = f32::MAX;
            let mut max_n = f32::MIN;
            let mut min_p = f32::MAX;
            let mut max_p = f32::MIN;

            for point in hull_points.iter() {
                let proj_n = nx * (point.x - hull_points[i].x) + ny * (point.y - hull_points[i].y);
                min_n = min_n.min(proj_n);
                max_n = max_n.max(proj_n);

                let proj_p = px * (point.x - hull_points[i].x) + py * (point.y - hull_points[i].y);
                min_p = min_p.min(proj_p);
                max_p = max_p.max(proj_p);
            }

            let width = max_n - min_n;
            let height = max_p - min_p;
            let area = width * height;

            if area < min_area {
                min_area = area;

                let center_n = (min_n + max_n) / 2.0;
                let center_p = (min_p + max_p) / 2.0;

                let center_x = hull_points[i].x + center_n * nx + center_p * px;
                let center_y = hull_points[i].y + center_n * ny + center_p * py;

                let angle_deg = f32::atan2(ny, nx) * 180.0 / PI;

                min_rect = RectFit {
                    center: Point::new(center_x, center_y),
                    width,
                    height,
                    angle: normalize_angle(angle_deg),
                };
            }
        }

        min_rect
    }
}

/// The minimum-area rotated rectangle fitted around a polygon.
#[derive(Debug, Clone, Copy)]
pub struct RectFit {
    /// The center point of the rectangle.
    pub center: Point,
    /// Extent along the rectangle's own x axis.
    pub width: f32,
    /// Extent along the rectangle's own y axis.
    pub height: f32,
    /// Rotation in degrees, normalized to `[0, 360)`.
    pub angle: f32,
}

impl RectFit {
    fn empty() -> Self {
        Self {
            center: Point::new(0.0, 0.0),
            width: 0.0,
            height: 0.0,
            angle: 0.0,
        }
    }

    /// Gets the length of the shorter side of the rectangle.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Gets the area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Rotates the offset `(dx, dy)` by `angle` degrees around the origin using
/// the crate-wide clockwise-positive convention, and translates by `center`.
///
/// Every corner computation and every crop sample goes through this one
/// function so that boxes and pixels cannot drift apart.
#[inline]
pub fn rotate_offset(center: Point, dx: f32, dy: f32, angle: f32) -> Point {
    let rad = angle * PI / 180.0;
    let (sin_a, cos_a) = rad.sin_cos();
    Point::new(
        center.x + dx * cos_a - dy * sin_a,
        center.y + dx * sin_a + dy * cos_a,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, side: f32) -> Polygon {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ])
    }

    #[test]
    fn test_normalize_angle_idempotent() {
        for angle in [-730.0f32, -10.0, 0.0, 10.0, 359.9, 370.0, 1083.0] {
            let once = normalize_angle(angle);
            assert!((0.0..360.0).contains(&once));
            assert_eq!(normalize_angle(once), once);
        }
        assert_eq!(normalize_angle(370.0), normalize_angle(10.0));
        assert!((normalize_angle(-10.0) - 350.0).abs() < 1e-4);
    }

    #[test]
    fn test_polygon_area_and_perimeter() {
        let poly = square(0.0, 0.0, 4.0);
        assert_eq!(poly.area(), 16.0);
        assert_eq!(poly.perimeter(), 16.0);

        // Fewer than 3 points has no area
        let degenerate = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(degenerate.area(), 0.0);
    }

    #[test]
    fn test_convex_hull_drops_interior_points() {
        let mut points = square(0.0, 0.0, 10.0).points;
        points.push(Point::new(5.0, 5.0));
        let hull = Polygon::new(points).convex_hull();
        assert_eq!(hull.points.len(), 4);
        assert_eq!(hull.area(), 100.0);
    }

    #[test]
    fn test_solidity_of_concave_shape() {
        assert!((square(0.0, 0.0, 10.0).solidity() - 1.0).abs() < 1e-4);

        // L-shape: half the bounding square
        let l_shape = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let solidity = l_shape.solidity();
        assert!(solidity < 0.9, "L-shape solidity was {}", solidity);
    }

    #[test]
    fn test_min_area_rect_axis_aligned() {
        let fit = square(10.0, 20.0, 8.0).min_area_rect();
        assert!((fit.center.x - 14.0).abs() < 1e-3);
        assert!((fit.center.y - 24.0).abs() < 1e-3);
        assert!((fit.area() - 64.0).abs() < 1e-2);
        assert!((fit.min_side() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_min_area_rect_rotated_square() {
        // Diamond: a square rotated by 45 degrees
        let diamond = Polygon::new(vec![
            Point::new(10.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 20.0),
            Point::new(0.0, 10.0),
        ]);
        let fit = diamond.min_area_rect();
        let side = (200.0f32).sqrt();
        assert!((fit.width - side).abs() < 1e-2);
        assert!((fit.height - side).abs() < 1e-2);
        assert!((fit.center.x - 10.0).abs() < 1e-3);
        assert!((fit.center.y - 10.0).abs() < 1e-3);
        // The fitted edge direction is some multiple of 45 degrees
        let rem = fit.angle % 45.0;
        assert!(rem < 1e-2 || rem > 45.0 - 1e-2, "angle was {}", fit.angle);
    }

    #[test]
    fn test_rotate_offset_quarter_turn() {
        let center = Point::new(5.0, 5.0);
        // Clockwise 90 degrees in image coordinates: +x maps to +y
        let p = rotate_offset(center, 3.0, 0.0, 90.0);
        assert!((p.x - 5.0).abs() < 1e-4);
        assert!((p.y - 8.0).abs() < 1e-4);
    }
}
