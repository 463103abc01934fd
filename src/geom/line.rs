//! Infinite lines in 3-D space.
//!
//! A `Line3` is the carrier for bend lines: the intersection of two tab
//! planes, or a fallback construction from a plane normal and an edge
//! direction when the planes are parallel.

use super::core::{Point3, Tolerance, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub origin: Point3,
    /// Unit direction. Constructors guarantee normalization.
    pub direction: Vec3,
}

impl Line3 {
    /// Build a line from an origin and a (not necessarily unit) direction.
    /// Returns `None` when the direction is degenerate.
    #[must_use]
    pub fn new(origin: Point3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalized()?;
        Some(Self { origin, direction })
    }

    /// Line through two distinct points.
    #[must_use]
    pub fn through(a: Point3, b: Point3) -> Option<Self> {
        Self::new(a, b - a)
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// Parameter of the orthogonal projection of `p` onto the line.
    /// Used both to place bend points and to test whether a bend point's
    /// parameter lies inside a tab's corner-projection range.
    #[must_use]
    pub fn project_t(&self, p: Point3) -> f64 {
        (p - self.origin).dot(self.direction)
    }

    /// Closest point on the line to `p`.
    #[must_use]
    pub fn closest_point(&self, p: Point3) -> Point3 {
        self.point_at(self.project_t(p))
    }

    /// Perpendicular distance from `p` to the line.
    #[must_use]
    pub fn distance_to_point(&self, p: Point3) -> f64 {
        p.distance_to(self.closest_point(p))
    }

    /// Closest point on this line to another line.
    ///
    /// Solves the closest-approach problem between two infinite lines and
    /// returns the point on `self`. `None` when the lines are parallel
    /// (every point is equally close).
    #[must_use]
    pub fn closest_point_to_line(&self, other: &Line3) -> Option<Point3> {
        let d1 = self.direction;
        let d2 = other.direction;
        let r = self.origin - other.origin;

        let a = d1.dot(d1);
        let b = d1.dot(d2);
        let c = d2.dot(d2);
        let d = d1.dot(r);
        let e = d2.dot(r);

        let denom = a * c - b * b;
        if Tolerance::DEGENERATE.approx_zero(denom) {
            return None;
        }
        let t = (b * e - c * d) / denom;
        Some(self.point_at(t))
    }

    /// Parameter range of a point set projected onto the line.
    #[must_use]
    pub fn projection_range(&self, points: &[Point3]) -> Option<(f64, f64)> {
        let mut iter = points.iter().map(|&p| self.project_t(p));
        let first = iter.next()?;
        let (mut lo, mut hi) = (first, first);
        for t in iter {
            lo = lo.min(t);
            hi = hi.max(t);
        }
        Some((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_and_closest() {
        let line = Line3::new(Point3::ORIGIN, Vec3::X).unwrap();
        let p = Point3::new(3.0, 4.0, 0.0);
        assert!((line.project_t(p) - 3.0).abs() < 1e-12);
        assert_eq!(line.closest_point(p), Point3::new(3.0, 0.0, 0.0));
        assert!((line.distance_to_point(p) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn closest_point_between_skew_lines() {
        let a = Line3::new(Point3::ORIGIN, Vec3::X).unwrap();
        let b = Line3::new(Point3::new(2.0, 1.0, 1.0), Vec3::Y).unwrap();
        let p = a.closest_point_to_line(&b).unwrap();
        assert_eq!(p, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn parallel_lines_have_no_closest_point() {
        let a = Line3::new(Point3::ORIGIN, Vec3::X).unwrap();
        let b = Line3::new(Point3::new(0.0, 1.0, 0.0), Vec3::X).unwrap();
        assert!(a.closest_point_to_line(&b).is_none());
    }

    #[test]
    fn projection_range_covers_extremes() {
        let line = Line3::new(Point3::ORIGIN, Vec3::X).unwrap();
        let pts = [
            Point3::new(-2.0, 1.0, 0.0),
            Point3::new(5.0, -3.0, 2.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let (lo, hi) = line.projection_range(&pts).unwrap();
        assert!((lo + 2.0).abs() < 1e-12);
        assert!((hi - 5.0).abs() < 1e-12);
    }
}
