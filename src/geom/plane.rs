//! Planes and plane fitting.
//!
//! Tab planes come from three rectangle corners; intermediate-triangle
//! planes and the edge-coplanarity filter use a best-fit over four or more
//! points (centered covariance, smallest-eigenvalue axis as the normal).

use super::core::{Point3, Tolerance, Vec3};
use super::line::Line3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Point3,
    /// Unit normal. Constructors guarantee normalization.
    pub normal: Vec3,
}

impl Plane {
    #[must_use]
    pub fn new(origin: Point3, normal: Vec3) -> Option<Self> {
        let normal = normal.normalized()?;
        Some(Self { origin, normal })
    }

    /// Plane through three points with normal `(p1-p0) × (p2-p0)`.
    /// `None` when the points are collinear (normal magnitude ≤ 1e-6).
    #[must_use]
    pub fn from_three_points(p0: Point3, p1: Point3, p2: Point3) -> Option<Self> {
        let normal = (p1 - p0).cross(p2 - p0);
        if Tolerance::DEGENERATE.is_zero_vec3(normal) {
            return None;
        }
        Self::new(p0, normal)
    }

    /// Best-fit plane through a point set.
    ///
    /// Centers the points, accumulates the covariance matrix and extracts
    /// the axis with the smallest eigenvalue via power iteration on the two
    /// dominant axes. Three points fall back to the exact construction.
    #[must_use]
    pub fn best_fit(points: &[Point3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        if points.len() == 3 {
            return Self::from_three_points(points[0], points[1], points[2]);
        }

        let centroid = Point3::centroid(points)?;
        let mut cov = [[0.0_f64; 3]; 3];
        for p in points {
            let d = p.sub_point(centroid);
            cov[0][0] += d.x * d.x;
            cov[0][1] += d.x * d.y;
            cov[0][2] += d.x * d.z;
            cov[1][1] += d.y * d.y;
            cov[1][2] += d.y * d.z;
            cov[2][2] += d.z * d.z;
        }
        cov[1][0] = cov[0][1];
        cov[2][0] = cov[0][2];
        cov[2][1] = cov[1][2];

        let normal = smallest_covariance_axis(&cov)?;
        Self::new(centroid, normal)
    }

    /// Signed distance from a point to the plane along the normal.
    #[must_use]
    pub fn signed_distance(&self, p: Point3) -> f64 {
        (p - self.origin).dot(self.normal)
    }

    /// Orthogonal projection of a point onto the plane.
    #[must_use]
    pub fn project_point(&self, p: Point3) -> Point3 {
        p - self.normal * self.signed_distance(p)
    }

    #[must_use]
    pub fn is_parallel_to(&self, other: &Plane) -> bool {
        Tolerance::DEGENERATE.is_zero_vec3(self.normal.cross(other.normal))
    }

    /// Parallel and within `tol` of the same plane.
    #[must_use]
    pub fn is_coplanar_with(&self, other: &Plane, tol: f64) -> bool {
        self.is_parallel_to(other) && self.signed_distance(other.origin).abs() <= tol
    }

    /// Angle between the two plane normals in radians.
    #[must_use]
    pub fn angle_between(&self, other: &Plane) -> f64 {
        self.normal.dot(other.normal).clamp(-1.0, 1.0).acos()
    }

    /// Deviation of the two normals from perpendicular, in radians.
    #[must_use]
    pub fn deviation_from_perpendicular(&self, other: &Plane) -> f64 {
        let angle = self
            .normal
            .dot(other.normal)
            .abs()
            .clamp(0.0, 1.0)
            .acos();
        (angle - std::f64::consts::FRAC_PI_2).abs()
    }

    /// Intersection line of two planes.
    ///
    /// Direction is `n_a × n_b`; a position is found by zeroing the
    /// coordinate with the largest direction component and solving the
    /// remaining 2×2 system of the plane equations. `None` for parallel
    /// planes.
    #[must_use]
    pub fn intersect(&self, other: &Plane) -> Option<Line3> {
        let direction = self.normal.cross(other.normal);
        if Tolerance::DEGENERATE.is_zero_vec3(direction) {
            return None;
        }

        let n1 = self.normal;
        let n2 = other.normal;
        let d1 = n1.dot(self.origin.to_vec3());
        let d2 = n2.dot(other.origin.to_vec3());

        let abs_dir = direction.abs();
        let point = if abs_dir.z >= abs_dir.x && abs_dir.z >= abs_dir.y {
            let (x, y) = solve_2x2(n1.x, n1.y, d1, n2.x, n2.y, d2)?;
            Point3::new(x, y, 0.0)
        } else if abs_dir.y >= abs_dir.x {
            let (x, z) = solve_2x2(n1.x, n1.z, d1, n2.x, n2.z, d2)?;
            Point3::new(x, 0.0, z)
        } else {
            let (y, z) = solve_2x2(n1.y, n1.z, d1, n2.y, n2.z, d2)?;
            Point3::new(0.0, y, z)
        };

        Line3::new(point, direction)
    }

    /// Intersection of a line (given by a point and direction) with the
    /// plane. `None` when the line is parallel to the plane.
    #[must_use]
    pub fn intersect_line(&self, origin: Point3, direction: Vec3) -> Option<Point3> {
        let denom = direction.dot(self.normal);
        if Tolerance::DEGENERATE.approx_zero(denom) {
            return None;
        }
        let t = (self.origin - origin).dot(self.normal) / denom;
        Some(origin + direction * t)
    }
}

/// Solve `a1·x + b1·y = c1`, `a2·x + b2·y = c2`.
fn solve_2x2(a1: f64, b1: f64, c1: f64, a2: f64, b2: f64, c2: f64) -> Option<(f64, f64)> {
    let det = a1 * b2 - a2 * b1;
    if Tolerance::DEFAULT.approx_zero(det) {
        return None;
    }
    Some(((c1 * b2 - c2 * b1) / det, (a1 * c2 - a2 * c1) / det))
}

/// Axis of the covariance matrix with the smallest eigenvalue.
///
/// Power iteration finds the two dominant axes; the smallest axis comes out
/// of the cross product, with a Rayleigh-quotient sort to be safe against
/// near-degenerate spectra.
fn smallest_covariance_axis(cov: &[[f64; 3]; 3]) -> Option<Vec3> {
    let iterations = 20;
    let dominant = power_iteration(cov, Vec3::X, iterations);

    let mut second = if dominant.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    second = second - dominant.mul_scalar(second.dot(dominant));
    let second = power_iteration(cov, second.normalized()?, iterations);
    let third = dominant.cross(second);

    let axes = [
        dominant.normalized()?,
        second.normalized()?,
        third.normalized()?,
    ];
    let mut scored: Vec<(f64, Vec3)> = axes
        .iter()
        .map(|&axis| (rayleigh_quotient(cov, axis), axis))
        .collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    Some(scored[0].1)
}

fn power_iteration(cov: &[[f64; 3]; 3], initial: Vec3, iterations: usize) -> Vec3 {
    let mut v = initial;
    for _ in 0..iterations {
        let next = Vec3::new(
            cov[0][0] * v.x + cov[0][1] * v.y + cov[0][2] * v.z,
            cov[1][0] * v.x + cov[1][1] * v.y + cov[1][2] * v.z,
            cov[2][0] * v.x + cov[2][1] * v.y + cov[2][2] * v.z,
        );
        v = next.normalized().unwrap_or(v);
    }
    v
}

fn rayleigh_quotient(cov: &[[f64; 3]; 3], v: Vec3) -> f64 {
    let mv = Vec3::new(
        cov[0][0] * v.x + cov[0][1] * v.y + cov[0][2] * v.z,
        cov[1][0] * v.x + cov[1][1] * v.y + cov[1][2] * v.z,
        cov[2][0] * v.x + cov[2][1] * v.y + cov[2][2] * v.z,
    );
    v.dot(mv) / v.dot(v).max(1e-12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_three_points_rejects_collinear() {
        let a = Point3::ORIGIN;
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        assert!(Plane::from_three_points(a, b, c).is_none());
    }

    #[test]
    fn best_fit_recovers_flat_plane() {
        let pts = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(10.0, 0.0, 1.0),
            Point3::new(10.0, 5.0, 1.0),
            Point3::new(0.0, 5.0, 1.0),
        ];
        let plane = Plane::best_fit(&pts).unwrap();
        assert!(plane.normal.cross(Vec3::Z).length() < 1e-9);
        for p in &pts {
            assert!(plane.signed_distance(*p).abs() < 1e-9);
        }
    }

    #[test]
    fn intersect_perpendicular_planes() {
        let xy = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let xz = Plane::new(Point3::ORIGIN, Vec3::Y).unwrap();
        let line = xy.intersect(&xz).unwrap();
        // The X axis.
        assert!(line.direction.cross(Vec3::X).length() < 1e-12);
        assert!(line.distance_to_point(Point3::new(7.0, 0.0, 0.0)) < 1e-9);
    }

    #[test]
    fn intersect_parallel_planes_is_none() {
        let a = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let b = Plane::new(Point3::new(0.0, 0.0, 5.0), Vec3::Z).unwrap();
        assert!(a.intersect(&b).is_none());
        assert!(a.is_parallel_to(&b));
        assert!(!a.is_coplanar_with(&b, 1e-6));
        assert!(a.is_coplanar_with(&b, 10.0));
    }

    #[test]
    fn line_plane_intersection() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 5.0), Vec3::Z).unwrap();
        let hit = plane
            .intersect_line(Point3::ORIGIN, Vec3::new(0.0, 0.0, 2.0))
            .unwrap();
        assert_eq!(hit, Point3::new(0.0, 0.0, 5.0));
        assert!(plane.intersect_line(Point3::ORIGIN, Vec3::X).is_none());
    }

    #[test]
    fn perpendicular_deviation() {
        let xy = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let xz = Plane::new(Point3::ORIGIN, Vec3::Y).unwrap();
        assert!(xy.deviation_from_perpendicular(&xz) < 1e-12);
        assert!((xy.deviation_from_perpendicular(&xy) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
