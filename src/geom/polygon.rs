//! Planar polygon tests in a local 2-D frame.
//!
//! Tabs are planar polygons in 3-D; every containment/crossing predicate
//! here first projects into a local (u, v) frame and then works in 2-D.
//! Segment intersection uses the parametric cross-product form with an
//! interior-only window (`0.01 < t, s < 0.99`) so shared endpoints never
//! count as crossings.

use super::core::{Point3, Tolerance, Vec3};
use super::plane::Plane;

/// Interior-only parameter window for segment intersection tests.
const INTERIOR_LO: f64 = 0.01;
const INTERIOR_HI: f64 = 0.99;

// ─────────────────────────────────────────────────────────────────────────────
// Local 2-D frame
// ─────────────────────────────────────────────────────────────────────────────

/// A local planar coordinate frame: origin plus two in-plane unit axes.
#[derive(Debug, Clone, Copy)]
pub struct PlanarFrame {
    pub origin: Point3,
    pub u: Vec3,
    pub v: Vec3,
}

impl PlanarFrame {
    /// Frame spanned by a polygon: origin at the first vertex, `u` along
    /// the first non-degenerate edge, `v` completing the basis with the
    /// polygon normal.
    #[must_use]
    pub fn from_polygon(points: &[Point3]) -> Option<Self> {
        let origin = *points.first()?;
        let plane = Plane::best_fit(points)?;
        let u = points
            .iter()
            .skip(1)
            .find_map(|&p| (p - origin).normalized())?;
        let v = plane.normal.cross(u).normalized()?;
        Some(Self { origin, u, v })
    }

    #[must_use]
    pub fn project(&self, p: Point3) -> [f64; 2] {
        let rel = p - self.origin;
        [rel.dot(self.u), rel.dot(self.v)]
    }

    #[must_use]
    pub fn project_all(&self, points: &[Point3]) -> Vec<[f64; 2]> {
        points.iter().map(|&p| self.project(p)).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 2-D predicates
// ─────────────────────────────────────────────────────────────────────────────

/// Proper interior intersection of segments `a1-a2` and `b1-b2` in 2-D.
#[must_use]
pub fn segments_intersect_2d(a1: [f64; 2], a2: [f64; 2], b1: [f64; 2], b2: [f64; 2]) -> bool {
    let d1 = [a2[0] - a1[0], a2[1] - a1[1]];
    let d2 = [b2[0] - b1[0], b2[1] - b1[1]];

    let cross = d1[0] * d2[1] - d1[1] * d2[0];
    if cross.abs() < 1e-10 {
        return false; // Parallel or collinear.
    }

    let diff = [b1[0] - a1[0], b1[1] - a1[1]];
    let t = (diff[0] * d2[1] - diff[1] * d2[0]) / cross;
    let s = (diff[0] * d1[1] - diff[1] * d1[0]) / cross;

    INTERIOR_LO < t && t < INTERIOR_HI && INTERIOR_LO < s && s < INTERIOR_HI
}

/// Ray-casting point-in-polygon test.
#[must_use]
pub fn point_in_polygon_2d(point: [f64; 2], polygon: &[[f64; 2]]) -> bool {
    let [x, y] = point;
    let n = polygon.len();
    let mut inside = false;

    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = polygon[i];
        let [xj, yj] = polygon[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi + 1e-10) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Minimum distance from a 2-D point to a segment.
#[must_use]
pub fn point_segment_distance_2d(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let l2 = ab[0] * ab[0] + ab[1] * ab[1];
    if l2 == 0.0 {
        return ((p[0] - a[0]).powi(2) + (p[1] - a[1]).powi(2)).sqrt();
    }
    let t = (((p[0] - a[0]) * ab[0] + (p[1] - a[1]) * ab[1]) / l2).clamp(0.0, 1.0);
    let proj = [a[0] + t * ab[0], a[1] + t * ab[1]];
    ((p[0] - proj[0]).powi(2) + (p[1] - proj[1]).powi(2)).sqrt()
}

fn project_axis(p: Point3, axes: (usize, usize)) -> [f64; 2] {
    let arr = p.to_array();
    [arr[axes.0], arr[axes.1]]
}

/// The three orthogonal axis-pair projections (XY, XZ, YZ).
const AXIS_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Segment crossing test applied in each of the three axis projections.
#[must_use]
pub fn segments_cross_any_projection(p1: Point3, p2: Point3, p3: Point3, p4: Point3) -> bool {
    AXIS_PAIRS.iter().any(|&axes| {
        segments_intersect_2d(
            project_axis(p1, axes),
            project_axis(p2, axes),
            project_axis(p3, axes),
            project_axis(p4, axes),
        )
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Quadrilateral checks
// ─────────────────────────────────────────────────────────────────────────────

/// A quadrilateral folds over itself when opposite edges cross
/// (bow-tie shape), in any axis projection.
#[must_use]
pub fn quad_self_intersecting(a: Point3, b: Point3, c: Point3, d: Point3) -> bool {
    segments_cross_any_projection(a, b, c, d) || segments_cross_any_projection(b, c, d, a)
}

/// Near-zero diagonal cross-product area means three or more corners are
/// collinear and the quad cannot carry a flange.
#[must_use]
pub fn quad_degenerate(a: Point3, b: Point3, c: Point3, d: Point3, min_area: f64) -> bool {
    let area = 0.5 * (c - a).cross(d - b).length();
    area < min_area
}

/// Ratio of the longest to the shortest perimeter edge of a quadrilateral.
#[must_use]
pub fn quad_aspect_ratio(a: Point3, b: Point3, c: Point3, d: Point3) -> f64 {
    let lengths = [
        a.distance_to(b),
        b.distance_to(c),
        c.distance_to(d),
        d.distance_to(a),
    ];
    let longest = lengths.iter().copied().fold(f64::MIN, f64::max);
    let shortest = lengths.iter().copied().fold(f64::MAX, f64::min);
    if shortest <= 0.0 {
        f64::INFINITY
    } else {
        longest / shortest
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polygon containment / overlap
// ─────────────────────────────────────────────────────────────────────────────

/// Does `outer` fully cover `inner`?
///
/// Both polygons are projected into `inner`'s local frame. `inner` is
/// covered when every vertex lies inside `outer` (or within `buffer` of its
/// boundary) and no `inner` edge properly crosses an `outer` edge. Used to
/// ensure a modified tab still covers its original rectangle.
#[must_use]
pub fn polygon_contains(outer: &[Point3], inner: &[Point3], buffer: f64) -> bool {
    let Some(frame) = PlanarFrame::from_polygon(inner) else {
        return false;
    };
    let outer_2d = frame.project_all(outer);
    let inner_2d = frame.project_all(inner);

    for &p in &inner_2d {
        if point_in_polygon_2d(p, &outer_2d) {
            continue;
        }
        let near_boundary = polygon_edges_2d(&outer_2d)
            .any(|(a, b)| point_segment_distance_2d(p, a, b) <= buffer);
        if !near_boundary {
            return false;
        }
    }

    for (ia, ib) in polygon_edges_2d(&inner_2d) {
        for (oa, ob) in polygon_edges_2d(&outer_2d) {
            if segments_intersect_2d(ia, ib, oa, ob) {
                return false;
            }
        }
    }
    true
}

/// Overlap test for two coplanar polygons, projected into the first
/// polygon's frame. Touching along a shared boundary does not count;
/// a proper edge crossing or a vertex strictly inside the other does.
#[must_use]
pub fn coplanar_polygons_overlap(first: &[Point3], second: &[Point3]) -> bool {
    let Some(frame) = PlanarFrame::from_polygon(first) else {
        return false;
    };
    let a = frame.project_all(first);
    let b = frame.project_all(second);

    for (ea1, ea2) in polygon_edges_2d(&a) {
        for (eb1, eb2) in polygon_edges_2d(&b) {
            if segments_intersect_2d(ea1, ea2, eb1, eb2) {
                return true;
            }
        }
    }

    let strictly_inside = |p: [f64; 2], poly: &[[f64; 2]]| {
        point_in_polygon_2d(p, poly)
            && !polygon_edges_2d(poly)
                .any(|(s, e)| point_segment_distance_2d(p, s, e) <= Tolerance::COINCIDENT.eps)
    };

    b.iter().any(|&p| strictly_inside(p, &a)) || a.iter().any(|&p| strictly_inside(p, &b))
}

fn polygon_edges_2d(poly: &[[f64; 2]]) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
    let n = poly.len();
    (0..n).map(move |i| (poly[i], poly[(i + 1) % n]))
}
