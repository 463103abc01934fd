//! Whole-part 3-D collision detection.
//!
//! Two planar tabs collide when they overlap within the same plane, or
//! when their planes' intersection line passes through the interior of
//! both polygons. Tabs that legitimately touch, either through related
//! ids (a tab and its intermediate) or by sharing two or more perimeter
//! points, are exempt from the non-coplanar test: a shared fold edge is
//! exactly what a valid bend looks like.

use std::collections::BTreeMap;

use crate::geom::{
    BBox, Line3, PlanarFrame, Plane, Point3, Tolerance, coplanar_polygons_overlap,
    point_in_polygon_2d,
};
use crate::part::{Tab, TabId};

/// Check every tab pair of an assembled part. Returns true when any pair
/// collides.
#[must_use]
pub fn part_has_collision(tabs: &BTreeMap<TabId, Tab>, gap: f64) -> bool {
    let entries: Vec<(&TabId, &Tab)> = tabs.iter().collect();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (id_i, tab_i) = entries[i];
            let (id_j, tab_j) = entries[j];

            if id_i.is_related(id_j) {
                continue;
            }

            let pts_i = tab_i.coords();
            let pts_j = tab_j.coords();
            let (Some(bb_i), Some(bb_j)) =
                (BBox::from_points(&pts_i), BBox::from_points(&pts_j))
            else {
                continue;
            };
            if !bb_i.intersects_with_gap(bb_j, gap) {
                continue;
            }

            if polygons_collide(&pts_i, &pts_j, gap) {
                log::debug!("collision between tab {id_i} and tab {id_j}");
                return true;
            }
        }
    }
    false
}

fn polygons_collide(pts_a: &[Point3], pts_b: &[Point3], tol: f64) -> bool {
    let (Some(plane_a), Some(plane_b)) = (Plane::best_fit(pts_a), Plane::best_fit(pts_b)) else {
        return false;
    };

    if plane_a.is_coplanar_with(&plane_b, tol) {
        return coplanar_polygons_overlap(pts_a, pts_b);
    }

    // Polygons meeting along a shared edge are a connection, not a collision.
    if shared_point_count(pts_a, pts_b, tol) >= 2 {
        return false;
    }

    if plane_a.is_parallel_to(&plane_b) {
        return false;
    }

    let Some(line) = plane_a.intersect(&plane_b) else {
        return false;
    };

    line_crosses_polygon_interior(&line, pts_a) && line_crosses_polygon_interior(&line, pts_b)
}

fn shared_point_count(pts_a: &[Point3], pts_b: &[Point3], tol: f64) -> usize {
    let tolerance = Tolerance::new(tol);
    pts_a
        .iter()
        .filter(|&&pa| pts_b.iter().any(|&pb| tolerance.approx_eq_point3(pa, pb)))
        .count()
}

/// Does an infinite line pass through the interior of a planar polygon?
fn line_crosses_polygon_interior(line: &Line3, polygon: &[Point3]) -> bool {
    let Some(frame) = PlanarFrame::from_polygon(polygon) else {
        return false;
    };
    let Some(plane) = Plane::best_fit(polygon) else {
        return false;
    };
    let poly_2d = frame.project_all(polygon);

    let dir_dot_normal = line.direction.dot(plane.normal);
    if dir_dot_normal.abs() < 1e-9 {
        // Line parallel to the plane: only relevant when it lies on it.
        if plane.signed_distance(line.origin).abs() > Tolerance::DEGENERATE.eps {
            return false;
        }
        let p_2d = frame.project(line.origin);
        let d_2d = [line.direction.dot(frame.u), line.direction.dot(frame.v)];

        // The line is in-plane: it crosses the interior when it properly
        // enters and exits, i.e. cuts at least two edges.
        let n = poly_2d.len();
        let mut crossings = 0;
        for i in 0..n {
            let a = poly_2d[i];
            let b = poly_2d[(i + 1) % n];
            let edge = [b[0] - a[0], b[1] - a[1]];
            let denom = d_2d[0] * edge[1] - d_2d[1] * edge[0];
            if denom.abs() < 1e-9 {
                continue;
            }
            let diff = [a[0] - p_2d[0], a[1] - p_2d[1]];
            let s = (diff[0] * d_2d[1] - diff[1] * d_2d[0]) / denom;
            if 0.01 < s && s < 0.99 {
                crossings += 1;
            }
        }
        return crossings >= 2;
    }

    // Line pierces the plane at one point: interior test on that point.
    let t = (plane.origin - line.origin).dot(plane.normal) / dir_dot_normal;
    let hit = line.point_at(t);
    point_in_polygon_2d(frame.project(hit), &poly_2d)
}
