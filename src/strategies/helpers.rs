//! Shared geometry for the bend strategy generators.

use crate::config::EngineConfig;
use crate::geom::{Line3, Plane, Point3, Tolerance, Vec3};
use crate::part::{Tab, TabId};

/// Everything a generator needs about the pair being connected.
/// Planes and centroids are computed once up front; generators only read.
pub(crate) struct PairContext<'a> {
    pub tab_x: &'a Tab,
    pub tab_z: &'a Tab,
    pub x_id: TabId,
    pub z_id: TabId,
    pub plane_x: Plane,
    pub plane_z: Plane,
    pub centroid_x: Point3,
    pub centroid_z: Point3,
    pub cfg: &'a EngineConfig,
}

impl<'a> PairContext<'a> {
    pub fn new(tab_x: &'a Tab, tab_z: &'a Tab, cfg: &'a EngineConfig) -> Option<Self> {
        let plane_x = tab_x.plane()?;
        let plane_z = tab_z.plane()?;
        Some(Self {
            tab_x,
            tab_z,
            x_id: tab_x.id().clone(),
            z_id: tab_z.id().clone(),
            plane_x,
            plane_z,
            centroid_x: tab_x.centroid()?,
            centroid_z: tab_z.centroid()?,
            cfg,
        })
    }
}

/// Place a bend point: the point on the bend line closest to the chord
/// from one tab's corner to the other's. `None` when the chord is
/// degenerate or parallel to the bend line.
#[must_use]
pub(crate) fn bend_point(corner_a: Point3, corner_b: Point3, bend: &Line3) -> Option<Point3> {
    let chord = Line3::through(corner_a, corner_b)?;
    bend.closest_point_to_line(&chord)
}

/// Flange points for one side of a bend: both bend points pushed
/// perpendicular off the bend line, inside `plane`, toward `toward`.
///
/// `None` when the bend direction degenerates or when the perpendicular
/// has no meaningful orientation toward the reference point (the
/// "angle check" rejection).
#[must_use]
pub(crate) fn flange_pair(
    bp_l: Point3,
    bp_r: Point3,
    plane: &Plane,
    toward: Point3,
    flange_length: f64,
) -> Option<(Point3, Point3)> {
    let bend_dir = (bp_r - bp_l).normalized()?;
    let mut f = plane.normal.cross(bend_dir).normalized()?;

    let mid = bp_l.midpoint(bp_r);
    let orientation = f.dot(toward - mid);
    if Tolerance::DEGENERATE.approx_zero(orientation) {
        return None;
    }
    if orientation < 0.0 {
        f = -f;
    }
    Some((bp_l + f * flange_length, bp_r + f * flange_length))
}

/// Outward in-plane normal of a directed edge, oriented away from the tab
/// centroid.
#[must_use]
pub(crate) fn outward_direction(
    edge_vec: Vec3,
    plane: &Plane,
    edge_mid: Point3,
    centroid: Point3,
) -> Option<Vec3> {
    let mut out = edge_vec.cross(plane.normal).normalized()?;
    if out.dot(edge_mid - centroid) < 0.0 {
        out = -out;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bend_point_lands_on_line() {
        let bend = Line3::new(Point3::ORIGIN, Vec3::X).unwrap();
        // Chord from above the line to below it, crossing at x = 4.
        let p = bend_point(
            Point3::new(4.0, 10.0, 0.0),
            Point3::new(4.0, -10.0, 0.0),
            &bend,
        )
        .unwrap();
        assert!(p.distance_to(Point3::new(4.0, 0.0, 0.0)) < 1e-9);
    }

    #[test]
    fn flange_pair_points_toward_reference() {
        let plane = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let (fl, fr) = flange_pair(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            &plane,
            Point3::new(25.0, 40.0, 0.0),
            10.0,
        )
        .unwrap();
        assert!(fl.distance_to(Point3::new(0.0, 10.0, 0.0)) < 1e-9);
        assert!(fr.distance_to(Point3::new(50.0, 10.0, 0.0)) < 1e-9);
    }

    #[test]
    fn flange_pair_rejects_ambiguous_reference() {
        let plane = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        // Reference point on the bend line itself: no orientation.
        assert!(
            flange_pair(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(50.0, 0.0, 0.0),
                &plane,
                Point3::new(25.0, 0.0, 0.0),
                10.0,
            )
            .is_none()
        );
    }

    #[test]
    fn outward_direction_faces_away_from_centroid() {
        let plane = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let out = outward_direction(
            Vec3::new(50.0, 0.0, 0.0),
            &plane,
            Point3::new(25.0, 0.0, 0.0),
            Point3::new(25.0, 15.0, 0.0),
        )
        .unwrap();
        // Bottom edge of a tab whose centroid sits above it: outward is -Y.
        assert!(out.dot(Vec3::new(0.0, -1.0, 0.0)) > 0.99);
    }
}
