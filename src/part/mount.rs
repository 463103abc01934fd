//! Mounting features (screw holes) on tabs.
//!
//! A mount lives in its tab's local (u, v) frame: `u` along `A→B`, `v`
//! along `B→C`, both measured from `A`. The original global coordinates are
//! kept when the mount was supplied in 3-D, because surface separation
//! sorts mounts by their global projections.

use crate::geom::{Point3, Tolerance};

use super::rect::Rectangle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mount {
    /// Distance along the `A→B` direction from corner A.
    pub u: f64,
    /// Distance along the `B→C` direction from corner A.
    pub v: f64,
    /// Hole radius.
    pub radius: f64,
    /// Original 3-D position, when the mount came in as global coordinates.
    pub global: Option<Point3>,
}

impl Mount {
    #[must_use]
    pub const fn new(u: f64, v: f64, radius: f64) -> Self {
        Self {
            u,
            v,
            radius,
            global: None,
        }
    }

    /// Convert a global 3-D position into the rectangle's (u, v) frame.
    ///
    /// A point that does not lie on the rectangle's plane is projected onto
    /// it with a logged diagnostic; mounts are only ever constraints, so a
    /// slightly off-plane input is not worth failing the whole run for.
    #[must_use]
    pub fn from_global(rect: &Rectangle, point: Point3, radius: f64) -> Option<Self> {
        let plane = rect.plane()?;
        let ab = rect.ab_direction()?;
        let bc = rect.bc_direction()?;

        let mut position = point;
        let off_plane = plane.signed_distance(point).abs();
        if off_plane > Tolerance::DEGENERATE.eps {
            log::warn!(
                "mount at {point:?} is {off_plane:.6} off its tab plane; projecting onto the plane"
            );
            position = plane.project_point(point);
        }

        let rel = position - rect.corner(super::ids::CornerId::A);
        Some(Self {
            u: rel.dot(ab),
            v: rel.dot(bc),
            radius,
            global: Some(position),
        })
    }

    /// Reconstruct the global position from the local frame.
    #[must_use]
    pub fn global_position(&self, rect: &Rectangle) -> Option<Point3> {
        if let Some(p) = self.global {
            return Some(p);
        }
        let ab = rect.ab_direction()?;
        let bc = rect.bc_direction()?;
        Some(rect.corner(super::ids::CornerId::A) + ab * self.u + bc * self.v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_roundtrip() {
        let rect = Rectangle::from_three_points(
            Point3::new(30.0, 30.0, 0.0),
            Point3::new(30.0, 0.0, 0.0),
            Point3::new(80.0, 0.0, 0.0),
        );
        let mount = Mount::from_global(&rect, Point3::new(55.0, 15.0, 0.0), 5.0).unwrap();
        let back = mount.global_position(&rect).unwrap();
        assert!(back.distance_to(Point3::new(55.0, 15.0, 0.0)) < 1e-9);
    }

    #[test]
    fn off_plane_mount_is_projected() {
        let rect = Rectangle::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(50.0, 50.0, 0.0),
        );
        let mount = Mount::from_global(&rect, Point3::new(25.0, 25.0, 3.0), 5.0).unwrap();
        let p = mount.global_position(&rect).unwrap();
        assert!(p.z.abs() < 1e-9);
    }
}
