//! Input rectangles.
//!
//! Users supply three corner points; the fourth is derived by locating the
//! right-angle vertex and completing the rectangle. When no perpendicular
//! corner pair exists the input degrades to a parallelogram with a logged
//! diagnostic rather than a hard failure.

use crate::geom::{Plane, Point3, Vec3};

use super::ids::CornerId;

/// Perpendicularity threshold on normalized edge directions.
const PERPENDICULAR_EPS: f64 = 1e-6;

/// A planar quadrilateral in perimeter order `A → B → C → D`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    corners: [Point3; 4],
}

impl Rectangle {
    /// Build from three independent corners.
    ///
    /// The right-angle vertex is detected by testing the pairwise dot
    /// product of the normalized edge directions at each candidate corner;
    /// the detected vertex becomes `B` so that `A→B` and `B→C` are the two
    /// perpendicular edges and `D = A + C − B`.
    #[must_use]
    pub fn from_three_points(p0: Point3, p1: Point3, p2: Point3) -> Self {
        let triples = [(p0, p1, p2), (p1, p0, p2), (p0, p2, p1)];
        for (a, vertex, c) in triples {
            let Some(u) = (a - vertex).normalized() else {
                continue;
            };
            let Some(w) = (c - vertex).normalized() else {
                continue;
            };
            if u.dot(w).abs() < PERPENDICULAR_EPS {
                let d = a + (c - vertex);
                return Self {
                    corners: [a, vertex, c, d],
                };
            }
        }

        log::warn!(
            "no perpendicular corner pair among {p0:?}, {p1:?}, {p2:?}; \
             falling back to a parallelogram"
        );
        let d = p2 - (p1 - p0);
        Self {
            corners: [p0, p1, p2, d],
        }
    }

    #[must_use]
    pub const fn corner(&self, id: CornerId) -> Point3 {
        self.corners[id.index()]
    }

    #[must_use]
    pub const fn corners(&self) -> [Point3; 4] {
        self.corners
    }

    /// Directed edge starting at `from`, ending at the next corner.
    #[must_use]
    pub fn edge(&self, from: CornerId) -> (Point3, Point3) {
        (self.corner(from), self.corner(from.next()))
    }

    #[must_use]
    pub fn centroid(&self) -> Point3 {
        Point3::centroid(&self.corners).unwrap_or(self.corners[0])
    }

    /// Supporting plane, `None` when the corners are collinear.
    #[must_use]
    pub fn plane(&self) -> Option<Plane> {
        Plane::from_three_points(self.corners[0], self.corners[1], self.corners[2])
    }

    /// Unit direction of edge `A → B`.
    #[must_use]
    pub fn ab_direction(&self) -> Option<Vec3> {
        (self.corner(CornerId::B) - self.corner(CornerId::A)).normalized()
    }

    /// Unit direction of edge `B → C`.
    #[must_use]
    pub fn bc_direction(&self) -> Option<Vec3> {
        (self.corner(CornerId::C) - self.corner(CornerId::B)).normalized()
    }

    #[must_use]
    pub fn ab_length(&self) -> f64 {
        self.corner(CornerId::A).distance_to(self.corner(CornerId::B))
    }

    #[must_use]
    pub fn bc_length(&self) -> f64 {
        self.corner(CornerId::B).distance_to(self.corner(CornerId::C))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_closed_rectangle(rect: &Rectangle) {
        let [a, b, c, d] = rect.corners();
        let ab = b - a;
        let bc = c - b;
        let cd = d - c;
        let da = a - d;
        // Perpendicular adjacent edges...
        assert!(ab.dot(bc).abs() < 1e-9, "AB·BC = {}", ab.dot(bc));
        // ...and opposite edges cancel, so the perimeter closes.
        assert!((ab + cd).length() < 1e-9);
        assert!((bc + da).length() < 1e-9);
    }

    #[test]
    fn derives_fourth_corner_when_vertex_is_second() {
        let rect = Rectangle::from_three_points(
            Point3::new(30.0, 30.0, 0.0),
            Point3::new(30.0, 0.0, 0.0),
            Point3::new(80.0, 0.0, 0.0),
        );
        assert_closed_rectangle(&rect);
        assert_eq!(rect.corner(CornerId::D), Point3::new(80.0, 30.0, 0.0));
    }

    #[test]
    fn derives_fourth_corner_for_any_input_order() {
        // Right angle sits at the first input point.
        let rect = Rectangle::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(0.0, 20.0, 0.0),
        );
        assert_closed_rectangle(&rect);

        // Right angle sits at the third input point, rectangle off-axis.
        let rect = Rectangle::from_three_points(
            Point3::new(0.0, 80.0, 40.0),
            Point3::new(0.0, 40.0, 80.0),
            Point3::new(0.0, 40.0, 40.0),
        );
        assert_closed_rectangle(&rect);
    }

    #[test]
    fn falls_back_to_parallelogram() {
        let rect = Rectangle::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(25.0, 10.0, 0.0),
        );
        let [a, b, c, d] = rect.corners();
        // Opposite edges still cancel even without right angles.
        assert!(((b - a) + (d - c)).length() < 1e-9);
        assert_eq!(d, Point3::new(15.0, 10.0, 0.0));
    }
}
