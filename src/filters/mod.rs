//! Manufacturability filters.
//!
//! Every filter takes already-computed geometry plus the configuration and
//! answers accept/reject; rejection is never an error, it just skips the
//! candidate. Distance-type thresholds scale with the connection distance
//! via the adaptive-tolerance rule so one configuration works across part
//! scales.

mod collision;

pub use collision::part_has_collision;

use crate::config::{DesignRules, FilterConfig, StrategyConfig};
use crate::geom::{
    BBox, Plane, Point3, Tolerance, adaptive_tolerance, polygon_contains, quad_aspect_ratio,
    segments_cross_any_projection,
};
use crate::part::Tab;

/// Bend points closer together than the minimum flange width cannot carry
/// a usable flange.
#[must_use]
pub fn min_flange_width_ok(bp_l: Point3, bp_r: Point3, rules: &DesignRules) -> bool {
    bp_l.distance_to(bp_r) >= rules.min_flange_width
}

/// Angle between the two plane normals, in degrees.
#[must_use]
pub fn bend_angle_deg(plane_a: &Plane, plane_b: &Plane) -> f64 {
    plane_a.angle_between(plane_b).to_degrees()
}

/// A bend shallower than the configured minimum cannot be formed reliably.
#[must_use]
pub fn min_bend_angle_ok(plane_a: &Plane, plane_b: &Plane, rules: &DesignRules) -> bool {
    bend_angle_deg(plane_a, plane_b) >= rules.min_bend_angle_deg
}

/// Edge-coplanarity filter for two-bend candidates.
///
/// The four endpoints of the chosen edge pair must admit a common plane
/// (best fit, max deviation within the adaptive tolerance) and that plane
/// must be near-perpendicular to both source planes.
#[must_use]
pub fn edges_coplanar(
    cp_xl: Point3,
    cp_xr: Point3,
    cp_zl: Point3,
    cp_zr: Point3,
    plane_x: &Plane,
    plane_z: &Plane,
    filters: &FilterConfig,
) -> bool {
    let connection_dist = cp_xl
        .midpoint(cp_xr)
        .distance_to(cp_zl.midpoint(cp_zr));
    let tolerance = adaptive_tolerance(
        filters.coplanarity_tolerance,
        filters.coplanarity_relative,
        connection_dist,
    );

    let points = [cp_xl, cp_xr, cp_zl, cp_zr];
    let Some(fitted) = Plane::best_fit(&points) else {
        return false;
    };

    let max_deviation = points
        .iter()
        .map(|&p| fitted.signed_distance(p).abs())
        .fold(0.0, f64::max);
    if max_deviation > tolerance {
        log::trace!("edge coplanarity: deviation {max_deviation:.3} > {tolerance:.3}");
        return false;
    }

    let angle_tol = filters.coplanarity_angle_tol_deg.to_radians();
    fitted.deviation_from_perpendicular(plane_x) < angle_tol
        && fitted.deviation_from_perpendicular(plane_z) < angle_tol
}

/// Bend points may overshoot their tab's bounding extent only by the
/// adaptive margin, hard-capped regardless of scale.
#[must_use]
pub fn bend_points_in_range(
    x_points: &[Point3],
    x_bounds: BBox,
    z_points: &[Point3],
    z_bounds: BBox,
    connection_dist: f64,
    filters: &FilterConfig,
) -> bool {
    let margin = adaptive_tolerance(filters.range_margin, filters.range_relative, connection_dist)
        .min(filters.max_absolute_overshoot);

    let max_overshoot = |points: &[Point3], bounds: BBox| {
        points
            .iter()
            .map(|&p| bounds.overshoot(p).max_component())
            .fold(0.0, f64::max)
    };

    let worst = max_overshoot(x_points, x_bounds).max(max_overshoot(z_points, z_bounds));
    if worst > margin {
        log::trace!("bend point range: overshoot {worst:.3} > {margin:.3}");
        return false;
    }
    true
}

/// Needle-shaped intermediate quads are rejected by edge aspect ratio.
#[must_use]
pub fn aspect_ratio_ok(
    a: Point3,
    b: Point3,
    c: Point3,
    d: Point3,
    strategies: &StrategyConfig,
) -> bool {
    quad_aspect_ratio(a, b, c, d) <= strategies.max_intermediate_aspect_ratio
}

/// The corner→flange connection lines must not cut through the owning
/// tab's own rectangle.
#[must_use]
pub fn connection_crosses_tab(
    corner_l: Point3,
    fp_l: Point3,
    corner_r: Point3,
    fp_r: Point3,
    rect_corners: &[Point3; 4],
) -> bool {
    let tol = Tolerance::DEGENERATE;
    let edges = [
        (rect_corners[0], rect_corners[1]),
        (rect_corners[1], rect_corners[2]),
        (rect_corners[2], rect_corners[3]),
        (rect_corners[3], rect_corners[0]),
    ];

    let crosses = |seg_start: Point3, seg_end: Point3| {
        edges.iter().any(|&(edge_start, edge_end)| {
            // A connection that starts or ends on an edge endpoint is fine.
            let shares_endpoint = [seg_start, seg_end].iter().any(|&p| {
                tol.approx_eq_point3(p, edge_start) || tol.approx_eq_point3(p, edge_end)
            });
            !shares_endpoint && segments_cross_any_projection(seg_start, seg_end, edge_start, edge_end)
        })
    };

    crosses(corner_l, fp_l) || crosses(corner_r, fp_r)
}

/// Does the modified tab still fully cover its original rectangle?
#[must_use]
pub fn tab_covers_rectangle(tab: &Tab, filters: &FilterConfig) -> bool {
    let Some(rect) = tab.rectangle() else {
        // Intermediate tabs have no source rectangle to cover.
        return true;
    };
    polygon_contains(&tab.coords(), &rect.corners(), filters.containment_buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;

    #[test]
    fn flange_width_threshold() {
        let rules = DesignRules::default();
        let a = Point3::ORIGIN;
        assert!(min_flange_width_ok(a, Point3::new(30.0, 0.0, 0.0), &rules));
        assert!(!min_flange_width_ok(a, Point3::new(29.0, 0.0, 0.0), &rules));
    }

    #[test]
    fn bend_angle_threshold() {
        let rules = DesignRules::default();
        let flat = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let steep = Plane::new(Point3::ORIGIN, Vec3::new(0.0, 1.0, 1.0)).unwrap();
        let shallow = Plane::new(Point3::ORIGIN, Vec3::new(0.0, 0.1, 1.0)).unwrap();
        assert!(min_bend_angle_ok(&flat, &steep, &rules)); // 45°
        assert!(!min_bend_angle_ok(&flat, &shallow, &rules)); // ≈5.7°
    }

    #[test]
    fn coplanar_edges_pass_skewed_edges_fail() {
        let plane_x = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let plane_z = Plane::new(Point3::ORIGIN, Vec3::X).unwrap();
        let filters = FilterConfig::default();

        // Both edges in the y=0 plane, which is perpendicular to both sources.
        assert!(edges_coplanar(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 40.0),
            Point3::new(50.0, 0.0, 40.0),
            &plane_x,
            &plane_z,
            &filters,
        ));

        // Lift one endpoint far out of the fitted plane.
        assert!(!edges_coplanar(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(0.0, 30.0, 40.0),
            Point3::new(50.0, 0.0, 40.0),
            &plane_x,
            &plane_z,
            &filters,
        ));
    }

    #[test]
    fn range_filter_caps_overshoot() {
        let filters = FilterConfig::default();
        let bounds = BBox::new(Point3::ORIGIN, Point3::new(50.0, 30.0, 0.0));
        let inside = [Point3::new(10.0, -4.0, 0.0)];
        let outside = [Point3::new(10.0, -80.0, 0.0)];
        assert!(bend_points_in_range(&inside, bounds, &[], bounds, 50.0, &filters));
        assert!(!bend_points_in_range(&outside, bounds, &[], bounds, 50.0, &filters));
    }

    #[test]
    fn connection_crossing_detection() {
        let rect = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(50.0, 30.0, 0.0),
            Point3::new(0.0, 30.0, 0.0),
        ];
        // Flange points below the bottom edge: no crossing.
        assert!(!connection_crosses_tab(
            rect[0],
            Point3::new(0.0, -10.0, 0.0),
            rect[1],
            Point3::new(50.0, -10.0, 0.0),
            &rect,
        ));
        // Connection line cutting through the rectangle interior crosses
        // the far edge.
        assert!(connection_crosses_tab(
            Point3::new(10.0, -5.0, 0.0),
            Point3::new(10.0, 35.0, 0.0),
            Point3::new(40.0, -5.0, 0.0),
            Point3::new(40.0, -8.0, 0.0),
            &rect,
        ));
    }
}
