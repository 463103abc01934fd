//! Two-bend connections via a synthesized intermediate tab.
//!
//! Approach 1 pairs near-perpendicular edges of the two tabs, shifts them
//! outward into a rectangular intermediate tab and folds at both of its
//! long edges. Approach 2 is the fallback when no Approach-1 candidate
//! exists (parallel or anti-parallel source planes): it builds a
//! triangular intermediate plane from an edge of the first tab and one
//! corner of the second, then applies the single-bend machinery twice.

use crate::part::{CornerId, PointKey, Segment, Side, Tab, TabId};

use super::helpers::{PairContext, bend_point, flange_pair, outward_direction};
use super::zero_bend::DIRECTED_EDGES;
use crate::filters::{
    aspect_ratio_ok, bend_points_in_range, edges_coplanar, min_bend_angle_ok, min_flange_width_ok,
    tab_covers_rectangle,
};
use crate::geom::{
    Plane, Point3, Tolerance, Vec3, adaptive_tolerance, quad_degenerate, quad_self_intersecting,
};

/// Edge-direction dot threshold for the Approach-1 perpendicularity
/// precondition.
const PERPENDICULAR_EDGE_DOT: f64 = 0.1;

/// The four forward edges of a rectangle perimeter.
const FORWARD_EDGES: [(CornerId, CornerId); 4] = [
    (CornerId::A, CornerId::B),
    (CornerId::B, CornerId::C),
    (CornerId::C, CornerId::D),
    (CornerId::D, CornerId::A),
];

pub(crate) fn two_bends(ctx: &PairContext<'_>) -> Vec<Segment> {
    let library = approach_one(ctx);
    if !library.is_empty() {
        return library;
    }
    // Fallback when the perpendicular-edge precondition cannot be met.
    approach_two(ctx)
}

// ─────────────────────────────────────────────────────────────────────────────
// Approach 1: perpendicular edges, rectangular intermediate tab
// ─────────────────────────────────────────────────────────────────────────────

fn approach_one(ctx: &PairContext<'_>) -> Vec<Segment> {
    let rules = &ctx.cfg.rules;
    let filters = &ctx.cfg.filters;
    let strategies = &ctx.cfg.strategies;
    let angle_tol = strategies.intermediate_angle_tol_deg.to_radians();

    let mut library = Vec::new();

    for &(cx_l, cx_r) in &FORWARD_EDGES {
        let (Some(cp_xl), Some(cp_xr)) = (ctx.tab_x.corner(cx_l), ctx.tab_x.corner(cx_r)) else {
            continue;
        };
        let edge_x_vec = cp_xr - cp_xl;
        let edge_x_mid = cp_xl.midpoint(cp_xr);

        for &(cz_l, cz_r) in &FORWARD_EDGES {
            let (Some(mut cp_zl), Some(mut cp_zr)) =
                (ctx.tab_z.corner(cz_l), ctx.tab_z.corner(cz_r))
            else {
                continue;
            };
            let edge_z_vec = cp_zr - cp_zl;
            let edge_z_mid = cp_zl.midpoint(cp_zr);

            let (Some(ex), Some(ez)) = (edge_x_vec.normalized(), edge_z_vec.normalized()) else {
                continue;
            };
            if ex.dot(ez).abs() >= PERPENDICULAR_EDGE_DOT {
                continue;
            }

            let Some(normal_b) = intermediate_normal(ctx, edge_x_vec, edge_z_vec) else {
                continue;
            };

            let Some(out_x) =
                outward_direction(edge_x_vec, &ctx.plane_x, edge_x_mid, ctx.centroid_x)
            else {
                continue;
            };
            let Some(out_z) =
                outward_direction(edge_z_vec, &ctx.plane_z, edge_z_mid, ctx.centroid_z)
            else {
                continue;
            };

            if out_x.dot(out_z) < strategies.antiparallel_threshold {
                continue;
            }

            if !edges_coplanar(cp_xl, cp_xr, cp_zl, cp_zr, &ctx.plane_x, &ctx.plane_z, filters) {
                continue;
            }

            // The side growing away from the other tab absorbs the
            // perpendicular separation on top of the flange length.
            let connection_vec = edge_z_mid - edge_x_mid;
            let separation = connection_vec.dot(normal_b).abs();
            let x_grows = out_x.dot(connection_vec) > 0.0;
            let (shift_x, shift_z) = if x_grows {
                (separation + rules.min_flange_length, rules.min_flange_length)
            } else {
                (rules.min_flange_length, separation + rules.min_flange_length)
            };

            let bp_xl = cp_xl + out_x * shift_x;
            let bp_xr = cp_xr + out_x * shift_x;
            let mut bp_zl = cp_zl + out_z * shift_z;
            let mut bp_zr = cp_zr + out_z * shift_z;

            let Some(plane_y) = Plane::from_three_points(bp_xl, bp_xr, bp_zl) else {
                continue;
            };
            if plane_y.deviation_from_perpendicular(&ctx.plane_x) >= angle_tol
                || plane_y.deviation_from_perpendicular(&ctx.plane_z) >= angle_tol
            {
                continue;
            }

            if !min_flange_width_ok(bp_xl, bp_xr, rules)
                || !min_flange_width_ok(bp_zl, bp_zr, rules)
            {
                continue;
            }

            if filters.check_bend_angle
                && (!min_bend_angle_ok(&ctx.plane_x, &plane_y, rules)
                    || !min_bend_angle_ok(&plane_y, &ctx.plane_z, rules))
            {
                continue;
            }

            // Left/right correspondence across the intermediate tab: pick
            // the assignment minimizing total diagonal length. The naive
            // projected-crossing test misfires on collinear layouts. The
            // swap also flips the directed insertion edge so the z run
            // still follows that tab's perimeter.
            let (mut z_from, mut z_to) = (cz_l, cz_r);
            let straight = bp_xl.distance_to(bp_zl) + bp_xr.distance_to(bp_zr);
            let crossed = bp_xl.distance_to(bp_zr) + bp_xr.distance_to(bp_zl);
            if crossed < straight {
                std::mem::swap(&mut bp_zl, &mut bp_zr);
                std::mem::swap(&mut cp_zl, &mut cp_zr);
                std::mem::swap(&mut z_from, &mut z_to);
            }

            let connection_dist = connection_vec.length();
            let (Some(x_bounds), Some(z_bounds)) =
                (ctx.tab_x.corner_bounds(), ctx.tab_z.corner_bounds())
            else {
                continue;
            };
            if !bend_points_in_range(
                &[bp_xl, bp_xr],
                x_bounds,
                &[bp_zl, bp_zr],
                z_bounds,
                connection_dist,
                filters,
            ) {
                continue;
            }

            if quad_degenerate(bp_xl, bp_xr, bp_zr, bp_zl, filters.min_quad_area)
                || quad_self_intersecting(bp_xl, bp_xr, bp_zr, bp_zl)
            {
                continue;
            }
            if !aspect_ratio_ok(bp_xl, bp_xr, bp_zr, bp_zl, strategies) {
                continue;
            }

            // Flange points, with the orientation ("angle") check built in.
            let Some((fp_xl, fp_xr)) = flange_pair(
                bp_xl,
                bp_xr,
                &ctx.plane_x,
                ctx.centroid_x,
                rules.min_flange_length,
            ) else {
                continue;
            };
            let Some((fp_zl, fp_zr)) = flange_pair(
                bp_zl,
                bp_zr,
                &ctx.plane_z,
                ctx.centroid_z,
                rules.min_flange_length,
            ) else {
                continue;
            };

            if flange_outside_edge_span(cp_xl, cp_xr, fp_xl, fp_xr, connection_dist, filters)
                || flange_outside_edge_span(cp_zl, cp_zr, fp_zl, fp_zr, connection_dist, filters)
            {
                continue;
            }

            let bridge_id = TabId::join(&ctx.x_id, &ctx.z_id);
            let bridge = Tab::intermediate(
                bridge_id.clone(),
                vec![
                    (PointKey::bend(&bridge_id, &ctx.x_id, Side::Left), bp_xl),
                    (PointKey::bend(&bridge_id, &ctx.x_id, Side::Right), bp_xr),
                    (PointKey::bend(&bridge_id, &ctx.z_id, Side::Right), bp_zr),
                    (PointKey::bend(&bridge_id, &ctx.z_id, Side::Left), bp_zl),
                ],
            );

            let mut new_x = ctx.tab_x.clone();
            if !new_x.insert_edge_run(
                cx_l,
                cx_r,
                vec![
                    (PointKey::flange(&ctx.x_id, &bridge_id, Side::Left), fp_xl),
                    (PointKey::bend(&ctx.x_id, &bridge_id, Side::Left), bp_xl),
                    (PointKey::bend(&ctx.x_id, &bridge_id, Side::Right), bp_xr),
                    (PointKey::flange(&ctx.x_id, &bridge_id, Side::Right), fp_xr),
                ],
            ) {
                continue;
            }

            let mut new_z = ctx.tab_z.clone();
            if !new_z.insert_edge_run(
                z_from,
                z_to,
                vec![
                    (PointKey::flange(&ctx.z_id, &bridge_id, Side::Left), fp_zl),
                    (PointKey::bend(&ctx.z_id, &bridge_id, Side::Left), bp_zl),
                    (PointKey::bend(&ctx.z_id, &bridge_id, Side::Right), bp_zr),
                    (PointKey::flange(&ctx.z_id, &bridge_id, Side::Right), fp_zr),
                ],
            ) {
                continue;
            }

            if filters.check_containment
                && (!tab_covers_rectangle(&new_x, filters) || !tab_covers_rectangle(&new_z, filters))
            {
                continue;
            }

            library.push(
                Segment::new((ctx.x_id.clone(), ctx.z_id.clone()), new_x, new_z)
                    .with_intermediate(bridge),
            );
        }
    }

    log::debug!(
        "two-bend approach 1 {}-{}: {} candidate(s)",
        ctx.x_id,
        ctx.z_id,
        library.len()
    );
    library
}

/// Normal of the intermediate plane: the cross of the source normals, with
/// edge-direction fallbacks for parallel planes.
fn intermediate_normal(ctx: &PairContext<'_>, edge_x: Vec3, edge_z: Vec3) -> Option<Vec3> {
    for candidate in [
        ctx.plane_x.normal.cross(ctx.plane_z.normal),
        ctx.plane_x.normal.cross(edge_x),
        ctx.plane_z.normal.cross(edge_z),
    ] {
        if !Tolerance::DEGENERATE.is_zero_vec3(candidate) {
            return candidate.normalized();
        }
    }
    None
}

/// Flange points that wander past the span of their source edge indicate a
/// mispaired edge choice.
fn flange_outside_edge_span(
    cp_l: Point3,
    cp_r: Point3,
    fp_l: Point3,
    fp_r: Point3,
    connection_dist: f64,
    filters: &crate::config::FilterConfig,
) -> bool {
    let Some(edge_dir) = (cp_r - cp_l).normalized() else {
        return true;
    };
    let span = cp_l.distance_to(cp_r);
    let margin = adaptive_tolerance(filters.range_margin, filters.range_relative, connection_dist)
        .min(filters.max_absolute_overshoot);
    let t_l = (fp_l - cp_l).dot(edge_dir);
    let t_r = (fp_r - cp_l).dot(edge_dir);
    !(t_l >= -margin && t_l <= span + margin && t_r >= -margin && t_r <= span + margin)
}

// ─────────────────────────────────────────────────────────────────────────────
// Approach 2: triangular intermediate plane, one corner consumed
// ─────────────────────────────────────────────────────────────────────────────

fn approach_two(ctx: &PairContext<'_>) -> Vec<Segment> {
    let rules = &ctx.cfg.rules;
    let filters = &ctx.cfg.filters;

    let mut library = Vec::new();

    for &(cx_l, cx_r) in &DIRECTED_EDGES {
        let (Some(cp_xl), Some(cp_xr)) = (ctx.tab_x.corner(cx_l), ctx.tab_x.corner(cx_r)) else {
            continue;
        };
        // The x edge itself becomes the first fold line.
        let bp_xl = cp_xl;
        let bp_xr = cp_xr;

        for &cz_m in &CornerId::ALL {
            let (Some(cp_zm), Some(cp_zl), Some(cp_zr)) = (
                ctx.tab_z.corner(cz_m),
                ctx.tab_z.corner(cz_m.prev()),
                ctx.tab_z.corner(cz_m.next()),
            ) else {
                continue;
            };

            let Some(bp_zm) = middle_bend_point(ctx, bp_xl, bp_xr, cp_zm) else {
                continue;
            };

            let Some(plane_y) = Plane::from_three_points(bp_xl, bp_xr, bp_zm) else {
                continue;
            };
            let Some(bend_yz) = plane_y.intersect(&ctx.plane_z) else {
                continue;
            };

            if filters.check_bend_angle
                && (!min_bend_angle_ok(&ctx.plane_x, &plane_y, rules)
                    || !min_bend_angle_ok(&plane_y, &ctx.plane_z, rules))
            {
                continue;
            }

            // Fold between x and the intermediate plane.
            let Some((fp_xl, fp_xr)) = flange_pair(
                bp_xl,
                bp_xr,
                &ctx.plane_x,
                ctx.centroid_x,
                rules.min_flange_length,
            ) else {
                continue;
            };
            let Some((fp_yxl, fp_yxr)) = flange_pair(
                bp_xl,
                bp_xr,
                &plane_y,
                bp_zm,
                rules.min_flange_length,
            ) else {
                continue;
            };

            // Fold between the intermediate plane and z.
            let Some(bp_zl) = bend_point(cp_zl, fp_yxl, &bend_yz) else {
                continue;
            };
            let Some(bp_zr) = bend_point(cp_zr, fp_yxr, &bend_yz) else {
                continue;
            };

            if !min_flange_width_ok(bp_xl, bp_xr, rules)
                || !min_flange_width_ok(bp_zl, bp_zr, rules)
            {
                continue;
            }

            let x_mid = bp_xl.midpoint(bp_xr);
            let Some((fp_yzl, fp_yzr)) = flange_pair(
                bp_zl,
                bp_zr,
                &plane_y,
                x_mid,
                rules.min_flange_length,
            ) else {
                continue;
            };
            let Some((fp_zl, fp_zr)) = flange_pair(
                bp_zl,
                bp_zr,
                &ctx.plane_z,
                ctx.centroid_z,
                rules.min_flange_length,
            ) else {
                continue;
            };

            let bridge_id = TabId::join(&ctx.x_id, &ctx.z_id);
            let bridge = intermediate_tab(
                &bridge_id,
                ctx,
                [fp_yxl, bp_xl, bp_xr, fp_yxr],
                [fp_yzl, bp_zl, bp_zr, fp_yzr],
            );

            let mut new_x = ctx.tab_x.clone();
            if !new_x.insert_edge_run(
                cx_l,
                cx_r,
                vec![
                    (PointKey::flange(&ctx.x_id, &bridge_id, Side::Left), fp_xl),
                    (PointKey::bend(&ctx.x_id, &bridge_id, Side::Left), bp_xl),
                    (PointKey::bend(&ctx.x_id, &bridge_id, Side::Right), bp_xr),
                    (PointKey::flange(&ctx.x_id, &bridge_id, Side::Right), fp_xr),
                ],
            ) {
                continue;
            }

            // The corner the triangle was built on is consumed by the run
            // between its two neighbours.
            let mut new_z = ctx.tab_z.clone();
            if !new_z.insert_after(
                &PointKey::Corner(cz_m.prev()),
                vec![
                    (PointKey::flange(&ctx.z_id, &bridge_id, Side::Left), fp_zl),
                    (PointKey::bend(&ctx.z_id, &bridge_id, Side::Left), bp_zl),
                    (PointKey::bend(&ctx.z_id, &bridge_id, Side::Right), bp_zr),
                    (PointKey::flange(&ctx.z_id, &bridge_id, Side::Right), fp_zr),
                ],
            ) {
                continue;
            }
            new_z.remove(&PointKey::Corner(cz_m));

            if filters.check_containment
                && (!tab_covers_rectangle(&new_x, filters) || !tab_covers_rectangle(&new_z, filters))
            {
                continue;
            }

            library.push(
                Segment::new((ctx.x_id.clone(), ctx.z_id.clone()), new_x, new_z)
                    .with_intermediate(bridge),
            );
        }
    }

    log::debug!(
        "two-bend approach 2 {}-{}: {} candidate(s)",
        ctx.x_id,
        ctx.z_id,
        library.len()
    );
    library
}

/// Bend point near the picked corner of the second tab: project the x edge
/// line onto z's plane, step `min_flange_length` perpendicular to that
/// direction, and keep whichever candidate sits farther from the tab
/// centre. When the edge line is parallel to z's plane, step straight away
/// from the centroid instead.
fn middle_bend_point(
    ctx: &PairContext<'_>,
    bp_xl: Point3,
    bp_xr: Point3,
    cp_zm: Point3,
) -> Option<Point3> {
    let flange = ctx.cfg.rules.min_flange_length;

    if let Some(projected) = ctx.plane_z.intersect_line(bp_xl, bp_xl - bp_xr) {
        let toward = (projected - cp_zm).normalized()?;
        let step = toward.cross(ctx.plane_z.normal).normalized()?;
        let candidate_a = cp_zm + step * flange;
        let candidate_b = cp_zm - step * flange;
        let centroid = ctx.centroid_z;
        if candidate_a.distance_to(centroid) >= candidate_b.distance_to(centroid) {
            Some(candidate_a)
        } else {
            Some(candidate_b)
        }
    } else {
        let away = (cp_zm - ctx.centroid_z).normalized()?;
        Some(cp_zm + away * flange)
    }
}

/// Perimeter of the triangular intermediate tab: the x-side run, then the
/// z-side run, reversed when the straight pairing would cross.
fn intermediate_tab(
    bridge_id: &TabId,
    ctx: &PairContext<'_>,
    x_run: [Point3; 4],
    z_run: [Point3; 4],
) -> Tab {
    let [fp_yxl, bp_xl, bp_xr, fp_yxr] = x_run;
    let [fp_yzl, bp_zl, bp_zr, fp_yzr] = z_run;

    let mut points = vec![
        (PointKey::flange(bridge_id, &ctx.x_id, Side::Left), fp_yxl),
        (PointKey::bend(bridge_id, &ctx.x_id, Side::Left), bp_xl),
        (PointKey::bend(bridge_id, &ctx.x_id, Side::Right), bp_xr),
        (PointKey::flange(bridge_id, &ctx.x_id, Side::Right), fp_yxr),
    ];

    let crossed =
        crate::geom::segments_cross_any_projection(fp_yxl, fp_yzl, fp_yxr, fp_yzr);
    if crossed {
        points.extend([
            (PointKey::flange(bridge_id, &ctx.z_id, Side::Left), fp_yzl),
            (PointKey::bend(bridge_id, &ctx.z_id, Side::Left), bp_zl),
            (PointKey::bend(bridge_id, &ctx.z_id, Side::Right), bp_zr),
            (PointKey::flange(bridge_id, &ctx.z_id, Side::Right), fp_yzr),
        ]);
    } else {
        points.extend([
            (PointKey::flange(bridge_id, &ctx.z_id, Side::Right), fp_yzr),
            (PointKey::bend(bridge_id, &ctx.z_id, Side::Right), bp_zr),
            (PointKey::bend(bridge_id, &ctx.z_id, Side::Left), bp_zl),
            (PointKey::flange(bridge_id, &ctx.z_id, Side::Left), fp_yzl),
        ]);
    }

    Tab::intermediate(bridge_id.clone(), points)
}
