//! Single-bend connections between intersecting tab planes.
//!
//! The bend line is the intersection of the two planes. Every ordered
//! corner pair on each side (12 × 12) nominates a candidate: each bend
//! point is the point on the bend line closest to the chord between the
//! paired corners, and the flange points are derived in-plane from the
//! bend points. A corner pair that is not edge-adjacent consumes the
//! corner it skips.

use crate::part::{CornerId, PointKey, Segment, Side};

use super::helpers::{PairContext, bend_point, flange_pair};
use crate::filters::{
    connection_crosses_tab, min_bend_angle_ok, min_flange_width_ok, tab_covers_rectangle,
};
use crate::geom::{adaptive_tolerance, segments_cross_any_projection};

/// Ordered pairs of distinct corners (12 of them).
fn corner_pairs() -> Vec<(CornerId, CornerId)> {
    let mut pairs = Vec::with_capacity(12);
    for &a in &CornerId::ALL {
        for &b in &CornerId::ALL {
            if a != b {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

pub(crate) fn one_bend(ctx: &PairContext<'_>) -> Vec<Segment> {
    let rules = &ctx.cfg.rules;
    let filters = &ctx.cfg.filters;

    let Some(bend) = ctx.plane_x.intersect(&ctx.plane_z) else {
        log::debug!(
            "one-bend {}-{}: planes are parallel, nothing to do",
            ctx.x_id,
            ctx.z_id
        );
        return Vec::new();
    };

    if filters.check_bend_angle && !min_bend_angle_ok(&ctx.plane_x, &ctx.plane_z, rules) {
        return Vec::new();
    }

    // Bend points must stay within reach of both tabs: clamp their bend-line
    // parameters to the union of corner-projection ranges, with the adaptive
    // margin.
    let x_range = bend.projection_range(&ctx.tab_x.corner_coords());
    let z_range = bend.projection_range(&ctx.tab_z.corner_coords());
    let char_dist = ctx.centroid_x.distance_to(ctx.centroid_z);
    let range_margin = adaptive_tolerance(filters.range_margin, filters.range_relative, char_dist)
        .min(filters.max_absolute_overshoot);
    let in_range = |t: f64| {
        [x_range, z_range].iter().all(|range| match range {
            Some((lo, hi)) => t >= lo - range_margin && t <= hi + range_margin,
            None => false,
        })
    };

    let pairs = corner_pairs();
    let mut library = Vec::new();

    for &(cx_l, cx_r) in &pairs {
        let (Some(cp_xl), Some(cp_xr)) = (ctx.tab_x.corner(cx_l), ctx.tab_x.corner(cx_r)) else {
            continue;
        };
        for &(cz_l, cz_r) in &pairs {
            let (Some(cp_zl), Some(cp_zr)) = (ctx.tab_z.corner(cz_l), ctx.tab_z.corner(cz_r))
            else {
                continue;
            };

            let Some(bp_l) = bend_point(cp_xl, cp_zl, &bend) else {
                continue;
            };
            let Some(bp_r) = bend_point(cp_xr, cp_zr, &bend) else {
                continue;
            };

            if !min_flange_width_ok(bp_l, bp_r, rules) {
                continue;
            }
            if !in_range(bend.project_t(bp_l)) || !in_range(bend.project_t(bp_r)) {
                continue;
            }

            let Some((fp_xl, fp_xr)) = flange_pair(
                bp_l,
                bp_r,
                &ctx.plane_x,
                ctx.centroid_x,
                rules.min_flange_length,
            ) else {
                continue;
            };
            let Some((fp_zl, fp_zr)) = flange_pair(
                bp_l,
                bp_r,
                &ctx.plane_z,
                ctx.centroid_z,
                rules.min_flange_length,
            ) else {
                continue;
            };

            // Crossed corner-to-flange connections fold the flange over
            // itself.
            if segments_cross_any_projection(cp_xl, fp_xl, cp_xr, fp_xr)
                || segments_cross_any_projection(cp_zl, fp_zl, cp_zr, fp_zr)
            {
                continue;
            }

            // Flange lines may not cut through their own tab either.
            let crosses_own_boundary = [
                (ctx.tab_x.rectangle(), cp_xl, fp_xl, cp_xr, fp_xr),
                (ctx.tab_z.rectangle(), cp_zl, fp_zl, cp_zr, fp_zr),
            ]
            .into_iter()
            .any(|(rect, cl, fl, cr, fr)| {
                rect.is_some_and(|r| connection_crosses_tab(cl, fl, cr, fr, &r.corners()))
            });
            if crosses_own_boundary {
                continue;
            }

            let mut new_x = ctx.tab_x.clone();
            let run_x = vec![
                (PointKey::flange(&ctx.x_id, &ctx.z_id, Side::Left), fp_xl),
                (PointKey::bend(&ctx.x_id, &ctx.z_id, Side::Left), bp_l),
                (PointKey::bend(&ctx.x_id, &ctx.z_id, Side::Right), bp_r),
                (PointKey::flange(&ctx.x_id, &ctx.z_id, Side::Right), fp_xr),
            ];
            if !new_x.insert_after(&PointKey::Corner(cx_l), run_x) {
                continue;
            }
            if !cx_l.is_adjacent(cx_r) {
                // The corner between the paired corners loses both its
                // edges to the bend run.
                new_x.remove(&PointKey::Corner(cx_l.next()));
            }

            // If the straight left-left / right-right pairing crosses
            // between the planes, the z side runs in the other direction.
            let z_run_reversed = segments_cross_any_projection(fp_xl, fp_zl, fp_xr, fp_zr);
            let mut run_z = vec![
                (PointKey::flange(&ctx.z_id, &ctx.x_id, Side::Left), fp_zl),
                (PointKey::bend(&ctx.z_id, &ctx.x_id, Side::Left), bp_l),
                (PointKey::bend(&ctx.z_id, &ctx.x_id, Side::Right), bp_r),
                (PointKey::flange(&ctx.z_id, &ctx.x_id, Side::Right), fp_zr),
            ];
            if z_run_reversed {
                run_z.reverse();
            }
            let mut new_z = ctx.tab_z.clone();
            if !new_z.insert_after(&PointKey::Corner(cz_l), run_z) {
                continue;
            }
            if !cz_l.is_adjacent(cz_r) {
                new_z.remove(&PointKey::Corner(cz_l.next()));
            }

            if filters.check_containment
                && (!tab_covers_rectangle(&new_x, filters) || !tab_covers_rectangle(&new_z, filters))
            {
                continue;
            }

            library.push(Segment::new(
                (ctx.x_id.clone(), ctx.z_id.clone()),
                new_x,
                new_z,
            ));
        }
    }

    log::debug!(
        "one-bend {}-{}: {} candidate(s)",
        ctx.x_id,
        ctx.z_id,
        library.len()
    );
    library
}
