//! Zero-bend connections for coplanar tabs.
//!
//! Two tabs in the same plane are joined by a flat rectangular bridge: no
//! actual fold, but the bridge is a real intermediate tab so downstream
//! assembly treats the connection uniformly. All 64 directed edge pairs
//! are tried and geometrically identical survivors are de-duplicated.

use crate::part::{CornerId, PointKey, Segment, Side, Tab, TabId};

use super::helpers::{PairContext, outward_direction};
use crate::filters::{min_flange_width_ok, tab_covers_rectangle};
use crate::geom::{quad_degenerate, quad_self_intersecting};

/// All eight directed edges of a rectangle perimeter.
pub(crate) const DIRECTED_EDGES: [(CornerId, CornerId); 8] = [
    (CornerId::A, CornerId::B),
    (CornerId::B, CornerId::C),
    (CornerId::C, CornerId::D),
    (CornerId::D, CornerId::A),
    (CornerId::B, CornerId::A),
    (CornerId::C, CornerId::B),
    (CornerId::D, CornerId::C),
    (CornerId::A, CornerId::D),
];

pub(crate) fn zero_bends(ctx: &PairContext<'_>) -> Vec<Segment> {
    let rules = &ctx.cfg.rules;
    let filters = &ctx.cfg.filters;
    let mut library: Vec<Segment> = Vec::new();

    for &(cx_l, cx_r) in &DIRECTED_EDGES {
        let (Some(cp_xl), Some(cp_xr)) = (ctx.tab_x.corner(cx_l), ctx.tab_x.corner(cx_r)) else {
            continue;
        };
        let edge_x_vec = cp_xr - cp_xl;
        let edge_x_len = edge_x_vec.length();
        if edge_x_len < 1e-9 {
            continue;
        }
        let edge_x_mid = cp_xl.midpoint(cp_xr);

        for &(cz_l, cz_r) in &DIRECTED_EDGES {
            let (Some(cp_zl), Some(cp_zr)) = (ctx.tab_z.corner(cz_l), ctx.tab_z.corner(cz_r))
            else {
                continue;
            };
            let edge_z_vec = cp_zr - cp_zl;
            let edge_z_len = edge_z_vec.length();
            if edge_z_len < 1e-9 {
                continue;
            }
            let edge_z_mid = cp_zl.midpoint(cp_zr);

            // The bridge must be long enough to fold flanges on both ends
            // and short enough to stay proportionate to the tabs.
            let connection_vec = edge_z_mid - edge_x_mid;
            let connection_dist = connection_vec.length();
            if connection_dist < rules.min_flange_length * 2.0 {
                continue;
            }
            if connection_dist > edge_x_len.max(edge_z_len) * 5.0 {
                continue;
            }

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

            // Both edges must grow toward each other.
            if out_x.dot(connection_vec) <= 0.0 || out_z.dot(-connection_vec) <= 0.0 {
                continue;
            }

            // Flange points stay at the corners; bend points shift outward.
            let fp_xl = cp_xl;
            let fp_xr = cp_xr;
            let bp_xl = cp_xl + out_x * rules.min_flange_length;
            let bp_xr = cp_xr + out_x * rules.min_flange_length;

            let mut fp_zl = cp_zl;
            let mut fp_zr = cp_zr;
            let mut bp_zl = cp_zl + out_z * rules.min_flange_length;
            let mut bp_zr = cp_zr + out_z * rules.min_flange_length;

            if !min_flange_width_ok(bp_xl, bp_xr, rules)
                || !min_flange_width_ok(bp_zl, bp_zr, rules)
            {
                continue;
            }

            // Anti-parallel edges: swap left/right on the z side so the
            // bridge perimeter keeps a consistent winding.
            if edge_x_vec.dot(edge_z_vec) < 0.0 {
                std::mem::swap(&mut fp_zl, &mut fp_zr);
                std::mem::swap(&mut bp_zl, &mut bp_zr);
            }

            if quad_degenerate(bp_xl, bp_xr, bp_zr, bp_zl, filters.min_quad_area) {
                continue;
            }
            if quad_self_intersecting(bp_xl, bp_xr, bp_zr, bp_zl) {
                continue;
            }

            let bridge_id = TabId::join(&ctx.x_id, &ctx.z_id);
            let bridge = Tab::intermediate(
                bridge_id.clone(),
                vec![
                    (PointKey::Corner(CornerId::A), bp_xl),
                    (PointKey::Corner(CornerId::B), bp_xr),
                    (PointKey::Corner(CornerId::C), bp_zr),
                    (PointKey::Corner(CornerId::D), bp_zl),
                ],
            );

            let mut new_x = ctx.tab_x.clone();
            let run_x = vec![
                (PointKey::flange(&ctx.x_id, &bridge_id, Side::Left), fp_xl),
                (PointKey::bend(&ctx.x_id, &bridge_id, Side::Left), bp_xl),
                (PointKey::bend(&ctx.x_id, &bridge_id, Side::Right), bp_xr),
                (PointKey::flange(&ctx.x_id, &bridge_id, Side::Right), fp_xr),
            ];
            if !new_x.insert_edge_run(cx_l, cx_r, run_x) {
                continue;
            }

            let mut new_z = ctx.tab_z.clone();
            let run_z = vec![
                (PointKey::flange(&ctx.z_id, &bridge_id, Side::Left), fp_zl),
                (PointKey::bend(&ctx.z_id, &bridge_id, Side::Left), bp_zl),
                (PointKey::bend(&ctx.z_id, &bridge_id, Side::Right), bp_zr),
                (PointKey::flange(&ctx.z_id, &bridge_id, Side::Right), fp_zr),
            ];
            if !new_z.insert_edge_run(cz_l, cz_r, run_z) {
                continue;
            }

            if filters.check_containment
                && (!tab_covers_rectangle(&new_x, filters) || !tab_covers_rectangle(&new_z, filters))
            {
                continue;
            }

            let candidate =
                Segment::new((ctx.x_id.clone(), ctx.z_id.clone()), new_x, new_z)
                    .with_intermediate(bridge);

            if library.iter().any(|s| s.geometrically_eq(&candidate)) {
                continue;
            }
            library.push(candidate);
        }
    }

    log::debug!(
        "zero-bend {}-{}: {} candidate(s)",
        ctx.x_id,
        ctx.z_id,
        library.len()
    );
    library
}
