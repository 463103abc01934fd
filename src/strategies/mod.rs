//! Bend strategy generators and the per-pair dispatcher.
//!
//! Coplanar pairs get the zero-bend bridge only; everything else runs
//! the single-bend and/or two-bend generators, each independently enabled
//! by configuration. Generators only ever read the source tabs; every
//! candidate owns deep copies, so candidates never interfere.

mod helpers;
mod one_bend;
mod two_bend;
mod zero_bend;

use crate::config::EngineConfig;
use crate::geom::Tolerance;
use crate::part::{Segment, Tab};

use helpers::PairContext;

/// Generate all enabled candidate connections for one tab pair.
/// An empty result means the pair cannot be joined under the current
/// configuration; the caller treats that as "try the next topology".
#[must_use]
pub fn create_segments(tab_x: &Tab, tab_z: &Tab, cfg: &EngineConfig) -> Vec<Segment> {
    let Some(ctx) = PairContext::new(tab_x, tab_z, cfg) else {
        log::debug!(
            "pair {}-{}: degenerate tab plane, no candidates",
            tab_x.id(),
            tab_z.id()
        );
        return Vec::new();
    };

    if ctx.plane_x.is_coplanar_with(&ctx.plane_z, Tolerance::DEGENERATE.eps) {
        if cfg.strategies.zero_bend {
            return zero_bend::zero_bends(&ctx);
        }
        return Vec::new();
    }

    let mut library = Vec::new();
    if cfg.strategies.single_bend {
        library.extend(one_bend::one_bend(&ctx));
    }
    if cfg.strategies.double_bend {
        library.extend(two_bend::two_bends(&ctx));
    }
    library
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3;
    use crate::part::{Rectangle, TabId};

    fn tab(id: &str, a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Tab {
        let rect =
            Rectangle::from_three_points(Point3::from(a), Point3::from(b), Point3::from(c));
        Tab::from_rectangle(TabId::new(id), rect, Vec::new())
    }

    #[test]
    fn coplanar_offset_tabs_yield_exactly_one_zero_bend() {
        // Two 50×50 squares in the plane z = 0, offset 100 along x: wide
        // separation, pure single-axis offset.
        let tab_x = tab("0", [0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]);
        let tab_z = tab(
            "1",
            [150.0, 0.0, 0.0],
            [200.0, 0.0, 0.0],
            [200.0, 50.0, 0.0],
        );
        let cfg = EngineConfig::default();

        let segments = create_segments(&tab_x, &tab_z, &cfg);
        assert_eq!(segments.len(), 1, "expected exactly one zero-bend segment");

        let seg = &segments[0];
        let bridge = seg.tab_y.as_ref().expect("zero-bend has a bridge tab");
        assert_eq!(bridge.len(), 4);
        let c = bridge.coords();
        assert!(!crate::geom::quad_degenerate(c[0], c[1], c[2], c[3], 1e-3));
        assert!(!crate::geom::quad_self_intersecting(c[0], c[1], c[2], c[3]));
        // Both source tabs carry one four-point run.
        assert_eq!(seg.tab_x.len(), 8);
        assert_eq!(seg.tab_z.len(), 8);
    }

    #[test]
    fn perpendicular_tabs_one_bend_points_lie_on_intersection_line() {
        // Tab 0 in the plane z = 0, tab 1 in the plane y = 0; their
        // intersection line is the x axis.
        let tab_x = tab("0", [0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]);
        let tab_z = tab("1", [0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 0.0, 50.0]);
        let mut cfg = EngineConfig::default();
        cfg.strategies.double_bend = false;

        let segments = create_segments(&tab_x, &tab_z, &cfg);
        assert!(!segments.is_empty(), "expected one-bend candidates");

        let line = crate::geom::Line3::new(Point3::ORIGIN, crate::geom::Vec3::X).unwrap();
        for seg in &segments {
            for tab in seg.tabs() {
                for (key, point) in tab.points() {
                    if key.is_bend() {
                        assert!(
                            line.distance_to_point(*point) < 1e-6,
                            "bend point {key} at {point:?} off the intersection line"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn strategy_flags_disable_generators() {
        let tab_x = tab("0", [0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]);
        let tab_z = tab("1", [0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 0.0, 50.0]);
        let mut cfg = EngineConfig::default();
        cfg.strategies.single_bend = false;
        cfg.strategies.double_bend = false;
        assert!(create_segments(&tab_x, &tab_z, &cfg).is_empty());
    }
}
