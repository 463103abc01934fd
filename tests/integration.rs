//! End-to-end pipeline tests.

use bend_engine::{EngineConfig, RectangleInput, solve};

/// Two 50-unit squares, one in the z = 0 plane and one folded up 90° into
/// the y = 0 plane, meeting along the x axis. The default thresholds must
/// admit at least one part, and every accepted part carries exactly one
/// bend run on each source tab.
#[test]
fn folded_squares_yield_parts_with_one_bend_per_tab() {
    let inputs = vec![
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]),
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 0.0, 50.0]),
    ];
    let cfg = EngineConfig::default();

    let parts = solve(&inputs, &cfg).expect("valid configuration");
    assert!(!parts.is_empty(), "expected at least one accepted part");

    for part in &parts {
        for id in ["0", "1"] {
            let tab = part
                .tab(&bend_engine::TabId::new(id))
                .expect("source tab present in part");
            let bends = tab
                .points()
                .iter()
                .filter(|(k, _)| k.is_bend())
                .count();
            assert_eq!(bends, 2, "tab {id} should carry exactly one bend run");
        }
    }
}

/// Coplanar tabs must assemble through the zero-bend bridge: the part has
/// three tabs (both sources plus the intermediate).
#[test]
fn coplanar_tabs_assemble_via_bridge() {
    let inputs = vec![
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]),
        RectangleInput::new([150.0, 0.0, 0.0], [200.0, 0.0, 0.0], [200.0, 50.0, 0.0]),
    ];
    let cfg = EngineConfig::default();

    let parts = solve(&inputs, &cfg).expect("valid configuration");
    assert!(!parts.is_empty(), "expected a zero-bend solution");
    for part in &parts {
        assert_eq!(part.tab_count(), 3);
        assert!(part.tab(&bend_engine::TabId::new("0_1")).is_some());
    }
}

/// Accepted parts never reuse a tab edge for two different connections.
/// A three-tab chain forces the middle tab to carry two bend runs.
#[test]
fn chain_parts_keep_connections_on_distinct_edges() {
    let inputs = vec![
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]),
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 0.0, 50.0]),
        RectangleInput::new([0.0, 50.0, 0.0], [50.0, 50.0, 0.0], [50.0, 50.0, 50.0]),
    ];
    let mut cfg = EngineConfig::default();
    cfg.topology.explicit_pairs = Some(vec![
        ["1".to_string(), "0".to_string()],
        ["0".to_string(), "2".to_string()],
    ]);

    let parts = solve(&inputs, &cfg).expect("valid configuration");
    // The middle tab (0) carries both connections; whatever survives the
    // search must keep a full bend run per connection, each on its own
    // stretch of the perimeter.
    for part in &parts {
        let tab = part.tab(&bend_engine::TabId::new("0")).unwrap();
        let connections: std::collections::BTreeSet<String> = tab
            .points()
            .iter()
            .filter_map(|(k, _)| k.connection().map(ToString::to_string))
            .collect();
        assert_eq!(connections.len(), 2, "both connections land on tab 0");
        for connection in &connections {
            let bends = tab
                .points()
                .iter()
                .filter(|(k, _)| {
                    k.is_bend() && k.connection().map(ToString::to_string).as_ref() == Some(connection)
                })
                .count();
            assert_eq!(bends, 2, "connection {connection} keeps its two bend points");
        }
    }
}

/// Two equal squares in parallel planes 50 units apart cannot be joined
/// with a single bend; the two-bend fallback must bridge them through an
/// intermediate tab, and each source tab still folds exactly once.
#[test]
fn parallel_planes_are_bridged_with_two_bends() {
    let inputs = vec![
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]),
        RectangleInput::new([0.0, 0.0, 50.0], [50.0, 0.0, 50.0], [50.0, 50.0, 50.0]),
    ];
    let cfg = EngineConfig::default();

    let parts = solve(&inputs, &cfg).expect("valid configuration");
    assert!(!parts.is_empty(), "expected two-bend solutions");

    for part in &parts {
        assert_eq!(part.tab_count(), 3, "two sources plus an intermediate");
        for id in ["0", "1"] {
            let tab = part
                .tab(&bend_engine::TabId::new(id))
                .expect("source tab present");
            let bends = tab.points().iter().filter(|(k, _)| k.is_bend()).count();
            assert_eq!(bends, 2, "tab {id} folds exactly once");
        }
    }
}

#[test]
fn invalid_configuration_is_rejected_before_geometry() {
    let inputs = vec![
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 50.0, 0.0]),
        RectangleInput::new([0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [50.0, 0.0, 50.0]),
    ];
    let mut cfg = EngineConfig::default();
    cfg.rules.min_bend_angle_deg = f64::NAN;
    assert!(solve(&inputs, &cfg).is_err());
}

#[test]
fn too_few_rectangles_is_an_error() {
    let inputs = vec![RectangleInput::new(
        [0.0, 0.0, 0.0],
        [50.0, 0.0, 0.0],
        [50.0, 50.0, 0.0],
    )];
    assert!(solve(&inputs, &EngineConfig::default()).is_err());
}

#[test]
fn mounted_surfaces_split_and_route_around_siblings() {
    // One double-mounted tab splits into two siblings; the chain topology
    // must route both of them through the second tab instead of joining
    // them directly.
    let inputs = vec![
        RectangleInput::new([20.0, 0.0, 0.0], [20.0, 60.0, 0.0], [80.0, 60.0, 0.0])
            .with_mounts(vec![[50.0, 10.0, 0.0], [50.0, 50.0, 0.0]]),
        RectangleInput::new([0.0, 80.0, 40.0], [0.0, 40.0, 40.0], [0.0, 40.0, 80.0])
            .with_mounts(vec![[0.0, 60.0, 60.0]]),
    ];
    let mut cfg = EngineConfig::default();
    cfg.separation.auto_split = true;

    let parts = solve(&inputs, &cfg).expect("valid configuration");
    // Whatever is accepted, no part may contain a direct sibling link.
    for part in &parts {
        for (a, b) in part.sequence() {
            assert!(
                !(a.as_str().starts_with("0_") && b.as_str().starts_with("0_")),
                "sibling tabs {a} and {b} connected directly"
            );
        }
    }
}
