#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! bend-engine: sheet-metal part generation from planar rectangles.
//!
//! Given input rectangles in 3-D space (three corners each, the fourth is
//! derived) and optional mount positions, the engine enumerates
//! geometrically valid ways to join them with bend/flange geometry,
//! filters out non-manufacturable candidates and merges one candidate per
//! connection into self-consistent parts.
//!
//! Pipeline: rectangles → tabs → (optional surface separation) → topology
//! sequences → per-pair bend strategy candidates → pruned combination
//! search → perimeter merge and whole-part validation. Geometric dead ends
//! are never errors; they just shrink the result set. The only hard
//! failures are malformed configuration and empty input.

pub mod assembly;
pub mod config;
pub mod filters;
pub mod geom;
pub mod part;
pub mod search;
pub mod strategies;
pub mod topology;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use config::{ConfigError, EngineConfig};
pub use part::{CornerId, Mount, Part, PointKey, Rectangle, Segment, Side, Tab, TabId};

/// One input rectangle: three corners plus optional mount positions in
/// global coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleInput {
    pub point_a: [f64; 3],
    pub point_b: [f64; 3],
    pub point_c: [f64; 3],
    #[serde(default)]
    pub mounts: Vec<[f64; 3]>,
    #[serde(default = "default_mount_radius")]
    pub mount_radius: f64,
}

fn default_mount_radius() -> f64 {
    5.0
}

impl RectangleInput {
    #[must_use]
    pub fn new(point_a: [f64; 3], point_b: [f64; 3], point_c: [f64; 3]) -> Self {
        Self {
            point_a,
            point_b,
            point_c,
            mounts: Vec::new(),
            mount_radius: default_mount_radius(),
        }
    }

    #[must_use]
    pub fn with_mounts(mut self, mounts: Vec<[f64; 3]>) -> Self {
        self.mounts = mounts;
        self
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("need at least two rectangles, got {0}")]
    TooFewRectangles(usize),

    #[error("explicit pair references unknown tab id {0}")]
    UnknownTabId(String),
}

/// Run the full engine: every accepted part for the given input.
///
/// Geometric failures (no candidates for a pair, rejected merges,
/// collisions) only reduce the result; an empty vector is a valid answer.
pub fn solve(inputs: &[RectangleInput], cfg: &EngineConfig) -> Result<Vec<Part>, EngineError> {
    cfg.validate()?;
    if inputs.len() < 2 {
        return Err(EngineError::TooFewRectangles(inputs.len()));
    }

    let tabs = initialize_tabs(inputs);
    let (tabs, forbidden) = topology::separation::separate_surfaces(tabs, &cfg.separation);
    log::info!("{} tab(s) after surface separation", tabs.len());

    let sequences = resolve_sequences(&tabs, &forbidden, cfg)?;
    log::info!("{} topology sequence(s) to explore", sequences.len());

    let mut solutions = Vec::new();
    for sequence in &sequences {
        solutions.extend(solve_sequence(&tabs, sequence, cfg));
    }
    log::info!("{} accepted part(s)", solutions.len());
    Ok(solutions)
}

fn initialize_tabs(inputs: &[RectangleInput]) -> BTreeMap<TabId, Tab> {
    let mut tabs = BTreeMap::new();
    for (index, input) in inputs.iter().enumerate() {
        let rect = Rectangle::from_three_points(
            input.point_a.into(),
            input.point_b.into(),
            input.point_c.into(),
        );
        let mounts: Vec<Mount> = input
            .mounts
            .iter()
            .filter_map(|&m| Mount::from_global(&rect, m.into(), input.mount_radius))
            .collect();
        let id = TabId::new(index.to_string());
        tabs.insert(id.clone(), Tab::from_rectangle(id, rect, mounts));
    }
    tabs
}

fn resolve_sequences(
    tabs: &BTreeMap<TabId, Tab>,
    forbidden: &[topology::Pair],
    cfg: &EngineConfig,
) -> Result<Vec<Vec<topology::Pair>>, EngineError> {
    if let Some(pairs) = &cfg.topology.explicit_pairs {
        let mut sequence = Vec::with_capacity(pairs.len());
        for [a, b] in pairs {
            let a = TabId::new(a.clone());
            let b = TabId::new(b.clone());
            for id in [&a, &b] {
                if !tabs.contains_key(id) {
                    return Err(EngineError::UnknownTabId(id.to_string()));
                }
            }
            sequence.push((a, b));
        }
        return Ok(vec![sequence]);
    }

    let ids: Vec<TabId> = tabs.keys().cloned().collect();
    Ok(topology::sequences(&ids, forbidden, &cfg.topology))
}

fn solve_sequence(
    tabs: &BTreeMap<TabId, Tab>,
    sequence: &[topology::Pair],
    cfg: &EngineConfig,
) -> Vec<Part> {
    // Candidate generation per pair; pairs are independent.
    let generate = |(x_id, z_id): &topology::Pair| -> Vec<Segment> {
        let (Some(tab_x), Some(tab_z)) = (tabs.get(x_id), tabs.get(z_id)) else {
            log::warn!("sequence references unknown tab {x_id} or {z_id}");
            return Vec::new();
        };
        let candidates = strategies::create_segments(tab_x, tab_z, cfg);
        log::debug!("pair {x_id}-{z_id}: {} candidate segment(s)", candidates.len());
        candidates
    };

    #[cfg(feature = "parallel")]
    let libraries: Vec<Vec<Segment>> = sequence.par_iter().map(generate).collect();
    #[cfg(not(feature = "parallel"))]
    let libraries: Vec<Vec<Segment>> = sequence.iter().map(generate).collect();

    if libraries.iter().any(Vec::is_empty) {
        log::debug!("skipping sequence: a pair produced no candidates");
        return Vec::new();
    }

    let shared = search::shared_tab_ids(sequence);
    let combos = search::Combinations::new(&libraries)
        .filter(|combo| !search::has_edge_conflict(combo, &shared));

    #[cfg(feature = "parallel")]
    {
        combos
            .par_bridge()
            .filter_map(|combo| assembly::assemble(&combo, sequence, cfg))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        combos
            .filter_map(|combo| assembly::assemble(&combo, sequence, cfg))
            .collect()
    }
}
