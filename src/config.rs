//! Engine configuration.
//!
//! Every threshold the filters and strategies consult lives here and is
//! threaded explicitly through the call tree; there is no ambient state.
//! All structs deserialize with defaults so hosts can load partial
//! configurations from YAML/JSON. Malformed thresholds are the one
//! unrecoverable error class and are caught by `EngineConfig::validate`
//! before any geometry runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be finite and positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be a finite fraction in [0, 1) (got {value})")]
    BadFraction { name: &'static str, value: f64 },

    #[error("{name} must be in [-1, 1] (got {value})")]
    BadCosine { name: &'static str, value: f64 },

    #[error("max_topologies must be at least 1")]
    NoTopologies,
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::BadFraction { name, value })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Design rules
// ─────────────────────────────────────────────────────────────────────────────

/// Core sheet-metal design rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignRules {
    /// Length of the flat flange run between a corner and its bend point.
    pub min_flange_length: f64,
    /// Minimum distance between the two bend points of one bend.
    pub min_flange_width: f64,
    /// Minimum bend angle in degrees (0° = flat, 90° = right-angle bend).
    pub min_bend_angle_deg: f64,
}

impl Default for DesignRules {
    fn default() -> Self {
        Self {
            min_flange_length: 10.0,
            min_flange_width: 30.0,
            min_bend_angle_deg: 35.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Strategies
// ─────────────────────────────────────────────────────────────────────────────

/// Which bend strategies run, and their strategy-specific knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub zero_bend: bool,
    pub single_bend: bool,
    pub double_bend: bool,
    /// Outward-direction dot threshold below which a two-bend edge pair
    /// counts as anti-parallel and is rejected.
    pub antiparallel_threshold: f64,
    /// Allowed deviation (degrees) of the synthesized intermediate plane
    /// from perpendicular to both source planes.
    pub intermediate_angle_tol_deg: f64,
    /// Longest/shortest edge cap for synthesized intermediate quads.
    pub max_intermediate_aspect_ratio: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            zero_bend: true,
            single_bend: true,
            double_bend: true,
            antiparallel_threshold: -0.8,
            intermediate_angle_tol_deg: 5.0,
            max_intermediate_aspect_ratio: 10.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Thresholds for the manufacturability filter set. Distance thresholds
/// with a `_relative` partner use the adaptive rule
/// `max(absolute, relative × connection distance)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Absolute tolerance for the edge-coplanarity fit.
    pub coplanarity_tolerance: f64,
    /// Scale-relative fraction for the edge-coplanarity fit.
    pub coplanarity_relative: f64,
    /// Allowed deviation (degrees) of the fitted edge plane from
    /// perpendicular to the two source planes.
    pub coplanarity_angle_tol_deg: f64,
    /// Absolute bend-point overshoot margin beyond a tab's bounds.
    pub range_margin: f64,
    /// Scale-relative fraction for the bend-point overshoot margin.
    pub range_relative: f64,
    /// Hard cap on bend-point overshoot regardless of scale.
    pub max_absolute_overshoot: f64,
    /// Minimal diagonal-cross area below which a quad is degenerate.
    pub min_quad_area: f64,
    /// Buffer used by the tab-covers-rectangle containment test.
    pub containment_buffer: f64,
    /// Clearance gap for the whole-part collision check.
    pub collision_gap: f64,
    pub check_bend_angle: bool,
    pub check_containment: bool,
    pub check_collision: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            coplanarity_tolerance: 5.0,
            coplanarity_relative: 0.1,
            coplanarity_angle_tol_deg: 10.0,
            range_margin: 5.0,
            range_relative: 0.1,
            max_absolute_overshoot: 50.0,
            min_quad_area: 1e-3,
            containment_buffer: 1e-7,
            collision_gap: 0.1,
            check_bend_angle: true,
            check_containment: true,
            check_collision: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Topology
// ─────────────────────────────────────────────────────────────────────────────

/// How topologies (tab-pair sequences) are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopologyMode {
    /// Sequential chain over the tab ids.
    #[default]
    Chain,
    /// Enumerate all spanning trees and keep the best-scoring ones.
    SpanningTrees,
}

/// Heuristic used to rank spanning trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopologyScoring {
    /// Minimize the variance of per-node degree.
    #[default]
    Balanced,
    /// Maximize the number of degree-2 nodes (chain-like trees).
    Linear,
    /// Maximize the maximum degree (hub-like trees).
    Star,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub mode: TopologyMode,
    pub scoring: TopologyScoring,
    /// Keep only the best K spanning trees.
    pub max_topologies: usize,
    /// Explicit pair sequence; bypasses generation entirely when set.
    pub explicit_pairs: Option<Vec<[String; 2]>>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            mode: TopologyMode::Chain,
            scoring: TopologyScoring::Balanced,
            max_topologies: 10,
            explicit_pairs: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface separation
// ─────────────────────────────────────────────────────────────────────────────

/// Direction to cut when splitting a multi-mount surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    /// Pick the in-plane axis with the larger mount spread.
    #[default]
    Auto,
    /// Cut parallel to edge A→B.
    AlongAb,
    /// Cut parallel to edge B→C.
    AlongBc,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    pub auto_split: bool,
    pub min_mounts_for_split: usize,
    pub mounts_per_surface: usize,
    pub split_along: SplitAxis,
    /// Gap width between split surfaces.
    pub gap_width: f64,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            auto_split: false,
            min_mounts_for_split: 2,
            mounts_per_surface: 1,
            split_along: SplitAxis::Auto,
            gap_width: 10.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EngineConfig
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: DesignRules,
    pub strategies: StrategyConfig,
    pub filters: FilterConfig,
    pub topology: TopologyConfig,
    pub separation: SeparationConfig,
}

impl EngineConfig {
    /// Check every numeric threshold before any geometry runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("min_flange_length", self.rules.min_flange_length)?;
        check_positive("min_flange_width", self.rules.min_flange_width)?;
        check_positive("min_bend_angle_deg", self.rules.min_bend_angle_deg)?;

        if !self.strategies.antiparallel_threshold.is_finite()
            || self.strategies.antiparallel_threshold.abs() > 1.0
        {
            return Err(ConfigError::BadCosine {
                name: "antiparallel_threshold",
                value: self.strategies.antiparallel_threshold,
            });
        }
        check_positive(
            "intermediate_angle_tol_deg",
            self.strategies.intermediate_angle_tol_deg,
        )?;
        check_positive(
            "max_intermediate_aspect_ratio",
            self.strategies.max_intermediate_aspect_ratio,
        )?;

        check_positive("coplanarity_tolerance", self.filters.coplanarity_tolerance)?;
        check_fraction("coplanarity_relative", self.filters.coplanarity_relative)?;
        check_positive(
            "coplanarity_angle_tol_deg",
            self.filters.coplanarity_angle_tol_deg,
        )?;
        check_positive("range_margin", self.filters.range_margin)?;
        check_fraction("range_relative", self.filters.range_relative)?;
        check_positive(
            "max_absolute_overshoot",
            self.filters.max_absolute_overshoot,
        )?;
        check_positive("min_quad_area", self.filters.min_quad_area)?;
        check_positive("containment_buffer", self.filters.containment_buffer)?;
        check_positive("collision_gap", self.filters.collision_gap)?;

        if self.topology.max_topologies == 0 {
            return Err(ConfigError::NoTopologies);
        }

        check_positive("gap_width", self.separation.gap_width)?;
        if self.separation.mounts_per_surface == 0 {
            return Err(ConfigError::NonPositive {
                name: "mounts_per_surface",
                value: 0.0,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_thresholds() {
        let mut cfg = EngineConfig::default();
        cfg.rules.min_flange_width = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive { name: "min_flange_width", .. })
        ));

        let mut cfg = EngineConfig::default();
        cfg.filters.coplanarity_relative = 1.5;
        assert!(matches!(cfg.validate(), Err(ConfigError::BadFraction { .. })));

        let mut cfg = EngineConfig::default();
        cfg.topology.max_topologies = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NoTopologies));
    }
}
