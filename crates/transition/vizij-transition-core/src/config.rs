//! Core configuration for vizij-transition-core.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::effect::Effect;
use crate::matching::MatchingKind;

/// Weights of the five comparator axes in `COMPARE_SUM`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareWeights {
    pub count: f64,
    pub data_scope: f64,
    pub data_tuples: f64,
    pub class_id: f64,
    pub comp_id: f64,
}

impl Default for CompareWeights {
    fn default() -> Self {
        Self {
            count: 3.0,
            data_scope: 2.0,
            data_tuples: 2.0,
            class_id: 1.5,
            comp_id: 1.5,
        }
    }
}

/// Linking and timing knobs. `Config::default()` is the product behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub weights: CompareWeights,
    /// Minimum `COMPARE_SUM` for an identity link.
    pub link_threshold: f64,
    /// Numeric fields closer than this are considered unchanged.
    pub numeric_tolerance: f64,
    /// Floor for the per-peer duration of stagger/speed sequencing.
    pub min_peer_duration: f64,
    pub strategy: MatchingKind,
    pub default_effect: Effect,
    pub default_easing: Easing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weights: CompareWeights::default(),
            link_threshold: 5.0,
            numeric_tolerance: 1.0,
            min_peer_duration: 0.3,
            strategy: MatchingKind::Greedy,
            default_effect: Effect::Fade,
            default_easing: Easing::CubicInOut,
        }
    }
}
