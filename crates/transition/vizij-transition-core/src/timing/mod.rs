//! Timing model: per-edge windows, peer sequencing, and parent nesting.
//!
//! Every edge owns an [`ObjectTiming`] stored in a [`TimingGraph`] arena. Raw
//! windows are fractions of the parent's resolved window (or of `[0, 1]` for
//! roots); resolved windows are computed on read and cached until a write
//! touches the node or one of its ancestors.

pub mod decoration;
pub mod graph;
pub mod object;
pub mod scale;
pub mod sequence;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::{Result, TransitionError};
use crate::ids::TimingId;

pub use decoration::DecorationTiming;
pub use graph::TimingGraph;
pub use object::ObjectTiming;
pub use scale::ClampedScale;
pub use sequence::{
    Aggregation, FieldSource, PeerGroup, PeerSample, PeerValue, SequenceKind, SequenceRequest,
    Sequencing,
};

/// A `[start, end]` interval in normalized time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    pub const UNIT: Window = Window {
        start: 0.0,
        end: 1.0,
    };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::UNIT
    }
}

/// Absolute placement of one peer: `(start, duration)` in the top-level domain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerWindow {
    pub start: f64,
    pub duration: f64,
}

impl PeerWindow {
    pub const UNIT: PeerWindow = PeerWindow {
        start: 0.0,
        duration: 1.0,
    };

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Place `inner` (fractions of this window) inside this window.
    pub fn compose(&self, inner: PeerWindow) -> PeerWindow {
        PeerWindow {
            start: self.start + inner.start * self.duration,
            duration: inner.duration * self.duration,
        }
    }

    /// Eased local progress at absolute time `t`. Zero-length windows jump at `start`.
    pub fn progress(&self, t: f64, easing: &Easing) -> f64 {
        let local = if self.duration <= 0.0 {
            if t >= self.start {
                1.0
            } else {
                0.0
            }
        } else {
            ((t - self.start) / self.duration).clamp(0.0, 1.0)
        };
        easing.apply(local)
    }
}

/// Read-only projection of a timing for the timeline UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingView {
    pub start_raw: f64,
    pub end_raw: f64,
    pub start_scaled: f64,
    pub end_scaled: f64,
    pub parent: Option<TimingId>,
    pub sequencing: SequenceKind,
    pub field: Option<String>,
    pub aggregation: Aggregation,
    pub default_duration: f64,
    pub is_reverse: bool,
    pub peer_groups: Vec<PeerGroup>,
    pub prop_times: Vec<(String, Window)>,
}

/// Reject non-finite values and values outside `[0, 1]`.
pub(crate) fn check_time(value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(TransitionError::InvalidTime { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_nests_fractions() {
        let outer = PeerWindow {
            start: 0.2,
            duration: 0.4,
        };
        let inner = PeerWindow {
            start: 0.5,
            duration: 0.5,
        };
        let w = outer.compose(inner);
        assert!((w.start - 0.4).abs() < 1e-12);
        assert!((w.duration - 0.2).abs() < 1e-12);
    }

    #[test]
    fn progress_clamps_outside_window() {
        let w = PeerWindow {
            start: 0.25,
            duration: 0.5,
        };
        assert_eq!(w.progress(0.0, &Easing::Linear), 0.0);
        assert!((w.progress(0.5, &Easing::Linear) - 0.5).abs() < 1e-12);
        assert_eq!(w.progress(1.0, &Easing::Linear), 1.0);
    }

    #[test]
    fn check_time_rejects_out_of_range() {
        assert!(check_time(0.5).is_ok());
        assert!(check_time(1.5).is_err());
        assert!(check_time(f64::NAN).is_err());
    }
}
