//! Clamped linear scale (no extrapolation outside the domain).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClampedScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl Default for ClampedScale {
    fn default() -> Self {
        Self::identity()
    }
}

impl ClampedScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// [0,1] -> [0,1]
    pub fn identity() -> Self {
        Self::new([0.0, 1.0], [0.0, 1.0])
    }

    /// [0,1] -> `range`
    pub fn unit(range: [f64; 2]) -> Self {
        Self::new([0.0, 1.0], range)
    }

    pub fn apply(&self, x: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        let t = ((x - d0) / span).clamp(0.0, 1.0);
        r0 + t * (r1 - r0)
    }

    pub fn invert(&self, y: f64) -> f64 {
        ClampedScale::new(self.range, self.domain).apply(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_outside_domain() {
        let s = ClampedScale::unit([0.2, 0.6]);
        assert!((s.apply(0.5) - 0.4).abs() < 1e-12);
        assert_eq!(s.apply(-1.0), 0.2);
        assert_eq!(s.apply(2.0), 0.6);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let s = ClampedScale::new([3.0, 3.0], [0.0, 0.7]);
        assert_eq!(s.apply(3.0), 0.0);
    }

    #[test]
    fn reversed_range_and_invert() {
        let s = ClampedScale::new([10.0, 20.0], [0.7, 0.0]);
        assert!((s.apply(10.0) - 0.7).abs() < 1e-12);
        assert!((s.apply(20.0)).abs() < 1e-12);
        assert!((s.invert(0.35) - 15.0).abs() < 1e-9);
    }
}
