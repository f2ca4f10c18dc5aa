//! DecorationTiming: a single window with no peers and no parent.

use crate::error::Result;
use crate::timing::sequence::{Aggregation, SequenceKind};
use crate::timing::{check_time, PeerWindow, TimingView, Window};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecorationTiming {
    window: Window,
}

impl DecorationTiming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_raw(&self) -> f64 {
        self.window.start
    }

    pub fn end_raw(&self) -> f64 {
        self.window.end
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn peer(&self) -> PeerWindow {
        PeerWindow {
            start: self.window.start,
            duration: self.window.span(),
        }
    }

    pub fn set_times(&mut self, start: f64, end: f64) -> Result<()> {
        let (start, end) = (check_time(start)?, check_time(end)?);
        self.window = Window::new(start.min(end), start.max(end));
        Ok(())
    }

    pub fn view(&self) -> TimingView {
        TimingView {
            start_raw: self.window.start,
            end_raw: self.window.end,
            start_scaled: self.window.start,
            end_scaled: self.window.end,
            parent: None,
            sequencing: SequenceKind::All,
            field: None,
            aggregation: Aggregation::Mean,
            default_duration: 1.0,
            is_reverse: false,
            peer_groups: Vec::new(),
            prop_times: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_times_orders_and_validates() {
        let mut t = DecorationTiming::new();
        t.set_times(0.8, 0.2).unwrap();
        assert_eq!(t.window(), Window::new(0.2, 0.8));
        assert!(t.set_times(0.1, 2.0).is_err());
        assert_eq!(t.window(), Window::new(0.2, 0.8));
        assert!((t.peer().duration - 0.6).abs() < 1e-12);
    }
}
