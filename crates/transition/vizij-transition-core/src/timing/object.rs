//! ObjectTiming: one edge's raw window, per-property sub-windows, and sequencing.
//!
//! Mutators are crate-private: writes go through [`TimingGraph`](super::TimingGraph)
//! so cached windows are invalidated.

use indexmap::IndexMap;

use crate::data::Dataset;
use crate::error::Result;
use crate::props::ObjectProps;
use crate::scope::DataScope;
use crate::timing::check_time;
use crate::timing::sequence::{
    Aggregation, PeerGroup, PeerSample, SequenceRequest, Sequencing,
};
use crate::timing::Window;

#[derive(Clone, Debug, Default)]
pub struct ObjectTiming {
    window: Window,
    prop_times: IndexMap<String, Window>,
    sequencing: Sequencing,
}

impl ObjectTiming {
    /// Full window, `'all'` sequencing over `peer_count` peers.
    pub fn new(peer_count: usize, min_peer_duration: f64) -> Self {
        Self {
            window: Window::UNIT,
            prop_times: IndexMap::new(),
            sequencing: Sequencing::all(peer_count, min_peer_duration),
        }
    }

    pub fn start_raw(&self) -> f64 {
        self.window.start
    }

    pub fn end_raw(&self) -> f64 {
        self.window.end
    }

    pub fn raw_window(&self) -> Window {
        self.window
    }

    pub fn sequencing(&self) -> &Sequencing {
        &self.sequencing
    }

    pub fn peer_groups(&self) -> &[PeerGroup] {
        self.sequencing.peer_groups()
    }

    /// Sub-window of `field` inside this edge's span; `[0, 1]` when unset.
    pub fn prop_window(&self, field: &str) -> Window {
        self.prop_times.get(field).copied().unwrap_or(Window::UNIT)
    }

    pub fn prop_times(&self) -> impl Iterator<Item = (&str, Window)> {
        self.prop_times.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn get_delay(&self, scope: &DataScope, props: Option<&ObjectProps>) -> f64 {
        self.sequencing.get_delay(scope, props)
    }

    pub fn get_duration(&self, scope: &DataScope, props: Option<&ObjectProps>) -> f64 {
        self.sequencing.get_duration(scope, props)
    }

    /// The start never passes the end: moving it past pushes the end along.
    pub(crate) fn set_start_raw(&mut self, x: f64) -> Result<()> {
        let x = check_time(x)?;
        self.window.start = x;
        if self.window.end < x {
            self.window.end = x;
        }
        Ok(())
    }

    pub(crate) fn set_end_raw(&mut self, x: f64) -> Result<()> {
        let x = check_time(x)?;
        self.window.end = x;
        if self.window.start > x {
            self.window.start = x;
        }
        Ok(())
    }

    pub(crate) fn set_prop_times(&mut self, field: &str, start: f64, end: f64) -> Result<()> {
        let (start, end) = (check_time(start)?, check_time(end)?);
        let w = Window::new(start.min(end), start.max(end));
        self.prop_times.insert(field.to_string(), w);
        Ok(())
    }

    pub(crate) fn set_prop_start(&mut self, field: &str, t: f64) -> Result<()> {
        let end = self.prop_window(field).end.max(check_time(t)?);
        self.set_prop_times(field, t, end)
    }

    pub(crate) fn set_prop_end(&mut self, field: &str, t: f64) -> Result<()> {
        let start = self.prop_window(field).start.min(check_time(t)?);
        self.set_prop_times(field, start, t)
    }

    /// Replace the sequencing; on error the previous one is kept.
    pub(crate) fn create_sequencing(
        &mut self,
        request: &SequenceRequest,
        dataset: Option<&Dataset>,
        peers: &[PeerSample<'_>],
        min_peer_duration: f64,
    ) -> Result<()> {
        self.sequencing = Sequencing::build(request, dataset, peers, min_peer_duration)?;
        Ok(())
    }

    pub(crate) fn set_default_duration(&mut self, duration: f64) -> Result<()> {
        self.sequencing.set_default_duration(duration)
    }

    pub(crate) fn set_aggregation(&mut self, aggregation: Aggregation) {
        self.sequencing.set_aggregation(aggregation);
    }

    pub(crate) fn toggle_is_reverse(&mut self) {
        self.sequencing.toggle_is_reverse();
    }
}
