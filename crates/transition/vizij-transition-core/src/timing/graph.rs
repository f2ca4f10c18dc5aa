//! Arena of edge timings with parent links.
//!
//! Nodes are addressed by [`TimingId`]; removed slots stay empty so ids are
//! never reused. A node's resolved window is its raw window mapped through
//! the parent's resolved window. Resolution is lazy and cached per node;
//! every write clears the cache of the node and all of its descendants.
//! [`TimingGraph::set_parent`] refuses links that would close a cycle.

use std::cell::Cell;

use crate::data::Dataset;
use crate::error::{Result, TransitionError};
use crate::ids::TimingId;
use crate::props::ObjectProps;
use crate::scope::DataScope;
use crate::timing::object::ObjectTiming;
use crate::timing::scale::ClampedScale;
use crate::timing::sequence::{Aggregation, PeerSample, SequenceRequest};
use crate::timing::{PeerWindow, TimingView, Window};

#[derive(Debug)]
struct TimingNode {
    timing: ObjectTiming,
    parent: Option<TimingId>,
    children: Vec<TimingId>,
    resolved: Cell<Option<Window>>,
}

#[derive(Debug, Default)]
pub struct TimingGraph {
    nodes: Vec<Option<TimingNode>>,
}

fn missing(id: TimingId) -> TransitionError {
    TransitionError::ObjectNotFound {
        id: format!("timing#{}", id.0),
    }
}

impl TimingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timing: ObjectTiming) -> TimingId {
        let id = TimingId(self.nodes.len() as u32);
        self.nodes.push(Some(TimingNode {
            timing,
            parent: None,
            children: Vec::new(),
            resolved: Cell::new(None),
        }));
        id
    }

    /// Remove a node. Its children become roots.
    pub fn remove(&mut self, id: TimingId) -> Option<ObjectTiming> {
        let node = self.nodes.get_mut(id.index())?.take()?;
        if let Some(parent) = node.parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        for child in &node.children {
            if let Some(c) = self.node_mut(*child) {
                c.parent = None;
            }
            self.invalidate(*child);
        }
        Some(node.timing)
    }

    pub fn contains(&self, id: TimingId) -> bool {
        self.node(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: TimingId) -> Option<&ObjectTiming> {
        self.node(id).map(|n| &n.timing)
    }

    pub fn parent(&self, id: TimingId) -> Option<TimingId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: TimingId) -> &[TimingId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn node(&self, id: TimingId) -> Option<&TimingNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: TimingId) -> Option<&mut TimingNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Clear cached windows of `id` and its descendants.
    fn invalidate(&self, id: TimingId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.node(cur) {
                node.resolved.set(None);
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Nest `child` under `parent` (or detach it with `None`).
    pub fn set_parent(&mut self, child: TimingId, parent: Option<TimingId>) -> Result<()> {
        if !self.contains(child) {
            return Err(missing(child));
        }
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(missing(p));
            }
            let mut cur = Some(p);
            while let Some(c) = cur {
                if c == child {
                    return Err(TransitionError::TimingCycle { child, parent: p });
                }
                cur = self.parent(c);
            }
        }

        let old = self.parent(child);
        if old == parent {
            return Ok(());
        }
        if let Some(node) = old.and_then(|o| self.node_mut(o)) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = parent.and_then(|p| self.node_mut(p)) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = parent;
        }
        self.invalidate(child);
        Ok(())
    }

    /// Resolved `[start, end]` in the top-level domain; `[0, 1]` for unknown ids.
    pub fn window(&self, id: TimingId) -> Window {
        let Some(node) = self.node(id) else {
            return Window::UNIT;
        };
        if let Some(w) = node.resolved.get() {
            return w;
        }
        let range = node.parent.map(|p| self.window(p)).unwrap_or(Window::UNIT);
        let scale = ClampedScale::unit([range.start, range.end]);
        let w = Window::new(
            scale.apply(node.timing.start_raw()),
            scale.apply(node.timing.end_raw()),
        );
        node.resolved.set(Some(w));
        w
    }

    /// Absolute `(start, duration)` of the peer bound to `scope`.
    ///
    /// The edge's delay and duration are fractions of its own raw span; the
    /// result is then placed inside the parent's peer window for the same
    /// scope and properties, recursively.
    pub fn peer(&self, id: TimingId, scope: &DataScope, props: Option<&ObjectProps>) -> PeerWindow {
        let Some(node) = self.node(id) else {
            return PeerWindow::UNIT;
        };
        let t = &node.timing;
        let span = t.end_raw() - t.start_raw();
        let local = PeerWindow {
            start: t.start_raw() + t.get_delay(scope, props) * span,
            duration: t.get_duration(scope, props) * span,
        };
        match node.parent {
            Some(p) => self.peer(p, scope, props).compose(local),
            None => local,
        }
    }

    /// Absolute window of one property of one peer.
    pub fn prop_window(
        &self,
        id: TimingId,
        field: &str,
        scope: &DataScope,
        props: Option<&ObjectProps>,
    ) -> PeerWindow {
        let peer = self.peer(id, scope, props);
        let w = self.get(id).map(|t| t.prop_window(field)).unwrap_or(Window::UNIT);
        peer.compose(PeerWindow {
            start: w.start,
            duration: w.span(),
        })
    }

    /// Apply `f` to the timing of `id` and invalidate its subtree.
    fn update<R>(&mut self, id: TimingId, f: impl FnOnce(&mut ObjectTiming) -> Result<R>) -> Result<R> {
        let node = self.node_mut(id).ok_or_else(|| missing(id))?;
        let out = f(&mut node.timing)?;
        self.invalidate(id);
        Ok(out)
    }

    pub fn set_start_raw(&mut self, id: TimingId, x: f64) -> Result<()> {
        self.update(id, |t| t.set_start_raw(x))
    }

    pub fn set_end_raw(&mut self, id: TimingId, x: f64) -> Result<()> {
        self.update(id, |t| t.set_end_raw(x))
    }

    pub fn set_prop_times(&mut self, id: TimingId, field: &str, start: f64, end: f64) -> Result<()> {
        self.update(id, |t| t.set_prop_times(field, start, end))
    }

    pub fn set_prop_start(&mut self, id: TimingId, field: &str, t: f64) -> Result<()> {
        self.update(id, |timing| timing.set_prop_start(field, t))
    }

    pub fn set_prop_end(&mut self, id: TimingId, field: &str, t: f64) -> Result<()> {
        self.update(id, |timing| timing.set_prop_end(field, t))
    }

    pub fn create_sequencing(
        &mut self,
        id: TimingId,
        request: &SequenceRequest,
        dataset: Option<&Dataset>,
        peers: &[PeerSample<'_>],
        min_peer_duration: f64,
    ) -> Result<()> {
        self.update(id, |t| {
            t.create_sequencing(request, dataset, peers, min_peer_duration)
        })
    }

    pub fn set_default_duration(&mut self, id: TimingId, duration: f64) -> Result<()> {
        self.update(id, |t| t.set_default_duration(duration))
    }

    pub fn set_aggregation(&mut self, id: TimingId, aggregation: Aggregation) -> Result<()> {
        self.update(id, |t| {
            t.set_aggregation(aggregation);
            Ok(())
        })
    }

    pub fn toggle_is_reverse(&mut self, id: TimingId) -> Result<()> {
        self.update(id, |t| {
            t.toggle_is_reverse();
            Ok(())
        })
    }

    pub fn view(&self, id: TimingId) -> Option<TimingView> {
        let node = self.node(id)?;
        let t = &node.timing;
        let seq = t.sequencing();
        let scaled = self.window(id);
        Some(TimingView {
            start_raw: t.start_raw(),
            end_raw: t.end_raw(),
            start_scaled: scaled.start,
            end_scaled: scaled.end,
            parent: node.parent,
            sequencing: seq.kind(),
            field: seq.field().map(str::to_string),
            aggregation: seq.aggregation(),
            default_duration: seq.default_duration(),
            is_reverse: seq.is_reverse(),
            peer_groups: seq.peer_groups().to_vec(),
            prop_times: t.prop_times().map(|(k, w)| (k.to_string(), w)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(n: usize) -> (TimingGraph, Vec<TimingId>) {
        let mut g = TimingGraph::new();
        let ids = (0..n).map(|_| g.insert(ObjectTiming::new(1, 0.3))).collect();
        (g, ids)
    }

    #[test]
    fn child_window_follows_parent_writes() {
        let (mut g, ids) = graph_with(2);
        g.set_parent(ids[1], Some(ids[0])).unwrap();
        g.set_end_raw(ids[1], 0.5).unwrap();
        assert_eq!(g.window(ids[1]), Window::new(0.0, 0.5));

        g.set_start_raw(ids[0], 0.2).unwrap();
        g.set_end_raw(ids[0], 0.6).unwrap();
        let w = g.window(ids[1]);
        assert!((w.start - 0.2).abs() < 1e-12);
        assert!((w.end - 0.4).abs() < 1e-12);
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut g, ids) = graph_with(3);
        g.set_parent(ids[1], Some(ids[0])).unwrap();
        g.set_parent(ids[2], Some(ids[1])).unwrap();
        let err = g.set_parent(ids[0], Some(ids[2])).unwrap_err();
        assert_eq!(
            err,
            TransitionError::TimingCycle {
                child: ids[0],
                parent: ids[2]
            }
        );
        assert!(g.set_parent(ids[0], Some(ids[0])).is_err());
        assert_eq!(g.parent(ids[0]), None);
    }

    #[test]
    fn removing_a_parent_frees_children() {
        let (mut g, ids) = graph_with(2);
        g.set_start_raw(ids[0], 0.5).unwrap();
        g.set_parent(ids[1], Some(ids[0])).unwrap();
        assert_eq!(g.window(ids[1]).start, 0.5);
        g.remove(ids[0]);
        assert_eq!(g.parent(ids[1]), None);
        assert_eq!(g.window(ids[1]), Window::UNIT);
        assert!(!g.contains(ids[0]));
        assert_eq!(g.len(), 1);
    }
}
