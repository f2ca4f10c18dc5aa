//! AnimationGenerator: owns the edges of one transition and exposes the
//! mutation/query API used by the timeline UI and the renderer.
//!
//! Construction resolves data scopes, runs the linker once, and derives the
//! first set of render commands. Every mutator either succeeds and
//! re-derives the commands, or fails without touching any state; failures
//! are logged and kept as [`Diagnostic`]s until [`AnimationGenerator::take_diagnostics`].

use log::warn;

use crate::config::Config;
use crate::easing::Easing;
use crate::edge::{AnimationEdge, DecorationEdge, IdLinks, LinkKey, LinkedEdge};
use crate::effect::Effect;
use crate::error::{Diagnostic, Result, TransitionError};
use crate::ids::{LinkType, ObjectId, Side, TimingId};
use crate::layer::{nest, LayerNode, LayerPeer};
use crate::linker::{wire_parents, ObjectLinker};
use crate::outputs::{FieldWindow, MergeFan, Outputs, PeerTrack, ProgressChange, RenderCommand};
use crate::props::{Bounds, ObjectProps};
use crate::registry::{Registry, TargetHandle};
use crate::scope::DataScope;
use crate::template::{ObjectClass, Template};
use crate::timing::{
    Aggregation, PeerSample, PeerWindow, SequenceRequest, TimingGraph, TimingView,
};

const UPDATE_OBJECTS: &str = "update_objects";

/// One peer of an edge as seen by the renderer.
#[derive(Clone, Copy, Debug)]
struct PeerRef<'a> {
    start_id: Option<&'a ObjectId>,
    end_id: Option<&'a ObjectId>,
    scope: Option<&'a DataScope>,
    props: Option<&'a ObjectProps>,
}

impl<'a> PeerRef<'a> {
    fn id(&self) -> Option<&'a ObjectId> {
        self.end_id.or(self.start_id)
    }
}

pub struct AnimationGenerator<R: Registry> {
    cfg: Config,
    linker: ObjectLinker,
    start: Template,
    end: Template,
    registry: R,
    graph: TimingGraph,
    edges: Vec<AnimationEdge>,
    decorations: Vec<DecorationEdge>,
    outputs: Outputs,
    diagnostics: Vec<Diagnostic>,
}

impl<R: Registry> AnimationGenerator<R> {
    pub fn new(cfg: Config, start: Template, end: Template, registry: R) -> Self {
        let linker = ObjectLinker::new(&cfg);
        let mut gen = Self {
            cfg,
            linker,
            start,
            end,
            registry,
            graph: TimingGraph::new(),
            edges: Vec::new(),
            decorations: Vec::new(),
            outputs: Outputs::default(),
            diagnostics: Vec::new(),
        };
        gen.resolve_scopes(Side::Start);
        gen.resolve_scopes(Side::End);

        let result = gen.linker.link(&gen.start, &gen.end, &mut gen.graph);
        gen.edges = result.edges;
        gen.decorations = result.decorations;
        gen.update_objects();
        gen
    }

    fn resolve_scopes(&mut self, side: Side) {
        let template = match side {
            Side::Start => &mut self.start,
            Side::End => &mut self.end,
        };
        for id in template.dataset_ids() {
            match self.registry.dataset(&id) {
                Some(ds) => template.resolve_scopes(ds),
                None => {
                    let err = TransitionError::DatasetNotFound { id };
                    warn!("resolve scopes: {err}");
                    self.diagnostics.push(Diagnostic::new("resolve_scopes", err));
                }
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn template(&self, side: Side) -> &Template {
        match side {
            Side::Start => &self.start,
            Side::End => &self.end,
        }
    }

    pub fn edges(&self) -> &[AnimationEdge] {
        &self.edges
    }

    pub fn decorations(&self) -> &[DecorationEdge] {
        &self.decorations
    }

    pub fn timing_graph(&self) -> &TimingGraph {
        &self.graph
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn report(&mut self, operation: &str, err: TransitionError) {
        warn!("{operation}: {err}");
        self.diagnostics.push(Diagnostic::new(operation, err));
    }

    /// Run a mutation; refresh the outputs on success, record the error otherwise.
    fn mutate(&mut self, operation: &str, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        match f(self) {
            Ok(()) => {
                self.update_objects();
                Ok(())
            }
            Err(err) => {
                self.report(operation, err.clone());
                Err(err)
            }
        }
    }

    // ---- lookups ----

    /// Edge of `link_type` involving class `id`; class-level edges win over remainders.
    fn edge_index(&self, id: &str, link_type: LinkType) -> Result<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.link_type() == link_type && e.involves(id))
            .min_by_key(|(_, e)| e.is_remainder())
            .map(|(i, _)| i)
            .ok_or_else(|| TransitionError::EdgeNotFound {
                id: id.to_string(),
                link_type,
            })
    }

    /// Whole-class enter/exit edge of `id`.
    fn class_edge_index(&self, id: &str, link_type: LinkType) -> Result<usize> {
        self.edges
            .iter()
            .position(|e| e.link_type() == link_type && !e.is_remainder() && e.involves(id))
            .ok_or_else(|| TransitionError::EdgeNotFound {
                id: id.to_string(),
                link_type,
            })
    }

    fn edge_timing(&self, id: &str, link_type: LinkType) -> Result<TimingId> {
        self.edge_index(id, link_type).map(|i| self.edges[i].timing())
    }

    fn decoration_index(&self, id: &str, link_type: LinkType) -> Result<usize> {
        self.decorations
            .iter()
            .position(|d| d.link_type == link_type && d.involves(id))
            .ok_or_else(|| TransitionError::DecorationNotFound {
                id: id.to_string(),
                link_type,
            })
    }

    pub fn find_edge(&self, id: &str, link_type: LinkType) -> Option<&AnimationEdge> {
        self.edge_index(id, link_type).ok().map(|i| &self.edges[i])
    }

    pub fn find_decoration(&self, id: &str, link_type: LinkType) -> Option<&DecorationEdge> {
        self.decoration_index(id, link_type)
            .ok()
            .map(|i| &self.decorations[i])
    }

    fn class(&self, side: Side, id: &str) -> Option<&ObjectClass> {
        self.template(side).class(id)
    }

    fn handle(&self, class_id: &str, side: Side) -> Result<TargetHandle> {
        self.registry
            .object(class_id, side)
            .ok_or_else(|| TransitionError::ObjectNotFound {
                id: class_id.to_string(),
            })
    }

    fn peers_of<'a>(&'a self, edge: &'a AnimationEdge) -> Vec<PeerRef<'a>> {
        match edge {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => {
                let side = edge.peer_class().0;
                let Some(class) = self.class(side, &e.class) else {
                    return Vec::new();
                };
                e.ids
                    .iter()
                    .map(|id| PeerRef {
                        start_id: (side == Side::Start).then_some(id),
                        end_id: (side == Side::End).then_some(id),
                        scope: class.scope(id),
                        props: class.props(id),
                    })
                    .collect()
            }
            AnimationEdge::Linked(l) => {
                let (Some(s), Some(e)) = (self.class(Side::Start, &l.start), self.class(Side::End, &l.end))
                else {
                    return Vec::new();
                };
                match &l.links {
                    IdLinks::Pairs { pairs } => pairs
                        .iter()
                        .map(|(a, b)| PeerRef {
                            start_id: Some(a),
                            end_id: Some(b),
                            scope: e.scope(b),
                            props: e.props(b),
                        })
                        .collect(),
                    IdLinks::Merge { many, groups } => {
                        let (many_class, one_start) = match many {
                            Side::Start => (s, false),
                            Side::End => (e, true),
                        };
                        groups
                            .iter()
                            .filter_map(|g| {
                                let first = g.many.first()?;
                                let (start_id, end_id) = if one_start {
                                    (&g.one, first)
                                } else {
                                    (first, &g.one)
                                };
                                Some(PeerRef {
                                    start_id: Some(start_id),
                                    end_id: Some(end_id),
                                    scope: many_class.scope(first),
                                    props: many_class.props(first),
                                })
                            })
                            .collect()
                    }
                }
            }
        }
    }

    fn window_of(&self, timing: TimingId, peer: &PeerRef<'_>) -> PeerWindow {
        let empty = DataScope::default();
        self.graph
            .peer(timing, peer.scope.unwrap_or(&empty), peer.props)
    }

    /// Absolute `(start, duration)` of `object_id` within the edge `(id, link_type)`.
    pub fn peer_window(&self, id: &str, link_type: LinkType, object_id: &str) -> Option<PeerWindow> {
        let edge = self.find_edge(id, link_type)?;
        self.peers_of(edge)
            .iter()
            .find(|p| {
                p.start_id.map(String::as_str) == Some(object_id)
                    || p.end_id.map(String::as_str) == Some(object_id)
            })
            .map(|p| self.window_of(edge.timing(), p))
    }

    pub fn timing_for_object(&self, id: &str, link_type: LinkType) -> Option<TimingView> {
        let timing = self.edge_timing(id, link_type).ok()?;
        self.graph.view(timing)
    }

    pub fn timing_for_decoration(&self, id: &str, link_type: LinkType) -> Option<TimingView> {
        self.find_decoration(id, link_type).map(|d| d.timing.view())
    }

    // ---- render outputs ----

    /// Re-derive every render command from the current edges.
    /// Unresolved handles replace the diagnostics of the previous call.
    pub fn update_objects(&mut self) -> &Outputs {
        let mut commands = Vec::new();
        let mut errors = Vec::new();
        for edge in &self.edges {
            match self.edge_commands(edge) {
                Ok(cmds) => commands.extend(cmds),
                Err(err) => errors.push(err),
            }
        }
        for deco in &self.decorations {
            match self.decoration_command(deco) {
                Ok(cmd) => commands.push(cmd),
                Err(err) => errors.push(err),
            }
        }
        self.diagnostics.retain(|d| d.operation != UPDATE_OBJECTS);
        for err in errors {
            self.report(UPDATE_OBJECTS, err);
        }
        self.outputs.clear();
        for command in commands {
            self.outputs.push_command(command);
        }
        &self.outputs
    }

    fn edge_commands(&self, edge: &AnimationEdge) -> Result<Vec<RenderCommand>> {
        let timing = edge.timing();
        match edge {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => {
                let link_type = edge.link_type();
                let side = edge.peer_class().0;
                let handle = self.handle(&e.class, side)?;
                let tracks = self
                    .peers_of(edge)
                    .iter()
                    .filter_map(|p| {
                        let props = p.props?;
                        let off = e.effect.apply(props);
                        let (from, to) = match link_type {
                            LinkType::Enter => (off, props.clone()),
                            _ => (props.clone(), off),
                        };
                        Some(PeerTrack {
                            start_id: p.start_id.cloned(),
                            end_id: p.end_id.cloned(),
                            from,
                            to,
                            window: self.window_of(timing, p),
                            fields: Vec::new(),
                        })
                    })
                    .collect();
                Ok(vec![RenderCommand::AnimateWithEffect {
                    handle,
                    link_type,
                    effect: e.effect,
                    easing: e.easing,
                    tracks,
                }])
            }
            AnimationEdge::Linked(l) => self.linked_commands(edge, l),
        }
    }

    fn linked_commands(&self, edge: &AnimationEdge, l: &LinkedEdge) -> Result<Vec<RenderCommand>> {
        let (s, e) = match (self.class(Side::Start, &l.start), self.class(Side::End, &l.end)) {
            (Some(s), Some(e)) => (s, e),
            (None, _) => return Err(TransitionError::ObjectNotFound { id: l.start.clone() }),
            (_, None) => return Err(TransitionError::ObjectNotFound { id: l.end.clone() }),
        };
        let start_handle = self.handle(&l.start, Side::Start)?;
        let mut out = Vec::new();
        let handle = match &l.morph {
            Some(morph) => {
                out.push(RenderCommand::SpawnMorph {
                    handle: morph.clone(),
                    from: s.shape,
                    to: e.shape,
                    start_handle: start_handle.clone(),
                    end_handle: self.handle(&l.end, Side::End)?,
                });
                morph.clone()
            }
            None => start_handle,
        };

        if let IdLinks::Merge { many, groups } = &l.links {
            let (one_class, many_class) = match many {
                Side::Start => (e, s),
                Side::End => (s, e),
            };
            let peers = self.peers_of(edge);
            let fans = groups
                .iter()
                .zip(peers.iter())
                .filter_map(|(g, p)| {
                    Some(MergeFan {
                        one_id: g.one.clone(),
                        one: one_class.props(&g.one)?.clone(),
                        many: g
                            .many
                            .iter()
                            .filter_map(|id| many_class.props(id).map(|p| (id.clone(), p.clone())))
                            .collect(),
                        window: self.window_of(l.timing, p),
                    })
                })
                .collect();
            out.push(RenderCommand::AnimateWithMerge {
                handle,
                many: *many,
                easing: l.easing,
                fans,
            });
            return Ok(out);
        }

        let tracks: Vec<PeerTrack> = self
            .peers_of(edge)
            .iter()
            .filter_map(|p| {
                let from = s.props(p.start_id?)?.clone();
                let to = p.props?.clone();
                let scope = p.scope.cloned().unwrap_or_default();
                let fields = l
                    .prop_list
                    .iter()
                    .map(|f| FieldWindow {
                        field: f.clone(),
                        window: self.graph.prop_window(l.timing, f, &scope, p.props),
                    })
                    .collect();
                Some(PeerTrack {
                    start_id: p.start_id.cloned(),
                    end_id: p.end_id.cloned(),
                    from,
                    to,
                    window: self.window_of(l.timing, p),
                    fields,
                })
            })
            .collect();

        out.push(if l.is_animating {
            RenderCommand::AnimateProperties {
                handle,
                easing: l.easing,
                prop_list: l.prop_list.clone(),
                tracks,
            }
        } else {
            RenderCommand::StaticProperties { handle, tracks }
        });
        Ok(out)
    }

    fn decoration_command(&self, deco: &DecorationEdge) -> Result<RenderCommand> {
        let (id, side) = match (&deco.start, &deco.end) {
            (_, Some(end)) => (end, Side::End),
            (Some(start), None) => (start, Side::Start),
            (None, None) => {
                return Err(TransitionError::DecorationNotFound {
                    id: deco.key.clone(),
                    link_type: deco.link_type,
                })
            }
        };
        let handle = self
            .registry
            .decoration(id, side)
            .ok_or_else(|| TransitionError::DecorationNotFound {
                id: id.clone(),
                link_type: deco.link_type,
            })?;
        Ok(RenderCommand::AnimateDecoration {
            handle,
            link_type: deco.link_type,
            effect: deco.effect,
            easing: deco.easing,
            window: deco.timing.peer(),
        })
    }

    /// Eased progress of every resolved peer and decoration at time `t`.
    /// `t` is clamped to `[0, 1]`; non-finite values count as 0.
    pub fn set_progress(&mut self, t: f64) -> &Outputs {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mut progress = Vec::new();
        for edge in &self.edges {
            let side = match edge {
                AnimationEdge::Linked(_) => Side::Start,
                _ => edge.peer_class().0,
            };
            let class_id = match (edge, side) {
                (AnimationEdge::Linked(l), _) => &l.start,
                (_, _) => edge.owner_class(),
            };
            let handle = match edge.as_linked().and_then(|l| l.morph.clone()) {
                Some(morph) => morph,
                None => match self.registry.object(class_id, side) {
                    Some(h) => h,
                    None => continue,
                },
            };
            for peer in self.peers_of(edge) {
                let window = self.window_of(edge.timing(), &peer);
                let object_id = match edge {
                    AnimationEdge::Linked(_) => peer.start_id,
                    _ => peer.id(),
                };
                progress.push(ProgressChange {
                    handle: handle.clone(),
                    link_type: edge.link_type(),
                    object_id: object_id.cloned(),
                    progress: window.progress(t, edge.easing()),
                });
            }
        }
        for deco in &self.decorations {
            let (id, side) = match (&deco.start, &deco.end) {
                (_, Some(end)) => (end, Side::End),
                (Some(start), None) => (start, Side::Start),
                (None, None) => continue,
            };
            if let Some(handle) = self.registry.decoration(id, side) {
                progress.push(ProgressChange {
                    handle,
                    link_type: deco.link_type,
                    object_id: None,
                    progress: deco.timing.peer().progress(t, &deco.easing),
                });
            }
        }
        self.outputs.clear();
        for change in progress {
            self.outputs.push_progress(change);
        }
        &self.outputs
    }

    // ---- edge mutators ----

    /// Remove edges by index along with their timing nodes.
    fn remove_edges(&mut self, mut indices: Vec<usize>) {
        indices.sort_unstable();
        indices.dedup();
        for idx in indices.into_iter().rev() {
            let edge = self.edges.remove(idx);
            self.graph.remove(edge.timing());
        }
    }

    /// Re-pair decorations and re-nest timings after edges were replaced.
    /// Decoration edits survive when the decoration keeps its key and type.
    fn relink(&mut self) {
        let fresh = self.linker.link_decorations(&self.start, &self.end, &self.edges);
        let old = std::mem::take(&mut self.decorations);
        self.decorations = fresh
            .into_iter()
            .map(|mut d| {
                if let Some(prev) = old
                    .iter()
                    .find(|o| o.key == d.key && o.link_type == d.link_type)
                {
                    d.timing = prev.timing;
                    d.effect = prev.effect;
                    d.easing = prev.easing;
                }
                d
            })
            .collect();
        wire_parents(&self.start, &self.end, &self.edges, &mut self.graph);
    }

    fn linked_indices(&self, start_class: &str) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| match e {
                AnimationEdge::Linked(l) => l.start == start_class,
                _ => e.remainder_of().map(String::as_str) == Some(start_class),
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Manually link an exiting start class with an entering end class.
    ///
    /// Peers pair by `link_by` (filter strings when `None`), then by identical
    /// object id; the rest become remainder exit/enter edges. Ellipse/rectangle
    /// pairs get a morph target named `object_id` (or `morph:{start}->{end}`).
    pub fn create_link(
        &mut self,
        start_class: &str,
        end_class: &str,
        object_id: Option<&str>,
        link_by: Option<LinkKey>,
    ) -> Result<()> {
        self.mutate("create_link", |g| {
            let exit = g.class_edge_index(start_class, LinkType::Exit)?;
            let enter = g.class_edge_index(end_class, LinkType::Enter)?;
            let s = g
                .start
                .class(start_class)
                .cloned()
                .ok_or_else(|| TransitionError::ObjectNotFound {
                    id: start_class.to_string(),
                })?;
            let e = g
                .end
                .class(end_class)
                .cloned()
                .ok_or_else(|| TransitionError::ObjectNotFound {
                    id: end_class.to_string(),
                })?;
            if s.shape != e.shape && !s.shape.is_morph_compatible(e.shape) {
                return Err(TransitionError::IncompatibleShapes {
                    start: s.shape.as_str().to_string(),
                    end: e.shape.as_str().to_string(),
                });
            }

            g.remove_edges(vec![exit, enter]);
            let key = link_by.unwrap_or(LinkKey::FilterString);
            let mut edges = g.linker.linked_edges(&s, &e, key, None, &mut g.graph);
            if s.shape != e.shape {
                if let Some(AnimationEdge::Linked(l)) = edges.first_mut() {
                    l.morph = Some(
                        object_id
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("morph:{}->{}", s.id, e.id)),
                    );
                }
            }
            g.edges.extend(edges);
            g.relink();
            Ok(())
        })
    }

    /// Split a linked edge (and its remainders) into a fade-out exit and a fade-in enter.
    pub fn break_link(&mut self, id: &str) -> Result<()> {
        self.mutate("break_link", |g| {
            let idx = g.edge_index(id, LinkType::Linked)?;
            let Some(l) = g.edges[idx].as_linked() else {
                return Err(TransitionError::EdgeNotFound {
                    id: id.to_string(),
                    link_type: LinkType::Linked,
                });
            };
            let (start_id, end_id) = (l.start.clone(), l.end.clone());
            let s = g.start.class(&start_id).cloned();
            let e = g.end.class(&end_id).cloned();
            let (Some(s), Some(e)) = (s, e) else {
                return Err(TransitionError::ObjectNotFound { id: id.to_string() });
            };

            let stale = g.linked_indices(&start_id);
            g.remove_edges(stale);
            for (link_type, class) in [(LinkType::Exit, &s), (LinkType::Enter, &e)] {
                let mut edge =
                    g.linker
                        .preset_edge(link_type, class, class.ids.clone(), None, &mut g.graph);
                if let AnimationEdge::Enter(p) | AnimationEdge::Exit(p) = &mut edge {
                    p.effect = Effect::Fade;
                }
                g.edges.push(edge);
            }
            g.relink();
            Ok(())
        })
    }

    /// Re-pair the peers of a linked edge by a different canonical key.
    /// The edge keeps its timing.
    pub fn update_key(&mut self, id: &str, key: LinkKey) -> Result<()> {
        self.mutate("update_key", |g| {
            let idx = g.edge_index(id, LinkType::Linked)?;
            let not_found = || TransitionError::EdgeNotFound {
                id: id.to_string(),
                link_type: LinkType::Linked,
            };
            let l = g.edges[idx].as_linked().ok_or_else(not_found)?;
            if l.is_merge {
                return Err(not_found());
            }
            let (timing, morph, easing) = (l.timing, l.morph.clone(), l.easing);
            let s = g.start.class(&l.start).cloned();
            let e = g.end.class(&l.end).cloned();
            let (Some(s), Some(e)) = (s, e) else {
                return Err(TransitionError::ObjectNotFound { id: id.to_string() });
            };

            // Keep the linked timing node alive; drop only the remainders.
            let mut stale = g.linked_indices(&s.id);
            stale.retain(|i| *i != idx);
            g.edges.remove(idx);
            let stale: Vec<usize> = stale.into_iter().map(|i| if i > idx { i - 1 } else { i }).collect();
            g.remove_edges(stale);

            let mut edges = g
                .linker
                .linked_edges(&s, &e, key, Some(timing), &mut g.graph);
            if let Some(AnimationEdge::Linked(l)) = edges.first_mut() {
                l.morph = morph;
                l.easing = easing;
            }
            g.edges.extend(edges);
            g.relink();
            Ok(())
        })
    }

    pub fn update_effect(&mut self, id: &str, link_type: LinkType, effect: Effect) -> Result<()> {
        self.mutate("update_effect", |g| {
            let idx = g.edge_index(id, link_type)?;
            match &mut g.edges[idx] {
                AnimationEdge::Enter(p) | AnimationEdge::Exit(p) => {
                    p.effect = effect;
                    Ok(())
                }
                AnimationEdge::Linked(_) => Err(TransitionError::EdgeNotFound {
                    id: id.to_string(),
                    link_type,
                }),
            }
        })
    }

    pub fn update_easing(&mut self, id: &str, link_type: LinkType, easing: Easing) -> Result<()> {
        self.mutate("update_easing", |g| {
            let idx = g.edge_index(id, link_type)?;
            g.edges[idx].set_easing(easing);
            Ok(())
        })
    }

    // ---- timing mutators ----

    pub fn set_start_raw(&mut self, id: &str, link_type: LinkType, x: f64) -> Result<()> {
        self.mutate("set_start_raw", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.set_start_raw(t, x)
        })
    }

    pub fn set_end_raw(&mut self, id: &str, link_type: LinkType, x: f64) -> Result<()> {
        self.mutate("set_end_raw", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.set_end_raw(t, x)
        })
    }

    pub fn set_prop_times(
        &mut self,
        id: &str,
        link_type: LinkType,
        field: &str,
        start: f64,
        end: f64,
    ) -> Result<()> {
        self.mutate("set_prop_times", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.set_prop_times(t, field, start, end)
        })
    }

    pub fn set_prop_start(&mut self, id: &str, link_type: LinkType, field: &str, x: f64) -> Result<()> {
        self.mutate("set_prop_start", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.set_prop_start(t, field, x)
        })
    }

    pub fn set_prop_end(&mut self, id: &str, link_type: LinkType, field: &str, x: f64) -> Result<()> {
        self.mutate("set_prop_end", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.set_prop_end(t, field, x)
        })
    }

    /// Sequence the peers of an edge. Data fields are read from the dataset
    /// bound to the peer class; visual fields from the peers' properties.
    pub fn create_sequencing(
        &mut self,
        id: &str,
        link_type: LinkType,
        request: SequenceRequest,
    ) -> Result<()> {
        self.mutate("create_sequencing", |g| {
            let idx = g.edge_index(id, link_type)?;
            let edge = &g.edges[idx];
            let (side, class_id) = edge.peer_class();
            let template = match side {
                Side::Start => &g.start,
                Side::End => &g.end,
            };
            let class = template
                .class(class_id)
                .ok_or_else(|| TransitionError::ObjectNotFound {
                    id: class_id.clone(),
                })?;
            let dataset = class
                .dataset
                .as_deref()
                .and_then(|d| g.registry.dataset(d));
            let peer_ids = edge.peer_ids();
            let peers: Vec<PeerSample<'_>> = peer_ids
                .iter()
                .filter_map(|pid| {
                    Some(PeerSample {
                        scope: class.scope(pid)?,
                        props: class.props(pid),
                    })
                })
                .collect();
            g.graph.create_sequencing(
                edge.timing(),
                &request,
                dataset,
                &peers,
                g.cfg.min_peer_duration,
            )
        })
    }

    pub fn set_default_duration(&mut self, id: &str, link_type: LinkType, duration: f64) -> Result<()> {
        self.mutate("set_default_duration", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.set_default_duration(t, duration)
        })
    }

    pub fn set_aggregation(&mut self, id: &str, link_type: LinkType, aggregation: Aggregation) -> Result<()> {
        self.mutate("set_aggregation", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.set_aggregation(t, aggregation)
        })
    }

    pub fn toggle_is_reverse(&mut self, id: &str, link_type: LinkType) -> Result<()> {
        self.mutate("toggle_is_reverse", |g| {
            let t = g.edge_timing(id, link_type)?;
            g.graph.toggle_is_reverse(t)
        })
    }

    // ---- decoration mutators ----

    pub fn set_decoration_times(&mut self, id: &str, link_type: LinkType, start: f64, end: f64) -> Result<()> {
        self.mutate("set_decoration_times", |g| {
            let idx = g.decoration_index(id, link_type)?;
            g.decorations[idx].timing.set_times(start, end)
        })
    }

    pub fn update_decoration_effect(&mut self, id: &str, link_type: LinkType, effect: Effect) -> Result<()> {
        self.mutate("update_decoration_effect", |g| {
            let idx = g.decoration_index(id, link_type)?;
            g.decorations[idx].effect = effect;
            Ok(())
        })
    }

    pub fn update_decoration_easing(&mut self, id: &str, link_type: LinkType, easing: Easing) -> Result<()> {
        self.mutate("update_decoration_easing", |g| {
            let idx = g.decoration_index(id, link_type)?;
            g.decorations[idx].easing = easing;
            Ok(())
        })
    }

    // ---- projections ----

    /// Roots-first tree of all edges (nested by timing parent), followed by
    /// one row per decoration edge.
    pub fn get_layer_data(&self) -> Vec<LayerNode> {
        let rows = self
            .edges
            .iter()
            .filter_map(|edge| {
                let timing = edge.timing();
                let (side, class_id) = match edge {
                    AnimationEdge::Enter(e) => (Side::End, &e.class),
                    AnimationEdge::Exit(e) => (Side::Start, &e.class),
                    AnimationEdge::Linked(l) => (Side::Start, &l.start),
                };
                let class = self.class(side, class_id);
                let node = LayerNode {
                    id: class_id.clone(),
                    kind: class.map_or("unknown", |c| c.shape.as_str()).to_string(),
                    label: class.map_or(class_id.as_str(), |c| c.label()).to_string(),
                    counts: edge.counts(),
                    timing: self.graph.view(timing)?,
                    link_type: edge.link_type(),
                    is_animating: edge.is_animating(),
                    properties: edge
                        .as_linked()
                        .map(|l| l.prop_list.clone())
                        .unwrap_or_default(),
                    peers: self
                        .peers_of(edge)
                        .iter()
                        .filter_map(|p| {
                            let w = self.window_of(timing, p);
                            Some(LayerPeer {
                                id: p.id()?.clone(),
                                start: w.start,
                                duration: w.duration,
                            })
                        })
                        .collect(),
                    child_nodes: Vec::new(),
                };
                Some((timing, self.graph.parent(timing), node))
            })
            .collect();

        let mut layers = nest(rows);
        layers.extend(self.decorations.iter().map(|d| {
            let deco = d
                .end
                .as_deref()
                .and_then(|id| self.end.decoration(id))
                .or_else(|| d.start.as_deref().and_then(|id| self.start.decoration(id)));
            LayerNode {
                id: d.id().to_string(),
                kind: deco.map_or("decoration", |x| x.kind.as_str()).to_string(),
                label: d.key.clone(),
                counts: [d.start.is_some() as usize, d.end.is_some() as usize],
                timing: d.timing.view(),
                link_type: d.link_type,
                is_animating: true,
                properties: deco.map(|x| vec![x.visual_field.clone()]).unwrap_or_default(),
                peers: Vec::new(),
                child_nodes: Vec::new(),
            }
        }));
        layers
    }

    /// Union of both board bounds and every peer's property bounds.
    pub fn get_bounds(&self) -> Bounds {
        [&self.start, &self.end]
            .into_iter()
            .flat_map(|t| {
                let board = (!t.bounds.is_empty()).then_some(t.bounds);
                board
                    .into_iter()
                    .chain(t.classes.iter().filter_map(ObjectClass::bounds))
            })
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }
}
