//! ObjectLinker: builds the enter/linked/exit partition of two boards.
//!
//! Steps, in order:
//! 1. Score every type-compatible (start, end) class pair.
//! 2. Let the configured [`MatchingStrategy`] pick identity links with
//!    `COMPARE_SUM >= link_threshold`.
//! 3. Walk the remaining pairs by rank and turn complete N-to-1 covers into
//!    merge edges.
//! 4. Everything left over becomes a plain exit or enter edge.
//! 5. Link decorations through their owner's edge and nest timings along the
//!    boards' parent maps.
//!
//! Linking never fails: malformed classes simply stay unmatched.

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use log::{debug, trace, warn};

use crate::compare::{CompareScore, Comparison, ObjectComparator};
use crate::config::Config;
use crate::edge::{AnimationEdge, DecorationEdge, IdLinks, LinkKey, LinkedEdge, PresetEdge};
use crate::ids::{ClassId, LinkType, ObjectId, Side, TimingId};
use crate::matching::{rank, Candidate, MatchingStrategy};
use crate::props::changed_fields;
use crate::template::{Decoration, ObjectClass, Template};
use crate::timing::{DecorationTiming, ObjectTiming, TimingGraph};

#[derive(Clone, Debug, Default)]
pub struct LinkResult {
    pub edges: Vec<AnimationEdge>,
    pub decorations: Vec<DecorationEdge>,
}

/// Peer correspondence between two classes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Correspondence {
    pub pairs: Vec<(ObjectId, ObjectId)>,
    pub id_exit: Vec<ObjectId>,
    pub id_enter: Vec<ObjectId>,
}

pub struct ObjectLinker {
    cfg: Config,
    comparator: ObjectComparator,
    strategy: Box<dyn MatchingStrategy>,
}

impl ObjectLinker {
    pub fn new(cfg: &Config) -> Self {
        Self {
            cfg: cfg.clone(),
            comparator: ObjectComparator::new(cfg.weights),
            strategy: cfg.strategy.strategy(),
        }
    }

    /// Replace the matching strategy (e.g. to compare algorithms on one fixture).
    pub fn with_strategy(mut self, strategy: Box<dyn MatchingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn comparator(&self) -> &ObjectComparator {
        &self.comparator
    }

    pub fn link(&self, start: &Template, end: &Template, graph: &mut TimingGraph) -> LinkResult {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut comparisons: Vec<Comparison> = Vec::new();
        for (si, s) in start.classes.iter().enumerate() {
            for (ei, e) in end.classes.iter().enumerate() {
                let cmp = self.comparator.compare(s, e);
                if cmp.score.type_match < 1.0 {
                    continue;
                }
                let sum = self.comparator.compare_sum(&cmp.score);
                trace!("score {} -> {}: {:?} sum={sum:.3}", s.id, e.id, cmp.score);
                candidates.push(Candidate {
                    start: si,
                    end: ei,
                    sum,
                });
                comparisons.push(cmp);
            }
        }

        let mut start_used = vec![false; start.classes.len()];
        let mut end_used = vec![false; end.classes.len()];
        let mut edges = Vec::new();

        for idx in self.strategy.assign(&candidates, self.cfg.link_threshold) {
            let c = candidates[idx];
            let (s, e) = (&start.classes[c.start], &end.classes[c.end]);
            start_used[c.start] = true;
            end_used[c.end] = true;
            let key = default_key(&comparisons[idx].score);
            debug!("link {} -> {} (sum={:.3}, key={key:?})", s.id, e.id, c.sum);
            edges.extend(self.linked_edges(s, e, key, None, graph));
        }

        for idx in rank(&candidates) {
            let c = candidates[idx];
            if start_used[c.start] || end_used[c.end] {
                continue;
            }
            let cmp = &comparisons[idx];
            if cmp.combine.combine_matches == 0 {
                continue;
            }
            let (s, e) = (&start.classes[c.start], &end.classes[c.end]);
            start_used[c.start] = true;
            end_used[c.end] = true;
            debug!(
                "merge {} -> {} ({} complete covers)",
                s.id, e.id, cmp.combine.combine_matches
            );
            edges.extend(self.merge_edges(s, e, cmp, graph));
        }

        for (class, _) in start.classes.iter().zip(&start_used).filter(|(_, u)| !**u) {
            debug!("exit {}", class.id);
            edges.push(self.preset_edge(LinkType::Exit, class, class.ids.clone(), None, graph));
        }
        for (class, _) in end.classes.iter().zip(&end_used).filter(|(_, u)| !**u) {
            debug!("enter {}", class.id);
            edges.push(self.preset_edge(LinkType::Enter, class, class.ids.clone(), None, graph));
        }

        let decorations = self.link_decorations(start, end, &edges);
        wire_parents(start, end, &edges, graph);
        LinkResult { edges, decorations }
    }

    pub(crate) fn preset_edge(
        &self,
        link_type: LinkType,
        class: &ObjectClass,
        ids: Vec<ObjectId>,
        remainder_of: Option<ClassId>,
        graph: &mut TimingGraph,
    ) -> AnimationEdge {
        let timing = graph.insert(ObjectTiming::new(ids.len(), self.cfg.min_peer_duration));
        let edge = PresetEdge {
            class: class.id.clone(),
            ids,
            timing,
            effect: self.cfg.default_effect,
            easing: self.cfg.default_easing,
            remainder_of,
        };
        match link_type {
            LinkType::Enter => AnimationEdge::Enter(edge),
            _ => AnimationEdge::Exit(edge),
        }
    }

    /// Identity link plus remainder edges for ids without a counterpart.
    /// `timing` keeps an existing timing node instead of allocating one.
    pub(crate) fn linked_edges(
        &self,
        s: &ObjectClass,
        e: &ObjectClass,
        key: LinkKey,
        timing: Option<TimingId>,
        graph: &mut TimingGraph,
    ) -> Vec<AnimationEdge> {
        let corr = correspond(s, e, key);
        let prop_list = prop_list(s, e, &corr.pairs, self.cfg.numeric_tolerance);
        let is_animating =
            !prop_list.is_empty() || s.shape.is_container() || s.shape != e.shape;
        let timing = timing.unwrap_or_else(|| {
            graph.insert(ObjectTiming::new(
                corr.pairs.len(),
                self.cfg.min_peer_duration,
            ))
        });

        let mut out = Vec::with_capacity(3);
        out.push(AnimationEdge::Linked(LinkedEdge {
            start: s.id.clone(),
            end: e.id.clone(),
            links: IdLinks::Pairs {
                pairs: corr.pairs,
            },
            key,
            id_exit: corr.id_exit.clone(),
            id_enter: corr.id_enter.clone(),
            prop_list,
            timing,
            easing: self.cfg.default_easing,
            is_merge: false,
            is_animating,
            morph: None,
        }));
        self.push_remainders(&mut out, s, e, corr.id_exit, corr.id_enter, graph);
        out
    }

    fn merge_edges(
        &self,
        s: &ObjectClass,
        e: &ObjectClass,
        cmp: &Comparison,
        graph: &mut TimingGraph,
    ) -> Vec<AnimationEdge> {
        let many = cmp.combine.many.unwrap_or(Side::Start);
        let groups: Vec<_> = cmp
            .combine
            .groups
            .iter()
            .filter(|g| g.complete)
            .cloned()
            .collect();
        let links = IdLinks::Merge { many, groups };
        let (linked_start, linked_end) = (links.start_ids(), links.end_ids());
        let id_exit: Vec<ObjectId> = s
            .ids
            .iter()
            .filter(|id| !linked_start.contains(id))
            .cloned()
            .collect();
        let id_enter: Vec<ObjectId> = e
            .ids
            .iter()
            .filter(|id| !linked_end.contains(id))
            .cloned()
            .collect();
        let peers = match many {
            Side::Start => linked_start.len(),
            Side::End => linked_end.len(),
        };
        let timing = graph.insert(ObjectTiming::new(peers, self.cfg.min_peer_duration));

        let mut out = vec![AnimationEdge::Linked(LinkedEdge {
            start: s.id.clone(),
            end: e.id.clone(),
            links,
            key: LinkKey::TupleString,
            id_exit: id_exit.clone(),
            id_enter: id_enter.clone(),
            prop_list: Vec::new(),
            timing,
            easing: self.cfg.default_easing,
            is_merge: true,
            is_animating: true,
            morph: None,
        })];
        self.push_remainders(&mut out, s, e, id_exit, id_enter, graph);
        out
    }

    fn push_remainders(
        &self,
        out: &mut Vec<AnimationEdge>,
        s: &ObjectClass,
        e: &ObjectClass,
        id_exit: Vec<ObjectId>,
        id_enter: Vec<ObjectId>,
        graph: &mut TimingGraph,
    ) {
        if !id_exit.is_empty() {
            out.push(self.preset_edge(LinkType::Exit, s, id_exit, Some(s.id.clone()), graph));
        }
        if !id_enter.is_empty() {
            out.push(self.preset_edge(LinkType::Enter, e, id_enter, Some(s.id.clone()), graph));
        }
    }

    /// Pair decorations by `{owner edge}__{visual field}__{kind}`.
    ///
    /// Owners on a linked edge are named by its start class on both boards,
    /// so only their decorations can pair up. Any other owner is tagged with
    /// its board (`start:{owner}` / `end:{owner}`).
    pub(crate) fn link_decorations(
        &self,
        start: &Template,
        end: &Template,
        edges: &[AnimationEdge],
    ) -> Vec<DecorationEdge> {
        let linked: Vec<&LinkedEdge> = edges.iter().filter_map(AnimationEdge::as_linked).collect();
        let start_owner = |owner: &str| {
            if linked.iter().any(|l| l.start == owner) {
                owner.to_string()
            } else {
                format!("start:{owner}")
            }
        };
        let end_owner = |owner: &str| match linked.iter().find(|l| l.end == owner) {
            Some(l) => l.start.clone(),
            None => format!("end:{owner}"),
        };
        let key_of = |owner: String, d: &Decoration| {
            format!("{owner}__{}__{}", d.visual_field, d.kind.as_str())
        };

        let mut end_keys: IndexMap<String, &str> = IndexMap::new();
        for d in &end.decorations {
            end_keys
                .entry(key_of(end_owner(&d.owner), d))
                .or_insert(d.id.as_str());
        }

        let mut out = Vec::new();
        let mut matched: HashSet<&str> = HashSet::new();
        for d in &start.decorations {
            let key = key_of(start_owner(&d.owner), d);
            let (link_type, end_id) = match end_keys.shift_remove(&key) {
                Some(end_id) => {
                    matched.insert(end_id);
                    (LinkType::Linked, Some(end_id.to_string()))
                }
                None => (LinkType::Exit, None),
            };
            debug!("decoration {key}: {link_type}");
            out.push(self.decoration_edge(link_type, key, Some(d.id.clone()), end_id));
        }
        for d in &end.decorations {
            if matched.contains(d.id.as_str()) {
                continue;
            }
            let key = key_of(end_owner(&d.owner), d);
            debug!("decoration {key}: enter");
            out.push(self.decoration_edge(LinkType::Enter, key, None, Some(d.id.clone())));
        }
        out
    }

    pub(crate) fn decoration_edge(
        &self,
        link_type: LinkType,
        key: String,
        start: Option<String>,
        end: Option<String>,
    ) -> DecorationEdge {
        DecorationEdge {
            link_type,
            key,
            start,
            end,
            timing: DecorationTiming::new(),
            effect: self.cfg.default_effect,
            easing: self.cfg.default_easing,
        }
    }
}

/// Filter strings when the scope axis strictly dominates, tuple strings otherwise.
pub fn default_key(score: &CompareScore) -> LinkKey {
    if score.data_scope > score.data_tuples {
        LinkKey::FilterString
    } else {
        LinkKey::TupleString
    }
}

fn key_string<'a>(class: &'a ObjectClass, id: &str, key: LinkKey) -> Option<&'a str> {
    let scope = class.scope(id)?;
    let s = match key {
        LinkKey::FilterString => scope.filter_string(),
        LinkKey::TupleString => scope.tuple_string(),
    };
    (!s.is_empty()).then_some(s)
}

/// Pair start ids with end ids: equal key strings first, then identical
/// object ids. Everything else is left for the remainder edges.
pub fn correspond(s: &ObjectClass, e: &ObjectClass, key: LinkKey) -> Correspondence {
    let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, id) in e.ids.iter().enumerate().rev() {
        if let Some(k) = key_string(e, id, key) {
            by_key.entry(k).or_default().push(i);
        }
    }

    let mut end_used = vec![false; e.ids.len()];
    let mut pair_of: Vec<Option<usize>> = vec![None; s.ids.len()];

    for (si, id) in s.ids.iter().enumerate() {
        let Some(queue) = key_string(s, id, key).and_then(|k| by_key.get_mut(k)) else {
            continue;
        };
        if let Some(ei) = queue.pop() {
            end_used[ei] = true;
            pair_of[si] = Some(ei);
        }
    }

    for (si, id) in s.ids.iter().enumerate() {
        if pair_of[si].is_some() {
            continue;
        }
        if let Some(ei) = e.ids.iter().position(|x| x == id) {
            if !end_used[ei] {
                end_used[ei] = true;
                pair_of[si] = Some(ei);
            }
        }
    }

    let mut corr = Correspondence::default();
    for (si, slot) in pair_of.iter().enumerate() {
        match slot {
            Some(ei) => corr.pairs.push((s.ids[si].clone(), e.ids[*ei].clone())),
            None => corr.id_exit.push(s.ids[si].clone()),
        }
    }
    corr.id_enter = e
        .ids
        .iter()
        .zip(&end_used)
        .filter(|(_, used)| !**used)
        .map(|(id, _)| id.clone())
        .collect();
    corr
}

/// Union of the fields that differ across the paired peers, first-seen order.
pub fn prop_list(
    s: &ObjectClass,
    e: &ObjectClass,
    pairs: &[(ObjectId, ObjectId)],
    tolerance: f64,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (a, b) in pairs {
        let (Some(pa), Some(pb)) = (s.props(a), e.props(b)) else {
            continue;
        };
        for field in changed_fields(pa, pb, tolerance) {
            if !out.iter().any(|f| f == field) {
                out.push(field.to_string());
            }
        }
    }
    out
}

/// Nest each edge's timing under the same-type edge owning its parent class.
pub fn wire_parents(start: &Template, end: &Template, edges: &[AnimationEdge], graph: &mut TimingGraph) {
    for edge in edges {
        if let Err(err) = graph.set_parent(edge.timing(), None) {
            warn!("detach {}: {err}", edge.owner_class());
        }
    }
    for edge in edges {
        let template = match edge.owner_side() {
            Side::Start => start,
            Side::End => end,
        };
        let Some(parent_class) = template.parent_of(edge.owner_class()) else {
            continue;
        };
        let parent = edges
            .iter()
            .filter(|p| p.link_type() == edge.link_type() && p.owner_class() == parent_class)
            .min_by_key(|p| p.is_remainder());
        let Some(parent) = parent else {
            continue;
        };
        if let Err(err) = graph.set_parent(edge.timing(), Some(parent.timing())) {
            warn!(
                "cannot nest {} under {parent_class}: {err}",
                edge.owner_class()
            );
        }
    }
}
