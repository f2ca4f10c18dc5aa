//! Animation edges: the enter/linked/exit partition produced by the linker.
//!
//! Class-level edges cover whole object classes. A linked edge whose ids do
//! not all correspond also owns *remainder* exit/enter edges for the leftover
//! ids; those carry `remainder_of` and are replaced together with the edge.

use serde::{Deserialize, Serialize};

use crate::compare::CombineGroup;
use crate::easing::Easing;
use crate::effect::Effect;
use crate::ids::{ClassId, LinkType, ObjectId, Side, TimingId};
use crate::timing::DecorationTiming;

/// Canonical string used to pair peer ids across a linked edge.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKey {
    #[default]
    FilterString,
    TupleString,
}

/// Peer correspondence of a linked edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IdLinks {
    /// One start id to one end id.
    Pairs { pairs: Vec<(ObjectId, ObjectId)> },
    /// N start ids fan into one end id (`many == Start`), or the inverse.
    Merge { many: Side, groups: Vec<CombineGroup> },
}

impl IdLinks {
    pub fn start_ids(&self) -> Vec<ObjectId> {
        self.side_ids(Side::Start)
    }

    pub fn end_ids(&self) -> Vec<ObjectId> {
        self.side_ids(Side::End)
    }

    fn side_ids(&self, side: Side) -> Vec<ObjectId> {
        match self {
            IdLinks::Pairs { pairs } => pairs
                .iter()
                .map(|(s, e)| match side {
                    Side::Start => s.clone(),
                    Side::End => e.clone(),
                })
                .collect(),
            IdLinks::Merge { many, groups } if *many == side => {
                groups.iter().flat_map(|g| g.many.iter().cloned()).collect()
            }
            IdLinks::Merge { groups, .. } => groups.iter().map(|g| g.one.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IdLinks::Pairs { pairs } => pairs.len(),
            IdLinks::Merge { groups, .. } => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Peers of one class appearing (or, for [`ExitEdge`], disappearing) with a preset effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetEdge {
    pub class: ClassId,
    pub ids: Vec<ObjectId>,
    pub timing: TimingId,
    pub effect: Effect,
    pub easing: Easing,
    /// Class of the linked edge this remainder belongs to.
    #[serde(default)]
    pub remainder_of: Option<ClassId>,
}

pub type EnterEdge = PresetEdge;
pub type ExitEdge = PresetEdge;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedEdge {
    pub start: ClassId,
    pub end: ClassId,
    pub links: IdLinks,
    pub key: LinkKey,
    /// Start ids without a counterpart.
    pub id_exit: Vec<ObjectId>,
    /// End ids without a counterpart.
    pub id_enter: Vec<ObjectId>,
    /// Visual fields that differ between paired peers.
    pub prop_list: Vec<String>,
    pub timing: TimingId,
    pub easing: Easing,
    pub is_merge: bool,
    pub is_animating: bool,
    /// Morph target spawned for a cross-shape manual link.
    #[serde(default)]
    pub morph: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "linkType", rename_all = "camelCase")]
pub enum AnimationEdge {
    Enter(EnterEdge),
    Linked(LinkedEdge),
    Exit(ExitEdge),
}

impl AnimationEdge {
    pub fn link_type(&self) -> LinkType {
        match self {
            AnimationEdge::Enter(_) => LinkType::Enter,
            AnimationEdge::Linked(_) => LinkType::Linked,
            AnimationEdge::Exit(_) => LinkType::Exit,
        }
    }

    pub fn timing(&self) -> TimingId {
        match self {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => e.timing,
            AnimationEdge::Linked(l) => l.timing,
        }
    }

    /// Class the edge is keyed by: start class for linked/exit, end class for enter.
    pub fn owner_class(&self) -> &ClassId {
        match self {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => &e.class,
            AnimationEdge::Linked(l) => &l.start,
        }
    }

    /// Board whose parent map applies to this edge.
    pub fn owner_side(&self) -> Side {
        match self {
            AnimationEdge::Enter(_) => Side::End,
            _ => Side::Start,
        }
    }

    /// True when `id` names a class on either side of the edge.
    pub fn involves(&self, id: &str) -> bool {
        match self {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => e.class == id,
            AnimationEdge::Linked(l) => l.start == id || l.end == id,
        }
    }

    pub fn remainder_of(&self) -> Option<&ClassId> {
        match self {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => e.remainder_of.as_ref(),
            AnimationEdge::Linked(_) => None,
        }
    }

    pub fn is_remainder(&self) -> bool {
        self.remainder_of().is_some()
    }

    pub fn easing(&self) -> &Easing {
        match self {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => &e.easing,
            AnimationEdge::Linked(l) => &l.easing,
        }
    }

    pub fn set_easing(&mut self, easing: Easing) {
        match self {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => e.easing = easing,
            AnimationEdge::Linked(l) => l.easing = easing,
        }
    }

    /// Side and class whose scopes drive sequencing: end for linked/enter,
    /// start for exit, the aggregated side for merges.
    pub fn peer_class(&self) -> (Side, &ClassId) {
        match self {
            AnimationEdge::Enter(e) => (Side::End, &e.class),
            AnimationEdge::Exit(e) => (Side::Start, &e.class),
            AnimationEdge::Linked(l) => match &l.links {
                IdLinks::Merge {
                    many: Side::Start, ..
                } => (Side::Start, &l.start),
                _ => (Side::End, &l.end),
            },
        }
    }

    /// Peer ids on the [`peer_class`](Self::peer_class) side.
    pub fn peer_ids(&self) -> Vec<ObjectId> {
        match self {
            AnimationEdge::Enter(e) | AnimationEdge::Exit(e) => e.ids.clone(),
            AnimationEdge::Linked(l) => match self.peer_class().0 {
                Side::Start => l.links.start_ids(),
                Side::End => l.links.end_ids(),
            },
        }
    }

    /// `[start ids, end ids]` covered by the edge.
    pub fn counts(&self) -> [usize; 2] {
        match self {
            AnimationEdge::Enter(e) => [0, e.ids.len()],
            AnimationEdge::Exit(e) => [e.ids.len(), 0],
            AnimationEdge::Linked(l) => [l.links.start_ids().len(), l.links.end_ids().len()],
        }
    }

    pub fn is_animating(&self) -> bool {
        match self {
            AnimationEdge::Linked(l) => l.is_animating,
            _ => true,
        }
    }

    pub fn as_linked(&self) -> Option<&LinkedEdge> {
        match self {
            AnimationEdge::Linked(l) => Some(l),
            _ => None,
        }
    }
}

/// Axis/legend transition, keyed by `{owner}__{visualField}__{kind}`.
#[derive(Clone, Debug, PartialEq)]
pub struct DecorationEdge {
    pub link_type: LinkType,
    pub key: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub timing: DecorationTiming,
    pub effect: Effect,
    pub easing: Easing,
}

impl DecorationEdge {
    pub fn involves(&self, id: &str) -> bool {
        self.start.as_deref() == Some(id) || self.end.as_deref() == Some(id)
    }

    /// Decoration id used for display: end side when present.
    pub fn id(&self) -> &str {
        self.end
            .as_deref()
            .or(self.start.as_deref())
            .unwrap_or(self.key.as_str())
    }
}
