//! Layer tree projection consumed by the timeline/tree UI.

use serde::{Deserialize, Serialize};

use crate::ids::{LinkType, ObjectId, TimingId};
use crate::timing::TimingView;

/// Absolute placement of one peer, for the timeline bars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerPeer {
    pub id: ObjectId,
    pub start: f64,
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerNode {
    pub id: String,
    /// Shape kind, or decoration kind for decoration rows.
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    /// `[start ids, end ids]`
    pub counts: [usize; 2],
    pub timing: TimingView,
    pub link_type: LinkType,
    pub is_animating: bool,
    pub properties: Vec<String>,
    pub peers: Vec<LayerPeer>,
    pub child_nodes: Vec<LayerNode>,
}

impl LayerNode {
    /// Depth-first search by node id.
    pub fn find(&self, id: &str) -> Option<&LayerNode> {
        if self.id == id {
            return Some(self);
        }
        self.child_nodes.iter().find_map(|c| c.find(id))
    }
}

/// Arrange flat `(timing, parent, node)` rows into a forest. Rows whose
/// parent is not among the rows become roots; input order is kept.
pub(crate) fn nest(rows: Vec<(TimingId, Option<TimingId>, LayerNode)>) -> Vec<LayerNode> {
    let ids: Vec<TimingId> = rows.iter().map(|(id, _, _)| *id).collect();
    let parents: Vec<Option<usize>> = rows
        .iter()
        .map(|(_, parent, _)| parent.and_then(|p| ids.iter().position(|id| *id == p)))
        .collect();
    let mut slots: Vec<Option<LayerNode>> = rows.into_iter().map(|(_, _, n)| Some(n)).collect();

    fn assemble(
        idx: usize,
        parents: &[Option<usize>],
        slots: &mut [Option<LayerNode>],
    ) -> Option<LayerNode> {
        let mut node = slots[idx].take()?;
        for child in (0..parents.len()).filter(|c| parents[*c] == Some(idx)) {
            if let Some(c) = assemble(child, parents, slots) {
                node.child_nodes.push(c);
            }
        }
        Some(node)
    }

    (0..parents.len())
        .filter(|i| parents[*i].is_none())
        .filter_map(|i| assemble(i, &parents, &mut slots))
        .collect()
}
