//! Output contracts from the generator.
//!
//! `update_objects` re-derives one [`RenderCommand`] per edge from scratch;
//! `set_progress` reports eased per-peer progress. Adapters apply both to
//! the host's render objects, addressed by [`TargetHandle`].

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::effect::Effect;
use crate::ids::{LinkType, ObjectId, Side};
use crate::props::{ObjectProps, ShapeKind};
use crate::registry::TargetHandle;
use crate::timing::PeerWindow;

/// Sub-window of one animated field of a peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldWindow {
    pub field: String,
    pub window: PeerWindow,
}

/// Interpolation of one peer from `from` to `to` inside `window`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerTrack {
    pub start_id: Option<ObjectId>,
    pub end_id: Option<ObjectId>,
    pub from: ObjectProps,
    pub to: ObjectProps,
    pub window: PeerWindow,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldWindow>,
}

/// One "one"-side peer and the "many"-side peers folded into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeFan {
    pub one_id: ObjectId,
    pub one: ObjectProps,
    pub many: Vec<(ObjectId, ObjectProps)>,
    pub window: PeerWindow,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RenderCommand {
    /// Enter/exit toward or away from an effect's off-state.
    #[serde(rename_all = "camelCase")]
    AnimateWithEffect {
        handle: TargetHandle,
        link_type: LinkType,
        effect: Effect,
        easing: Easing,
        tracks: Vec<PeerTrack>,
    },
    /// Linked edge interpolating paired peers.
    #[serde(rename_all = "camelCase")]
    AnimateProperties {
        handle: TargetHandle,
        easing: Easing,
        prop_list: Vec<String>,
        tracks: Vec<PeerTrack>,
    },
    /// Merge edge fanning k peers into one (or the inverse).
    #[serde(rename_all = "camelCase")]
    AnimateWithMerge {
        handle: TargetHandle,
        many: Side,
        easing: Easing,
        fans: Vec<MergeFan>,
    },
    /// Linked edge with nothing to interpolate.
    #[serde(rename_all = "camelCase")]
    StaticProperties {
        handle: TargetHandle,
        tracks: Vec<PeerTrack>,
    },
    /// Create a morph-capable target for a cross-shape link.
    #[serde(rename_all = "camelCase")]
    SpawnMorph {
        handle: TargetHandle,
        from: ShapeKind,
        to: ShapeKind,
        start_handle: TargetHandle,
        end_handle: TargetHandle,
    },
    #[serde(rename_all = "camelCase")]
    AnimateDecoration {
        handle: TargetHandle,
        link_type: LinkType,
        effect: Effect,
        easing: Easing,
        window: PeerWindow,
    },
}

impl RenderCommand {
    pub fn handle(&self) -> &str {
        match self {
            RenderCommand::AnimateWithEffect { handle, .. }
            | RenderCommand::AnimateProperties { handle, .. }
            | RenderCommand::AnimateWithMerge { handle, .. }
            | RenderCommand::StaticProperties { handle, .. }
            | RenderCommand::SpawnMorph { handle, .. }
            | RenderCommand::AnimateDecoration { handle, .. } => handle,
        }
    }
}

/// Eased progress of one peer (or decoration) at the current time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressChange {
    pub handle: TargetHandle,
    pub link_type: LinkType,
    pub object_id: Option<ObjectId>,
    pub progress: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub commands: Vec<RenderCommand>,
    #[serde(default)]
    pub progress: Vec<ProgressChange>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.commands.clear();
        self.progress.clear();
    }

    #[inline]
    pub fn push_command(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    #[inline]
    pub fn push_progress(&mut self, change: ProgressChange) {
        self.progress.push(change);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.progress.is_empty()
    }
}
