//! Vizij Transition Core (engine-agnostic)
//!
//! Object matching and hierarchical timing for animated transitions between
//! two visualization boards. The linker partitions object classes into
//! enter/linked/exit edges, each edge owns a timing node (window, per-field
//! sub-windows, peer sequencing, parent nesting), and the
//! [`AnimationGenerator`] turns the result into render commands and per-peer
//! progress for an adapter to apply.

pub mod compare;
pub mod config;
pub mod data;
pub mod easing;
pub mod edge;
pub mod effect;
pub mod error;
pub mod generator;
pub mod ids;
pub mod layer;
pub mod linker;
pub mod matching;
pub mod outputs;
pub mod props;
pub mod registry;
pub mod scope;
pub mod template;
pub mod timing;

// Re-exports for consumers (adapters)
pub use compare::{CombineGroup, CombineMap, CompareScore, Comparison, ObjectComparator};
pub use config::{CompareWeights, Config};
pub use data::{parse_dataset_json, DataValue, Dataset, FieldInfo, FieldKind, Tuple};
pub use easing::Easing;
pub use edge::{AnimationEdge, DecorationEdge, EnterEdge, ExitEdge, IdLinks, LinkKey, LinkedEdge, PresetEdge};
pub use effect::{Effect, WipeDirection};
pub use error::{Diagnostic, Result, TransitionError};
pub use generator::AnimationGenerator;
pub use ids::{ClassId, LinkType, ObjectId, Side, TimingId, TupleId};
pub use layer::{LayerNode, LayerPeer};
pub use linker::{LinkResult, ObjectLinker};
pub use matching::{Candidate, GreedyMatching, MatchingKind, MatchingStrategy, MaxWeightMatching};
pub use outputs::{FieldWindow, MergeFan, Outputs, PeerTrack, ProgressChange, RenderCommand};
pub use props::{
    Bounds, ContainerProps, EllipseProps, ObjectProps, Paint, PathProps, PropValue, RectProps,
    ShapeKind, TextProps, VisualProps,
};
pub use registry::{Registry, StaticRegistry, TargetHandle};
pub use scope::{DataScope, Filter};
pub use template::{parse_template_json, Decoration, DecorationKind, ObjectClass, Template};
pub use timing::{
    Aggregation, DecorationTiming, FieldSource, ObjectTiming, PeerGroup, PeerSample, PeerWindow,
    SequenceKind, SequenceRequest, TimingGraph, TimingView, Window,
};
