//! Peer sequencing: how one edge's window is shared among its peers.
//!
//! - `All`: every peer runs over the whole window.
//! - `Stagger`: each distinct value of the sequencing field maps to a delay in
//!   `[0, 1 - default_duration]`; every peer lasts `default_duration`.
//! - `Speed`: delay is zero and each distinct value maps to a duration in
//!   `[default_duration, 1]`.
//!
//! Numeric fields are aggregated per peer and mapped linearly; text and
//! boolean fields are ordered by first appearance. The default duration is
//! `max(min_peer_duration, 1 / groups)` until explicitly overridden.
//!
//! Sampled values are snapshotted at creation so aggregation, duration, and
//! direction can be re-derived later without the dataset. Lookups for a scope
//! prefer the sampled peer with the same filter string, then the first sampled
//! peer whose tuples contain the scope's tuples (so a nested child inherits
//! the value of the parent peer it lives in).

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::{DataValue, Dataset, FieldKind};
use crate::error::{Result, TransitionError};
use crate::ids::TupleId;
use crate::props::{ObjectProps, PropValue, VisualProps};
use crate::scope::DataScope;
use crate::timing::scale::ClampedScale;

/// Smallest duration accepted by `set_default_duration`.
pub const MIN_PEER_SPAN: f64 = 0.01;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SequenceKind {
    #[default]
    All,
    Stagger,
    Speed,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
    Median,
    Max,
    Min,
}

impl Aggregation {
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) * 0.5
                } else {
                    sorted[mid]
                }
            }
        })
    }
}

/// Where the sequencing field lives: a dataset column or a visual property.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldSource {
    #[default]
    Data,
    Visual,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SequenceRequest {
    pub kind: SequenceKind,
    pub field: Option<String>,
    pub source: FieldSource,
    pub aggregation: Aggregation,
}

impl SequenceRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn stagger(field: impl Into<String>) -> Self {
        Self {
            kind: SequenceKind::Stagger,
            field: Some(field.into()),
            ..Self::default()
        }
    }

    pub fn speed(field: impl Into<String>) -> Self {
        Self {
            kind: SequenceKind::Speed,
            field: Some(field.into()),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: FieldSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }
}

/// Projection used by the stagger/speed editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerGroup {
    pub delay: f64,
    pub duration: f64,
    pub label: String,
    pub count: usize,
}

/// One peer handed to sequencing.
#[derive(Clone, Copy, Debug)]
pub struct PeerSample<'a> {
    pub scope: &'a DataScope,
    pub props: Option<&'a ObjectProps>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PeerValue {
    Number(f64),
    Category(String),
}

impl PeerValue {
    pub fn label(&self) -> String {
        match self {
            PeerValue::Number(n) => format!("{n}"),
            PeerValue::Category(s) => s.clone(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            PeerValue::Number(n) => Some(*n),
            PeerValue::Category(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
enum RawSample {
    Numbers(Vec<f64>),
    Category(Option<String>),
    Visual(Option<PeerValue>),
}

#[derive(Clone, Debug)]
struct SampledPeer {
    filter_string: String,
    tuples: Vec<TupleId>,
    raw: RawSample,
}

#[derive(Clone, Debug)]
enum SequenceScale {
    Uniform,
    Linear(ClampedScale),
    Ordinal { labels: Vec<String>, range: [f64; 2] },
}

#[derive(Clone, Debug)]
pub struct Sequencing {
    kind: SequenceKind,
    field: Option<String>,
    source: FieldSource,
    aggregation: Aggregation,
    default_duration: f64,
    duration_pinned: bool,
    is_reverse: bool,
    min_duration: f64,
    numeric: bool,
    peer_count: usize,
    peers: Vec<SampledPeer>,
    numbers: HashMap<TupleId, f64>,
    scale: SequenceScale,
    peer_groups: Vec<PeerGroup>,
}

impl Default for Sequencing {
    fn default() -> Self {
        Sequencing::all(0, 0.3)
    }
}

fn visual_value(props: &ObjectProps, field: &str) -> Option<PeerValue> {
    match props.field(field)? {
        PropValue::Number(n) => Some(PeerValue::Number(n)),
        PropValue::Category(s) => Some(PeerValue::Category(s)),
        PropValue::Points(_) => None,
    }
}

impl Sequencing {
    /// Synchronized window shared by `peer_count` peers.
    pub fn all(peer_count: usize, min_duration: f64) -> Self {
        let mut seq = Sequencing {
            kind: SequenceKind::All,
            field: None,
            source: FieldSource::Data,
            aggregation: Aggregation::Mean,
            default_duration: 1.0,
            duration_pinned: false,
            is_reverse: false,
            min_duration,
            numeric: false,
            peer_count,
            peers: Vec::new(),
            numbers: HashMap::new(),
            scale: SequenceScale::Uniform,
            peer_groups: Vec::new(),
        };
        seq.rederive();
        seq
    }

    pub fn build(
        request: &SequenceRequest,
        dataset: Option<&Dataset>,
        peers: &[PeerSample<'_>],
        min_duration: f64,
    ) -> Result<Self> {
        if request.kind == SequenceKind::All {
            return Ok(Sequencing::all(peers.len(), min_duration));
        }
        let field = request
            .field
            .clone()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| TransitionError::UnsupportedSequencingField {
                field: String::new(),
            })?;

        let mut numbers = HashMap::new();
        let (sampled, numeric) = match request.source {
            FieldSource::Data => sample_data(&field, dataset, peers, &mut numbers)?,
            FieldSource::Visual => sample_visual(&field, peers)?,
        };

        let mut seq = Sequencing {
            kind: request.kind,
            field: Some(field),
            source: request.source,
            aggregation: request.aggregation,
            default_duration: 1.0,
            duration_pinned: false,
            is_reverse: false,
            min_duration,
            numeric,
            peer_count: peers.len(),
            peers: sampled,
            numbers,
            scale: SequenceScale::Uniform,
            peer_groups: Vec::new(),
        };
        seq.rederive();
        Ok(seq)
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn source(&self) -> FieldSource {
        self.source
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn default_duration(&self) -> f64 {
        self.default_duration
    }

    pub fn is_reverse(&self) -> bool {
        self.is_reverse
    }

    pub fn peer_groups(&self) -> &[PeerGroup] {
        &self.peer_groups
    }

    pub fn set_default_duration(&mut self, duration: f64) -> Result<()> {
        if !duration.is_finite() {
            return Err(TransitionError::InvalidTime { value: duration });
        }
        self.default_duration = duration.clamp(MIN_PEER_SPAN, 1.0);
        self.duration_pinned = true;
        self.rederive();
        Ok(())
    }

    pub fn set_aggregation(&mut self, aggregation: Aggregation) {
        self.aggregation = aggregation;
        self.rederive();
    }

    pub fn toggle_is_reverse(&mut self) {
        self.is_reverse = !self.is_reverse;
        self.rederive();
    }

    /// Delay of the peer within the edge window, as a fraction of it.
    pub fn get_delay(&self, scope: &DataScope, props: Option<&ObjectProps>) -> f64 {
        match self.kind {
            SequenceKind::All | SequenceKind::Speed => 0.0,
            SequenceKind::Stagger => self
                .value_for(scope, props)
                .and_then(|v| self.scale_value(&v))
                .unwrap_or(0.0),
        }
    }

    /// Duration of the peer within the edge window, as a fraction of it.
    pub fn get_duration(&self, scope: &DataScope, props: Option<&ObjectProps>) -> f64 {
        match self.kind {
            SequenceKind::All => 1.0,
            SequenceKind::Stagger => self.default_duration,
            SequenceKind::Speed => self
                .value_for(scope, props)
                .and_then(|v| self.scale_value(&v))
                .unwrap_or(self.default_duration),
        }
    }

    fn peer_value(&self, peer: &SampledPeer) -> Option<PeerValue> {
        match &peer.raw {
            RawSample::Numbers(values) => self.aggregation.apply(values).map(PeerValue::Number),
            RawSample::Category(label) => label.clone().map(PeerValue::Category),
            RawSample::Visual(value) => value.clone(),
        }
    }

    fn value_for(&self, scope: &DataScope, props: Option<&ObjectProps>) -> Option<PeerValue> {
        let by_filter = (!scope.filter_string().is_empty())
            .then(|| {
                self.peers
                    .iter()
                    .find(|p| p.filter_string == scope.filter_string())
            })
            .flatten();
        let sampled = by_filter.or_else(|| {
            self.peers
                .iter()
                .find(|p| !p.tuples.is_empty() && scope.is_subset_of(&p.tuples))
        });
        if let Some(peer) = sampled {
            return self.peer_value(peer);
        }

        let field = self.field.as_deref()?;
        match self.source {
            FieldSource::Visual => props.and_then(|p| visual_value(p, field)),
            FieldSource::Data if self.numeric => {
                let values: Vec<f64> = scope
                    .tuples()
                    .iter()
                    .filter_map(|t| self.numbers.get(t).copied())
                    .collect();
                self.aggregation.apply(&values).map(PeerValue::Number)
            }
            FieldSource::Data => scope
                .filter_value(field)
                .map(|v| PeerValue::Category(v.to_string())),
        }
    }

    fn scale_value(&self, value: &PeerValue) -> Option<f64> {
        match (&self.scale, value) {
            (SequenceScale::Uniform, _) => None,
            (SequenceScale::Linear(scale), PeerValue::Number(n)) => Some(scale.apply(*n)),
            (SequenceScale::Linear(_), PeerValue::Category(_)) => None,
            (SequenceScale::Ordinal { labels, range }, v) => {
                let label = v.label();
                let idx = labels.iter().position(|l| *l == label)?;
                let t = if labels.len() > 1 {
                    idx as f64 / (labels.len() - 1) as f64
                } else {
                    0.0
                };
                Some(range[0] + t * (range[1] - range[0]))
            }
        }
    }

    /// Rebuild the scale and the peer-group projection from the snapshot.
    fn rederive(&mut self) {
        if self.kind == SequenceKind::All {
            self.scale = SequenceScale::Uniform;
            self.peer_groups = vec![PeerGroup {
                delay: 0.0,
                duration: 1.0,
                label: "all".to_string(),
                count: self.peer_count,
            }];
            return;
        }

        let mut groups: IndexMap<String, (PeerValue, usize)> = IndexMap::new();
        for value in self.peers.iter().filter_map(|p| self.peer_value(p)) {
            groups.entry(value.label()).or_insert((value, 0)).1 += 1;
        }
        if self.numeric {
            groups.sort_by(|_, a, _, b| {
                let (a, b) = (a.0.as_number(), b.0.as_number());
                a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0))
            });
        }

        let n = groups.len();
        if !self.duration_pinned {
            self.default_duration = if n == 0 {
                1.0
            } else {
                self.min_duration.max(1.0 / n as f64).min(1.0)
            };
        }
        let d = self.default_duration;
        let (mut r0, mut r1) = match self.kind {
            SequenceKind::Stagger => (0.0, 1.0 - d),
            _ => (d, 1.0),
        };
        if self.is_reverse {
            std::mem::swap(&mut r0, &mut r1);
        }

        self.scale = if n == 0 {
            SequenceScale::Uniform
        } else if self.numeric {
            let values = groups.values().filter_map(|(v, _)| v.as_number());
            let lo = values.clone().fold(f64::INFINITY, f64::min);
            let hi = values.fold(f64::NEG_INFINITY, f64::max);
            SequenceScale::Linear(ClampedScale::new([lo, hi], [r0, r1]))
        } else {
            SequenceScale::Ordinal {
                labels: groups.keys().cloned().collect(),
                range: [r0, r1],
            }
        };

        let kind = self.kind;
        self.peer_groups = groups
            .iter()
            .map(|(label, (value, count))| {
                let v = self.scale_value(value).unwrap_or(r0);
                let (delay, duration) = match kind {
                    SequenceKind::Stagger => (v, d),
                    _ => (0.0, v),
                };
                PeerGroup {
                    delay,
                    duration,
                    label: label.clone(),
                    count: *count,
                }
            })
            .collect();
    }
}

fn sample_data(
    field: &str,
    dataset: Option<&Dataset>,
    peers: &[PeerSample<'_>],
    numbers: &mut HashMap<TupleId, f64>,
) -> Result<(Vec<SampledPeer>, bool)> {
    let unsupported = || TransitionError::UnsupportedSequencingField {
        field: field.to_string(),
    };
    let dataset = dataset.ok_or_else(unsupported)?;
    let info = dataset.get_info(field).ok_or_else(unsupported)?;
    let numeric = info.kind == FieldKind::Number;

    let mut out = Vec::with_capacity(peers.len());
    for peer in peers {
        let mut tuples = if peer.scope.tuples().is_empty() {
            dataset.resolve(peer.scope.all_filters())
        } else {
            peer.scope.tuples().to_vec()
        };
        tuples.sort_unstable();

        let raw = if numeric {
            let mut values = Vec::with_capacity(tuples.len());
            for t in &tuples {
                if let Some(v) = dataset.value(*t, field).and_then(DataValue::as_number) {
                    numbers.insert(*t, v);
                    values.push(v);
                }
            }
            RawSample::Numbers(values)
        } else {
            let value = peer
                .scope
                .filter_value(field)
                .or_else(|| tuples.first().and_then(|t| dataset.value(*t, field)));
            RawSample::Category(value.map(|v| v.to_string()))
        };
        out.push(SampledPeer {
            filter_string: peer.scope.filter_string().to_string(),
            tuples,
            raw,
        });
    }
    Ok((out, numeric))
}

fn sample_visual(field: &str, peers: &[PeerSample<'_>]) -> Result<(Vec<SampledPeer>, bool)> {
    let values: Vec<Option<PeerValue>> = peers
        .iter()
        .map(|p| p.props.and_then(|props| visual_value(props, field)))
        .collect();
    if values.iter().all(Option::is_none) {
        return Err(TransitionError::UnsupportedSequencingField {
            field: field.to_string(),
        });
    }
    let numeric = values
        .iter()
        .flatten()
        .all(|v| matches!(v, PeerValue::Number(_)));

    let out = peers
        .iter()
        .zip(values)
        .map(|(peer, value)| {
            let value = match value {
                Some(v) if !numeric => Some(PeerValue::Category(v.label())),
                other => other,
            };
            SampledPeer {
                filter_string: peer.scope.filter_string().to_string(),
                tuples: peer.scope.tuples().to_vec(),
                raw: RawSample::Visual(value),
            }
        })
        .collect();
    Ok((out, numeric))
}
