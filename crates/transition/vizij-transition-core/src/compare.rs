//! ObjectComparator: pairwise compatibility between a start and an end class.
//!
//! Scores are pure and deterministic. Malformed classes (no ids, properties,
//! or scopes) score zero on every axis, including the type gate, so they are
//! never matched.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::CompareWeights;
use crate::ids::{ObjectId, Side, TupleId};
use crate::scope::DataScope;
use crate::template::ObjectClass;

/// Per-axis compatibility, each in [0,1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareScore {
    /// 1 iff both classes share a shape kind.
    #[serde(rename = "type")]
    pub type_match: f64,
    pub count: f64,
    pub data_scope: f64,
    pub data_tuples: f64,
    /// 1 iff both classes carry the same class id.
    pub class_id: f64,
    /// Fraction of peer ids present on both sides.
    pub comp_id: f64,
}

impl CompareScore {
    /// `COMPARE_SUM`, the ranking key of the linker.
    pub fn sum(&self, w: &CompareWeights) -> f64 {
        w.count * self.count
            + w.data_scope * self.data_scope
            + w.data_tuples * self.data_tuples
            + w.class_id * self.class_id
            + w.comp_id * self.comp_id
    }
}

/// One "one"-side group and the "many"-side groups it fully contains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombineGroup {
    pub one: ObjectId,
    pub many: Vec<ObjectId>,
    /// The union of `many` equals the tuple set of `one`.
    pub complete: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineMap {
    /// Side aggregated into the other one (lower average tuples per peer).
    pub many: Option<Side>,
    pub groups: Vec<CombineGroup>,
    pub combine_matches: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comparison {
    pub score: CompareScore,
    pub combine: CombineMap,
}

/// Peer view of a class: ids in order with their scopes. Ids without a scope are dropped.
fn scoped_peers(class: &ObjectClass) -> Vec<(&ObjectId, &DataScope)> {
    class
        .ids
        .iter()
        .filter_map(|id| class.scope(id).map(|s| (id, s)))
        .collect()
}

fn key_overlap<'a>(
    a: impl Iterator<Item = &'a str>,
    b: impl Iterator<Item = &'a str>,
    max_len: usize,
) -> f64 {
    if max_len == 0 {
        return 0.0;
    }
    let a: BTreeSet<&str> = a.filter(|s| !s.is_empty()).collect();
    let b: BTreeSet<&str> = b.filter(|s| !s.is_empty()).collect();
    a.intersection(&b).count() as f64 / max_len as f64
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectComparator {
    pub weights: CompareWeights,
}

impl ObjectComparator {
    pub fn new(weights: CompareWeights) -> Self {
        Self { weights }
    }

    pub fn compare_sum(&self, score: &CompareScore) -> f64 {
        score.sum(&self.weights)
    }

    pub fn compare(&self, start: &ObjectClass, end: &ObjectClass) -> Comparison {
        if start.is_malformed() || end.is_malformed() {
            return Comparison::default();
        }
        let sp = scoped_peers(start);
        let ep = scoped_peers(end);
        let (ls, le) = (start.ids.len(), end.ids.len());
        let max_len = ls.max(le);

        let score = CompareScore {
            type_match: if start.shape == end.shape { 1.0 } else { 0.0 },
            count: 1.0 - (ls as f64 - le as f64).abs() / max_len as f64,
            data_scope: key_overlap(
                sp.iter().map(|(_, s)| s.filter_string()),
                ep.iter().map(|(_, s)| s.filter_string()),
                max_len,
            ),
            data_tuples: key_overlap(
                sp.iter().map(|(_, s)| s.tuple_string()),
                ep.iter().map(|(_, s)| s.tuple_string()),
                max_len,
            ),
            class_id: if start.id == end.id { 1.0 } else { 0.0 },
            comp_id: key_overlap(
                start.ids.iter().map(String::as_str),
                end.ids.iter().map(String::as_str),
                max_len,
            ),
        };

        Comparison {
            score,
            combine: combine_map(&sp, &ep),
        }
    }
}

fn average_tuples(peers: &[(&ObjectId, &DataScope)]) -> f64 {
    if peers.is_empty() {
        return 0.0;
    }
    let total: usize = peers.iter().map(|(_, s)| s.tuples().len()).sum();
    total as f64 / peers.len() as f64
}

/// Detect N-to-1 combines. The side with the lower average tuples per peer
/// is the aggregation target ("many"); each "one"-side group collects the
/// "many" groups whose tuples it fully contains. Equal averages never combine.
fn combine_map(start: &[(&ObjectId, &DataScope)], end: &[(&ObjectId, &DataScope)]) -> CombineMap {
    let (avg_s, avg_e) = (average_tuples(start), average_tuples(end));
    if avg_s == 0.0 || avg_e == 0.0 || avg_s == avg_e {
        return CombineMap::default();
    }
    let (many_side, many, one) = if avg_s < avg_e {
        (Side::Start, start, end)
    } else {
        (Side::End, end, start)
    };

    let mut groups = Vec::new();
    let mut combine_matches = 0;
    for (one_id, one_scope) in one {
        let one_tuples = one_scope.tuples();
        if one_tuples.is_empty() {
            continue;
        }
        let members: Vec<&(&ObjectId, &DataScope)> = many
            .iter()
            .filter(|(_, s)| s.is_subset_of(one_tuples))
            .collect();
        if members.is_empty() {
            continue;
        }
        let covered: BTreeSet<TupleId> = members
            .iter()
            .flat_map(|(_, s)| s.tuples().iter().copied())
            .collect();
        let complete = covered.len() == one_tuples.len();
        if complete {
            combine_matches += 1;
        }
        groups.push(CombineGroup {
            one: (*one_id).clone(),
            many: members.iter().map(|(id, _)| (*id).clone()).collect(),
            complete,
        });
    }

    CombineMap {
        many: Some(many_side),
        groups,
        combine_matches,
    }
}
