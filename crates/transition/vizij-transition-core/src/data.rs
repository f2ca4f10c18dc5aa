//! Read-only dataset model: tuples, field summaries, and filter resolution.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransitionError};
use crate::ids::TupleId;
use crate::scope::Filter;

/// A single cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl DataValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Bool(b) => write!(f, "{b}"),
            DataValue::Number(n) => write!(f, "{n}"),
            DataValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    pub id: TupleId,
    #[serde(default)]
    pub values: HashMap<String, DataValue>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Number,
    Text,
    Boolean,
}

/// Summary of one column, as reported by [`Dataset::get_info`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub kind: FieldKind,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Distinct values in first-appearance order.
    pub unique: Vec<DataValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDataset")]
pub struct Dataset {
    pub id: String,
    pub tuples: Vec<Tuple>,
    #[serde(skip)]
    index: HashMap<TupleId, usize>,
}

#[derive(Deserialize)]
struct RawDataset {
    id: String,
    #[serde(default)]
    tuples: Vec<Tuple>,
}

impl From<RawDataset> for Dataset {
    fn from(raw: RawDataset) -> Self {
        Dataset::new(raw.id, raw.tuples)
    }
}

impl Dataset {
    pub fn new(id: impl Into<String>, tuples: Vec<Tuple>) -> Self {
        let index = tuples
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();
        Self {
            id: id.into(),
            tuples,
            index,
        }
    }

    pub fn tuple(&self, id: TupleId) -> Option<&Tuple> {
        self.index.get(&id).and_then(|&i| self.tuples.get(i))
    }

    pub fn value(&self, id: TupleId, field: &str) -> Option<&DataValue> {
        self.tuple(id).and_then(|t| t.values.get(field))
    }

    /// Column summary. `None` when no tuple carries the field.
    pub fn get_info(&self, field: &str) -> Option<FieldInfo> {
        let mut unique: Vec<DataValue> = Vec::new();
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let (mut numbers, mut bools, mut total) = (0usize, 0usize, 0usize);

        for v in self.tuples.iter().filter_map(|t| t.values.get(field)) {
            total += 1;
            match v {
                DataValue::Number(n) => {
                    numbers += 1;
                    min = Some(min.map_or(*n, |m| m.min(*n)));
                    max = Some(max.map_or(*n, |m| m.max(*n)));
                }
                DataValue::Bool(_) => bools += 1,
                DataValue::Text(_) => {}
            }
            if !unique.contains(v) {
                unique.push(v.clone());
            }
        }
        if total == 0 {
            return None;
        }
        let kind = if numbers == total {
            FieldKind::Number
        } else if bools == total {
            FieldKind::Boolean
        } else {
            FieldKind::Text
        };
        Some(FieldInfo {
            kind,
            min,
            max,
            unique,
        })
    }

    /// Tuples matching every filter, in dataset order.
    pub fn resolve<'a, I>(&self, filters: I) -> Vec<TupleId>
    where
        I: Iterator<Item = &'a Filter> + Clone,
    {
        self.tuples
            .iter()
            .filter(|t| filters.clone().all(|f| f.matches(t)))
            .map(|t| t.id)
            .collect()
    }
}

/// Parse a dataset from its JSON form (`{ "id": ..., "tuples": [{ "id": 0, "values": {...} }] }`).
pub fn parse_dataset_json(s: &str) -> Result<Dataset> {
    serde_json::from_str(s).map_err(|e| TransitionError::TemplateParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(id: u32, region: &str, revenue: f64) -> Tuple {
        let mut values = HashMap::new();
        values.insert("region".to_string(), DataValue::Text(region.into()));
        values.insert("revenue".to_string(), DataValue::Number(revenue));
        Tuple {
            id: TupleId(id),
            values,
        }
    }

    #[test]
    fn field_info_reports_kind_range_and_unique_order() {
        let ds = Dataset::new(
            "sales",
            vec![tuple(0, "east", 5.0), tuple(1, "west", 2.0), tuple(2, "east", 9.0)],
        );
        let revenue = ds.get_info("revenue").unwrap();
        assert_eq!(revenue.kind, FieldKind::Number);
        assert_eq!(revenue.min, Some(2.0));
        assert_eq!(revenue.max, Some(9.0));

        let region = ds.get_info("region").unwrap();
        assert_eq!(region.kind, FieldKind::Text);
        assert_eq!(
            region.unique,
            vec![DataValue::Text("east".into()), DataValue::Text("west".into())]
        );
        assert!(ds.get_info("missing").is_none());
    }

    #[test]
    fn resolve_applies_all_filters() {
        let ds = Dataset::new(
            "sales",
            vec![tuple(0, "east", 5.0), tuple(1, "west", 2.0), tuple(2, "east", 9.0)],
        );
        let east = [Filter::new("region", DataValue::Text("east".into()))];
        assert_eq!(ds.resolve(east.iter()), vec![TupleId(0), TupleId(2)]);
        assert_eq!(ds.resolve(std::iter::empty()).len(), 3);
    }
}
