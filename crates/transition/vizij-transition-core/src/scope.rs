//! DataScope: local + inherited filters and the resolved tuple set.
//!
//! `filter_string` and `tuple_string` are canonical identities used as
//! matching keys by the comparator and linker. They are recomputed whenever
//! the filters or tuples change, including on deserialization.

use serde::{Deserialize, Serialize};

use crate::data::{DataValue, Dataset, Tuple};
use crate::ids::TupleId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: DataValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, value: DataValue) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    pub fn matches(&self, tuple: &Tuple) -> bool {
        tuple.values.get(&self.field) == Some(&self.value)
    }

    fn canonical(&self) -> String {
        format!("{}={}", self.field, self.value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScope", rename_all = "camelCase")]
pub struct DataScope {
    filters: Vec<Filter>,
    inherited: Vec<Filter>,
    tuples: Vec<TupleId>,
    filter_string: String,
    tuple_string: String,
}

#[derive(Deserialize)]
struct RawScope {
    #[serde(default)]
    filters: Vec<Filter>,
    #[serde(default)]
    inherited: Vec<Filter>,
    #[serde(default)]
    tuples: Vec<TupleId>,
}

impl From<RawScope> for DataScope {
    fn from(raw: RawScope) -> Self {
        DataScope::new(raw.filters, raw.inherited).with_tuples(raw.tuples)
    }
}

impl DataScope {
    pub fn new(filters: Vec<Filter>, inherited: Vec<Filter>) -> Self {
        let mut scope = Self {
            filters,
            inherited,
            ..Self::default()
        };
        scope.refresh_filter_string();
        scope
    }

    pub fn with_tuples(mut self, tuples: impl IntoIterator<Item = TupleId>) -> Self {
        self.set_tuples(tuples);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn inherited(&self) -> &[Filter] {
        &self.inherited
    }

    /// Sorted, de-duplicated tuple ids.
    pub fn tuples(&self) -> &[TupleId] {
        &self.tuples
    }

    pub fn filter_string(&self) -> &str {
        &self.filter_string
    }

    pub fn tuple_string(&self) -> &str {
        &self.tuple_string
    }

    /// Local filters first, then inherited ones.
    pub fn all_filters(&self) -> impl Iterator<Item = &Filter> + Clone {
        self.filters.iter().chain(self.inherited.iter())
    }

    /// Value a filter pins `field` to, if any.
    pub fn filter_value(&self, field: &str) -> Option<&DataValue> {
        self.all_filters()
            .find(|f| f.field == field)
            .map(|f| &f.value)
    }

    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
        self.refresh_filter_string();
    }

    pub fn set_inherited(&mut self, inherited: Vec<Filter>) {
        self.inherited = inherited;
        self.refresh_filter_string();
    }

    pub fn set_tuples(&mut self, tuples: impl IntoIterator<Item = TupleId>) {
        let mut tuples: Vec<TupleId> = tuples.into_iter().collect();
        tuples.sort_unstable();
        tuples.dedup();
        self.tuple_string = tuples
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.tuples = tuples;
    }

    /// Recompute the tuple set from the filters against `dataset`.
    /// Scopes without any filter keep their explicit tuples.
    pub fn resolve(&mut self, dataset: &Dataset) {
        if self.filters.is_empty() && self.inherited.is_empty() {
            return;
        }
        let tuples = dataset.resolve(self.all_filters());
        self.set_tuples(tuples);
    }

    /// True when every tuple of `self` also belongs to `other`.
    pub fn is_subset_of(&self, other: &[TupleId]) -> bool {
        !self.tuples.is_empty() && self.tuples.iter().all(|t| other.binary_search(t).is_ok())
    }

    fn refresh_filter_string(&mut self) {
        let mut parts: Vec<String> = self.all_filters().map(Filter::canonical).collect();
        parts.sort();
        parts.dedup();
        self.filter_string = parts.join("&");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(field: &str, v: &str) -> Filter {
        Filter::new(field, DataValue::Text(v.into()))
    }

    #[test]
    fn filter_string_is_order_independent() {
        let a = DataScope::new(vec![text("region", "east")], vec![text("year", "2020")]);
        let b = DataScope::new(vec![text("year", "2020"), text("region", "east")], vec![]);
        assert_eq!(a.filter_string(), b.filter_string());
        assert_eq!(a.filter_string(), "region=east&year=2020");
    }

    #[test]
    fn set_filters_recomputes_identity() {
        let mut scope = DataScope::new(vec![text("region", "east")], vec![]);
        scope.set_filters(vec![text("region", "west")]);
        assert_eq!(scope.filter_string(), "region=west");
    }

    #[test]
    fn tuple_string_sorts_and_dedups() {
        let scope = DataScope::default().with_tuples([TupleId(3), TupleId(1), TupleId(3)]);
        assert_eq!(scope.tuple_string(), "1,3");
        assert!(scope.is_subset_of(&[TupleId(1), TupleId(2), TupleId(3)]));
        assert!(!DataScope::default().is_subset_of(&[TupleId(1)]));
    }

    #[test]
    fn deserialized_scope_carries_canonical_strings() {
        let scope: DataScope = serde_json::from_str(
            r#"{ "filters": [{ "field": "region", "value": "east" }], "tuples": [2, 0] }"#,
        )
        .unwrap();
        assert_eq!(scope.filter_string(), "region=east");
        assert_eq!(scope.tuple_string(), "0,2");
    }

    #[test]
    fn resolve_without_filters_keeps_tuples() {
        let ds = crate::data::parse_dataset_json(
            r#"{ "id": "d", "tuples": [{ "id": 0, "values": { "region": "east" } }, { "id": 1, "values": { "region": "west" } }] }"#,
        )
        .unwrap();
        let mut bound = DataScope::default().with_tuples([TupleId(1)]);
        bound.resolve(&ds);
        assert_eq!(bound.tuples(), &[TupleId(1)]);

        let mut east = DataScope::new(vec![text("region", "east")], vec![]);
        east.resolve(&ds);
        assert_eq!(east.tuples(), &[TupleId(0)]);
    }
}
