#![allow(dead_code)]
//! Small builders shared by the integration tests.

use vizij_transition_core::{
    parse_dataset_json, DataScope, DataValue, Dataset, EllipseProps, Filter, ObjectClass,
    ObjectProps, Paint, RectProps, ShapeKind, Side, StaticRegistry, Template, TupleId,
};

pub fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> ObjectProps {
    ObjectProps::Rectangle(RectProps {
        x,
        y,
        width,
        height,
        corner_radius: 0.0,
        paint: Paint::default(),
    })
}

pub fn ellipse(cx: f64, cy: f64, r: f64) -> ObjectProps {
    ObjectProps::Ellipse(EllipseProps {
        cx,
        cy,
        rx: r,
        ry: r,
        paint: Paint::default(),
    })
}

pub fn text_filter(field: &str, value: &str) -> Filter {
    Filter::new(field, DataValue::Text(value.to_string()))
}

/// Scope pinned to `field = value` with no resolved tuples.
pub fn filter_scope(field: &str, value: &str) -> DataScope {
    DataScope::new(vec![text_filter(field, value)], vec![])
}

/// Scope bound to explicit tuples and no filters.
pub fn tuple_scope(tuples: &[u32]) -> DataScope {
    DataScope::default().with_tuples(tuples.iter().map(|t| TupleId(*t)))
}

pub fn class(id: &str, shape: ShapeKind, peers: Vec<(&str, ObjectProps, DataScope)>) -> ObjectClass {
    ObjectClass {
        id: id.to_string(),
        shape,
        label: None,
        dataset: None,
        ids: peers.iter().map(|(pid, _, _)| pid.to_string()).collect(),
        properties: peers
            .iter()
            .map(|(pid, props, _)| (pid.to_string(), props.clone()))
            .collect(),
        scopes: peers
            .into_iter()
            .map(|(pid, _, scope)| (pid.to_string(), scope))
            .collect(),
    }
}

/// `n` rectangles `{prefix}{i}` with one tuple each, tuple ids from `tuples`.
pub fn bars(id: &str, prefix: &str, tuples: &[u32]) -> ObjectClass {
    let peers = tuples
        .iter()
        .enumerate()
        .map(|(i, t)| {
            (
                format!("{prefix}{i}"),
                rect(i as f64 * 20.0, 0.0, 10.0, 50.0),
                tuple_scope(&[*t]),
            )
        })
        .collect::<Vec<_>>();
    class(
        id,
        ShapeKind::Rectangle,
        peers.iter().map(|(p, r, s)| (p.as_str(), r.clone(), s.clone())).collect(),
    )
}

pub fn template(id: &str, classes: Vec<ObjectClass>) -> Template {
    Template {
        id: id.to_string(),
        classes,
        ..Template::default()
    }
}

pub fn registry(start: &Template, end: &Template) -> StaticRegistry {
    StaticRegistry::new()
        .with_template(start, Side::Start)
        .with_template(end, Side::End)
}

/// Five regions with distinct revenue values 10..50.
pub fn revenue_dataset() -> Dataset {
    parse_dataset_json(
        r#"{
            "id": "revenue",
            "tuples": [
                { "id": 0, "values": { "region": "east",    "revenue": 30, "target": true } },
                { "id": 1, "values": { "region": "west",    "revenue": 10, "target": false } },
                { "id": 2, "values": { "region": "north",   "revenue": 50, "target": true } },
                { "id": 3, "values": { "region": "south",   "revenue": 20, "target": false } },
                { "id": 4, "values": { "region": "central", "revenue": 40, "target": true } }
            ]
        }"#,
    )
    .expect("dataset parses")
}

/// Three rectangles (east, west, north) bound by a region filter, no dataset.
pub fn region_rects(id: &str) -> ObjectClass {
    class(
        id,
        ShapeKind::Rectangle,
        vec![
            ("east", rect(0.0, 0.0, 10.0, 40.0), filter_scope("region", "east")),
            ("west", rect(20.0, 0.0, 10.0, 30.0), filter_scope("region", "west")),
            ("north", rect(40.0, 0.0, 10.0, 20.0), filter_scope("region", "north")),
        ],
    )
}

/// Ellipse counterpart of [`region_rects`].
pub fn region_dots(id: &str) -> ObjectClass {
    class(
        id,
        ShapeKind::Ellipse,
        vec![
            ("east", ellipse(5.0, 20.0, 5.0), filter_scope("region", "east")),
            ("west", ellipse(25.0, 15.0, 5.0), filter_scope("region", "west")),
            ("north", ellipse(45.0, 10.0, 5.0), filter_scope("region", "north")),
        ],
    )
}

pub const REGIONS: [&str; 5] = ["east", "west", "north", "south", "central"];

/// One rectangle per region, bound to the revenue dataset by filter.
pub fn region_bars(id: &str) -> ObjectClass {
    let mut c = class(
        id,
        ShapeKind::Rectangle,
        REGIONS
            .iter()
            .enumerate()
            .map(|(i, r)| {
                (
                    *r,
                    rect(i as f64 * 30.0, 0.0, 20.0, 10.0 + i as f64 * 15.0),
                    filter_scope("region", r),
                )
            })
            .collect(),
    );
    c.dataset = Some("revenue".to_string());
    c
}
