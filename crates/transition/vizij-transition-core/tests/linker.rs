mod common;

use common::{bars, class, filter_scope, rect, region_dots, region_rects, template, tuple_scope};
use vizij_transition_core::{
    AnimationEdge, Config, Decoration, DecorationKind, IdLinks, LinkKey, LinkType, MatchingKind,
    ObjectLinker, ShapeKind, Side, Template, TimingGraph,
};

fn link(start: &Template, end: &Template) -> (Vec<AnimationEdge>, TimingGraph) {
    let mut graph = TimingGraph::new();
    let result = ObjectLinker::new(&Config::default()).link(start, end, &mut graph);
    (result.edges, graph)
}

/// it should link identical filter-string sets with an empty propList and no animation
#[test]
fn identical_filter_scopes_link_statically() {
    let start = template("s", vec![region_rects("bars")]);
    let end = template("e", vec![region_rects("bars")]);
    let (edges, _) = link(&start, &end);

    assert_eq!(edges.len(), 1);
    let l = edges[0].as_linked().expect("linked edge");
    assert_eq!(l.key, LinkKey::FilterString);
    assert!(l.prop_list.is_empty());
    assert!(!l.is_animating);
    assert!(!l.is_merge);
    assert_eq!(l.links.len(), 3);
}

/// it should link the three shared tuple groups and split the rest into exit and enter
#[test]
fn partial_tuple_overlap_splits_remainders() {
    let start = template("s", vec![bars("bars", "a", &[1, 2, 3, 4])]);
    let end = template("e", vec![bars("bars", "b", &[1, 2, 3, 9])]);
    let (edges, _) = link(&start, &end);

    let linked: Vec<_> = edges.iter().filter_map(AnimationEdge::as_linked).collect();
    assert_eq!(linked.len(), 1);
    let l = linked[0];
    assert_eq!(l.key, LinkKey::TupleString);
    assert_eq!(l.links.len(), 3);
    assert_eq!(l.id_exit, vec!["a3"]);
    assert_eq!(l.id_enter, vec!["b3"]);

    let exit: Vec<_> = edges
        .iter()
        .filter_map(|e| match e {
            AnimationEdge::Exit(x) => Some(x),
            _ => None,
        })
        .collect();
    let enter: Vec<_> = edges
        .iter()
        .filter_map(|e| match e {
            AnimationEdge::Enter(x) => Some(x),
            _ => None,
        })
        .collect();
    assert_eq!(exit.len(), 1);
    assert_eq!(exit[0].ids, vec!["a3"]);
    assert_eq!(exit[0].remainder_of.as_deref(), Some("bars"));
    assert_eq!(enter.len(), 1);
    assert_eq!(enter[0].ids, vec!["b3"]);
}

/// it should turn three single-tuple peers covered by one aggregate into a merge
#[test]
fn single_tuple_peers_merge_into_aggregate() {
    let start = template("s", vec![bars("points", "p", &[1, 2, 3])]);
    let end = template(
        "e",
        vec![class(
            "total",
            ShapeKind::Rectangle,
            vec![("sum", rect(0.0, 0.0, 30.0, 50.0), tuple_scope(&[1, 2, 3]))],
        )],
    );
    let (edges, _) = link(&start, &end);

    assert_eq!(edges.len(), 1);
    let l = edges[0].as_linked().expect("merge edge");
    assert!(l.is_merge);
    assert!(l.is_animating);
    assert_eq!(edges[0].counts(), [3, 1]);
    match &l.links {
        IdLinks::Merge { many, groups } => {
            assert_eq!(*many, Side::Start);
            assert_eq!(groups[0].many, vec!["p0", "p1", "p2"]);
        }
        other => panic!("expected merge links, got {other:?}"),
    }
}

/// it should exclude type-mismatched pairs from standard linking
#[test]
fn type_gate_blocks_links() {
    let start = template("s", vec![region_rects("marks")]);
    let end = template("e", vec![region_dots("marks")]);
    let (edges, _) = link(&start, &end);
    let kinds: Vec<LinkType> = edges.iter().map(AnimationEdge::link_type).collect();
    assert_eq!(kinds, vec![LinkType::Exit, LinkType::Enter]);
}

/// it should place every class in exactly one class-level edge
#[test]
fn no_double_assignment_and_completeness() {
    let start = template(
        "s",
        vec![
            bars("a", "a", &[1, 2, 3]),
            bars("b", "b", &[1, 2, 3]),
            bars("c", "c", &[7, 8]),
            region_rects("d"),
        ],
    );
    let end = template(
        "e",
        vec![
            bars("a", "a", &[1, 2, 3]),
            bars("x", "x", &[1, 2, 3]),
            region_rects("d"),
            bars("y", "y", &[40]),
        ],
    );
    let (edges, _) = link(&start, &end);
    let class_level: Vec<&AnimationEdge> = edges.iter().filter(|e| !e.is_remainder()).collect();

    for c in &start.classes {
        let hits = class_level
            .iter()
            .filter(|e| match e {
                AnimationEdge::Linked(l) => l.start == c.id,
                AnimationEdge::Exit(x) => x.class == c.id,
                AnimationEdge::Enter(_) => false,
            })
            .count();
        assert_eq!(hits, 1, "start class {} appears {hits} times", c.id);
    }
    for c in &end.classes {
        let hits = class_level
            .iter()
            .filter(|e| match e {
                AnimationEdge::Linked(l) => l.end == c.id,
                AnimationEdge::Enter(x) => x.class == c.id,
                AnimationEdge::Exit(_) => false,
            })
            .count();
        assert_eq!(hits, 1, "end class {} appears {hits} times", c.id);
    }

    // a<->a is the strongest pair and wins over b<->a.
    let a = edges
        .iter()
        .filter_map(AnimationEdge::as_linked)
        .find(|l| l.start == "a")
        .expect("a is linked");
    assert_eq!(a.end, "a");
}

/// it should produce the same partition with the max-weight strategy on a simple board
#[test]
fn strategies_agree_on_unambiguous_boards() {
    let start = template("s", vec![region_rects("bars"), bars("dots", "d", &[1, 2])]);
    let end = template("e", vec![region_rects("bars"), bars("dots", "d", &[1, 2])]);

    let greedy = link(&start, &end).0;
    let mut graph = TimingGraph::new();
    let cfg = Config {
        strategy: MatchingKind::MaxWeight,
        ..Config::default()
    };
    let optimal = ObjectLinker::new(&cfg).link(&start, &end, &mut graph).edges;

    let pairs = |edges: &[AnimationEdge]| {
        let mut v: Vec<(String, String)> = edges
            .iter()
            .filter_map(AnimationEdge::as_linked)
            .map(|l| (l.start.clone(), l.end.clone()))
            .collect();
        v.sort();
        v
    };
    assert_eq!(pairs(&greedy), pairs(&optimal));
    assert_eq!(pairs(&greedy).len(), 2);
}

/// it should list changed fields in propList using the numeric tolerance
#[test]
fn prop_list_respects_tolerance() {
    let start = template(
        "s",
        vec![class(
            "bars",
            ShapeKind::Rectangle,
            vec![("east", rect(0.0, 0.0, 10.0, 40.0), filter_scope("region", "east"))],
        )],
    );
    let end = template(
        "e",
        vec![class(
            "bars",
            ShapeKind::Rectangle,
            vec![("east", rect(0.5, 0.0, 10.0, 80.0), filter_scope("region", "east"))],
        )],
    );
    let (edges, _) = link(&start, &end);
    let l = edges[0].as_linked().expect("linked");
    assert_eq!(l.prop_list, vec!["height"]);
    assert!(l.is_animating);
}

/// it should pair decorations by owner edge, visual field, and kind
#[test]
fn decorations_link_through_owner_edges() {
    let axis = |id: &str, owner: &str, field: &str| Decoration {
        id: id.to_string(),
        owner: owner.to_string(),
        visual_field: field.to_string(),
        kind: DecorationKind::Axis,
        bounds: Default::default(),
        properties: serde_json::Value::Null,
    };
    let mut start = template("s", vec![region_rects("bars")]);
    start.decorations = vec![axis("y", "bars", "height"), axis("x", "bars", "x")];
    let mut end = template("e", vec![region_rects("columns")]);
    end.decorations = vec![axis("y2", "columns", "height"), axis("legend", "columns", "fill")];

    let mut graph = TimingGraph::new();
    let result = ObjectLinker::new(&Config::default()).link(&start, &end, &mut graph);
    assert!(result.edges[0].as_linked().is_some());

    let find = |key: &str| {
        result
            .decorations
            .iter()
            .find(|d| d.key == key)
            .unwrap_or_else(|| panic!("missing decoration {key}"))
    };
    let y = find("bars__height__axis");
    assert_eq!(y.link_type, LinkType::Linked);
    assert_eq!(y.start.as_deref(), Some("y"));
    assert_eq!(y.end.as_deref(), Some("y2"));
    assert_eq!(find("bars__x__axis").link_type, LinkType::Exit);
    assert_eq!(find("bars__fill__axis").link_type, LinkType::Enter);
}

/// it should keep decorations of an exiting and an entering class apart even when their ids match
#[test]
fn decorations_of_unlinked_owners_stay_apart() {
    let axis = |id: &str| Decoration {
        id: id.to_string(),
        owner: "marks".to_string(),
        visual_field: "height".to_string(),
        kind: DecorationKind::Axis,
        bounds: Default::default(),
        properties: serde_json::Value::Null,
    };
    let mut start = template("s", vec![region_rects("marks")]);
    start.decorations = vec![axis("y")];
    let mut end = template("e", vec![region_dots("marks")]);
    end.decorations = vec![axis("y2")];

    let mut graph = TimingGraph::new();
    let result = ObjectLinker::new(&Config::default()).link(&start, &end, &mut graph);
    assert!(result.edges.iter().all(|e| e.as_linked().is_none()));

    let summary: Vec<(&str, LinkType, Option<&str>, Option<&str>)> = result
        .decorations
        .iter()
        .map(|d| (d.key.as_str(), d.link_type, d.start.as_deref(), d.end.as_deref()))
        .collect();
    assert_eq!(
        summary,
        [
            ("start:marks__height__axis", LinkType::Exit, Some("y"), None),
            ("end:marks__height__axis", LinkType::Enter, None, Some("y2")),
        ]
    );
}

/// it should nest a child class's timing under its parent's same-type edge
#[test]
fn parent_map_wires_timings() {
    let mut start = template("s", vec![region_rects("panel"), bars("marks", "m", &[1, 2])]);
    start
        .parent_map
        .insert("marks".to_string(), "panel".to_string());
    let end = template("e", vec![]);

    let (edges, graph) = link(&start, &end);
    let timing_of = |id: &str| {
        edges
            .iter()
            .find(|e| e.owner_class() == id)
            .map(AnimationEdge::timing)
            .expect("edge exists")
    };
    assert_eq!(graph.parent(timing_of("marks")), Some(timing_of("panel")));
    assert_eq!(graph.parent(timing_of("panel")), None);
}
