mod common;

use common::{bars, class, ellipse, filter_scope, rect, tuple_scope};
use vizij_transition_core::{
    CompareScore, CompareWeights, ObjectClass, ObjectComparator, ShapeKind, Side,
};

fn comparator() -> ObjectComparator {
    ObjectComparator::new(CompareWeights::default())
}

/// it should zero the type axis for mismatched shapes and report it as a hard gate
#[test]
fn type_mismatch_scores_zero() {
    let s = class(
        "marks",
        ShapeKind::Rectangle,
        vec![("a", rect(0.0, 0.0, 1.0, 1.0), filter_scope("region", "east"))],
    );
    let e = class(
        "marks",
        ShapeKind::Ellipse,
        vec![("a", ellipse(0.0, 0.0, 1.0), filter_scope("region", "east"))],
    );
    let cmp = comparator().compare(&s, &e);
    assert_eq!(cmp.score.type_match, 0.0);
    // The other axes still describe the pair.
    assert_eq!(cmp.score.data_scope, 1.0);
    assert_eq!(cmp.score.class_id, 1.0);
}

/// it should compute count, scope, tuple, and identity axes as overlap fractions
#[test]
fn axes_follow_overlap_fractions() {
    let s = bars("bars", "a", &[1, 2, 3, 4]);
    let e = bars("bars", "b", &[1, 2, 3, 9]);
    let score = comparator().compare(&s, &e).score;
    assert_eq!(score.type_match, 1.0);
    assert_eq!(score.count, 1.0);
    assert_eq!(score.data_scope, 0.0);
    assert_eq!(score.data_tuples, 0.75);
    assert_eq!(score.class_id, 1.0);
    assert_eq!(score.comp_id, 0.0);
    assert_eq!(comparator().compare_sum(&score), 3.0 + 1.5 + 1.5);

    let short = bars("other", "a", &[1, 2]);
    let score = comparator().compare(&s, &short).score;
    assert_eq!(score.count, 0.5);
    assert_eq!(score.data_tuples, 0.5);
    assert_eq!(score.comp_id, 0.5);
}

/// it should never decrease COMPARE_SUM when one axis increases
#[test]
fn compare_sum_is_monotonic() {
    let w = CompareWeights::default();
    let base = CompareScore {
        type_match: 1.0,
        count: 0.4,
        data_scope: 0.2,
        data_tuples: 0.6,
        class_id: 0.0,
        comp_id: 0.3,
    };
    let bumps: [fn(&mut CompareScore); 5] = [
        |s| s.count += 0.1,
        |s| s.data_scope += 0.1,
        |s| s.data_tuples += 0.1,
        |s| s.class_id = 1.0,
        |s| s.comp_id += 0.1,
    ];
    for bump in bumps {
        let mut up = base;
        bump(&mut up);
        assert!(up.sum(&w) >= base.sum(&w));
    }
}

/// it should score malformed classes as zero on every axis
#[test]
fn malformed_classes_score_zero() {
    let good = bars("bars", "a", &[1, 2]);
    let empty = ObjectClass {
        ids: vec![],
        ..good.clone()
    };
    let cmp = comparator().compare(&good, &empty);
    assert_eq!(cmp.score, CompareScore::default());
    assert_eq!(cmp.combine.combine_matches, 0);
}

/// it should detect complete N-to-1 covers on the side with fewer tuples per peer
#[test]
fn combine_map_counts_complete_covers() {
    let s = bars("points", "p", &[1, 2, 3]);
    let e = class(
        "total",
        ShapeKind::Rectangle,
        vec![("sum", rect(0.0, 0.0, 30.0, 50.0), tuple_scope(&[1, 2, 3]))],
    );
    let cmp = comparator().compare(&s, &e);
    assert_eq!(cmp.combine.many, Some(Side::Start));
    assert_eq!(cmp.combine.combine_matches, 1);
    assert_eq!(cmp.combine.groups.len(), 1);
    assert_eq!(cmp.combine.groups[0].one, "sum");
    assert_eq!(cmp.combine.groups[0].many, vec!["p0", "p1", "p2"]);
    assert!(cmp.combine.groups[0].complete);

    // Partial cover: tuple 4 is never reached.
    let partial = class(
        "total",
        ShapeKind::Rectangle,
        vec![("sum", rect(0.0, 0.0, 30.0, 50.0), tuple_scope(&[1, 2, 4]))],
    );
    let cmp = comparator().compare(&bars("points", "p", &[1, 2]), &partial);
    assert_eq!(cmp.combine.combine_matches, 0);
    assert!(!cmp.combine.groups[0].complete);
}

/// it should not combine when both sides carry the same tuples per peer
#[test]
fn equal_averages_never_combine() {
    let cmp = comparator().compare(&bars("a", "x", &[1, 2]), &bars("b", "y", &[1, 2]));
    assert_eq!(cmp.combine.many, None);
    assert!(cmp.combine.groups.is_empty());
}
