use anyhow::{Context, Result};
use vizij_test_fixtures::{boards as board_fixtures, datasets, transitions};
use vizij_transition_core::{
    parse_dataset_json, parse_template_json, AnimationEdge, AnimationGenerator, Config, Dataset, IdLinks,
    LinkKey, LinkType, MatchingKind, ObjectLinker, RenderCommand, SequenceRequest, Side,
    StaticRegistry, Template, TimingGraph,
};

fn boards(name: &str) -> Result<(Template, Template)> {
    let (start, end) = transitions::boards_json(name)?;
    let start = parse_template_json(&start).with_context(|| format!("{name}: start board"))?;
    let end = parse_template_json(&end).with_context(|| format!("{name}: end board"))?;
    Ok((start, end))
}

fn load(name: &str) -> Result<AnimationGenerator<StaticRegistry>> {
    let (start, end) = boards(name)?;
    let mut reg = StaticRegistry::new()
        .with_template(&start, Side::Start)
        .with_template(&end, Side::End);
    for json in transitions::datasets_json(name)? {
        reg = reg.with_dataset(parse_dataset_json(&json)?);
    }
    Ok(AnimationGenerator::new(Config::default(), start, end, reg))
}

/// it should load every fixture transition without diagnostics
#[test]
fn all_transitions_load_cleanly() -> Result<()> {
    let mut names = transitions::keys();
    names.sort();
    assert!(!names.is_empty());
    for name in names {
        let gen = load(&name)?;
        assert!(
            gen.diagnostics().is_empty(),
            "{name}: {:?}",
            gen.diagnostics()
        );
        assert!(!gen.outputs().commands.is_empty(), "{name}: no commands");
    }
    Ok(())
}

/// it should merge per-year bars into their region totals
#[test]
fn year_to_region_merges() -> Result<()> {
    let mut gen = load("year-to-region")?;
    assert_eq!(gen.edges().len(), 1);
    let edge = &gen.edges()[0];
    assert_eq!(edge.counts(), [6, 3]);
    let l = edge.as_linked().context("merge edge")?;
    assert!(l.is_merge);
    match &l.links {
        IdLinks::Merge { many, groups } => {
            assert_eq!(*many, Side::Start);
            assert_eq!(groups.len(), 3);
            assert!(groups.iter().all(|g| g.complete && g.many.len() == 2));
        }
        other => panic!("expected merge links, got {other:?}"),
    }

    let axis = gen
        .find_decoration("y-axis", LinkType::Linked)
        .context("linked axis")?;
    assert_eq!(axis.key, "bars__height__axis");

    gen.create_sequencing("bars", LinkType::Linked, SequenceRequest::stagger("revenue"))?;
    let view = gen
        .timing_for_object("bars", LinkType::Linked)
        .context("timing")?;
    assert_eq!(view.peer_groups.len(), 6);
    Ok(())
}

/// it should keep bars and dots apart until they are linked by hand
#[test]
fn region_to_dots_needs_a_manual_link() -> Result<()> {
    let mut gen = load("region-to-dots")?;
    let kinds: Vec<LinkType> = gen.edges().iter().map(AnimationEdge::link_type).collect();
    assert_eq!(kinds, [LinkType::Exit, LinkType::Enter]);

    gen.create_link("bars-region", "dots", None, None)?;
    let l = gen
        .find_edge("dots", LinkType::Linked)
        .and_then(AnimationEdge::as_linked)
        .context("manual link")?;
    assert_eq!(l.links.len(), 3);
    assert!(l.id_exit.is_empty() && l.id_enter.is_empty());
    assert!(matches!(
        gen.outputs().commands.first(),
        Some(RenderCommand::SpawnMorph { .. })
    ));
    Ok(())
}

/// it should link a board to itself statically
#[test]
fn region_identity_is_static() -> Result<()> {
    let gen = load("region-identity")?;
    let l = gen.edges()[0].as_linked().context("linked edge")?;
    assert_eq!(l.key, LinkKey::TupleString);
    assert!(l.prop_list.is_empty());
    assert!(!l.is_animating);
    assert!(gen
        .outputs()
        .commands
        .iter()
        .any(|c| matches!(c, RenderCommand::StaticProperties { .. })));
    Ok(())
}

/// it should give the same class pairs under greedy and max-weight matching
#[test]
fn strategies_agree_on_fixtures() -> Result<()> {
    for name in transitions::keys() {
        let (start, end) = boards(&name)?;
        let pairs = |kind: MatchingKind| {
            let cfg = Config {
                strategy: kind,
                ..Config::default()
            };
            let mut graph = TimingGraph::new();
            let mut out: Vec<(LinkType, String)> = ObjectLinker::new(&cfg)
                .link(&start, &end, &mut graph)
                .edges
                .iter()
                .map(|e| (e.link_type(), e.owner_class().clone()))
                .collect();
            out.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.as_str().cmp(b.0.as_str())));
            out
        };
        assert_eq!(
            pairs(MatchingKind::Greedy),
            pairs(MatchingKind::MaxWeight),
            "{name}"
        );
    }
    Ok(())
}

/// it should deserialize every board and dataset fixture directly
#[test]
fn boards_and_datasets_deserialize() -> Result<()> {
    for name in board_fixtures::keys() {
        let board: Template = board_fixtures::load(&name)?;
        assert!(!board.classes.is_empty(), "{name}: no classes");
        assert!(board.classes.iter().all(|c| !c.is_malformed()), "{name}");
    }
    for name in datasets::keys() {
        let ds: Dataset = datasets::load(&name)?;
        assert!(!ds.tuples.is_empty(), "{name}: no tuples");
        assert!(ds.get_info("revenue").is_some(), "{name}: revenue field");
    }
    Ok(())
}
