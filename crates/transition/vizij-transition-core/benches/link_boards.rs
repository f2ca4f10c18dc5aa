use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vizij_transition_core::{
    Config, DataScope, DataValue, Filter, ObjectClass, ObjectLinker, ObjectProps, Paint,
    RectProps, ShapeKind, Template, TimingGraph, TupleId,
};

const CLASS_SAMPLES: &[usize] = &[8, 32, 128];
const PEERS_PER_CLASS: usize = 24;

fn bar(i: usize) -> ObjectProps {
    ObjectProps::Rectangle(RectProps {
        x: i as f64 * 12.0,
        y: 0.0,
        width: 10.0,
        height: 20.0 + i as f64,
        corner_radius: 0.0,
        paint: Paint::default(),
    })
}

/// `classes` bar classes; odd boards shift the tuple ids so only some peers overlap.
fn board(id: &str, classes: usize, shift: u32) -> Template {
    let classes = (0..classes)
        .map(|c| {
            let ids: Vec<String> = (0..PEERS_PER_CLASS).map(|p| format!("c{c}-p{p}")).collect();
            let scopes = ids
                .iter()
                .enumerate()
                .map(|(p, pid)| {
                    let filter = Filter::new("bucket", DataValue::Number(p as f64));
                    let tuple = TupleId((c * PEERS_PER_CLASS + p) as u32 + shift);
                    (pid.clone(), DataScope::new(vec![filter], vec![]).with_tuples([tuple]))
                })
                .collect();
            let properties = ids
                .iter()
                .enumerate()
                .map(|(p, pid)| (pid.clone(), bar(p)))
                .collect();
            ObjectClass {
                id: format!("class-{c}"),
                shape: ShapeKind::Rectangle,
                label: None,
                dataset: None,
                ids,
                properties,
                scopes,
            }
        })
        .collect();
    Template {
        id: id.to_string(),
        classes,
        ..Template::default()
    }
}

fn bench_link(c: &mut Criterion) {
    let mut group = c.benchmark_group("link_boards");
    let linker = ObjectLinker::new(&Config::default());
    for &classes in CLASS_SAMPLES {
        let start = board("start", classes, 0);
        let end = board("end", classes, 3);
        group.bench_with_input(BenchmarkId::new("classes", classes), &classes, |b, _| {
            b.iter(|| {
                let mut graph = TimingGraph::new();
                black_box(linker.link(black_box(&start), black_box(&end), &mut graph));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_link);
criterion_main!(benches);
