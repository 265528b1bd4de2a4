use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use witness_store::{
    core::{reducer::reduce, store::DataState},
    engine::resolver::Resolver,
    intent::Intent,
    records::{AnnotationRecord, SourceRecord, TextRecord, WitnessRecord},
    types::{AnnotationType, WitnessId},
};

const TEXT_ID: u64 = 1;
const BASE: WitnessId = 1;
const WORKING: WitnessId = 2;

fn witness(id: WitnessId, is_base: bool, is_working: bool) -> WitnessRecord {
    WitnessRecord {
        id,
        text_id: TEXT_ID,
        source_id: id,
        content: "lorem ipsum dolor sit amet".to_string(),
        is_base,
        is_working,
        revision: 1,
        properties: None,
    }
}

fn annotation(idx: usize, original: Option<usize>) -> AnnotationRecord {
    AnnotationRecord {
        id: Some(idx as u64),
        unique_id: format!("a{idx}"),
        witness_id: BASE,
        start: idx % 20,
        length: 3,
        content: "var".to_string(),
        annotation_type: AnnotationType::Variant,
        creator_witness_id: Some(WORKING),
        creator_user_id: None,
        original: original.map(|o| format!("a{o}")),
        is_saved: true,
        is_deleted: false,
    }
}

fn corpus(annotations: usize, chain: usize) -> Arc<DataState> {
    let intents = [
        Intent::LoadedTexts {
            texts: vec![TextRecord {
                id: TEXT_ID,
                name: "bench".to_string(),
            }],
        },
        Intent::LoadedSources {
            sources: vec![
                SourceRecord {
                    id: BASE,
                    name: "base".to_string(),
                    is_base: true,
                    is_working: false,
                },
                SourceRecord {
                    id: WORKING,
                    name: "working".to_string(),
                    is_base: false,
                    is_working: true,
                },
            ],
        },
        Intent::LoadedWitnesses {
            text: TextRecord {
                id: TEXT_ID,
                name: "bench".to_string(),
            },
            witnesses: vec![witness(BASE, true, false), witness(WORKING, false, true)],
        },
        Intent::LoadedWitnessAnnotations {
            witness_id: BASE,
            annotations: (0..annotations)
                .map(|i| annotation(i, (i % chain != 0).then(|| i - 1)))
                .collect(),
        },
    ];

    intents
        .iter()
        .fold(Arc::new(DataState::new()), |state, intent| reduce(&state, intent))
}

fn bench_operation_log(c: &mut Criterion) {
    c.bench_function("oplog_apply_remove_20k", |b| {
        b.iter(|| {
            let mut state = Arc::new(DataState::new());
            for i in 0..10_000u64 {
                state = reduce(
                    &state,
                    &Intent::AppliedAnnotation {
                        unique_id: format!("u{i}"),
                        witness_id: i % 8,
                    },
                );
            }
            for i in 0..10_000u64 {
                state = reduce(
                    &state,
                    &Intent::RemovedDefaultAnnotation {
                        unique_id: format!("u{i}"),
                        witness_id: i % 8,
                    },
                );
            }
            state
        });
    });
}

fn bench_annotation_upserts(c: &mut Criterion) {
    let state = corpus(0, 1);
    let mut resolver = Resolver::default();
    let template = resolver
        .annotation(&state, &annotation(0, None))
        .expect("template annotation");

    c.bench_function("annotation_update_5k", |b| {
        b.iter(|| {
            let mut state = Arc::clone(&state);
            for i in 0..5_000usize {
                let mut edit = template.clone();
                edit.unique_id = format!("e{}", i % 500);
                edit.start = i;
                state = reduce(&state, &Intent::UpdatedAnnotation { annotation: edit });
            }
            state
        });
    });
}

fn bench_resolve_annotations(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_witness_annotations");

    for chain in [1usize, 8, 64] {
        let state = corpus(2_000, chain);
        group.bench_with_input(BenchmarkId::from_parameter(chain), &chain, |b, _| {
            let mut resolver = Resolver::default();
            b.iter(|| resolver.witness_annotations(&state, BASE).len());
        });
    }

    group.finish();
}

fn bench_base_witness(c: &mut Criterion) {
    let state = corpus(0, 1);
    c.bench_function("base_witness_cached", |b| {
        let mut resolver = Resolver::default();
        b.iter(|| resolver.base_witness(&state, TEXT_ID).map(|w| w.id));
    });
}

criterion_group!(
    benches,
    bench_operation_log,
    bench_annotation_upserts,
    bench_resolve_annotations,
    bench_base_witness
);
criterion_main!(benches);
