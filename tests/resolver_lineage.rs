mod common;

use std::sync::Arc;

use witness_store::{
    core::{reducer::reduce, store::DataState},
    engine::resolver::{serialize_annotation, ResolveError, Resolver, ResolverConfig},
    intent::Intent,
    records::{AnnotationRecord, WitnessRecord},
    types::{AnnotationType, DEFAULT_MAX_LINEAGE_DEPTH},
};

use common::{BASE_WITNESS, TEXT_ID, WORKING_WITNESS};

fn with_annotations(state: &Arc<DataState>, annotations: Vec<AnnotationRecord>) -> Arc<DataState> {
    reduce(
        state,
        &Intent::LoadedWitnessAnnotations {
            witness_id: BASE_WITNESS,
            annotations,
        },
    )
}

fn reload_witnesses(witnesses: Vec<WitnessRecord>) -> Intent {
    Intent::LoadedWitnesses {
        text: common::text(TEXT_ID),
        witnesses,
    }
}

#[test]
fn base_and_working_witness_follow_flags() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::default();

    let base = resolver.base_witness(&state, TEXT_ID).expect("base");
    assert_eq!(base.id, BASE_WITNESS);
    assert_eq!(base.source.id, 1);
    assert_eq!(base.text.id, TEXT_ID);

    let working = resolver.working_witness(&state, TEXT_ID).expect("working");
    assert_eq!(working.id, WORKING_WITNESS);
}

#[test]
fn highest_flagged_witness_id_wins_regardless_of_load_order() {
    let state = common::apply(
        &common::loaded_corpus(),
        [reload_witnesses(vec![
            common::witness(7, TEXT_ID, 1, true, true),
            common::witness(3, TEXT_ID, 1, true, true),
        ])],
    );
    let mut resolver = Resolver::default();

    assert_eq!(resolver.base_witness(&state, TEXT_ID).expect("base").id, 7);
    assert_eq!(resolver.working_witness(&state, TEXT_ID).expect("working").id, 7);
    let ids: Vec<_> = resolver
        .text_witnesses(&state, TEXT_ID)
        .into_iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, vec![3, 7]);
}

#[test]
fn base_witness_falls_back_to_lowest_id() {
    let state = common::apply(
        &common::loaded_corpus(),
        [reload_witnesses(vec![
            common::witness(8, TEXT_ID, 1, false, false),
            common::witness(4, TEXT_ID, 1, false, false),
        ])],
    );
    let mut resolver = Resolver::default();

    assert_eq!(resolver.base_witness(&state, TEXT_ID).expect("base").id, 4);
    assert!(resolver.working_witness(&state, TEXT_ID).is_none());
    assert!(resolver.base_witness(&state, 999).is_none());
}

#[test]
fn witness_without_source_is_not_resolved_or_cached() {
    let state = common::apply(
        &common::loaded_corpus(),
        [Intent::LoadedWitnesses {
            text: common::text(TEXT_ID),
            witnesses: vec![common::witness(9, TEXT_ID, 404, true, false)],
        }],
    );
    let mut resolver = Resolver::default();

    assert_eq!(
        resolver.try_witness(&state, 9),
        Err(ResolveError::SourceNotFound {
            witness_id: 9,
            source_id: 404
        })
    );
    assert!(resolver.witness(&state, 9).is_none());
    assert!(resolver.cache().is_empty());
}

#[test]
fn resolved_witness_is_shared_from_cache() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::default();

    let first = resolver.witness(&state, BASE_WITNESS).expect("first");
    let second = resolver.witness(&state, BASE_WITNESS).expect("second");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(resolver.cache().len(), 1);
}

#[test]
fn observing_witness_reload_drops_stale_content() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::new(ResolverConfig {
        check_witness_revision: false,
        ..ResolverConfig::default()
    });
    let before = resolver.witness(&state, BASE_WITNESS).expect("before");

    let mut updated = common::witness(BASE_WITNESS, TEXT_ID, 1, true, false);
    updated.content = "new content".to_string();
    let intent = reload_witnesses(vec![updated]);
    let state = reduce(&state, &intent);

    let cached = resolver.witness(&state, BASE_WITNESS).expect("cached");
    assert!(Arc::ptr_eq(&before, &cached), "cache is only dropped when told");

    resolver.observe(&intent);
    let after = resolver.witness(&state, BASE_WITNESS).expect("after");
    assert_eq!(after.content, "new content");
}

#[test]
fn revision_change_rebuilds_cached_witness() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::default();
    let before = resolver.witness(&state, BASE_WITNESS).expect("before");
    assert_eq!(before.revision, 1);

    let mut updated = common::witness(BASE_WITNESS, TEXT_ID, 1, true, false);
    updated.revision = 2;
    let state = reduce(&state, &reload_witnesses(vec![updated]));

    let after = resolver.witness(&state, BASE_WITNESS).expect("after");
    assert_eq!(after.revision, 2);
}

#[test]
fn annotation_on_unknown_witness_resolves_to_none() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::default();
    let record = common::annotation("orphan", 999, None);

    assert_eq!(
        resolver.try_annotation(&state, &record),
        Err(ResolveError::WitnessNotFound(999))
    );
    assert!(resolver.annotation(&state, &record).is_none());
}

#[test]
fn lookup_of_unloaded_annotation_names_it() {
    let state = with_annotations(&common::loaded_corpus(), vec![common::annotation("a", BASE_WITNESS, None)]);
    let mut resolver = Resolver::default();

    assert_eq!(
        resolver.try_annotation_by_unique_id(&state, BASE_WITNESS, &"b".to_string()),
        Err(ResolveError::AnnotationNotFound {
            witness_id: BASE_WITNESS,
            unique_id: "b".to_string(),
        })
    );
    assert!(resolver.annotation_by_unique_id(&state, BASE_WITNESS, &"b".to_string()).is_none());
    assert!(resolver
        .try_annotation_by_unique_id(&state, BASE_WITNESS, &"a".to_string())
        .is_ok());
}

#[test]
fn annotation_requires_creator_witness() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::default();

    let mut record = common::annotation("a", BASE_WITNESS, None);
    record.creator_witness_id = None;
    assert!(matches!(
        resolver.try_annotation(&state, &record),
        Err(ResolveError::MissingCreatorWitness { .. })
    ));

    record.creator_witness_id = Some(555);
    assert!(matches!(
        resolver.try_annotation(&state, &record),
        Err(ResolveError::CreatorWitnessUnresolved { witness_id: 555, .. })
    ));
}

#[test]
fn based_on_chain_follows_original_links() {
    let state = with_annotations(
        &common::loaded_corpus(),
        vec![
            common::annotation("root", BASE_WITNESS, None),
            common::annotation("mid", BASE_WITNESS, Some("root")),
            common::annotation("leaf", BASE_WITNESS, Some("mid")),
        ],
    );
    let mut resolver = Resolver::default();

    let leaf = resolver
        .annotation_by_unique_id(&state, BASE_WITNESS, &"leaf".to_string())
        .expect("leaf");
    assert_eq!(leaf.lineage_len(), 2);
    assert!(leaf.is_saved());

    let mid = leaf.based_on.as_ref().expect("mid");
    assert_eq!(mid.unique_id, "mid");
    assert_eq!(mid.based_on.as_ref().expect("root").unique_id, "root");

    let root = state
        .original_annotation_data(BASE_WITNESS, &"leaf".to_string())
        .expect("root record");
    assert_eq!(root.unique_id, "root");
    assert_eq!(root.original, None);
}

#[test]
fn dangling_original_leaves_based_on_empty() {
    let state = with_annotations(
        &common::loaded_corpus(),
        vec![common::annotation("child", BASE_WITNESS, Some("gone"))],
    );
    let mut resolver = Resolver::default();

    let child = resolver
        .annotation_by_unique_id(&state, BASE_WITNESS, &"child".to_string())
        .expect("child");
    assert!(child.based_on.is_none());
    assert!(state
        .original_annotation_data(BASE_WITNESS, &"child".to_string())
        .is_none());
}

#[test]
fn original_cycle_is_reported_instead_of_overflowing() {
    let state = with_annotations(
        &common::loaded_corpus(),
        vec![
            common::annotation("a", BASE_WITNESS, Some("b")),
            common::annotation("b", BASE_WITNESS, Some("a")),
        ],
    );
    let mut resolver = Resolver::new(ResolverConfig {
        max_lineage_depth: 8,
        ..ResolverConfig::default()
    });
    let record = state
        .annotation_data(BASE_WITNESS, &"a".to_string())
        .expect("record")
        .clone();

    assert!(matches!(
        resolver.try_annotation(&state, &record),
        Err(ResolveError::LineageTooDeep { max_depth: 8, .. })
    ));
    assert!(state
        .original_annotation_data(BASE_WITNESS, &"a".to_string())
        .is_none());
}

#[test]
fn user_created_root_marks_whole_lineage() {
    let root = common::annotation_from_json("root", BASE_WITNESS, Some(42));
    let state = with_annotations(
        &common::loaded_corpus(),
        vec![
            root,
            common::annotation("edit", BASE_WITNESS, Some("root")),
            common::annotation("default", BASE_WITNESS, None),
        ],
    );

    assert!(state.is_originally_user_created(BASE_WITNESS, &"edit".to_string()));
    assert!(!state.is_originally_user_created(BASE_WITNESS, &"default".to_string()));
    assert!(!state.is_originally_user_created(BASE_WITNESS, &"missing".to_string()));
}

#[test]
fn serialize_then_resolve_reproduces_annotation() {
    let state = with_annotations(
        &common::loaded_corpus(),
        vec![
            common::annotation("parent", BASE_WITNESS, None),
            common::annotation("child", BASE_WITNESS, Some("parent")),
        ],
    );
    let mut resolver = Resolver::default();
    let original = resolver
        .annotation_by_unique_id(&state, BASE_WITNESS, &"child".to_string())
        .expect("child");

    let record = serialize_annotation(&original).expect("record");
    let again = resolver.annotation(&state, &record).expect("resolved");

    assert_eq!(again.id, original.id);
    assert_eq!(again.witness.id, original.witness.id);
    assert_eq!(again.start, original.start);
    assert_eq!(again.length, original.length);
    assert_eq!(again.content, original.content);
    assert_eq!(again.annotation_type, original.annotation_type);
    assert_eq!(again.unique_id, original.unique_id);
    assert_eq!(
        again.based_on.as_ref().map(|a| a.unique_id.clone()),
        Some("parent".to_string())
    );
}

#[test]
fn serialize_without_creator_witness_is_refused() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::default();
    let mut annotation = resolver
        .annotation(&state, &common::annotation("x", BASE_WITNESS, None))
        .expect("annotation");
    annotation.creator_witness = None;

    assert!(serialize_annotation(&annotation).is_none());
}

#[test]
fn filter_by_type_and_creator() {
    let mut note = common::annotation("note", BASE_WITNESS, None);
    note.annotation_type = AnnotationType::Note;
    let mut other_creator = common::annotation("other", BASE_WITNESS, None);
    other_creator.creator_witness_id = Some(BASE_WITNESS);
    let state = with_annotations(
        &common::loaded_corpus(),
        vec![
            common::annotation("variant", BASE_WITNESS, None),
            note,
            other_creator,
        ],
    );

    assert_eq!(state.annotations_by_type_and_creator(BASE_WITNESS, None, None).len(), 3);

    let variants: Vec<_> = state
        .annotations_by_type_and_creator(BASE_WITNESS, Some(AnnotationType::Variant), None)
        .into_iter()
        .map(|a| a.unique_id.as_str())
        .collect();
    assert_eq!(variants, vec!["variant", "other"]);

    let from_working: Vec<_> = state
        .annotations_by_type_and_creator(
            BASE_WITNESS,
            Some(AnnotationType::Variant),
            Some(WORKING_WITNESS),
        )
        .into_iter()
        .map(|a| a.unique_id.as_str())
        .collect();
    assert_eq!(from_working, vec!["variant"]);
    assert!(state.annotations_by_type_and_creator(404, None, None).is_empty());
}

#[test]
fn sources_and_text_witnesses_resolve_in_order() {
    let state = common::loaded_corpus();
    let mut resolver = Resolver::default();

    let sources: Vec<_> = resolver.sources(&state).into_iter().map(|s| s.id).collect();
    assert_eq!(sources, vec![1, 2]);

    let witnesses: Vec<_> = resolver
        .text_witnesses(&state, TEXT_ID)
        .into_iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(witnesses, vec![BASE_WITNESS, WORKING_WITNESS]);
    assert_eq!(resolver.text(&state, TEXT_ID).expect("text").name, "text-10");
    assert!(resolver.text(&state, 11).is_none());
}

#[test]
fn lineage_depth_is_clamped_and_shared_with_root_lookup() {
    let chain: Vec<_> = (0..6)
        .map(|i| {
            let original = (i > 0).then(|| format!("n{}", i - 1));
            common::annotation(&format!("n{i}"), BASE_WITNESS, original.as_deref())
        })
        .collect();
    let state = with_annotations(&common::loaded_corpus(), chain);
    let tip = "n5".to_string();

    let shallow = Resolver::new(ResolverConfig {
        max_lineage_depth: 4,
        ..ResolverConfig::default()
    });
    assert!(shallow.original_annotation_data(&state, BASE_WITNESS, &tip).is_none());

    let mut exact = Resolver::new(ResolverConfig {
        max_lineage_depth: 5,
        ..ResolverConfig::default()
    });
    let root = exact
        .original_annotation_data(&state, BASE_WITNESS, &tip)
        .expect("root within five links");
    assert_eq!(root.unique_id, "n0");
    let record = state.annotation_data(BASE_WITNESS, &tip).expect("tip").clone();
    assert_eq!(exact.try_annotation(&state, &record).expect("resolved").lineage_len(), 5);

    let huge = Resolver::new(ResolverConfig {
        max_lineage_depth: usize::MAX,
        ..ResolverConfig::default()
    });
    assert_eq!(huge.config().max_lineage_depth, DEFAULT_MAX_LINEAGE_DEPTH);
}
