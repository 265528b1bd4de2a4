#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;

use witness_store::{
    core::{reducer::reduce, store::DataState},
    intent::Intent,
    records::{AnnotationRecord, SourceRecord, TextRecord, WitnessRecord},
    types::{AnnotationType, WitnessId},
};

pub const TEXT_ID: u64 = 10;
pub const BASE_WITNESS: WitnessId = 1;
pub const WORKING_WITNESS: WitnessId = 2;

pub fn text(id: u64) -> TextRecord {
    TextRecord {
        id,
        name: format!("text-{id}"),
    }
}

pub fn source(id: u64, is_base: bool, is_working: bool) -> SourceRecord {
    SourceRecord {
        id,
        name: format!("source-{id}"),
        is_base,
        is_working,
    }
}

pub fn witness(id: WitnessId, text_id: u64, source_id: u64, is_base: bool, is_working: bool) -> WitnessRecord {
    WitnessRecord {
        id,
        text_id,
        source_id,
        content: format!("content of witness {id}"),
        is_base,
        is_working,
        revision: 1,
        properties: None,
    }
}

pub fn annotation(unique_id: &str, witness_id: WitnessId, original: Option<&str>) -> AnnotationRecord {
    AnnotationRecord {
        id: Some(100),
        unique_id: unique_id.to_string(),
        witness_id,
        start: 3,
        length: 2,
        content: format!("{unique_id}-content"),
        annotation_type: AnnotationType::Variant,
        creator_witness_id: Some(WORKING_WITNESS),
        creator_user_id: None,
        original: original.map(str::to_string),
        is_saved: true,
        is_deleted: false,
    }
}

/// Annotation row in the network's JSON shape.
pub fn annotation_from_json(unique_id: &str, witness_id: WitnessId, creator_user: Option<u64>) -> AnnotationRecord {
    serde_json::from_value(json!({
        "id": null,
        "unique_id": unique_id,
        "witness": witness_id,
        "start": 0,
        "length": 4,
        "content": "gate",
        "type": "V",
        "creator_witness": WORKING_WITNESS,
        "creator_user": creator_user,
        "original": null,
    }))
    .expect("annotation json")
}

pub fn apply(state: &Arc<DataState>, intents: impl IntoIterator<Item = Intent>) -> Arc<DataState> {
    let mut state = Arc::clone(state);
    for intent in intents {
        state = reduce(&state, &intent);
    }
    state
}

/// Text 10 with a base witness (1) and a working witness (2), each on its own source.
pub fn loaded_corpus() -> Arc<DataState> {
    apply(
        &Arc::new(DataState::new()),
        [
            Intent::LoadedTexts {
                texts: vec![text(TEXT_ID)],
            },
            Intent::LoadedSources {
                sources: vec![source(1, true, false), source(2, false, true)],
            },
            Intent::LoadedWitnesses {
                text: text(TEXT_ID),
                witnesses: vec![
                    witness(BASE_WITNESS, TEXT_ID, 1, true, false),
                    witness(WORKING_WITNESS, TEXT_ID, 2, false, true),
                ],
            },
        ],
    )
}
