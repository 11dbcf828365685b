use std::path::PathBuf;

use sketchflow::{BatchOrigin, Pipeline};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn round_trip(kind: &str, name: &str) {
    let path = workspace_root().join("fixtures").join(kind).join(name);
    let text = std::fs::read_to_string(&path).expect("fixture");

    let pipeline = Pipeline::default();
    let scene = pipeline.convert(&text).expect("convert ok");
    let json = serde_json::to_string(&scene).expect("serialize");

    let batch = pipeline.classify(&json).expect("classify ok");
    assert_eq!(batch.origin, BatchOrigin::SceneObject);
    assert_eq!(
        batch.scene.len(),
        scene.len(),
        "element count changed for {kind}/{name}"
    );

    let ids: Vec<_> = scene.elements.iter().map(|e| e.id.as_str()).collect();
    let round_tripped: Vec<_> = batch.scene.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, round_tripped);
}

#[test]
fn flowchart_scene_survives_classification() {
    round_trip("flowchart", "basic.mmd");
    round_trip("flowchart", "cycle_lr.mmd");
}

#[test]
fn state_scene_survives_classification() {
    round_trip("state", "basic.mmd");
}

#[test]
fn sequence_scene_survives_classification() {
    round_trip("sequence", "basic.mmd");
}
