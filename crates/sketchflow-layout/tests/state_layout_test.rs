use std::path::PathBuf;
use std::sync::Arc;

use sketchflow_core::{Converter, ConversionError, ElementKind, LayoutConfig};
use sketchflow_layout::BuiltinLayoutEngine;
use sketchflow_layout::state::{END_ID, START_ID};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn basic_state() -> String {
    let path = workspace_root()
        .join("fixtures")
        .join("state")
        .join("basic.mmd");
    std::fs::read_to_string(&path).expect("fixture")
}

#[test]
fn state_layout_places_markers_at_the_ends() {
    let engine = BuiltinLayoutEngine::default();
    let scene = engine
        .layout_description(&basic_state(), &LayoutConfig::default())
        .expect("layout ok");

    let node = |id: &str| {
        scene
            .elements
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
            .unwrap_or_else(|| panic!("missing state {id}"))
    };

    let start = node(START_ID);
    let end = node(END_ID);
    assert_eq!(start.kind, ElementKind::Ellipse);
    assert_eq!(start.width, Some(20.0));
    assert_eq!(start.background_color.as_deref(), Some("#000000"));
    assert!(start.label.is_none());
    assert!(start.y < node("Idle").y);
    assert!(node("Ready").y < end.y);

    let transitions = scene.elements.iter().filter(|e| e.kind.is_linear()).count();
    assert_eq!(transitions, 6);

    // The retry transition is a back edge and does not push ranks.
    assert_eq!(node("Ready").y, node("Failed").y);
}

#[test]
fn converted_state_diagram_has_rounded_states_with_labels() {
    let converter = Converter::new(Arc::new(BuiltinLayoutEngine::default()));
    let scene = converter.convert(&basic_state()).expect("convert ok");

    let idle = scene.element("Idle").expect("Idle");
    assert!(idle.roundness.is_some());
    let fetch = scene
        .elements
        .iter()
        .find(|e| e.text_content() == Some("fetch"))
        .expect("transition label");
    let host = scene
        .element(fetch.container_id().expect("bound"))
        .expect("host arrow");
    assert!(host.is_linear());
}

#[test]
fn malformed_state_names_surface_as_syntax_errors() {
    let converter = Converter::new(Arc::new(BuiltinLayoutEngine::default()));
    let err = converter
        .convert("stateDiagram-v2\n[*] --> Idle\nIdle --> Two Words")
        .unwrap_err();
    assert!(matches!(err, ConversionError::Syntax { .. }), "{err}");
    assert_eq!(err.kind(), "SYNTAX_ERROR");
}
