use std::path::PathBuf;
use std::sync::Arc;

use sketchflow_core::{BoundKind, Converter, CurveStyle, ElementKind, LayoutConfig, StrokeStyle};
use sketchflow_layout::BuiltinLayoutEngine;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> String {
    let path = workspace_root()
        .join("fixtures")
        .join("flowchart")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture")
}

fn shapes(scene: &sketchflow_core::SkeletonScene) -> Vec<&sketchflow_core::SkeletonElement> {
    scene
        .elements
        .iter()
        .filter(|e| !e.kind.is_linear())
        .collect()
}

fn shape<'a>(
    scene: &'a sketchflow_core::SkeletonScene,
    id: &str,
) -> &'a sketchflow_core::SkeletonElement {
    scene
        .elements
        .iter()
        .find(|e| e.id.as_deref() == Some(id))
        .unwrap_or_else(|| panic!("missing node {id}"))
}

#[test]
fn flowchart_layout_produces_ranked_nodes_and_routes() {
    let engine = BuiltinLayoutEngine::default();
    let scene = engine
        .layout_description(&fixture("basic.mmd"), &LayoutConfig::default())
        .expect("layout ok");

    let nodes = shapes(&scene);
    assert_eq!(nodes.len(), 4);
    assert_eq!(scene.elements.len() - nodes.len(), 4);

    for n in &nodes {
        let (w, h) = (n.width.unwrap(), n.height.unwrap());
        assert!(w.is_finite() && w > 0.0);
        assert!(h.is_finite() && h > 0.0);
        assert!(n.x >= 0.0 && n.y >= 0.0);
    }
    let min_x = nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
    let min_y = nodes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min);
    assert_eq!((min_x, min_y), (0.0, 0.0));

    // Top-down: every edge goes to a lower rank.
    let a = shape(&scene, "A");
    let b = shape(&scene, "B");
    let d = shape(&scene, "D");
    assert!(a.y < b.y);
    assert!(b.y < d.y);
    assert_eq!(b.kind, ElementKind::Diamond);

    let labels: Vec<_> = scene
        .elements
        .iter()
        .filter(|e| e.kind.is_linear())
        .filter_map(|e| e.label.as_ref().map(|l| l.text.as_str()))
        .collect();
    assert_eq!(labels, vec!["是", "否"]);
}

#[test]
fn left_right_cycle_still_lays_out() {
    let engine = BuiltinLayoutEngine::default();
    let scene = engine
        .layout_description(&fixture("cycle_lr.mmd"), &LayoutConfig::default())
        .expect("layout ok");

    let request = shape(&scene, "Request");
    let check = shape(&scene, "Check");
    let done = shape(&scene, "Done");
    assert!(request.x < check.x);
    assert!(check.x < done.x);
    assert_eq!(done.kind, ElementKind::Ellipse);
    assert!(request.roundness.is_some());

    let back_edge = scene
        .elements
        .iter()
        .find(|e| e.start.as_deref() == Some("Wait") && e.end.as_deref() == Some("Request"))
        .expect("back edge");
    assert_eq!(back_edge.kind, ElementKind::Arrow);
}

#[test]
fn linear_curve_routes_with_two_points() {
    let engine = BuiltinLayoutEngine::default();
    let config = LayoutConfig {
        curve: CurveStyle::Linear,
        ..LayoutConfig::default()
    };
    let scene = engine
        .layout_description("graph TD\nA --> B & C\nB -.-> D\nC === D", &config)
        .expect("layout ok");

    let edges: Vec<_> = scene.elements.iter().filter(|e| e.kind.is_linear()).collect();
    assert_eq!(edges.len(), 4);
    for e in &edges {
        assert_eq!(e.points.as_ref().map(Vec::len), Some(2));
    }
    assert_eq!(edges[2].stroke_style, Some(StrokeStyle::Dashed));
    assert_eq!(edges[3].kind, ElementKind::Line);
    assert_eq!(edges[3].stroke_width, Some(4.0));
}

#[test]
fn bottom_up_mirrors_the_main_axis() {
    let engine = BuiltinLayoutEngine::default();
    let scene = engine
        .layout_description("graph BT\nA --> B", &LayoutConfig::default())
        .expect("layout ok");
    assert!(shape(&scene, "A").y > shape(&scene, "B").y);
    assert_eq!(shape(&scene, "B").y, 0.0);
}

#[test]
fn converted_flowchart_binds_arrows_and_labels() {
    let converter = Converter::new(Arc::new(BuiltinLayoutEngine::default()));
    let scene = converter.convert(&fixture("basic.mmd")).expect("convert ok");

    let arrows: Vec<_> = scene.elements.iter().filter(|e| e.is_linear()).collect();
    assert_eq!(arrows.len(), 4);
    for arrow in &arrows {
        let data = arrow.linear.as_ref().unwrap();
        let start = data.start_binding.as_ref().expect("start binding");
        let end = data.end_binding.as_ref().expect("end binding");
        assert!(scene.element(&start.element_id).is_some());
        assert!(scene.element(&end.element_id).is_some());
    }

    let b = scene.element("B").expect("node B");
    assert_eq!(b.bound_ids(BoundKind::Arrow).count(), 3);
    let label_id = b.bound_ids(BoundKind::Text).next().expect("bound label");
    let label = scene.element(label_id).expect("label element");
    assert_eq!(label.text_content(), Some("判断条件"));
    assert_eq!(label.container_id(), Some("B"));

    let bound_texts = scene
        .elements
        .iter()
        .filter(|e| e.kind == ElementKind::Text)
        .count();
    // Four node labels and two edge labels.
    assert_eq!(bound_texts, 6);
}

#[test]
fn oversized_inputs_are_rejected() {
    let engine = BuiltinLayoutEngine::default();
    let config = LayoutConfig {
        max_edges: 1,
        ..LayoutConfig::default()
    };
    let err = engine
        .layout_description("graph TD\nA --> B --> C", &config)
        .unwrap_err();
    assert!(matches!(
        err,
        sketchflow_layout::Error::TooManyEdges { count: 2, limit: 1 }
    ));

    let config = LayoutConfig {
        max_text_size: 8,
        ..LayoutConfig::default()
    };
    let err = engine
        .layout_description("graph TD\nA --> B", &config)
        .unwrap_err();
    assert!(matches!(err, sketchflow_layout::Error::TextTooLarge { .. }));
}
