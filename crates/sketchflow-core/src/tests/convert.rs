use super::fixed_engine;
use crate::*;

fn two_boxes() -> SkeletonScene {
    SkeletonScene::new(vec![
        SkeletonElement::shape(ElementKind::Rectangle, "A", 0.0, 0.0, 120.0, 60.0).with_label("Start"),
        SkeletonElement::shape(ElementKind::Rectangle, "B", 0.0, 160.0, 120.0, 60.0),
        SkeletonElement::arrow(&[Point(60.0, 60.0), Point(60.0, 160.0)]).connecting("A", "B"),
    ])
}

#[test]
fn empty_description_is_rejected() {
    let converter = Converter::new(fixed_engine(Ok(two_boxes())));
    assert_eq!(converter.convert(""), Err(ConversionError::EmptyInput));
    assert_eq!(converter.convert(" \n\t "), Err(ConversionError::EmptyInput));
    assert_eq!(ConversionError::EmptyInput.kind(), "EMPTY_DIAGRAM");
}

#[test]
fn unsupported_kinds_fail_before_layout() {
    // The engine would fail loudly if it were reached.
    let converter = Converter::new(fixed_engine(Err(LayoutError::new("engine reached"))));
    let err = converter.convert("gantt\n  title Plan").unwrap_err();
    assert_eq!(
        err,
        ConversionError::UnsupportedDiagram {
            kind: "gantt".to_string()
        }
    );
    assert_eq!(err.kind(), "UNSUPPORTED_DIAGRAM");
    assert!(matches!(
        converter.convert("pie\n\"a\": 1"),
        Err(ConversionError::UnsupportedDiagram { .. })
    ));
}

#[test]
fn unsupported_keyword_outside_the_header_token_still_converts() {
    let converter = Converter::new(fixed_engine(Ok(two_boxes())));
    let scene = converter.convert("graph TD; A[gantt]-->B").unwrap();
    assert!(!scene.is_empty());
}

#[test]
fn engine_failures_are_classified_by_message() {
    let syntax = Converter::new(fixed_engine(Err(LayoutError::new(
        "Parse error on line 2: unexpected token",
    ))));
    let err = syntax.convert("graph TD\nA-->").unwrap_err();
    assert_eq!(err.kind(), "SYNTAX_ERROR");
    assert!(err.to_string().contains("unexpected token"));

    let other = Converter::new(fixed_engine(Err(LayoutError::new("out of memory"))));
    assert_eq!(
        other.convert("graph TD\nA-->B"),
        Err(ConversionError::ConversionFailed {
            message: "out of memory".to_string()
        })
    );
}

#[test]
fn empty_skeleton_is_an_error() {
    let converter = Converter::new(fixed_engine(Ok(SkeletonScene::default())));
    assert_eq!(
        converter.convert("graph TD"),
        Err(ConversionError::EmptyResult)
    );
}

#[test]
fn converts_skeleton_into_a_bound_scene() {
    let converter = Converter::new(fixed_engine(Ok(two_boxes())));
    let scene = converter.convert("graph TD\nA[Start]-->B").unwrap();
    // Two boxes, one label, one arrow.
    assert_eq!(scene.len(), 4);

    let a = scene.element("A").unwrap();
    let label_id = a.bound_ids(BoundKind::Text).next().unwrap();
    let label = scene.element(label_id).unwrap();
    assert_eq!(label.container_id(), Some("A"));
    assert_eq!(label.text_content(), Some("Start"));

    let arrow = scene.elements.iter().find(|e| e.kind == ElementKind::Arrow).unwrap();
    let data = arrow.linear.as_ref().unwrap();
    assert_eq!(data.start_binding.as_ref().unwrap().element_id, "A");
    assert_eq!(data.end_binding.as_ref().unwrap().element_id, "B");
    assert!(scene.element("B").unwrap().bound_ids(BoundKind::Arrow).any(|id| id == arrow.id));
}

#[test]
fn unknown_kinds_are_still_attempted() {
    let converter = Converter::new(fixed_engine(Ok(two_boxes())));
    assert!(converter.convert("A-->B").is_ok());
}

#[test]
fn metadata_records_the_original_description() {
    let converter = Converter::new(fixed_engine(Ok(two_boxes())));
    let converted = converter.convert_with_metadata("graph TD\nA-->B").unwrap();
    assert_eq!(converted.metadata.original_description, "graph TD\nA-->B");
    assert!(converted.metadata.converted_at > 0);
    assert_eq!(converted.scene.len(), 4);
}
