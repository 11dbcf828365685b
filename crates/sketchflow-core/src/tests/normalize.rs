use super::approx;
use crate::element::BoundKind;
use crate::*;
use serde_json::json;

#[test]
fn candidates_without_type_are_dropped_alone() {
    let out = Normalizer::default().normalize(&json!([
        {"id": "a", "type": "rectangle"},
        {"id": "b"},
        "not an object",
        null,
        {"id": "c", "type": "ellipse"}
    ]));
    let ids: Vec<_> = out.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn empty_and_non_array_input_yield_nothing() {
    let n = Normalizer::default();
    assert!(n.normalize(&json!([])).is_empty());
    assert!(n.normalize(&json!({"type": "rectangle"})).is_empty());
    assert!(n.normalize(&json!("rectangle")).is_empty());
}

#[test]
fn absent_fields_take_defaults() {
    let out = normalize::normalize(&json!([{"type": "rectangle"}]));
    let el = &out[0];
    assert!(!el.id.is_empty());
    assert_eq!((el.x, el.y, el.width, el.height), (0.0, 0.0, 100.0, 100.0));
    assert_eq!(el.angle, 0.0);
    assert_eq!(el.stroke_color, "#000000");
    assert_eq!(el.background_color, "transparent");
    assert_eq!(el.fill_style, FillStyle::Solid);
    assert_eq!(el.stroke_style, StrokeStyle::Solid);
    assert_eq!(el.stroke_width, 2.0);
    assert_eq!(el.roughness, 1.0);
    assert_eq!(el.opacity, 100.0);
    assert!(el.group_ids.is_empty());
    assert_eq!(el.version, 1);
    assert!(el.seed >= 1 && el.seed <= 0x7fff_ffff);
    assert!(el.version_nonce >= 1 && el.version_nonce <= 0x7fff_ffff);
    assert!(el.updated > 0);
    assert!(!el.is_deleted && !el.locked);
}

#[test]
fn explicit_zero_is_preserved_and_falsy_values_default() {
    let out = normalize::normalize(&json!([{
        "type": "rectangle",
        "x": 0, "y": 5,
        "width": 0,
        "opacity": 0,
        "strokeWidth": 0,
        "strokeColor": "",
        "backgroundColor": null,
        "fillStyle": false,
        "height": "40"
    }]));
    let el = &out[0];
    assert_eq!((el.x, el.y, el.width, el.height), (0.0, 5.0, 0.0, 40.0));
    assert_eq!(el.opacity, 0.0);
    assert_eq!(el.stroke_width, 0.0);
    assert_eq!(el.stroke_color, "#000000");
    assert_eq!(el.background_color, "transparent");
    assert_eq!(el.fill_style, FillStyle::Solid);
}

#[test]
fn out_of_range_geometry_is_repaired() {
    let out = normalize::normalize(&json!([{
        "type": "rectangle",
        "x": 100, "y": 100,
        "width": -40, "height": -10,
        "opacity": 250,
        "strokeWidth": -3,
        "roughness": -1
    }]));
    let el = &out[0];
    assert_eq!((el.x, el.y, el.width, el.height), (60.0, 90.0, 40.0, 10.0));
    assert_eq!(el.opacity, 100.0);
    assert_eq!(el.stroke_width, 2.0);
    assert_eq!(el.roughness, 1.0);
}

#[test]
fn line_from_endpoints() {
    let out = normalize::normalize(&json!([{
        "type": "line", "startX": 0, "startY": 0, "endX": 100, "endY": 50
    }]));
    let el = &out[0];
    assert_eq!((el.x, el.y, el.width, el.height), (0.0, 0.0, 100.0, 50.0));
    assert_eq!(el.points(), Some(&[Point(0.0, 0.0), Point(100.0, 50.0)][..]));
}

#[test]
fn endpoints_going_backwards_use_absolute_extent() {
    let out = normalize::normalize(&json!([{
        "type": "arrow", "startX": 50, "startY": 80, "endX": 10, "endY": 20
    }]));
    let el = &out[0];
    assert_eq!((el.x, el.y, el.width, el.height), (50.0, 80.0, 40.0, 60.0));
    assert_eq!(el.points(), Some(&[Point(0.0, 0.0), Point(-40.0, -60.0)][..]));
}

#[test]
fn explicit_points_win_and_are_rebased() {
    let out = normalize::normalize(&json!([{
        "type": "line",
        "x": 10, "y": 10,
        "points": [[5, 5], [25, 45]],
        "startX": 0, "startY": 0, "endX": 1, "endY": 1
    }]));
    let el = &out[0];
    assert_eq!((el.x, el.y), (15.0, 15.0));
    assert_eq!(el.points(), Some(&[Point(0.0, 0.0), Point(20.0, 40.0)][..]));
    assert_eq!((el.width, el.height), (20.0, 40.0));
}

#[test]
fn negative_extent_on_a_line_keeps_its_origin() {
    let out = normalize::normalize(&json!([{
        "type": "line",
        "x": 10, "y": 0,
        "width": -50, "height": 0,
        "points": [[0, 0], [-50, 0]]
    }]));
    let el = &out[0];
    assert_eq!((el.x, el.y), (10.0, 0.0));
    assert_eq!((el.width, el.height), (50.0, 0.0));
    assert_eq!(el.points(), Some(&[Point(0.0, 0.0), Point(-50.0, 0.0)][..]));
}

#[test]
fn lines_without_geometry_get_a_default_segment() {
    let out = normalize::normalize(&json!([{"type": "line", "points": [[0, 0]]}]));
    let el = &out[0];
    assert_eq!(el.points(), Some(&[Point(0.0, 0.0), Point(100.0, 0.0)][..]));
    assert_eq!((el.width, el.height), (100.0, 0.0));
    assert_eq!(el.linear.as_ref().unwrap().end_arrowhead, None);
}

#[test]
fn arrows_default_to_an_end_arrowhead() {
    let out = normalize::normalize(&json!([
        {"type": "arrow"},
        {"type": "arrow", "endArrowhead": "dot", "startArrowhead": "bar"}
    ]));
    let first = out[0].linear.as_ref().unwrap();
    assert_eq!(first.end_arrowhead.as_deref(), Some("arrow"));
    assert_eq!(first.start_arrowhead, None);
    let second = out[1].linear.as_ref().unwrap();
    assert_eq!(second.end_arrowhead.as_deref(), Some("dot"));
    assert_eq!(second.start_arrowhead.as_deref(), Some("bar"));
}

#[test]
fn text_alignment_depends_on_container() {
    let out = normalize::normalize(&json!([
        {"type": "text", "text": "free"},
        {"type": "text", "label": "bound", "containerId": "r1"}
    ]));
    let free = out[0].text.as_ref().unwrap();
    assert_eq!(free.text, "free");
    assert_eq!(free.original_text, "free");
    assert_eq!(free.font_size, 20.0);
    assert_eq!(free.font_family, 1);
    assert_eq!(free.line_height, 1.25);
    assert_eq!(free.text_align, TextAlign::Left);
    assert_eq!(free.vertical_align, VerticalAlign::Top);

    let bound = out[1].text.as_ref().unwrap();
    assert_eq!(bound.text, "bound");
    assert_eq!(bound.container_id.as_deref(), Some("r1"));
    assert_eq!(bound.text_align, TextAlign::Center);
    assert_eq!(bound.vertical_align, VerticalAlign::Middle);
}

#[test]
fn labeled_shape_yields_host_then_bound_text() {
    let out = normalize::normalize(&json!([{
        "id": "r1", "type": "rectangle",
        "x": 10, "y": 20, "width": 200, "height": 100,
        "label": "Start",
        "boundElements": [{"type": "text", "id": "stale"}, {"type": "arrow", "id": "a1"}]
    }]));
    assert_eq!(out.len(), 2);
    let (host, text) = (&out[0], &out[1]);
    assert_eq!(host.id, "r1");
    assert_eq!(text.id, "text-r1");
    assert_eq!(text.kind, ElementKind::Text);

    assert_eq!(host.bound_ids(BoundKind::Text).collect::<Vec<_>>(), vec!["text-r1"]);
    assert_eq!(host.bound_ids(BoundKind::Arrow).collect::<Vec<_>>(), vec!["a1"]);
    assert_eq!(text.container_id(), Some("r1"));

    let data = text.text.as_ref().unwrap();
    assert_eq!(data.text, "Start");
    assert_eq!(data.font_size, 14.0);
    assert_eq!(data.text_align, TextAlign::Center);
    assert_eq!(data.vertical_align, VerticalAlign::Middle);

    // 5 columns * 14px * 0.6, padded by 1.3.
    assert!(approx(text.width, 54.6));
    assert!(approx(text.height, 17.5));
    assert!(approx(text.x + text.width / 2.0, 110.0));
    assert!(approx(text.y + text.height / 2.0, 70.0));
}

#[test]
fn labeled_host_keeps_its_arrow_references() {
    let out = normalize::normalize(&json!([{
        "id": "r1", "type": "rectangle",
        "label": "Step",
        "boundElements": [{"type": "arrow", "id": "a1"}]
    }]));
    let host = &out[0];
    assert_eq!(
        host.bound_elements,
        Some(vec![BoundElement::arrow("a1"), BoundElement::text("text-r1")])
    );
}

#[test]
fn label_width_falls_back_to_character_count() {
    let out = Normalizer::without_measurer().normalize(&json!([
        {"id": "a", "type": "ellipse", "label": "Start"},
        {"id": "b", "type": "diamond", "label": "A"}
    ]));
    assert_eq!(out.len(), 4);
    assert!(approx(out[1].width, 70.0));
    assert!(approx(out[3].width, 20.0));
}

#[test]
fn labels_on_text_and_lines_are_not_synthesized() {
    let out = normalize::normalize(&json!([
        {"type": "arrow", "label": "edge"},
        {"type": "line", "label": "edge"},
        {"type": "text", "text": "t", "label": "ignored"},
        {"type": "rectangle", "label": ""}
    ]));
    assert_eq!(out.len(), 4);
    assert_eq!(out[2].text_content(), Some("t"));
}

#[test]
fn synthesized_text_ids_are_unique() {
    let out = normalize::normalize(&json!([
        {"id": "text-r1", "type": "text", "text": "taken"},
        {"id": "r1", "type": "rectangle", "label": "one"},
        {"id": "r1", "type": "rectangle", "label": "two"}
    ]));
    assert_eq!(out.len(), 5);
    let mut ids: Vec<_> = out.iter().map(|e| e.id.clone()).collect();
    assert_eq!(out[2].id, "text-r1-2");
    assert_ne!(out[3].id, "r1");
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);

    for host in [&out[1], &out[3]] {
        let text_id = host.bound_ids(BoundKind::Text).next().unwrap();
        let text = out.iter().find(|e| e.id == text_id).unwrap();
        assert_eq!(text.container_id(), Some(host.id.as_str()));
    }
}

#[test]
fn opaque_fields_are_carried_over() {
    let out = normalize::normalize(&json!([{
        "type": "frame",
        "seed": 7, "version": 3, "versionNonce": 9, "updated": 1700000000000i64,
        "isDeleted": true, "locked": true,
        "groupIds": ["g1", "", 4],
        "link": "https://example.com",
        "roundness": {"type": 3}
    }]));
    let el = &out[0];
    assert_eq!((el.seed, el.version, el.version_nonce), (7, 3, 9));
    assert_eq!(el.updated, 1_700_000_000_000);
    assert!(el.is_deleted && el.locked);
    assert_eq!(el.group_ids, vec!["g1".to_string()]);
    assert_eq!(el.link.as_deref(), Some("https://example.com"));
    assert_eq!(el.roundness, Some(Roundness::adaptive()));
}

#[test]
fn unknown_kinds_survive_verbatim() {
    let out = normalize::normalize(&json!([{"type": "embeddable", "label": "x"}]));
    assert_eq!(out[0].kind, ElementKind::Other("embeddable".to_string()));
    let v = serde_json::to_value(&out[0]).unwrap();
    assert_eq!(v["type"], json!("embeddable"));
}
