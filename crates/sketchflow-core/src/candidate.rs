//! Decoding of untrusted candidate elements.
//!
//! A candidate is an arbitrary JSON value handed over by an external generator. Decoding is
//! lenient: a field that is absent, `null`, `false`, an empty string or of the wrong type is
//! read as "not given" and later defaulted. An explicit numeric zero is kept. Numbers written
//! as strings (`"120"`) are accepted.
//!
//! Decoding dispatches on the kind: lines and arrows read their geometry fields, text reads
//! its typography fields, everything else reads an optional `label`.

use serde_json::{Map, Value};

use crate::element::{
    BoundElement, BoundKind, ElementKind, FillStyle, Point, PointBinding, Roundness,
    StrokeStyle, TextAlign, VerticalAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CandidateRejection {
    #[error("candidate is not an object")]
    NotAnObject,
    #[error("candidate has no usable `type`")]
    MissingType,
}

/// Fields every kind may carry, each `None` when not given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonFields {
    pub id: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub angle: Option<f64>,
    pub stroke_color: Option<String>,
    pub background_color: Option<String>,
    pub fill_style: Option<FillStyle>,
    pub stroke_width: Option<f64>,
    pub stroke_style: Option<StrokeStyle>,
    pub roughness: Option<f64>,
    pub opacity: Option<f64>,
    pub group_ids: Option<Vec<String>>,
    pub frame_id: Option<String>,
    pub roundness: Option<Roundness>,
    pub seed: Option<u32>,
    pub version: Option<u32>,
    pub version_nonce: Option<u32>,
    pub is_deleted: Option<bool>,
    pub locked: Option<bool>,
    pub updated: Option<i64>,
    pub bound_elements: Option<Vec<BoundElement>>,
    pub link: Option<String>,
}

/// Absolute start and end coordinates of a line given as `startX/startY/endX/endY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoints {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearFields {
    pub points: Option<Vec<Point>>,
    pub endpoints: Option<Endpoints>,
    pub start_binding: Option<PointBinding>,
    pub end_binding: Option<PointBinding>,
    pub start_arrowhead: Option<String>,
    pub end_arrowhead: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFields {
    /// `text`, falling back to `label`.
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<u8>,
    pub text_align: Option<TextAlign>,
    pub vertical_align: Option<VerticalAlign>,
    pub line_height: Option<f64>,
    pub container_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateBody {
    Linear(LinearFields),
    Text(TextFields),
    Shape { label: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCandidate {
    pub kind: ElementKind,
    pub common: CommonFields,
    pub body: CandidateBody,
}

impl DecodedCandidate {
    pub fn decode(value: &Value) -> Result<Self, CandidateRejection> {
        let obj = value.as_object().ok_or(CandidateRejection::NotAnObject)?;
        let kind = string(obj.get("type"))
            .and_then(|tag| ElementKind::from_tag(&tag))
            .ok_or(CandidateRejection::MissingType)?;

        let common = decode_common(obj);
        let body = if kind.is_linear() {
            CandidateBody::Linear(decode_linear(obj))
        } else if kind.is_text() {
            CandidateBody::Text(decode_text(obj))
        } else {
            CandidateBody::Shape {
                label: string(obj.get("label")),
            }
        };

        Ok(Self { kind, common, body })
    }

    pub fn label(&self) -> Option<&str> {
        match &self.body {
            CandidateBody::Shape { label } => label.as_deref(),
            _ => None,
        }
    }
}

fn decode_common(obj: &Map<String, Value>) -> CommonFields {
    CommonFields {
        id: string(obj.get("id")),
        x: number(obj.get("x")),
        y: number(obj.get("y")),
        width: number(obj.get("width")),
        height: number(obj.get("height")),
        angle: number(obj.get("angle")),
        stroke_color: string(obj.get("strokeColor")),
        background_color: string(obj.get("backgroundColor")),
        fill_style: string(obj.get("fillStyle")).and_then(|s| FillStyle::parse(&s)),
        stroke_width: number(obj.get("strokeWidth")),
        stroke_style: string(obj.get("strokeStyle")).and_then(|s| StrokeStyle::parse(&s)),
        roughness: number(obj.get("roughness")),
        opacity: number(obj.get("opacity")),
        group_ids: string_list(obj.get("groupIds")),
        frame_id: string(obj.get("frameId")),
        roundness: roundness(obj.get("roundness")),
        seed: positive_u32(obj.get("seed")),
        version: positive_u32(obj.get("version")),
        version_nonce: positive_u32(obj.get("versionNonce")),
        is_deleted: boolean(obj.get("isDeleted")),
        locked: boolean(obj.get("locked")),
        updated: number(obj.get("updated"))
            .filter(|ms| *ms > 0.0)
            .map(|ms| ms as i64),
        bound_elements: bound_elements(obj.get("boundElements")),
        link: string(obj.get("link")),
    }
}

fn decode_linear(obj: &Map<String, Value>) -> LinearFields {
    let endpoints = match (
        number(obj.get("startX")),
        number(obj.get("startY")),
        number(obj.get("endX")),
        number(obj.get("endY")),
    ) {
        (Some(sx), Some(sy), Some(ex), Some(ey)) => Some(Endpoints {
            start: (sx, sy),
            end: (ex, ey),
        }),
        _ => None,
    };

    LinearFields {
        points: points(obj.get("points")),
        endpoints,
        start_binding: point_binding(obj.get("startBinding")),
        end_binding: point_binding(obj.get("endBinding")),
        start_arrowhead: string(obj.get("startArrowhead")),
        end_arrowhead: string(obj.get("endArrowhead")),
    }
}

fn decode_text(obj: &Map<String, Value>) -> TextFields {
    TextFields {
        text: string(obj.get("text")).or_else(|| string(obj.get("label"))),
        font_size: number(obj.get("fontSize")).filter(|v| *v > 0.0),
        font_family: number(obj.get("fontFamily"))
            .filter(|v| *v >= 1.0 && *v <= u8::MAX as f64)
            .map(|v| v as u8),
        text_align: string(obj.get("textAlign")).and_then(|s| TextAlign::parse(&s)),
        vertical_align: string(obj.get("verticalAlign")).and_then(|s| VerticalAlign::parse(&s)),
        line_height: number(obj.get("lineHeight")).filter(|v| *v > 0.0),
        container_id: string(obj.get("containerId")),
    }
}

/// A finite number, or a string that parses as one.
pub(crate) fn number(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// A string with at least one non-whitespace character, returned untrimmed.
pub(crate) fn string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn boolean(v: Option<&Value>) -> Option<bool> {
    v?.as_bool()
}

fn positive_u32(v: Option<&Value>) -> Option<u32> {
    number(v)
        .filter(|n| *n >= 1.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

fn string_list(v: Option<&Value>) -> Option<Vec<String>> {
    let items = v?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| string(Some(item)))
            .collect(),
    )
}

fn roundness(v: Option<&Value>) -> Option<Roundness> {
    let obj = v?.as_object()?;
    let kind = number(obj.get("type")).filter(|t| *t >= 0.0 && *t <= u8::MAX as f64)?;
    Some(Roundness {
        kind: kind as u8,
        value: number(obj.get("value")),
    })
}

fn bound_elements(v: Option<&Value>) -> Option<Vec<BoundElement>> {
    let items = v?.as_array()?;
    let list = items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let kind = match string(obj.get("type"))?.as_str() {
                "text" => BoundKind::Text,
                "arrow" => BoundKind::Arrow,
                _ => return None,
            };
            Some(BoundElement {
                kind,
                id: string(obj.get("id"))?,
            })
        })
        .collect();
    Some(list)
}

fn point(v: &Value) -> Option<Point> {
    match v {
        Value::Array(pair) if pair.len() >= 2 => {
            Some(Point(number(pair.first())?, number(pair.get(1))?))
        }
        Value::Object(obj) => Some(Point(number(obj.get("x"))?, number(obj.get("y"))?)),
        _ => None,
    }
}

/// At least two points, every one of them well formed.
fn points(v: Option<&Value>) -> Option<Vec<Point>> {
    let items = v?.as_array()?;
    if items.len() < 2 {
        return None;
    }
    items.iter().map(point).collect()
}

fn point_binding(v: Option<&Value>) -> Option<PointBinding> {
    let obj = v?.as_object()?;
    Some(PointBinding {
        element_id: string(obj.get("elementId"))?,
        focus: number(obj.get("focus")).unwrap_or(0.0),
        gap: number(obj.get("gap")).unwrap_or(1.0),
    })
}
