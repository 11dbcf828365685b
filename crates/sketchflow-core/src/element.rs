//! Canonical scene elements.
//!
//! A [`CanonicalElement`] is the trusted, fully-defaulted form every element takes after it
//! has gone through the normalizer or the skeleton finalizer. The JSON shape (camelCase keys,
//! `type` tag, `[x, y]` point tuples) is the one interactive whiteboard canvases consume.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::ids;

pub const DEFAULT_X: f64 = 0.0;
pub const DEFAULT_Y: f64 = 0.0;
pub const DEFAULT_WIDTH: f64 = 100.0;
pub const DEFAULT_HEIGHT: f64 = 100.0;
pub const DEFAULT_ANGLE: f64 = 0.0;
pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_BACKGROUND_COLOR: &str = "transparent";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
pub const DEFAULT_ROUGHNESS: f64 = 1.0;
pub const DEFAULT_OPACITY: f64 = 100.0;
pub const DEFAULT_VERSION: u32 = 1;

pub const DEFAULT_FONT_SIZE: f64 = 20.0;
pub const DEFAULT_FONT_FAMILY: u8 = 1;
pub const DEFAULT_LINE_HEIGHT: f64 = 1.25;

/// Length of the horizontal segment synthesized for a line that has no geometry at all.
pub const DEFAULT_SEGMENT_LENGTH: f64 = 100.0;

/// Element kind, keyed by the `type` field. The set is open: unknown tags survive as
/// [`ElementKind::Other`] so the canvas can decide what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Line,
    Arrow,
    Text,
    Image,
    Freedraw,
    Frame,
    Other(String),
}

impl ElementKind {
    /// Parses a `type` tag. Known tags are matched case-insensitively; an empty tag is not a kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        let kind = match tag.to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Self::Rectangle,
            "ellipse" | "circle" => Self::Ellipse,
            "diamond" => Self::Diamond,
            "line" => Self::Line,
            "arrow" => Self::Arrow,
            "text" => Self::Text,
            "image" => Self::Image,
            "freedraw" => Self::Freedraw,
            "frame" => Self::Frame,
            _ => Self::Other(tag.to_string()),
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Text => "text",
            Self::Image => "image",
            Self::Freedraw => "freedraw",
            Self::Frame => "frame",
            Self::Other(tag) => tag.as_str(),
        }
    }

    /// Lines and arrows: geometry lives in `points`.
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Line | Self::Arrow)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    /// Whether a `label` on a candidate of this kind becomes a separate bound text element.
    pub fn hosts_label(&self) -> bool {
        !self.is_linear() && !self.is_text()
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Self::from_tag(&tag).ok_or_else(|| serde::de::Error::custom("empty element type"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStyle {
    #[default]
    Solid,
    Hachure,
    CrossHatch,
    Zigzag,
}

impl FillStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(Self::Solid),
            "hachure" => Some(Self::Hachure),
            "cross-hatch" | "crosshatch" => Some(Self::CrossHatch),
            "zigzag" => Some(Self::Zigzag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roundness {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Roundness {
    /// Adaptive corner radius, the canvas default for rounded rectangles.
    pub fn adaptive() -> Self {
        Self {
            kind: 3,
            value: None,
        }
    }

    /// Proportional radius used for rounded lines and diamonds.
    pub fn proportional() -> Self {
        Self {
            kind: 2,
            value: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    Text,
    Arrow,
}

/// Back-reference from a host to an element that depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundElement {
    #[serde(rename = "type")]
    pub kind: BoundKind,
    pub id: String,
}

impl BoundElement {
    pub fn text(id: impl Into<String>) -> Self {
        Self {
            kind: BoundKind::Text,
            id: id.into(),
        }
    }

    pub fn arrow(id: impl Into<String>) -> Self {
        Self {
            kind: BoundKind::Arrow,
            id: id.into(),
        }
    }
}

/// A point relative to the owning element's `(x, y)`, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub const ORIGIN: Point = Point(0.0, 0.0);

    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointBinding {
    pub element_id: String,
    pub focus: f64,
    pub gap: f64,
}

impl PointBinding {
    pub fn to(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            focus: 0.0,
            gap: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearData {
    pub points: Vec<Point>,
    #[serde(default)]
    pub start_binding: Option<PointBinding>,
    #[serde(default)]
    pub end_binding: Option<PointBinding>,
    #[serde(default)]
    pub start_arrowhead: Option<String>,
    #[serde(default)]
    pub end_arrowhead: Option<String>,
}

impl LinearData {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            start_binding: None,
            end_binding: None,
            start_arrowhead: None,
            end_arrowhead: None,
        }
    }

    /// Width and height of the bounding box spanned by the points.
    pub fn extent(&self) -> (f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &self.points {
            min_x = min_x.min(p.0);
            min_y = min_y.min(p.1);
            max_x = max_x.max(p.0);
            max_y = max_y.max(p.1);
        }
        if self.points.is_empty() {
            return (0.0, 0.0);
        }
        (max_x - min_x, max_y - min_y)
    }

    /// Midpoint of the middle segment; where an edge label sits.
    pub fn label_anchor(&self) -> Point {
        match self.points.len() {
            0 => Point::ORIGIN,
            1 => self.points[0],
            n => {
                let a = self.points[(n - 2) / 2];
                let b = self.points[(n - 2) / 2 + 1];
                Point((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub text: String,
    pub original_text: String,
    pub font_size: f64,
    pub font_family: u8,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub line_height: f64,
    #[serde(default)]
    pub container_id: Option<String>,
}

impl TextData {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            original_text: text.clone(),
            text,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY,
            text_align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: DEFAULT_LINE_HEIGHT,
            container_id: None,
        }
    }

    /// Text bound inside a container is centered on both axes.
    pub fn bound_to(text: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            text_align: TextAlign::Center,
            vertical_align: VerticalAlign::Middle,
            container_id: Some(container_id.into()),
            ..Self::new(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub stroke_color: String,
    pub background_color: String,
    pub fill_style: FillStyle,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
    pub roughness: f64,
    pub opacity: f64,
    pub group_ids: Vec<String>,
    pub frame_id: Option<String>,
    pub roundness: Option<Roundness>,
    pub seed: u32,
    pub version: u32,
    pub version_nonce: u32,
    pub is_deleted: bool,
    pub locked: bool,
    pub updated: i64,
    pub bound_elements: Option<Vec<BoundElement>>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(flatten)]
    pub linear: Option<LinearData>,
    #[serde(flatten)]
    pub text: Option<TextData>,
}

impl CanonicalElement {
    /// An element with every field at its default and fresh random `seed`/`versionNonce`.
    pub fn new(kind: ElementKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            x: DEFAULT_X,
            y: DEFAULT_Y,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            angle: DEFAULT_ANGLE,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            fill_style: FillStyle::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_style: StrokeStyle::default(),
            roughness: DEFAULT_ROUGHNESS,
            opacity: DEFAULT_OPACITY,
            group_ids: Vec::new(),
            frame_id: None,
            roundness: None,
            seed: ids::random_seed(),
            version: DEFAULT_VERSION,
            version_nonce: ids::random_seed(),
            is_deleted: false,
            locked: false,
            updated: ids::now_millis(),
            bound_elements: None,
            link: None,
            linear: None,
            text: None,
        }
    }

    pub fn is_linear(&self) -> bool {
        self.kind.is_linear()
    }

    pub fn points(&self) -> Option<&[Point]> {
        self.linear.as_ref().map(|l| l.points.as_slice())
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.text.as_str())
    }

    pub fn container_id(&self) -> Option<&str> {
        self.text.as_ref().and_then(|t| t.container_id.as_deref())
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Adds a back-reference, replacing any existing reference of the same kind and id.
    pub fn add_bound_element(&mut self, bound: BoundElement) {
        let list = self.bound_elements.get_or_insert_with(Vec::new);
        if !list.contains(&bound) {
            list.push(bound);
        }
    }

    /// Binds a text element as this element's label. A host carries at most one label, so any
    /// previous text reference is dropped.
    pub fn bind_label(&mut self, text_id: impl Into<String>) {
        let list = self.bound_elements.get_or_insert_with(Vec::new);
        list.retain(|b| b.kind != BoundKind::Text);
        list.push(BoundElement::text(text_id));
    }

    pub fn bound_ids(&self, kind: BoundKind) -> impl Iterator<Item = &str> {
        self.bound_elements
            .iter()
            .flatten()
            .filter(move |b| b.kind == kind)
            .map(|b| b.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_tags_are_case_insensitive_and_open() {
        assert_eq!(ElementKind::from_tag("Rectangle"), Some(ElementKind::Rectangle));
        assert_eq!(ElementKind::from_tag(" ARROW "), Some(ElementKind::Arrow));
        assert_eq!(
            ElementKind::from_tag("embeddable"),
            Some(ElementKind::Other("embeddable".to_string()))
        );
        assert_eq!(ElementKind::from_tag("  "), None);
    }

    #[test]
    fn serializes_in_canvas_shape() {
        let mut el = CanonicalElement::new(ElementKind::Arrow, "a1");
        el.linear = Some(LinearData::new(vec![Point::ORIGIN, Point(10.0, 5.0)]));
        let v = serde_json::to_value(&el).unwrap();
        assert_eq!(v["type"], json!("arrow"));
        assert_eq!(v["points"], json!([[0.0, 0.0], [10.0, 5.0]]));
        assert_eq!(v["strokeColor"], json!("#000000"));
        assert_eq!(v["fillStyle"], json!("solid"));
        assert!(v.get("text").is_none());
        assert!(v.get("fontSize").is_none());
    }

    #[test]
    fn deserializes_flattened_payloads() {
        let mut el = CanonicalElement::new(ElementKind::Text, "t1");
        el.text = Some(TextData::bound_to("hi", "r1"));
        let back: CanonicalElement =
            serde_json::from_value(serde_json::to_value(&el).unwrap()).unwrap();
        assert_eq!(back.container_id(), Some("r1"));
        assert!(back.linear.is_none());
        assert_eq!(back, el);
    }

    #[test]
    fn bind_label_replaces_previous_text_reference() {
        let mut el = CanonicalElement::new(ElementKind::Rectangle, "r1");
        el.add_bound_element(BoundElement::arrow("a1"));
        el.bind_label("t-old");
        el.bind_label("t-new");
        let texts: Vec<_> = el.bound_ids(BoundKind::Text).collect();
        assert_eq!(texts, vec!["t-new"]);
        assert_eq!(el.bound_ids(BoundKind::Arrow).count(), 1);
    }

    #[test]
    fn label_anchor_uses_middle_segment() {
        let data = LinearData::new(vec![Point(0.0, 0.0), Point(0.0, 40.0), Point(60.0, 40.0)]);
        assert_eq!(data.label_anchor(), Point(0.0, 20.0));
        assert_eq!(data.extent(), (60.0, 40.0));
    }

    #[test]
    fn label_anchor_for_straight_and_elbow_routes() {
        let straight = LinearData::new(vec![Point(0.0, 0.0), Point(100.0, 0.0)]);
        assert_eq!(straight.label_anchor(), Point(50.0, 0.0));

        let elbow = LinearData::new(vec![
            Point(0.0, 0.0),
            Point(0.0, 20.0),
            Point(80.0, 20.0),
            Point(80.0, 40.0),
        ]);
        assert_eq!(elbow.label_anchor(), Point(40.0, 20.0));
    }
}
