//! Provisional layout output.
//!
//! A skeleton element carries only what a layout engine knows: kind, position, size, an
//! optional label and, for connectors, the skeleton ids of the shapes they join. The
//! [`crate::finalize::SceneFinalizer`] turns skeletons into canonical elements.

use serde::{Deserialize, Serialize};

use crate::element::{ElementKind, Point, Roundness, StrokeStyle};
use crate::scene::BinaryFiles;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonLabel {
    pub text: String,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub stroke_color: Option<String>,
}

impl SkeletonLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
            stroke_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub label: Option<SkeletonLabel>,
    /// Content of a free-standing text skeleton.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Connector geometry, relative to `(x, y)`.
    #[serde(default)]
    pub points: Option<Vec<Point>>,
    /// Skeleton id of the shape a connector starts at.
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub start_arrowhead: Option<String>,
    #[serde(default)]
    pub end_arrowhead: Option<String>,
    #[serde(default)]
    pub stroke_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub stroke_style: Option<StrokeStyle>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub roundness: Option<Roundness>,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

impl SkeletonElement {
    fn bare(kind: ElementKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            id: None,
            x,
            y,
            width: None,
            height: None,
            label: None,
            text: None,
            font_size: None,
            points: None,
            start: None,
            end: None,
            start_arrowhead: None,
            end_arrowhead: None,
            stroke_color: None,
            background_color: None,
            stroke_style: None,
            stroke_width: None,
            roundness: None,
            group_ids: Vec::new(),
        }
    }

    pub fn shape(kind: ElementKind, id: impl Into<String>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            id: Some(id.into()),
            width: Some(w),
            height: Some(h),
            ..Self::bare(kind, x, y)
        }
    }

    /// An arrow through absolute `points`; the first point becomes `(x, y)`.
    pub fn arrow(points: &[Point]) -> Self {
        let origin = points.first().copied().unwrap_or(Point::ORIGIN);
        let relative = points
            .iter()
            .map(|p| Point(p.0 - origin.0, p.1 - origin.1))
            .collect();
        Self {
            points: Some(relative),
            end_arrowhead: Some("arrow".to_string()),
            ..Self::bare(ElementKind::Arrow, origin.0, origin.1)
        }
    }

    /// A plain line through absolute `points`.
    pub fn line(points: &[Point]) -> Self {
        Self {
            kind: ElementKind::Line,
            end_arrowhead: None,
            ..Self::arrow(points)
        }
    }

    pub fn text(content: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::bare(ElementKind::Text, x, y)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(SkeletonLabel::new(text));
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        if let Some(label) = self.label.as_mut() {
            label.font_size.get_or_insert(size);
        }
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Binds a connector to the skeleton ids of its endpoints.
    pub fn connecting(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    pub fn with_stroke_style(mut self, style: StrokeStyle) -> Self {
        self.stroke_style = Some(style);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_roundness(mut self, roundness: Roundness) -> Self {
        self.roundness = Some(roundness);
        self
    }

    pub fn with_arrowheads(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.start_arrowhead = start.map(str::to_string);
        self.end_arrowhead = end.map(str::to_string);
        self
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }
}

/// What a layout engine returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonScene {
    pub elements: Vec<SkeletonElement>,
    #[serde(default)]
    pub files: BinaryFiles,
}

impl SkeletonScene {
    pub fn new(elements: Vec<SkeletonElement>) -> Self {
        Self {
            elements,
            files: BinaryFiles::new(),
        }
    }
}
