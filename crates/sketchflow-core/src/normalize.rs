//! Candidate elements → canonical elements.
//!
//! The normalizer never fails. Every candidate is handled on its own: a candidate that cannot
//! be decoded is dropped with a warning and its siblings are unaffected. Missing fields take
//! their defaults, out-of-range geometry is repaired, and a shape carrying a `label` gets a
//! separate text element bound to it.

use std::sync::Arc;

use serde_json::Value;

use crate::candidate::{CandidateBody, CommonFields, DecodedCandidate, LinearFields, TextFields};
use crate::config::NormalizeConfig;
use crate::element::{
    CanonicalElement, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_HEIGHT, DEFAULT_LINE_HEIGHT,
    DEFAULT_ROUGHNESS, DEFAULT_SEGMENT_LENGTH, DEFAULT_STROKE_WIDTH, DEFAULT_WIDTH, ElementKind,
    LinearData, Point, TextAlign, TextData, VerticalAlign,
};
use crate::ids::IdAllocator;
use crate::measure::{CharWidthTextMeasurer, TextMeasurer, TextStyle, estimate_width};

#[derive(Clone)]
pub struct Normalizer {
    measurer: Option<Arc<dyn TextMeasurer + Send + Sync>>,
    config: NormalizeConfig,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("measurer", &self.measurer.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_measurer(Arc::new(CharWidthTextMeasurer::default()))
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label widths fall back to the character-count estimate.
    pub fn without_measurer() -> Self {
        Self {
            measurer: None,
            config: NormalizeConfig::default(),
        }
    }

    pub fn with_measurer(measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        Self {
            measurer: Some(measurer),
            config: NormalizeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: NormalizeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalizes a JSON value expected to be an array of candidates. Anything else yields an
    /// empty result.
    pub fn normalize(&self, input: &Value) -> Vec<CanonicalElement> {
        match input.as_array() {
            Some(items) => self.normalize_slice(items),
            None => {
                tracing::warn!(
                    found = json_type_name(input),
                    "element data is not an array; nothing to normalize"
                );
                Vec::new()
            }
        }
    }

    pub fn normalize_slice(&self, candidates: &[Value]) -> Vec<CanonicalElement> {
        let mut ids = IdAllocator::new();
        let mut out = Vec::with_capacity(candidates.len());

        for (index, raw) in candidates.iter().enumerate() {
            let candidate = match DecodedCandidate::decode(raw) {
                Ok(c) => c,
                Err(reason) => {
                    tracing::warn!(index, %reason, "dropping candidate element");
                    continue;
                }
            };
            self.emit(candidate, &mut ids, &mut out);
        }

        tracing::debug!(
            candidates = candidates.len(),
            elements = out.len(),
            "normalized element batch"
        );
        out
    }

    fn emit(
        &self,
        candidate: DecodedCandidate,
        ids: &mut IdAllocator,
        out: &mut Vec<CanonicalElement>,
    ) {
        let DecodedCandidate { kind, common, body } = candidate;
        let id = ids.claim(common.id.as_deref());
        let mut el = CanonicalElement::new(kind, id);
        apply_common(&mut el, &common);

        match body {
            CandidateBody::Linear(fields) => {
                apply_linear(&mut el, &common, fields);
                out.push(el);
            }
            CandidateBody::Text(fields) => {
                apply_text(&mut el, fields);
                out.push(el);
            }
            CandidateBody::Shape { label } => {
                let Some(label) = label else {
                    out.push(el);
                    return;
                };
                let text_id = ids.claim_derived(&format!("text-{}", el.id));
                let text = self.label_for(&el, text_id, &label);
                el.bind_label(text.id.clone());
                tracing::debug!(host = %el.id, text = %text.id, "synthesized bound label");
                out.push(el);
                out.push(text);
            }
        }
    }

    fn label_for(&self, host: &CanonicalElement, text_id: String, label: &str) -> CanonicalElement {
        let font_size = self.config.label_font_size;
        let style = TextStyle {
            font_family: None,
            font_size,
            line_height: self.config.line_height,
        };
        let measured = self.measurer.as_ref().and_then(|m| m.measure(label, &style));
        let width = match measured {
            Some(metrics) => (metrics.width * self.config.label_padding)
                .max(self.config.min_label_width),
            None => estimate_width(label, font_size).max(self.config.min_label_width),
        };
        let height = font_size * self.config.line_height;

        bound_text(
            text_id,
            label,
            &host.id,
            host.center(),
            (width, height),
            font_size,
            self.config.line_height,
        )
    }
}

/// Normalizes with the default measurer and config.
pub fn normalize(input: &Value) -> Vec<CanonicalElement> {
    Normalizer::default().normalize(input)
}

/// A text element centered on `center` and bound to `container_id`.
pub(crate) fn bound_text(
    id: String,
    content: &str,
    container_id: &str,
    center: (f64, f64),
    (width, height): (f64, f64),
    font_size: f64,
    line_height: f64,
) -> CanonicalElement {
    let mut text = CanonicalElement::new(ElementKind::Text, id);
    text.x = center.0 - width / 2.0;
    text.y = center.1 - height / 2.0;
    text.width = width;
    text.height = height;
    text.text = Some(TextData {
        font_size,
        line_height,
        ..TextData::bound_to(content, container_id)
    });
    text
}

fn apply_common(el: &mut CanonicalElement, c: &CommonFields) {
    el.x = c.x.unwrap_or(el.x);
    el.y = c.y.unwrap_or(el.y);

    let width = c.width.unwrap_or(DEFAULT_WIDTH);
    let height = c.height.unwrap_or(DEFAULT_HEIGHT);
    // Linear elements keep their origin; the points carry the direction.
    if !el.kind.is_linear() {
        if width < 0.0 {
            el.x += width;
        }
        if height < 0.0 {
            el.y += height;
        }
    }
    el.width = width.abs();
    el.height = height.abs();

    el.angle = c.angle.unwrap_or(el.angle);
    if let Some(color) = &c.stroke_color {
        el.stroke_color = color.clone();
    }
    if let Some(color) = &c.background_color {
        el.background_color = color.clone();
    }
    el.fill_style = c.fill_style.unwrap_or(el.fill_style);
    el.stroke_style = c.stroke_style.unwrap_or(el.stroke_style);
    el.stroke_width = c
        .stroke_width
        .filter(|w| *w >= 0.0)
        .unwrap_or(DEFAULT_STROKE_WIDTH);
    el.roughness = c
        .roughness
        .filter(|r| *r >= 0.0)
        .unwrap_or(DEFAULT_ROUGHNESS);
    el.opacity = c.opacity.map(|o| o.clamp(0.0, 100.0)).unwrap_or(el.opacity);

    if let Some(groups) = &c.group_ids {
        el.group_ids = groups.clone();
    }
    el.frame_id = c.frame_id.clone();
    el.roundness = c.roundness;
    el.seed = c.seed.unwrap_or(el.seed);
    el.version = c.version.unwrap_or(el.version);
    el.version_nonce = c.version_nonce.unwrap_or(el.version_nonce);
    el.is_deleted = c.is_deleted.unwrap_or(false);
    el.locked = c.locked.unwrap_or(false);
    el.updated = c.updated.unwrap_or(el.updated);
    el.bound_elements = c.bound_elements.clone();
    el.link = c.link.clone();
}

fn apply_linear(el: &mut CanonicalElement, c: &CommonFields, fields: LinearFields) {
    let sized = c.width.is_some() && c.height.is_some();
    let mut data = if let Some(mut points) = fields.points {
        let first = points[0];
        if first != Point::ORIGIN {
            el.x += first.0;
            el.y += first.1;
            for p in &mut points {
                *p = Point(p.0 - first.0, p.1 - first.1);
            }
        }
        let data = LinearData::new(points);
        if !sized {
            (el.width, el.height) = data.extent();
        }
        data
    } else if let Some(ends) = fields.endpoints {
        let dx = ends.end.0 - ends.start.0;
        let dy = ends.end.1 - ends.start.1;
        el.x = ends.start.0;
        el.y = ends.start.1;
        el.width = dx.abs();
        el.height = dy.abs();
        LinearData::new(vec![Point::ORIGIN, Point(dx, dy)])
    } else {
        let data = LinearData::new(vec![Point::ORIGIN, Point(DEFAULT_SEGMENT_LENGTH, 0.0)]);
        if !sized {
            (el.width, el.height) = data.extent();
        }
        data
    };

    data.start_binding = fields.start_binding;
    data.end_binding = fields.end_binding;
    data.start_arrowhead = fields.start_arrowhead;
    data.end_arrowhead = fields.end_arrowhead.or_else(|| {
        matches!(el.kind, ElementKind::Arrow).then(|| "arrow".to_string())
    });
    el.linear = Some(data);
}

fn apply_text(el: &mut CanonicalElement, fields: TextFields) {
    let content = fields.text.unwrap_or_default();
    let bound = fields.container_id.is_some();
    el.text = Some(TextData {
        original_text: content.clone(),
        text: content,
        font_size: fields.font_size.unwrap_or(DEFAULT_FONT_SIZE),
        font_family: fields.font_family.unwrap_or(DEFAULT_FONT_FAMILY),
        text_align: fields.text_align.unwrap_or(if bound {
            TextAlign::Center
        } else {
            TextAlign::Left
        }),
        vertical_align: fields.vertical_align.unwrap_or(if bound {
            VerticalAlign::Middle
        } else {
            VerticalAlign::Top
        }),
        line_height: fields.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
        container_id: fields.container_id,
    });
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
