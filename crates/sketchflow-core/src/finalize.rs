//! Skeleton elements → canonical elements.

use std::collections::HashMap;
use std::sync::Arc;

use crate::element::{
    BoundElement, CanonicalElement, DEFAULT_FONT_SIZE, DEFAULT_HEIGHT, DEFAULT_LINE_HEIGHT,
    DEFAULT_SEGMENT_LENGTH, DEFAULT_WIDTH, LinearData, Point, PointBinding, TextData,
};
use crate::ids::IdAllocator;
use crate::measure::{CharWidthTextMeasurer, TextMeasurer, TextStyle, estimate_width};
use crate::normalize::bound_text;
use crate::skeleton::SkeletonElement;

/// Turns provisional layout output into canonical elements with ids, style defaults, bound
/// labels and connector bindings.
pub trait SceneFinalizer {
    fn finalize(&self, skeleton: Vec<SkeletonElement>) -> Vec<CanonicalElement>;
}

#[derive(Clone)]
pub struct SkeletonFinalizer {
    measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub font_size: f64,
    pub line_height: f64,
}

impl std::fmt::Debug for SkeletonFinalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkeletonFinalizer")
            .field("font_size", &self.font_size)
            .field("line_height", &self.line_height)
            .finish_non_exhaustive()
    }
}

impl Default for SkeletonFinalizer {
    fn default() -> Self {
        Self::new(Arc::new(CharWidthTextMeasurer::default()))
    }
}

impl SkeletonFinalizer {
    pub fn new(measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        Self {
            measurer,
            font_size: DEFAULT_FONT_SIZE,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    fn text_box(&self, text: &str, font_size: f64) -> (f64, f64) {
        let style = TextStyle {
            font_family: None,
            font_size,
            line_height: self.line_height,
        };
        match self.measurer.measure(text, &style) {
            Some(m) => (m.width, m.height),
            None => {
                let lines = text.lines().count().max(1) as f64;
                (
                    estimate_width(text, font_size),
                    lines * font_size * self.line_height,
                )
            }
        }
    }

    fn build(&self, sk: &SkeletonElement, id: String) -> CanonicalElement {
        let mut el = CanonicalElement::new(sk.kind.clone(), id);
        el.x = sk.x;
        el.y = sk.y;
        el.width = sk.width.unwrap_or(DEFAULT_WIDTH).abs();
        el.height = sk.height.unwrap_or(DEFAULT_HEIGHT).abs();
        if let Some(c) = &sk.stroke_color {
            el.stroke_color = c.clone();
        }
        if let Some(c) = &sk.background_color {
            el.background_color = c.clone();
        }
        el.stroke_style = sk.stroke_style.unwrap_or(el.stroke_style);
        el.stroke_width = sk.stroke_width.unwrap_or(el.stroke_width);
        el.roundness = sk.roundness;
        el.group_ids = sk.group_ids.clone();

        if sk.kind.is_linear() {
            let mut points = sk
                .points
                .clone()
                .filter(|p| p.len() >= 2)
                .unwrap_or_else(|| vec![Point::ORIGIN, Point(DEFAULT_SEGMENT_LENGTH, 0.0)]);
            let first = points[0];
            if first != Point::ORIGIN {
                el.x += first.0;
                el.y += first.1;
                for p in &mut points {
                    *p = Point(p.0 - first.0, p.1 - first.1);
                }
            }
            let mut data = LinearData::new(points);
            (el.width, el.height) = data.extent();
            data.start_arrowhead = sk.start_arrowhead.clone();
            data.end_arrowhead = sk.end_arrowhead.clone();
            el.linear = Some(data);
        } else if sk.kind.is_text() {
            let content = sk.text.clone().unwrap_or_default();
            let font_size = sk.font_size.unwrap_or(self.font_size);
            let (w, h) = self.text_box(&content, font_size);
            el.width = sk.width.unwrap_or(w);
            el.height = sk.height.unwrap_or(h);
            el.text = Some(TextData {
                font_size,
                line_height: self.line_height,
                ..TextData::new(content)
            });
        }
        el
    }

    fn label(&self, host: &CanonicalElement, sk: &SkeletonElement, id: String) -> Option<CanonicalElement> {
        let label = sk.label.as_ref().filter(|l| !l.text.trim().is_empty())?;
        let font_size = label.font_size.or(sk.font_size).unwrap_or(self.font_size);
        let size = self.text_box(&label.text, font_size);
        let center = match &host.linear {
            Some(data) => {
                let anchor = data.label_anchor();
                (host.x + anchor.0, host.y + anchor.1)
            }
            None => host.center(),
        };
        let mut text = bound_text(
            id,
            &label.text,
            &host.id,
            center,
            size,
            font_size,
            self.line_height,
        );
        if let Some(color) = &label.stroke_color {
            text.stroke_color = color.clone();
        }
        Some(text)
    }
}

impl SceneFinalizer for SkeletonFinalizer {
    fn finalize(&self, skeleton: Vec<SkeletonElement>) -> Vec<CanonicalElement> {
        let mut ids = IdAllocator::new();
        let assigned: Vec<String> = skeleton
            .iter()
            .map(|sk| ids.claim(sk.id.as_deref()))
            .collect();

        // Skeleton id → canonical id; the first skeleton claiming an id owns it.
        let mut by_skeleton_id: HashMap<&str, &str> = HashMap::new();
        for (sk, id) in skeleton.iter().zip(&assigned) {
            if let Some(sk_id) = sk.id.as_deref() {
                by_skeleton_id.entry(sk_id).or_insert(id.as_str());
            }
        }

        let mut out = Vec::with_capacity(skeleton.len());
        let mut arrow_refs: Vec<(String, String)> = Vec::new();

        for (sk, id) in skeleton.iter().zip(&assigned) {
            let mut el = self.build(sk, id.clone());

            if let Some(data) = el.linear.as_mut() {
                let mut resolve = |end: &Option<String>| -> Option<PointBinding> {
                    let target = end.as_deref()?;
                    match by_skeleton_id.get(target) {
                        Some(host) => {
                            arrow_refs.push(((*host).to_string(), id.clone()));
                            Some(PointBinding::to(*host))
                        }
                        None => {
                            tracing::debug!(connector = %id, endpoint = target, "connector endpoint not found");
                            None
                        }
                    }
                };
                data.start_binding = resolve(&sk.start);
                data.end_binding = resolve(&sk.end);
            }

            let label = if sk.label.is_some() {
                let label_id = ids.claim_derived(&format!("text-{id}"));
                self.label(&el, sk, label_id)
            } else {
                None
            };
            if let Some(text) = &label {
                el.bind_label(text.id.clone());
            }
            out.push(el);
            out.extend(label);
        }

        for (host_id, arrow_id) in arrow_refs {
            if let Some(host) = out.iter_mut().find(|e| e.id == host_id) {
                host.add_bound_element(BoundElement::arrow(arrow_id));
            }
        }

        tracing::debug!(
            skeleton = assigned.len(),
            elements = out.len(),
            "finalized skeleton"
        );
        out
    }
}
