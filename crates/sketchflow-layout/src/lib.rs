#![forbid(unsafe_code)]

//! Built-in layout engine.
//!
//! Lays out flowchart/graph, state and sequence descriptions into skeleton scenes. This is a
//! small deterministic layered layout, not a reproduction of any particular renderer.

pub mod error;
pub mod flowchart;
pub mod graph;
pub mod layered;
pub mod lex;
pub mod sequence;
pub mod state;

use std::sync::Arc;

use sketchflow_core::measure::estimate_width;
use sketchflow_core::{
    CharWidthTextMeasurer, DetectorRegistry, DiagramKind, LayoutConfig, LayoutEngine,
    LayoutError, SkeletonScene, TextMeasurer, TextStyle,
};

pub use error::{Error, Result};

/// Distances used by the layouts, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Spacing {
    /// Gap between neighbours within a rank.
    pub node: f64,
    /// Gap between ranks.
    pub rank: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            node: 50.0,
            rank: 80.0,
            padding_x: 30.0,
            padding_y: 15.0,
            min_width: 120.0,
            min_height: 60.0,
        }
    }
}

/// Measured text box, or the character-count estimate when measurement is unavailable.
pub(crate) fn text_size(measurer: &dyn TextMeasurer, text: &str, font_size: f64) -> (f64, f64) {
    let style = TextStyle::sized(font_size);
    match measurer.measure(text, &style) {
        Some(m) => (m.width, m.height),
        None => {
            let lines = text.lines().count().max(1) as f64;
            let widest = text
                .lines()
                .map(|l| estimate_width(l, font_size))
                .fold(0.0, f64::max);
            (widest, lines * font_size * style.line_height)
        }
    }
}

#[derive(Clone)]
pub struct BuiltinLayoutEngine {
    text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    detectors: DetectorRegistry,
    spacing: Spacing,
}

impl std::fmt::Debug for BuiltinLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinLayoutEngine")
            .field("spacing", &self.spacing)
            .finish_non_exhaustive()
    }
}

impl Default for BuiltinLayoutEngine {
    fn default() -> Self {
        Self::new(Arc::new(CharWidthTextMeasurer::default()))
    }
}

impl BuiltinLayoutEngine {
    pub fn new(text_measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        Self {
            text_measurer,
            detectors: DetectorRegistry::default(),
            spacing: Spacing::default(),
        }
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn layout_description(&self, text: &str, config: &LayoutConfig) -> Result<SkeletonScene> {
        if text.len() > config.max_text_size {
            return Err(Error::TextTooLarge {
                size: text.len(),
                limit: config.max_text_size,
            });
        }

        let measurer = self.text_measurer.as_ref();
        let scene = match self.detectors.detect(text) {
            Some(DiagramKind::Flowchart) => {
                let graph = flowchart::parse_flowchart(text)?;
                check_edges(graph.edges.len(), config)?;
                layered::layout_graph(&graph, measurer, config, &self.spacing)
            }
            Some(DiagramKind::State) => {
                let graph = state::parse_state(text)?;
                check_edges(graph.edges.len(), config)?;
                layered::layout_graph(&graph, measurer, config, &self.spacing)
            }
            Some(DiagramKind::Sequence) => {
                let diagram = sequence::parse_sequence(text)?;
                check_edges(diagram.messages.len(), config)?;
                sequence::layout_sequence(&diagram, measurer, config, &self.spacing)
            }
            Some(other) => {
                return Err(Error::NoBuiltinLayout {
                    kind: other.keyword().to_string(),
                });
            }
            None => {
                let header = sketchflow_core::detect::header_token(text).unwrap_or("");
                return Err(Error::parse(
                    1,
                    format!("no diagram type detected for header `{header}`"),
                ));
            }
        };

        tracing::debug!(elements = scene.elements.len(), "layout complete");
        Ok(scene)
    }
}

fn check_edges(count: usize, config: &LayoutConfig) -> Result<()> {
    if count > config.max_edges {
        return Err(Error::TooManyEdges {
            count,
            limit: config.max_edges,
        });
    }
    Ok(())
}

impl LayoutEngine for BuiltinLayoutEngine {
    fn layout(
        &self,
        text: &str,
        config: &LayoutConfig,
    ) -> std::result::Result<SkeletonScene, LayoutError> {
        Ok(self.layout_description(text, config)?)
    }
}
