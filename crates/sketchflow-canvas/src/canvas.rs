//! The live canvas seam.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sketchflow_core::{BinaryFiles, CanonicalElement};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas is not available")]
    Unavailable,
    #[error("scroll to content failed: {message}")]
    Scroll { message: String },
}

/// An interactive editor surface that renders a scene and reports user edits.
pub trait Canvas {
    /// Replaces the rendered scene.
    fn update_scene(&mut self, elements: &[CanonicalElement]);

    /// Elements currently rendered.
    fn scene_elements(&self) -> Vec<CanonicalElement>;

    fn scroll_to_content(
        &mut self,
        elements: &[CanonicalElement],
        fit_to_content: bool,
    ) -> Result<(), CanvasError>;
}

/// A change notification emitted by the canvas on every user-driven mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasChange {
    pub elements: Vec<CanonicalElement>,
    /// Opaque editor state (zoom, scroll, selection, ...).
    #[serde(default)]
    pub view_state: Value,
    #[serde(default)]
    pub files: BinaryFiles,
}

impl CanvasChange {
    pub fn new(elements: Vec<CanonicalElement>) -> Self {
        Self {
            elements,
            view_state: Value::Null,
            files: BinaryFiles::new(),
        }
    }
}
