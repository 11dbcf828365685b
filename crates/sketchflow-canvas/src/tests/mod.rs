
use sketchflow_core::{CanonicalElement, ElementKind, Scene};

use crate::{Canvas, CanvasError};

/// Canvas double that records what the reconciler does to it.
#[derive(Debug, Default)]
pub(crate) struct RecordingCanvas {
    pub elements: Vec<CanonicalElement>,
    pub updates: usize,
    pub fits: usize,
    pub fail_fit: bool,
}

impl RecordingCanvas {
    pub(crate) fn failing() -> Self {
        Self {
            fail_fit: true,
            ..Self::default()
        }
    }
}

impl Canvas for RecordingCanvas {
    fn update_scene(&mut self, elements: &[CanonicalElement]) {
        self.elements = elements.to_vec();
        self.updates += 1;
    }

    fn scene_elements(&self) -> Vec<CanonicalElement> {
        self.elements.iter().filter(|e| !e.is_deleted).cloned().collect()
    }

    fn scroll_to_content(
        &mut self,
        _elements: &[CanonicalElement],
        fit_to_content: bool,
    ) -> Result<(), CanvasError> {
        assert!(fit_to_content);
        self.fits += 1;
        if self.fail_fit {
            return Err(CanvasError::Scroll {
                message: "viewport not measured yet".to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn boxes(prefix: &str, count: usize) -> Vec<CanonicalElement> {
    (0..count)
        .map(|i| CanonicalElement::new(ElementKind::Rectangle, format!("{prefix}-{i}")))
        .collect()
}

pub(crate) fn scene(prefix: &str, count: usize) -> Scene {
    Scene::new(boxes(prefix, count))
}
