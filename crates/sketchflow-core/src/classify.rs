//! Routing of generation payloads.
//!
//! A payload is either scene data (a JSON array of candidates, or an object with `elements`
//! and optional `files`) or description text. JSON that fails to parse is taken as
//! description text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::convert::{ConversionError, Converter};
use crate::generation::strip_code_fences;
use crate::normalize::Normalizer;
use crate::scene::{Scene, files_from_value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("the generation payload is empty")]
    EmptyResponse,
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// How a payload was recognized.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    SceneArray(Vec<Value>),
    SceneObject { elements: Value, files: Value },
    Description(String),
}

impl Payload {
    /// Recognizes `text` after stripping code fences; `None` when nothing is left.
    pub fn parse(text: &str) -> Option<Self> {
        let text = strip_code_fences(text);
        if text.is_empty() {
            return None;
        }
        let payload = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => Self::SceneArray(items),
            Ok(Value::Object(mut obj)) if obj.contains_key("elements") => Self::SceneObject {
                elements: obj.remove("elements").unwrap_or(Value::Null),
                files: obj.remove("files").unwrap_or(Value::Null),
            },
            _ => Self::Description(text),
        };
        Some(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchOrigin {
    SceneArray,
    SceneObject,
    Description,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBatch {
    #[serde(flatten)]
    pub scene: Scene,
    pub origin: BatchOrigin,
    /// The description the scene was converted from, on the description path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    normalizer: Normalizer,
    converter: Converter,
}

impl Classifier {
    pub fn new(normalizer: Normalizer, converter: Converter) -> Self {
        Self {
            normalizer,
            converter,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn classify(&self, payload: &str) -> Result<ElementBatch, ClassifyError> {
        let payload = Payload::parse(payload).ok_or(ClassifyError::EmptyResponse)?;

        let batch = match payload {
            Payload::SceneArray(items) => {
                tracing::debug!(candidates = items.len(), "payload is a scene array");
                let elements = self.normalizer.normalize_slice(&items);
                warn_if_all_dropped(items.len(), elements.len());
                ElementBatch {
                    scene: Scene::new(elements),
                    origin: BatchOrigin::SceneArray,
                    description: None,
                }
            }
            Payload::SceneObject { elements, files } => {
                let candidates = elements.as_array().map_or(0, Vec::len);
                tracing::debug!(candidates, "payload is a scene object");
                let normalized = self.normalizer.normalize(&elements);
                warn_if_all_dropped(candidates, normalized.len());
                ElementBatch {
                    scene: Scene::with_files(normalized, files_from_value(&files)),
                    origin: BatchOrigin::SceneObject,
                    description: None,
                }
            }
            Payload::Description(text) => {
                tracing::debug!(bytes = text.len(), "payload is description text");
                let scene = self.converter.convert(&text)?;
                ElementBatch {
                    scene,
                    origin: BatchOrigin::Description,
                    description: Some(text),
                }
            }
        };
        Ok(batch)
    }
}

fn warn_if_all_dropped(candidates: usize, kept: usize) {
    if candidates > 0 && kept == 0 {
        tracing::warn!(candidates, "every candidate element was dropped");
    }
}
