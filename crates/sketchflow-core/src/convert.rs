//! Description text → scene.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::detect::DetectorRegistry;
use crate::finalize::{SceneFinalizer, SkeletonFinalizer};
use crate::scene::Scene;
use crate::skeleton::SkeletonScene;

/// Failure reported by a layout engine. The message is kept verbatim; the converter inspects
/// it to tell syntax errors apart from other failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LayoutError {
    pub message: String,
}

impl LayoutError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Whether the message describes a parse or syntax problem.
    pub fn is_syntax(&self) -> bool {
        let m = self.message.to_lowercase();
        m.contains("syntax") || m.contains("parse")
    }
}

/// Produces a provisional skeleton scene from description text.
pub trait LayoutEngine {
    fn layout(&self, text: &str, config: &LayoutConfig) -> Result<SkeletonScene, LayoutError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("the diagram description is empty")]
    EmptyInput,
    #[error("diagram type `{kind}` cannot be converted to a scene")]
    UnsupportedDiagram { kind: String },
    #[error("diagram syntax error: {message}")]
    Syntax { message: String },
    #[error("conversion produced no elements; check the diagram description")]
    EmptyResult,
    #[error("conversion failed: {message}")]
    ConversionFailed { message: String },
}

impl ConversionError {
    /// Stable machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_DIAGRAM",
            Self::UnsupportedDiagram { .. } => "UNSUPPORTED_DIAGRAM",
            Self::Syntax { .. } => "SYNTAX_ERROR",
            Self::EmptyResult => "EMPTY_RESULT",
            Self::ConversionFailed { .. } => "CONVERSION_FAILED",
        }
    }
}

impl From<LayoutError> for ConversionError {
    fn from(err: LayoutError) -> Self {
        if err.is_syntax() {
            Self::Syntax {
                message: err.message,
            }
        } else {
            Self::ConversionFailed {
                message: err.message,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    pub original_description: String,
    /// Epoch milliseconds.
    pub converted_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedScene {
    #[serde(flatten)]
    pub scene: Scene,
    pub metadata: ConversionMetadata,
}

#[derive(Clone)]
pub struct Converter {
    engine: Arc<dyn LayoutEngine + Send + Sync>,
    finalizer: Arc<dyn SceneFinalizer + Send + Sync>,
    detectors: DetectorRegistry,
    config: LayoutConfig,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Converter {
    pub fn new(engine: Arc<dyn LayoutEngine + Send + Sync>) -> Self {
        Self {
            engine,
            finalizer: Arc::new(SkeletonFinalizer::default()),
            detectors: DetectorRegistry::default(),
            config: LayoutConfig::default(),
        }
    }

    pub fn with_finalizer(mut self, finalizer: Arc<dyn SceneFinalizer + Send + Sync>) -> Self {
        self.finalizer = finalizer;
        self
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn convert(&self, description: &str) -> Result<Scene, ConversionError> {
        if description.trim().is_empty() {
            return Err(ConversionError::EmptyInput);
        }

        let kind = self.detectors.detect(description);
        if let Some(kind) = kind.filter(|k| !k.is_supported()) {
            tracing::info!(%kind, "refusing unsupported diagram kind");
            return Err(ConversionError::UnsupportedDiagram {
                kind: kind.keyword().to_string(),
            });
        }
        tracing::debug!(kind = ?kind, "converting description");

        let skeleton = self.engine.layout(description, &self.config).map_err(|err| {
            tracing::warn!(%err, "layout engine failed");
            ConversionError::from(err)
        })?;
        if skeleton.elements.is_empty() {
            return Err(ConversionError::EmptyResult);
        }

        let skeleton_len = skeleton.elements.len();
        let elements = self.finalizer.finalize(skeleton.elements);
        tracing::debug!(
            skeleton = skeleton_len,
            elements = elements.len(),
            files = skeleton.files.len(),
            "description converted"
        );
        Ok(Scene::with_files(elements, skeleton.files))
    }

    pub fn convert_with_metadata(&self, description: &str) -> Result<ConvertedScene, ConversionError> {
        let scene = self.convert(description)?;
        Ok(ConvertedScene {
            scene,
            metadata: ConversionMetadata {
                original_description: description.to_string(),
                converted_at: crate::ids::now_millis(),
            },
        })
    }
}
