use std::sync::Arc;

use serde_json::Value;
use sketchflow_core::{
    CanonicalElement, CharWidthTextMeasurer, ClassifyError, Classifier, ConversionError,
    Converter, ElementBatch, GenerationResponse, Normalizer, PipelineConfig, RepresentationMode,
    Result, Scene, SkeletonFinalizer, TextMeasurer,
};
use sketchflow_layout::BuiltinLayoutEngine;

/// Normalizer, converter and classifier built from one [`PipelineConfig`], all sharing the
/// same text measurer.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    classifier: Classifier,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_measurer(config, Some(Arc::new(CharWidthTextMeasurer::default())))
    }

    /// Without a measurer, every text width falls back to the character-count estimate.
    pub fn with_measurer(
        config: PipelineConfig,
        measurer: Option<Arc<dyn TextMeasurer + Send + Sync>>,
    ) -> Self {
        let normalizer = match &measurer {
            Some(m) => Normalizer::with_measurer(m.clone()),
            None => Normalizer::without_measurer(),
        }
        .with_config(config.normalize.clone());

        let layout_measurer: Arc<dyn TextMeasurer + Send + Sync> = match measurer {
            Some(m) => m,
            None => Arc::new(sketchflow_core::NoopTextMeasurer),
        };
        let engine = BuiltinLayoutEngine::new(layout_measurer.clone());
        let finalizer = SkeletonFinalizer::new(layout_measurer)
            .with_font_size(config.layout.font_size_px);
        let converter = Converter::new(Arc::new(engine))
            .with_finalizer(Arc::new(finalizer))
            .with_config(config.layout.clone());

        Self {
            config,
            classifier: Classifier::new(normalizer, converter),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        self.classifier.normalizer()
    }

    pub fn converter(&self) -> &Converter {
        self.classifier.converter()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn normalize(&self, candidates: &Value) -> Vec<CanonicalElement> {
        self.normalizer().normalize(candidates)
    }

    pub fn convert(&self, description: &str) -> std::result::Result<Scene, ConversionError> {
        self.converter().convert(description)
    }

    pub fn classify(&self, payload: &str) -> std::result::Result<ElementBatch, ClassifyError> {
        self.classifier.classify(payload)
    }

    /// Picks the payload `mode` asks for out of a backend response and classifies it.
    pub fn handle_response(
        &self,
        response: &GenerationResponse,
        mode: RepresentationMode,
    ) -> Result<ElementBatch> {
        let payload = response.payload(mode)?;
        let batch = self.classify(payload)?;
        tracing::debug!(
            origin = ?batch.origin,
            elements = batch.scene.len(),
            "generation response handled"
        );
        Ok(batch)
    }
}
