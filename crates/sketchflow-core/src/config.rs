//! Pipeline configuration.
//!
//! Every section deserializes with defaults, so a partial JSON document is a valid config.
//! Overrides are applied by deep-merging JSON onto the serialized defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    #[default]
    Linear,
    Basis,
}

/// Options handed to the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub curve: CurveStyle,
    pub font_size_px: f64,
    pub max_edges: usize,
    pub max_text_size: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            curve: CurveStyle::Linear,
            font_size_px: 20.0,
            max_edges: 500,
            max_text_size: 50_000,
        }
    }
}

/// Sizing of synthesized shape labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizeConfig {
    pub label_font_size: f64,
    /// Multiplier applied to the measured label width.
    pub label_padding: f64,
    pub min_label_width: f64,
    pub line_height: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            label_font_size: 14.0,
            label_padding: 1.3,
            min_label_width: 20.0,
            line_height: crate::element::DEFAULT_LINE_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub layout: LayoutConfig,
    pub normalize: NormalizeConfig,
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        Self::default().with_overrides(value)
    }

    /// Returns a copy with `overrides` deep-merged on top. Keys absent from `overrides` keep
    /// their current value.
    pub fn with_overrides(&self, overrides: &Value) -> Result<Self, ConfigError> {
        if !overrides.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let mut base = serde_json::to_value(self)?;
        deep_merge_value(&mut base, overrides);
        Ok(serde_json::from_value(base)?)
    }
}

pub(crate) fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_converter_settings() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.layout.curve, CurveStyle::Linear);
        assert_eq!(cfg.layout.font_size_px, 20.0);
        assert_eq!(cfg.layout.max_edges, 500);
        assert_eq!(cfg.layout.max_text_size, 50_000);
        assert_eq!(cfg.normalize.label_font_size, 14.0);
    }

    #[test]
    fn overrides_merge_nested_keys() {
        let cfg = PipelineConfig::default()
            .with_overrides(&json!({"layout": {"maxEdges": 10}}))
            .unwrap();
        assert_eq!(cfg.layout.max_edges, 10);
        assert_eq!(cfg.layout.max_text_size, 50_000);
    }

    #[test]
    fn partial_json_is_accepted() {
        let cfg = PipelineConfig::from_json_str(r#"{"normalize": {"labelPadding": 1.0}}"#).unwrap();
        assert_eq!(cfg.normalize.label_padding, 1.0);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }

    #[test]
    fn rejects_non_object_and_bad_types() {
        assert!(matches!(
            PipelineConfig::from_json_str("[1]"),
            Err(ConfigError::NotAnObject)
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"layout": {"curve": "zigzag"}}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
