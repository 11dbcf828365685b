#![forbid(unsafe_code)]

//! Diagram-to-scene pipeline core (headless).
//!
//! - [`normalize`]: repairs untrusted candidate elements into canonical elements
//! - [`convert`]: turns a textual diagram description into a scene through a pluggable
//!   [`LayoutEngine`] and [`SceneFinalizer`]
//! - [`classify`]: routes a generation payload to one of the two
//!
//! Nothing here touches a live canvas; see the `sketchflow-canvas` crate for that.

pub mod candidate;
pub mod classify;
pub mod config;
pub mod convert;
pub mod detect;
pub mod element;
pub mod error;
pub mod finalize;
pub mod generation;
pub mod ids;
pub mod measure;
pub mod normalize;
pub mod scene;
pub mod skeleton;

pub use classify::{BatchOrigin, ClassifyError, Classifier, ElementBatch, Payload};
pub use config::{ConfigError, CurveStyle, LayoutConfig, NormalizeConfig, PipelineConfig};
pub use convert::{
    ConversionError, ConversionMetadata, ConvertedScene, Converter, LayoutEngine, LayoutError,
};
pub use detect::{DetectorRegistry, DiagramKind, detect_diagram_kind};
pub use element::{
    BoundElement, BoundKind, CanonicalElement, ElementKind, FillStyle, LinearData, Point,
    PointBinding, Roundness, StrokeStyle, TextAlign, TextData, VerticalAlign,
};
pub use error::{Error, Result};
pub use finalize::{SceneFinalizer, SkeletonFinalizer};
pub use generation::{
    GenerationError, GenerationRequest, GenerationResponse, GenerationToken, GenerationTracker,
    RepresentationMode, strip_code_fences,
};
pub use measure::{CharWidthTextMeasurer, NoopTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
pub use normalize::Normalizer;
pub use scene::{BinaryFiles, FileData, Scene};
pub use skeleton::{SkeletonElement, SkeletonLabel, SkeletonScene};

#[cfg(test)]
mod tests;
