mod convert;
mod normalize;

use std::sync::Arc;

use crate::{LayoutConfig, LayoutEngine, LayoutError, SkeletonScene};

/// Layout engine returning a fixed result, recording nothing.
pub(crate) struct FixedEngine(pub Result<SkeletonScene, LayoutError>);

impl LayoutEngine for FixedEngine {
    fn layout(&self, _text: &str, _config: &LayoutConfig) -> Result<SkeletonScene, LayoutError> {
        self.0.clone()
    }
}

pub(crate) fn fixed_engine(
    result: Result<SkeletonScene, LayoutError>,
) -> Arc<dyn LayoutEngine + Send + Sync> {
    Arc::new(FixedEngine(result))
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
