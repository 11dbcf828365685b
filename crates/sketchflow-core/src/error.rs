use crate::classify::ClassifyError;
use crate::config::ConfigError;
use crate::convert::{ConversionError, LayoutError};
use crate::generation::GenerationError;
use crate::scene::FileDecodeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    FileDecode(#[from] FileDecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
