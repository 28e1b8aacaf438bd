use thiserror::Error;

use crate::config::AntialiasMode;

/// Failures the rig can encounter.
///
/// Only [`RigError::Configuration`] is fatal; everything else is logged at the
/// frame boundary and the affected item or pass degrades.
#[derive(Debug, Error)]
pub enum RigError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("element {index} has no image or video child")]
    ElementResolution { index: usize },

    #[error("antialiasing path `{mode}` unavailable: {reason}")]
    ResourceUnavailable { mode: AntialiasMode, reason: String },

    #[error("unrecognized transform component `{0}`")]
    TransformParse(String),

    #[error("gpu error: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, RigError>;
