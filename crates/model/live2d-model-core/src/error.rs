use live2d_motion_core::MotionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model settings have no Moc file reference")]
    MissingMoc,

    #[error("model settings list no textures")]
    MissingTextures,

    /// The texture entry at this index is empty.
    #[error("texture reference {0} is empty")]
    InvalidTexture(usize),

    #[error("framework is not initialized")]
    FrameworkNotInitialized,

    #[error(transparent)]
    Motion(#[from] MotionError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
