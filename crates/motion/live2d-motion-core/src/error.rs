//! Error type shared by the motion-core modules.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    /// An index outside both the real and the phantom slots of a store.
    #[error("{kind} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid motion data: {0}")]
    InvalidMotion(String),

    #[error("invalid pose data: {0}")]
    InvalidPose(String),

    #[error("invalid physics data: {0}")]
    InvalidPhysics(String),
}

pub type Result<T> = std::result::Result<T, MotionError>;
