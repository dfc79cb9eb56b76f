use live2d_motion_core::EyeBlinkConfig;
use serde::{Deserialize, Serialize};

/// Per-model switches for the effect layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub eye_blink: EyeBlinkConfig,
    /// Run eye-blink even on frames where a motion updated.
    pub blink_during_motion: bool,
    pub breath: bool,
    pub physics: bool,
    pub pose: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            eye_blink: EyeBlinkConfig::default(),
            blink_during_motion: false,
            breath: true,
            physics: true,
            pose: true,
        }
    }
}
