//! Effect configuration.

use serde::{Deserialize, Serialize};

/// Which parameter value means "eye closed" for eye-blink output.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum BlinkPolarity {
    /// 1 = open, 0 = closed.
    #[default]
    CloseAtZero,
    /// Output is negated: -1 = open, 0 = closed.
    SignInverted,
}

/// Eye-blink timing. All durations are seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeBlinkConfig {
    /// Mean spacing of blinks; the next blink lands within `[now, now + 2 * interval - 1]`.
    pub interval_seconds: f32,
    pub closing_seconds: f32,
    pub closed_seconds: f32,
    pub opening_seconds: f32,
    pub polarity: BlinkPolarity,
}

impl Default for EyeBlinkConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 4.0,
            closing_seconds: 0.1,
            closed_seconds: 0.05,
            opening_seconds: 0.15,
            polarity: BlinkPolarity::CloseAtZero,
        }
    }
}

/// Pose fade used when a pose document gives none (or a non-positive one).
pub const DEFAULT_POSE_FADE_SECONDS: f32 = 0.5;
