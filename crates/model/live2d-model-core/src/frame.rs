use live2d_motion_core::FiredEvent;
use serde::{Deserialize, Serialize};

/// Result of one [`Live2DModel::update`](crate::Live2DModel::update).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFrame {
    /// Model clock after this frame, in seconds.
    pub time: f32,
    /// Whether any motion was playing this frame.
    pub motion_updated: bool,
    #[serde(default)]
    pub events: Vec<FiredEvent>,
    /// Final parameter values handed to the core, in model order.
    #[serde(default)]
    pub parameters: Vec<f32>,
    #[serde(default)]
    pub part_opacities: Vec<f32>,
    /// Indices of drawables with at least one change flag set.
    #[serde(default)]
    pub changed_drawables: Vec<usize>,
}

impl ModelFrame {
    #[inline]
    pub fn clear(&mut self) {
        self.motion_updated = false;
        self.events.clear();
        self.parameters.clear();
        self.part_opacities.clear();
        self.changed_drawables.clear();
    }
}
