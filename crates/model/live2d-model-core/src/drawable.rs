//! Renderer-facing drawable state.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiplicative,
}

/// Per-update change flags. A renderer re-uploads only what a set flag names.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DynamicFlags {
    pub is_visible: bool,
    pub visibility_did_change: bool,
    pub opacity_did_change: bool,
    pub render_order_did_change: bool,
    pub vertex_positions_did_change: bool,
}

impl DynamicFlags {
    #[inline]
    pub fn any_changed(&self) -> bool {
        self.visibility_did_change
            || self.opacity_did_change
            || self.render_order_did_change
            || self.vertex_positions_did_change
    }

    #[inline]
    pub fn clear_changes(&mut self) {
        self.visibility_did_change = false;
        self.opacity_did_change = false;
        self.render_order_did_change = false;
        self.vertex_positions_did_change = false;
    }
}

/// One renderable mesh after the latest core update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    pub id: String,
    pub texture_index: usize,
    /// Interleaved x/y pairs in model units.
    pub vertex_positions: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u16>,
    pub render_order: i32,
    pub opacity: f32,
    pub blend_mode: BlendMode,
    pub culling: bool,
    /// Indices of the drawables that mask this one.
    pub masks: Vec<usize>,
    pub flags: DynamicFlags,
}

impl Drawable {
    pub fn vertex_count(&self) -> usize {
        self.vertex_positions.len() / 2
    }
}
