//! The opaque model provider seam.
//!
//! The binary model format is out of scope; anything that can expose parameter and part
//! definitions and turn final parameter values into drawables plugs in here.

use std::fmt;

use live2d_motion_core::{ParameterDef, PartDef};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::drawable::Drawable;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasInfo {
    pub width_pixels: f32,
    pub height_pixels: f32,
    pub origin_pixels: Vector2<f32>,
    pub pixels_per_unit: f32,
}

impl CanvasInfo {
    /// Canvas extent in model units.
    pub fn size_in_units(&self) -> (f32, f32) {
        if self.pixels_per_unit > 0.0 {
            (
                self.width_pixels / self.pixels_per_unit,
                self.height_pixels / self.pixels_per_unit,
            )
        } else {
            (self.width_pixels, self.height_pixels)
        }
    }
}

pub trait CoreModel: fmt::Debug {
    fn canvas(&self) -> CanvasInfo;

    fn parameter_defs(&self) -> Vec<ParameterDef>;

    fn part_defs(&self) -> Vec<PartDef>;

    fn drawables(&self) -> &[Drawable];

    /// Recompute every drawable from the final values of this frame and refresh the
    /// dynamic flags so they describe the change since the previous call.
    fn update(&mut self, parameters: &[f32], part_opacities: &[f32]);
}
