//! Reference [`CoreModel`]: meshes deformed by per-parameter linear vertex morphs.
//!
//! Vertex positions are `base + sum(delta_k * value_k)` over the morphs of a mesh; opacity
//! is the mesh's own opacity times the opacity of its parent part. Flags are derived by
//! comparing each update's result with the previous one.

use live2d_motion_core::{ParameterDef, PartDef};
use serde::{Deserialize, Serialize};

use crate::core_model::{CanvasInfo, CoreModel};
use crate::drawable::{BlendMode, Drawable, DynamicFlags};

/// Vertex offsets per unit of one parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexMorph {
    pub parameter: usize,
    /// Interleaved x/y deltas; same length as the mesh's base positions.
    pub deltas: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshDef {
    pub id: String,
    /// Index of the parent part; its opacity multiplies the mesh opacity.
    #[serde(default)]
    pub part: Option<usize>,
    #[serde(default)]
    pub texture_index: usize,
    pub base_positions: Vec<f32>,
    #[serde(default)]
    pub uvs: Vec<f32>,
    #[serde(default)]
    pub indices: Vec<u16>,
    #[serde(default)]
    pub morphs: Vec<VertexMorph>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub render_order: i32,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default)]
    pub culling: bool,
    #[serde(default)]
    pub masks: Vec<usize>,
}

fn default_opacity() -> f32 {
    1.0
}

impl MeshDef {
    pub fn new(id: impl Into<String>, base_positions: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            part: None,
            texture_index: 0,
            base_positions,
            uvs: Vec::new(),
            indices: Vec::new(),
            morphs: Vec::new(),
            opacity: 1.0,
            render_order: 0,
            blend_mode: BlendMode::Normal,
            culling: false,
            masks: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: usize) -> Self {
        self.part = Some(part);
        self
    }

    pub fn with_morph(mut self, parameter: usize, deltas: Vec<f32>) -> Self {
        self.morphs.push(VertexMorph { parameter, deltas });
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorphMesh {
    canvas: CanvasInfo,
    parameters: Vec<ParameterDef>,
    parts: Vec<PartDef>,
    meshes: Vec<MeshDef>,
    #[serde(skip)]
    drawables: Vec<Drawable>,
    #[serde(skip)]
    updated_once: bool,
}

impl MorphMesh {
    pub fn new(
        canvas: CanvasInfo,
        parameters: Vec<ParameterDef>,
        parts: Vec<PartDef>,
        meshes: Vec<MeshDef>,
    ) -> Self {
        let drawables = meshes.iter().map(initial_drawable).collect();
        Self {
            canvas,
            parameters,
            parts,
            meshes,
            drawables,
            updated_once: false,
        }
    }

    pub fn meshes(&self) -> &[MeshDef] {
        &self.meshes
    }
}

fn initial_drawable(mesh: &MeshDef) -> Drawable {
    Drawable {
        id: mesh.id.clone(),
        texture_index: mesh.texture_index,
        vertex_positions: mesh.base_positions.clone(),
        uvs: mesh.uvs.clone(),
        indices: mesh.indices.clone(),
        render_order: mesh.render_order,
        opacity: mesh.opacity,
        blend_mode: mesh.blend_mode,
        culling: mesh.culling,
        masks: mesh.masks.clone(),
        flags: DynamicFlags {
            is_visible: mesh.opacity > 0.0,
            ..DynamicFlags::default()
        },
    }
}

impl CoreModel for MorphMesh {
    fn canvas(&self) -> CanvasInfo {
        self.canvas
    }

    fn parameter_defs(&self) -> Vec<ParameterDef> {
        self.parameters.clone()
    }

    fn part_defs(&self) -> Vec<PartDef> {
        self.parts.clone()
    }

    fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    fn update(&mut self, parameters: &[f32], part_opacities: &[f32]) {
        if self.drawables.len() != self.meshes.len() {
            self.drawables = self.meshes.iter().map(initial_drawable).collect();
        }
        let first = !self.updated_once;
        self.updated_once = true;

        for (mesh, drawable) in self.meshes.iter().zip(self.drawables.iter_mut()) {
            drawable.flags.clear_changes();

            let mut positions = mesh.base_positions.clone();
            for morph in &mesh.morphs {
                let value = parameters.get(morph.parameter).copied().unwrap_or(0.0);
                for (p, d) in positions.iter_mut().zip(&morph.deltas) {
                    *p += d * value;
                }
            }

            let part_opacity = mesh
                .part
                .and_then(|i| part_opacities.get(i))
                .copied()
                .unwrap_or(1.0);
            let opacity = mesh.opacity * part_opacity;
            let visible = opacity > 0.0;

            let flags = &mut drawable.flags;
            flags.vertex_positions_did_change = first || positions != drawable.vertex_positions;
            flags.opacity_did_change = first || opacity != drawable.opacity;
            flags.visibility_did_change = first || visible != flags.is_visible;
            flags.render_order_did_change = first || mesh.render_order != drawable.render_order;
            flags.is_visible = visible;

            drawable.vertex_positions = positions;
            drawable.opacity = opacity;
            drawable.render_order = mesh.render_order;
        }
    }
}
