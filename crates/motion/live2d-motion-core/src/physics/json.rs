//! physics3.json raw structs and conversion into a [`PhysicsRig`](super::PhysicsRig).

use nalgebra::Vector2;
use serde::Deserialize;

use super::{NormalizationRange, PhysicsInput, PhysicsOutput, PhysicsParticle, PhysicsSource, PhysicsSubRig};
use crate::error::{MotionError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawPhysics {
    pub meta: RawMeta,
    pub physics_settings: Vec<RawSetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawMeta {
    #[serde(default)]
    pub effective_forces: Option<RawForces>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawForces {
    pub gravity: RawVec2,
    pub wind: RawVec2,
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawVec2 {
    pub x: f32,
    pub y: f32,
}

impl From<RawVec2> for Vector2<f32> {
    fn from(v: RawVec2) -> Self {
        Vector2::new(v.x, v.y)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawSetting {
    #[serde(default)]
    id: Option<String>,
    input: Vec<RawInput>,
    output: Vec<RawOutput>,
    vertices: Vec<RawVertex>,
    normalization: RawNormalization,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTarget {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawInput {
    source: RawTarget,
    weight: f32,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(default)]
    reflect: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOutput {
    destination: RawTarget,
    vertex_index: usize,
    scale: f32,
    weight: f32,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(default)]
    reflect: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawVertex {
    #[serde(default)]
    position: Option<RawVec2>,
    mobility: f32,
    delay: f32,
    acceleration: f32,
    radius: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNormalization {
    position: RawRange,
    angle: RawRange,
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRange {
    minimum: f32,
    default: f32,
    maximum: f32,
}

impl From<RawRange> for NormalizationRange {
    fn from(r: RawRange) -> Self {
        NormalizationRange {
            minimum: r.minimum,
            default: r.default,
            maximum: r.maximum,
        }
    }
}

fn source_kind(setting: &str, name: &str) -> Result<PhysicsSource> {
    match name {
        "X" => Ok(PhysicsSource::X),
        "Y" => Ok(PhysicsSource::Y),
        "Angle" => Ok(PhysicsSource::Angle),
        other => Err(MotionError::InvalidPhysics(format!(
            "setting '{setting}' uses unknown type '{other}'"
        ))),
    }
}

impl RawSetting {
    pub(super) fn into_sub_rig(self, index: usize) -> Result<PhysicsSubRig> {
        let name = self.id.unwrap_or_else(|| format!("#{index}"));
        if self.vertices.is_empty() {
            return Err(MotionError::InvalidPhysics(format!(
                "setting '{name}' has no vertices"
            )));
        }

        let inputs = self
            .input
            .into_iter()
            .map(|i| {
                Ok(PhysicsInput {
                    source_id: i.source.id,
                    weight: i.weight,
                    kind: source_kind(&name, &i.kind)?,
                    reflect: i.reflect,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs = self
            .output
            .into_iter()
            .map(|o| {
                Ok(PhysicsOutput {
                    destination_id: o.destination.id,
                    vertex_index: o.vertex_index,
                    scale: o.scale,
                    weight: o.weight,
                    kind: source_kind(&name, &o.kind)?,
                    reflect: o.reflect,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let particles = self
            .vertices
            .into_iter()
            .map(|v| {
                let mut p = PhysicsParticle::new(v.mobility, v.delay, v.acceleration, v.radius);
                if let Some(pos) = v.position {
                    p.authored_position = pos.into();
                }
                p
            })
            .collect();

        Ok(PhysicsSubRig {
            id: name,
            inputs,
            outputs,
            particles,
            normalization_position: self.normalization.position.into(),
            normalization_angle: self.normalization.angle.into(),
        })
    }
}
