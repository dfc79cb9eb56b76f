//! Pendulum physics: parameter inputs swing particle chains whose shape drives output
//! parameters.
//!
//! Per setting and frame:
//! 1. Inputs are normalized into a base translation and a base angle.
//! 2. The chain root moves to the (rotated) translation; every following particle is pulled
//!    by gravity and wind, damped by air resistance, and kept at its radius from its parent.
//! 3. Outputs read the translation or the angle between two chain links, then scale, clamp
//!    and blend the value into their destination parameter.

mod json;

use std::f32::consts::PI;

use hashbrown::HashSet;
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parameters::ParameterStore;

/// Weights in physics documents are percentages.
pub const MAXIMUM_WEIGHT: f32 = 100.0;
pub const AIR_RESISTANCE: f32 = 5.0;
/// Root x-movement below this fraction of the position range snaps to 0.
pub const MOVEMENT_THRESHOLD: f32 = 0.001;
/// Particle delays are authored against 30 fps.
const DELAY_FPS: f32 = 30.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PhysicsSource {
    X,
    Y,
    Angle,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRange {
    pub minimum: f32,
    pub default: f32,
    pub maximum: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsInput {
    pub source_id: String,
    pub weight: f32,
    pub kind: PhysicsSource,
    pub reflect: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsOutput {
    pub destination_id: String,
    /// Chain link `vertex_index - 1 -> vertex_index` is read; must be at least 1.
    pub vertex_index: usize,
    pub scale: f32,
    pub weight: f32,
    pub kind: PhysicsSource,
    pub reflect: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsParticle {
    pub mobility: f32,
    pub delay: f32,
    pub acceleration: f32,
    pub radius: f32,
    /// Position stored in the document; the rest pose is rebuilt from radii instead.
    pub authored_position: Vector2<f32>,
    pub initial_position: Vector2<f32>,
    pub position: Vector2<f32>,
    pub last_position: Vector2<f32>,
    pub last_gravity: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub force: Vector2<f32>,
}

impl PhysicsParticle {
    pub fn new(mobility: f32, delay: f32, acceleration: f32, radius: f32) -> Self {
        Self {
            mobility,
            delay,
            acceleration,
            radius,
            authored_position: Vector2::zeros(),
            initial_position: Vector2::zeros(),
            position: Vector2::zeros(),
            last_position: Vector2::zeros(),
            last_gravity: Vector2::new(0.0, 1.0),
            velocity: Vector2::zeros(),
            force: Vector2::zeros(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsSubRig {
    pub id: String,
    pub inputs: Vec<PhysicsInput>,
    pub outputs: Vec<PhysicsOutput>,
    pub particles: Vec<PhysicsParticle>,
    pub normalization_position: NormalizationRange,
    pub normalization_angle: NormalizationRange,
}

impl PhysicsSubRig {
    /// Hang the chain straight down (+y) from the origin, at rest.
    fn reset(&mut self) {
        let mut previous: Option<Vector2<f32>> = None;
        for p in &mut self.particles {
            p.initial_position = match previous {
                None => Vector2::zeros(),
                Some(prev) => prev + Vector2::new(0.0, p.radius),
            };
            p.position = p.initial_position;
            p.last_position = p.initial_position;
            p.last_gravity = Vector2::new(0.0, 1.0);
            p.velocity = Vector2::zeros();
            p.force = Vector2::zeros();
            previous = Some(p.initial_position);
        }
    }
}

/// All physics settings of a model plus the global forces.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsRig {
    pub settings: Vec<PhysicsSubRig>,
    pub gravity: Vector2<f32>,
    pub wind: Vector2<f32>,
}

#[derive(Clone, Debug)]
pub struct Physics {
    rig: PhysicsRig,
    /// Input ids already reported as missing from the model.
    warned_inputs: HashSet<String>,
}

impl Physics {
    pub fn new(mut rig: PhysicsRig) -> Self {
        for setting in &mut rig.settings {
            setting.reset();
        }
        Self {
            rig,
            warned_inputs: HashSet::new(),
        }
    }

    /// Parse a physics3.json document.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: json::RawPhysics = serde_json::from_str(s)?;
        let (gravity, wind) = match raw.meta.effective_forces {
            Some(forces) => (forces.gravity.into(), forces.wind.into()),
            None => (Vector2::new(0.0, -1.0), Vector2::zeros()),
        };
        let settings = raw
            .physics_settings
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.into_sub_rig(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(PhysicsRig {
            settings,
            gravity,
            wind,
        }))
    }

    pub fn rig(&self) -> &PhysicsRig {
        &self.rig
    }

    pub fn set_options(&mut self, gravity: Vector2<f32>, wind: Vector2<f32>) {
        self.rig.gravity = gravity;
        self.rig.wind = wind;
    }

    /// Input ids that were skipped because the model has no such parameter.
    pub fn missing_inputs(&self) -> impl Iterator<Item = &str> {
        self.warned_inputs.iter().map(String::as_str)
    }

    /// Return every chain to its rest pose.
    pub fn reset(&mut self) {
        for setting in &mut self.rig.settings {
            setting.reset();
        }
    }

    /// Step the simulation by `dt` seconds and write outputs. Non-positive `dt` is a no-op.
    pub fn evaluate(&mut self, store: &mut ParameterStore, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let PhysicsRig {
            settings,
            gravity,
            wind,
        } = &mut self.rig;
        let warned_inputs = &mut self.warned_inputs;

        for setting in settings.iter_mut() {
            let mut translation = Vector2::zeros();
            let mut angle = 0.0_f32;

            for input in &setting.inputs {
                let index = store.parameter_index(&input.source_id);
                let Some(bounds) = store.parameter_bounds(index) else {
                    if warned_inputs.insert(input.source_id.clone()) {
                        log::warn!("physics input '{}' has no real parameter", input.source_id);
                    }
                    continue;
                };
                let value = store.parameter(index).unwrap_or(bounds.default);
                let range = match input.kind {
                    PhysicsSource::Angle => setting.normalization_angle,
                    _ => setting.normalization_position,
                };
                let normalized = normalize_parameter_value(
                    value,
                    bounds.minimum,
                    bounds.maximum,
                    range,
                    input.reflect,
                ) * (input.weight / MAXIMUM_WEIGHT);
                match input.kind {
                    PhysicsSource::X => translation.x += normalized,
                    PhysicsSource::Y => translation.y += normalized,
                    PhysicsSource::Angle => angle += normalized,
                }
            }

            let translation = Rotation2::new((-angle).to_radians()) * translation;
            update_particles(
                &mut setting.particles,
                translation,
                angle,
                *wind,
                MOVEMENT_THRESHOLD * setting.normalization_position.maximum,
                dt,
            );

            for output in &setting.outputs {
                let i = output.vertex_index;
                if i < 1 || i >= setting.particles.len() {
                    continue;
                }
                let particles = &setting.particles;
                let link = particles[i].position - particles[i - 1].position;
                let mut value = match output.kind {
                    PhysicsSource::X => link.x,
                    PhysicsSource::Y => link.y,
                    PhysicsSource::Angle => {
                        let parent = if i >= 2 {
                            particles[i - 1].position - particles[i - 2].position
                        } else {
                            -*gravity
                        };
                        direction_to_radian(parent, link)
                    }
                };
                if output.reflect {
                    value = -value;
                }
                write_output(store, output, value * output.scale);
            }
        }
    }
}

fn write_output(store: &mut ParameterStore, output: &PhysicsOutput, value: f32) {
    // the store clamps real parameters before blending
    let weight = (output.weight / MAXIMUM_WEIGHT).min(1.0);
    store.set_parameter_by_id(&output.destination_id, value, weight);
}

/// Map `value` in `[minimum, maximum]` onto `range`, splitting at the parameter midpoint.
/// The result is negated unless `reflect` is set.
pub fn normalize_parameter_value(
    value: f32,
    minimum: f32,
    maximum: f32,
    range: NormalizationRange,
    reflect: bool,
) -> f32 {
    let max_value = maximum.max(minimum);
    let min_value = maximum.min(minimum);
    let value = value.max(min_value).min(max_value);

    let min_norm = range.minimum.min(range.maximum);
    let max_norm = range.minimum.max(range.maximum);
    let middle_norm = range.default;
    let middle_value = min_value + (max_value - min_value) / 2.0;
    let offset = value - middle_value;

    let result = if offset > 0.0 {
        let span = max_value - middle_value;
        if span != 0.0 {
            offset * ((max_norm - middle_norm) / span) + middle_norm
        } else {
            middle_norm
        }
    } else if offset < 0.0 {
        let span = min_value - middle_value;
        if span != 0.0 {
            offset * ((min_norm - middle_norm) / span) + middle_norm
        } else {
            middle_norm
        }
    } else {
        middle_norm
    };

    if reflect {
        result
    } else {
        -result
    }
}

/// Signed angle from `from` to `to`, wrapped to `[-PI, PI]`.
pub fn direction_to_radian(from: Vector2<f32>, to: Vector2<f32>) -> f32 {
    let mut angle = to.y.atan2(to.x) - from.y.atan2(from.x);
    while angle < -PI {
        angle += 2.0 * PI;
    }
    while angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}

fn update_particles(
    strand: &mut [PhysicsParticle],
    root: Vector2<f32>,
    angle_degrees: f32,
    wind: Vector2<f32>,
    threshold: f32,
    dt: f32,
) {
    let Some(first) = strand.first_mut() else {
        return;
    };
    first.position = root;

    let radian = angle_degrees.to_radians();
    let gravity = Vector2::new(radian.sin(), radian.cos()).normalize();

    for i in 1..strand.len() {
        let parent = strand[i - 1].position;
        let p = &mut strand[i];

        p.force = gravity * p.acceleration + wind;
        p.last_position = p.position;
        let delay = p.delay * dt * DELAY_FPS;

        let swing = direction_to_radian(p.last_gravity, gravity) / AIR_RESISTANCE;
        let direction = Rotation2::new(swing) * (p.position - parent);

        let moved = parent + direction + p.velocity * delay + p.force * delay * delay;
        let link = moved - parent;
        let link = if link.norm() > 0.0 {
            link.normalize()
        } else {
            Vector2::new(0.0, 1.0)
        };
        p.position = parent + link * p.radius;

        if p.position.x.abs() < threshold {
            p.position.x = 0.0;
        }
        if delay != 0.0 {
            p.velocity = (p.position - p.last_position) / delay * p.mobility;
        }
        p.force = Vector2::zeros();
        p.last_gravity = gravity;
    }
}
