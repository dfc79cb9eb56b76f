//! Pose: mutually exclusive part groups with a cross-fade between the visible members.
//!
//! Each part is driven by the parameter that shares its id. Within a group the first part
//! whose driving parameter is above [`VISIBLE_EPSILON`] fades in; the others fade out along
//! a two-segment curve of the visible part's opacity that limits background bleed-through.

use serde::Deserialize;

use crate::config::DEFAULT_POSE_FADE_SECONDS;
use crate::error::{MotionError, Result};
use crate::ids::{ParameterIndex, PartIndex};
use crate::parameters::ParameterStore;

pub const VISIBLE_EPSILON: f32 = 0.001;
const PHI: f32 = 0.5;
const BACK_OPACITY_THRESHOLD: f32 = 0.15;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPose {
    #[serde(default)]
    fade_in_time: Option<f32>,
    groups: Vec<Vec<RawPosePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPosePart {
    id: String,
    #[serde(default)]
    link: Vec<String>,
}

/// Store slots for one part id, resolved on the first update against a store.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Slots {
    parameter: ParameterIndex,
    part: PartIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoseGroupPart {
    pub part_id: String,
    /// Parts whose opacity mirrors this one.
    pub links: Vec<String>,
    slots: Option<Slots>,
    link_slots: Vec<PartIndex>,
}

impl PoseGroupPart {
    pub fn new(part_id: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            part_id: part_id.into(),
            links,
            slots: None,
            link_slots: Vec::new(),
        }
    }

    /// Resolve slots and set the driving parameter to 1.
    fn initialize(&mut self, store: &mut ParameterStore) -> Result<Slots> {
        let slots = Slots {
            parameter: store.parameter_index(&self.part_id),
            part: store.part_index(&self.part_id),
        };
        store.set_parameter(slots.parameter, 1.0, 1.0)?;
        self.slots = Some(slots);
        Ok(slots)
    }

    fn resolved(&self) -> Result<Slots> {
        self.slots.ok_or_else(|| {
            MotionError::InvalidPose(format!("part '{}' used before reset", self.part_id))
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    fade_seconds: f32,
    groups: Vec<Vec<PoseGroupPart>>,
    store_instance: Option<u64>,
}

impl Pose {
    pub fn new(groups: Vec<Vec<PoseGroupPart>>, fade_seconds: f32) -> Self {
        Self {
            fade_seconds: if fade_seconds > 0.0 {
                fade_seconds
            } else {
                DEFAULT_POSE_FADE_SECONDS
            },
            groups,
            store_instance: None,
        }
    }

    /// Parse a pose3.json document.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: RawPose = serde_json::from_str(s)?;
        let groups = raw
            .groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|p| PoseGroupPart::new(p.id, p.link))
                    .collect()
            })
            .collect();
        Ok(Self::new(
            groups,
            raw.fade_in_time.unwrap_or(DEFAULT_POSE_FADE_SECONDS),
        ))
    }

    pub fn fade_seconds(&self) -> f32 {
        self.fade_seconds
    }

    pub fn groups(&self) -> &[Vec<PoseGroupPart>] {
        &self.groups
    }

    /// Show the first part of every group and hide the rest.
    pub fn reset(&mut self, store: &mut ParameterStore) -> Result<()> {
        log::debug!("pose reset for store {}", store.instance_id());
        for group in &mut self.groups {
            for (i, part) in group.iter_mut().enumerate() {
                let slots = part.initialize(store)?;
                let shown = if i == 0 { 1.0 } else { 0.0 };
                store.set_part_opacity(slots.part, shown)?;
                store.set_parameter(slots.parameter, shown, 1.0)?;

                part.link_slots = part.links.iter().map(|id| store.part_index(id)).collect();
                for link in &part.links {
                    let index = store.parameter_index(link);
                    store.set_parameter(index, 1.0, 1.0)?;
                }
            }
        }
        self.store_instance = Some(store.instance_id());
        Ok(())
    }

    /// Advance the fades by `dt` seconds (negative is treated as 0).
    pub fn update(&mut self, store: &mut ParameterStore, dt: f32) -> Result<()> {
        if self.store_instance != Some(store.instance_id()) {
            self.reset(store)?;
        }
        let dt = dt.max(0.0);
        for group in &self.groups {
            fade_group(store, group, dt, self.fade_seconds)?;
        }
        self.copy_part_opacities(store)
    }

    fn copy_part_opacities(&self, store: &mut ParameterStore) -> Result<()> {
        for part in self.groups.iter().flatten().filter(|p| !p.link_slots.is_empty()) {
            let opacity = store.part_opacity(part.resolved()?.part)?;
            for &link in &part.link_slots {
                store.set_part_opacity(link, opacity)?;
            }
        }
        Ok(())
    }
}

/// Opacity ceiling for a hidden part while the visible one is at `visible`.
pub fn hidden_part_opacity(visible: f32) -> f32 {
    let mut a1 = if visible < PHI {
        visible * (PHI - 1.0) / PHI + 1.0
    } else {
        (1.0 - visible) * PHI / (1.0 - PHI)
    };
    let back_opacity = (1.0 - a1) * (1.0 - visible);
    if back_opacity > BACK_OPACITY_THRESHOLD {
        a1 = 1.0 - BACK_OPACITY_THRESHOLD / (1.0 - visible);
    }
    a1
}

fn fade_group(
    store: &mut ParameterStore,
    group: &[PoseGroupPart],
    dt: f32,
    fade_seconds: f32,
) -> Result<()> {
    let mut visible: Option<(usize, f32)> = None;
    for (i, part) in group.iter().enumerate() {
        let slots = part.resolved()?;
        if store.parameter(slots.parameter)? > VISIBLE_EPSILON {
            let opacity = store.part_opacity(slots.part)? + dt / fade_seconds;
            visible = Some((i, opacity.min(1.0)));
            break;
        }
    }
    let (visible_index, new_opacity) = visible.unwrap_or((0, 1.0));

    let ceiling = hidden_part_opacity(new_opacity);
    for (i, part) in group.iter().enumerate() {
        let index = part.resolved()?.part;
        if i == visible_index {
            store.set_part_opacity(index, new_opacity)?;
        } else {
            let opacity = store.part_opacity(index)?;
            if opacity > ceiling {
                store.set_part_opacity(index, ceiling)?;
            }
        }
    }
    Ok(())
}
