//! model3.json: file references, parameter groups, hit areas and layout.

use hashbrown::HashMap;
use live2d_motion_core::{EffectTargets, Motion};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Group name whose ids receive the eye-blink output.
pub const EYE_BLINK_GROUP: &str = "EyeBlink";
/// Group name whose ids receive the lip-sync output.
pub const LIP_SYNC_GROUP: &str = "LipSync";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawModelSettings {
    file_references: RawFileReferences,
    #[serde(default)]
    groups: Vec<ParameterGroup>,
    #[serde(default)]
    hit_areas: Vec<HitArea>,
    #[serde(default)]
    layout: HashMap<String, f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFileReferences {
    #[serde(default)]
    moc: Option<String>,
    #[serde(default)]
    textures: Vec<String>,
    #[serde(default)]
    physics: Option<String>,
    #[serde(default)]
    pose: Option<String>,
    #[serde(default)]
    user_data: Option<String>,
    #[serde(default)]
    expressions: Vec<ExpressionRef>,
    #[serde(default)]
    motions: HashMap<String, Vec<MotionRef>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterGroup {
    #[serde(default)]
    pub target: String,
    pub name: String,
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HitArea {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpressionRef {
    pub name: String,
    pub file: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MotionRef {
    pub file: String,
    #[serde(default, rename = "FadeInTime")]
    pub fade_in_seconds: Option<f32>,
    #[serde(default, rename = "FadeOutTime")]
    pub fade_out_seconds: Option<f32>,
    /// Carried for hosts; playback is not handled here.
    #[serde(default)]
    pub sound: Option<String>,
}

impl MotionRef {
    /// Apply this reference's fade overrides to a parsed motion.
    pub fn configure(&self, motion: Motion) -> Motion {
        motion.with_fade_times(self.fade_in_seconds, self.fade_out_seconds)
    }
}

/// Validated model settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSettings {
    pub moc: String,
    pub textures: Vec<String>,
    pub physics: Option<String>,
    pub pose: Option<String>,
    pub user_data: Option<String>,
    pub expressions: Vec<ExpressionRef>,
    pub motions: HashMap<String, Vec<MotionRef>>,
    pub groups: Vec<ParameterGroup>,
    pub hit_areas: Vec<HitArea>,
    pub layout: HashMap<String, f32>,
}

impl ModelSettings {
    /// Parse and validate a model3.json document.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: RawModelSettings = serde_json::from_str(s)?;
        let refs = raw.file_references;

        let moc = refs
            .moc
            .filter(|m| !m.is_empty())
            .ok_or(ModelError::MissingMoc)?;
        if refs.textures.is_empty() {
            return Err(ModelError::MissingTextures);
        }
        if let Some(i) = refs.textures.iter().position(|t| t.is_empty()) {
            return Err(ModelError::InvalidTexture(i));
        }

        Ok(Self {
            moc,
            textures: refs.textures,
            physics: refs.physics,
            pose: refs.pose,
            user_data: refs.user_data,
            expressions: refs.expressions,
            motions: refs.motions,
            groups: raw.groups,
            hit_areas: raw.hit_areas,
            layout: raw.layout,
        })
    }

    fn group_ids(&self, name: &str) -> Vec<String> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.ids.clone())
            .unwrap_or_default()
    }

    pub fn eye_blink_parameters(&self) -> Vec<String> {
        self.group_ids(EYE_BLINK_GROUP)
    }

    pub fn lip_sync_parameters(&self) -> Vec<String> {
        self.group_ids(LIP_SYNC_GROUP)
    }

    /// Eye-blink and lip-sync targets for this model's motion queue.
    pub fn effect_targets(&self) -> EffectTargets {
        EffectTargets::new(self.eye_blink_parameters(), self.lip_sync_parameters())
    }

    pub fn motion_groups(&self) -> impl Iterator<Item = &str> {
        self.motions.keys().map(String::as_str)
    }

    pub fn motion(&self, group: &str, index: usize) -> Option<&MotionRef> {
        self.motions.get(group).and_then(|refs| refs.get(index))
    }

    pub fn expression(&self, name: &str) -> Option<&ExpressionRef> {
        self.expressions.iter().find(|e| e.name == name)
    }

    pub fn hit_area_name(&self, id: &str) -> Option<&str> {
        self.hit_areas
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.name.as_str())
    }
}
