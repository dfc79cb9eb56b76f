//! Motion playback: evaluates a parsed timeline into a parameter store under a fade weight.

use crate::data::{CurveTarget, MotionCurve, MotionData};
use crate::entry::{EffectTargets, Playable, QueueEntry};
use crate::error::Result;
use crate::interp::easing_sine;
use crate::motion_json::parse_motion_json;
use crate::parameters::ParameterStore;
use crate::sampling::evaluate_curve;

/// Model curve id carrying the eye-blink strength.
pub const EYE_BLINK_CURVE_ID: &str = "EyeBlink";
/// Model curve id carrying the lip-sync strength.
pub const LIP_SYNC_CURVE_ID: &str = "LipSync";

/// Immutable motion plus playback settings. Share it between entries with an `Arc`.
#[derive(Clone, Debug)]
pub struct Motion {
    data: MotionData,
    fade_in_seconds: f32,
    fade_out_seconds: f32,
    weight: f32,
    offset_seconds: f32,
    is_loop: bool,
    loop_fade_in: bool,
    eye_blink_curve_id: String,
    lip_sync_curve_id: String,
}

impl Motion {
    pub fn new(data: MotionData) -> Self {
        Self {
            fade_in_seconds: data.fade_in_seconds,
            fade_out_seconds: data.fade_out_seconds,
            is_loop: data.is_loop,
            data,
            weight: 1.0,
            offset_seconds: 0.0,
            loop_fade_in: true,
            eye_blink_curve_id: EYE_BLINK_CURVE_ID.to_owned(),
            lip_sync_curve_id: LIP_SYNC_CURVE_ID.to_owned(),
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(Self::new(parse_motion_json(s)?))
    }

    /// Apply fade overrides, e.g. from a motion reference in the model settings.
    /// Negative values keep the current setting.
    pub fn with_fade_times(mut self, fade_in: Option<f32>, fade_out: Option<f32>) -> Self {
        if let Some(v) = fade_in.filter(|v| *v >= 0.0) {
            self.fade_in_seconds = v;
        }
        if let Some(v) = fade_out.filter(|v| *v >= 0.0) {
            self.fade_out_seconds = v;
        }
        self
    }

    pub fn data(&self) -> &MotionData {
        &self.data
    }

    /// Length of one pass through the timeline, regardless of looping.
    pub fn loop_duration(&self) -> f32 {
        self.data.duration
    }

    pub fn fps(&self) -> f32 {
        self.data.fps
    }

    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    pub fn set_loop(&mut self, is_loop: bool) {
        self.is_loop = is_loop;
    }

    pub fn is_loop_fade_in(&self) -> bool {
        self.loop_fade_in
    }

    pub fn set_loop_fade_in(&mut self, loop_fade_in: bool) {
        self.loop_fade_in = loop_fade_in;
    }

    pub fn set_fade_in_seconds(&mut self, seconds: f32) {
        self.fade_in_seconds = seconds;
    }

    pub fn set_fade_out_seconds(&mut self, seconds: f32) {
        self.fade_out_seconds = seconds;
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn set_offset_seconds(&mut self, offset: f32) {
        self.offset_seconds = offset;
    }

    /// Rename the model curves read as eye-blink / lip-sync strengths.
    pub fn set_effect_curve_ids(&mut self, eye_blink: impl Into<String>, lip_sync: impl Into<String>) {
        self.eye_blink_curve_id = eye_blink.into();
        self.lip_sync_curve_id = lip_sync.into();
    }

    /// Per-curve fade override for `id`, if the curve exists.
    pub fn set_curve_fade_times(&mut self, id: &str, fade_in: Option<f32>, fade_out: Option<f32>) -> bool {
        match self.data.curves.iter_mut().find(|c| c.id == id) {
            Some(curve) => {
                curve.fade_in_seconds = fade_in.filter(|v| *v >= 0.0);
                curve.fade_out_seconds = fade_out.filter(|v| *v >= 0.0);
                true
            }
            None => false,
        }
    }

    /// Event values with `before < fire_time <= now`.
    pub fn fired_events(&self, before: f32, now: f32) -> Vec<&str> {
        self.data
            .events
            .iter()
            .filter(|e| e.fire_time > before && e.fire_time <= now)
            .map(|e| e.value.as_str())
            .collect()
    }

    fn curves_of(&self, target: CurveTarget) -> impl Iterator<Item = &MotionCurve> {
        self.data.curves.iter().filter(move |c| c.target == target)
    }

    /// Write this frame's curve values into `store`.
    ///
    /// `fade_weight` is the motion-level envelope; curves with their own fade times use
    /// those instead. Eye-blink/lip-sync strengths read from model curves modulate the
    /// targets in `targets`; targets without a curve of their own get the strength directly.
    pub fn evaluate(
        &self,
        store: &mut ParameterStore,
        targets: &EffectTargets,
        user_time: f32,
        fade_weight: f32,
        entry: &mut QueueEntry,
    ) {
        let elapsed = (user_time - entry.start_time()).max(0.0);
        let duration = self.data.duration;
        let time = if self.is_loop && duration > 0.0 {
            elapsed % duration
        } else {
            elapsed
        };

        let motion_fade_in = if self.fade_in_seconds <= 0.0 {
            1.0
        } else {
            easing_sine((user_time - entry.fade_in_start_time()) / self.fade_in_seconds)
        };
        let motion_fade_out = match entry.end_time() {
            Some(end) if self.fade_out_seconds > 0.0 => {
                easing_sine((end - user_time) / self.fade_out_seconds)
            }
            _ => 1.0,
        };

        let mut eye_blink: Option<f32> = None;
        let mut lip_sync: Option<f32> = None;
        for curve in self.curves_of(CurveTarget::Model) {
            let value = evaluate_curve(&self.data, curve, time);
            if curve.id == self.eye_blink_curve_id {
                eye_blink = Some(value);
            } else if curve.id == self.lip_sync_curve_id {
                lip_sync = Some(value);
            }
        }

        let mut eye_claimed = vec![false; targets.eye_blink.len()];
        let mut lip_claimed = vec![false; targets.lip_sync.len()];

        for curve in self.curves_of(CurveTarget::Parameter) {
            let source = store.parameter_by_id(&curve.id);
            let mut value = evaluate_curve(&self.data, curve, time);

            if let Some(strength) = eye_blink {
                if let Some(i) = targets.eye_blink.iter().position(|id| *id == curve.id) {
                    value *= strength;
                    eye_claimed[i] = true;
                }
            }
            if let Some(strength) = lip_sync {
                if let Some(i) = targets.lip_sync.iter().position(|id| *id == curve.id) {
                    value += strength;
                    lip_claimed[i] = true;
                }
            }

            let weight = if curve.fade_in_seconds.is_none() && curve.fade_out_seconds.is_none() {
                fade_weight
            } else {
                let fade_in = match curve.fade_in_seconds {
                    None => motion_fade_in,
                    Some(s) if s == 0.0 => 1.0,
                    Some(s) => easing_sine((user_time - entry.fade_in_start_time()) / s),
                };
                let fade_out = match (curve.fade_out_seconds, entry.end_time()) {
                    (None, _) => motion_fade_out,
                    (Some(s), Some(end)) if s > 0.0 => easing_sine((end - user_time) / s),
                    _ => 1.0,
                };
                self.weight * fade_in * fade_out
            };

            store.set_parameter_by_id(&curve.id, source + (value - source) * weight, 1.0);
        }

        for (strength, ids, claimed) in [
            (eye_blink, &targets.eye_blink, &eye_claimed),
            (lip_sync, &targets.lip_sync, &lip_claimed),
        ] {
            let Some(strength) = strength else { continue };
            for (id, _) in ids.iter().zip(claimed).filter(|(_, claimed)| !**claimed) {
                let source = store.parameter_by_id(id);
                store.set_parameter_by_id(id, source + (strength - source) * fade_weight, 1.0);
            }
        }

        // Part opacity curves drive the parameter named after the part; Pose reads it.
        for curve in self.curves_of(CurveTarget::PartOpacity) {
            let value = evaluate_curve(&self.data, curve, time);
            store.set_parameter_by_id(&curve.id, value, 1.0);
        }

        if elapsed >= duration {
            if self.is_loop {
                log::trace!("motion loop rewind at {user_time}");
                entry.set_start_time(user_time);
                if self.loop_fade_in {
                    entry.set_fade_in_start_time(user_time);
                }
            } else {
                entry.mark_finished();
            }
        }
    }
}

impl Playable for Motion {
    fn fade_in_seconds(&self) -> f32 {
        self.fade_in_seconds
    }

    fn fade_out_seconds(&self) -> f32 {
        self.fade_out_seconds
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn offset_seconds(&self) -> f32 {
        self.offset_seconds
    }

    fn duration(&self) -> Option<f32> {
        if self.is_loop {
            None
        } else {
            Some(self.data.duration)
        }
    }

    fn apply(
        &self,
        store: &mut ParameterStore,
        targets: &EffectTargets,
        user_time: f32,
        fade_weight: f32,
        entry: &mut QueueEntry,
    ) {
        self.evaluate(store, targets, user_time, fade_weight, entry);
    }

    fn fired_events(&self, before: f32, now: f32) -> Vec<&str> {
        Motion::fired_events(self, before, now)
    }
}
