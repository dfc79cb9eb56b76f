//! Model facade: owns one model's store and effect layers and runs them in frame order.
//!
//! Frame order is fixed: motions, snapshot, expressions, eye-blink, breath, pose,
//! physics, core update, change scan, restore. Later layers override earlier ones on
//! contested parameters, and physics always sees the post-motion, post-pose state.

use std::sync::Arc;

use live2d_motion_core::{
    Breath, EffectTargets, Expression, ExpressionManager, EyeBlink, FiredEvent, MotionHandle,
    MotionQueueManager, ParameterStore, Physics, Playable, Pose,
};

use crate::config::ModelConfig;
use crate::core_model::CoreModel;
use crate::error::{ModelError, Result};
use crate::frame::ModelFrame;
use crate::framework::FrameworkContext;
use crate::matrix::ModelMatrix;
use crate::settings::ModelSettings;
use crate::user_data::UserData;

#[derive(Debug)]
pub struct Live2DModel<C: CoreModel> {
    core: C,
    config: ModelConfig,
    settings: Option<ModelSettings>,
    user_data: Option<UserData>,
    store: ParameterStore,
    matrix: ModelMatrix,
    motions: MotionQueueManager,
    expressions: ExpressionManager,
    eye_blink: Option<EyeBlink>,
    breath: Option<Breath>,
    pose: Option<Pose>,
    physics: Option<Physics>,
    elapsed: f32,
    frame: ModelFrame,
}

impl<C: CoreModel> Live2DModel<C> {
    /// Build a model over `core`. The framework context must be initialized.
    pub fn new(ctx: &FrameworkContext, core: C, config: ModelConfig) -> Result<Self> {
        if !ctx.is_initialized() {
            return Err(ModelError::FrameworkNotInitialized);
        }
        let store = ParameterStore::new(core.parameter_defs(), core.part_defs());
        let (width, height) = core.canvas().size_in_units();
        let breath = config.breath.then(Breath::with_default_parameters);
        log::debug!(
            "model created: {} parameters, {} parts, {} drawables",
            store.parameter_count(),
            store.part_count(),
            core.drawables().len()
        );
        Ok(Self {
            core,
            config,
            settings: None,
            user_data: None,
            store,
            matrix: ModelMatrix::new(width, height),
            motions: MotionQueueManager::new(),
            expressions: ExpressionManager::default(),
            eye_blink: None,
            breath,
            pose: None,
            physics: None,
            elapsed: 0.0,
            frame: ModelFrame::default(),
        })
    }

    /// Like [`new`](Self::new), wiring effect targets, eye-blink and layout from `settings`.
    pub fn with_settings(
        ctx: &FrameworkContext,
        core: C,
        settings: ModelSettings,
        config: ModelConfig,
    ) -> Result<Self> {
        let mut model = Self::new(ctx, core, config)?;
        model.motions.set_effect_targets(settings.effect_targets());

        let blink_ids = settings.eye_blink_parameters();
        if !blink_ids.is_empty() {
            model.eye_blink = Some(EyeBlink::new(blink_ids, model.config.eye_blink.clone()));
        }
        model.matrix.setup_from_layout(&settings.layout);
        model.settings = Some(settings);
        Ok(model)
    }

    /// Advance the model clock by `dt` seconds and produce one frame.
    pub fn update(&mut self, dt: f32) -> Result<&ModelFrame> {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        let now = self.elapsed;
        self.frame.clear();
        self.frame.time = now;

        let motion_updated = self.motions.update(&mut self.store, now);
        self.frame.motion_updated = motion_updated;
        self.store.save_parameters();

        self.expressions.update(&mut self.store, now);

        if let Some(eye_blink) = self.eye_blink.as_mut() {
            if !motion_updated || self.config.blink_during_motion {
                eye_blink.update(&mut self.store, dt);
            }
        }
        if let Some(breath) = self.breath.as_mut() {
            breath.update(&mut self.store, dt);
        }
        if self.config.pose {
            if let Some(pose) = self.pose.as_mut() {
                pose.update(&mut self.store, dt)?;
            }
        }
        if self.config.physics {
            if let Some(physics) = self.physics.as_mut() {
                physics.evaluate(&mut self.store, dt);
            }
        }

        self.core
            .update(self.store.values(), self.store.part_opacities());
        self.frame.changed_drawables.extend(
            self.core
                .drawables()
                .iter()
                .enumerate()
                .filter(|(_, d)| d.flags.any_changed())
                .map(|(i, _)| i),
        );
        self.frame.parameters.extend_from_slice(self.store.values());
        self.frame
            .part_opacities
            .extend_from_slice(self.store.part_opacities());
        self.frame.events = self.motions.take_fired_events();

        // Additive layers start again from the post-motion snapshot next frame.
        self.store.load_parameters();
        Ok(&self.frame)
    }

    /// Start `motion` now, fading out whatever is playing.
    pub fn start_motion(&mut self, motion: Arc<dyn Playable>) -> MotionHandle {
        self.motions.start_motion(motion, true, self.elapsed)
    }

    pub fn start_motion_with_callback(
        &mut self,
        motion: Arc<dyn Playable>,
        on_finished: impl FnOnce(MotionHandle) + 'static,
    ) -> MotionHandle {
        self.motions
            .start_motion_with_callback(motion, true, self.elapsed, on_finished)
    }

    pub fn stop_all_motions(&mut self) {
        self.motions.stop_all_motions();
    }

    pub fn is_motion_finished(&self, handle: MotionHandle) -> bool {
        self.motions.is_finished_by_handle(handle)
    }

    pub fn are_motions_finished(&self) -> bool {
        self.motions.is_finished()
    }

    pub fn set_motion_event_callback(&mut self, callback: impl FnMut(&FiredEvent) + 'static) {
        self.motions.set_event_callback(callback);
    }

    pub fn set_expressions(&mut self, expressions: impl IntoIterator<Item = (String, Expression)>) {
        self.expressions = ExpressionManager::new(expressions);
    }

    /// Crossfade to the named expression; `None` when the name is unknown.
    pub fn set_expression(&mut self, name: &str) -> Option<MotionHandle> {
        let handle = self.expressions.set_expression(name, self.elapsed);
        if handle.is_none() {
            log::warn!("unknown expression '{name}'");
        }
        handle
    }

    pub fn reset_expression(&mut self) {
        self.expressions.reset_expression(self.elapsed);
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = Some(pose);
    }

    pub fn set_physics(&mut self, physics: Physics) {
        self.physics = Some(physics);
    }

    pub fn set_eye_blink(&mut self, eye_blink: Option<EyeBlink>) {
        self.eye_blink = eye_blink;
    }

    pub fn set_breath(&mut self, breath: Option<Breath>) {
        self.breath = breath;
    }

    pub fn set_effect_targets(&mut self, targets: EffectTargets) {
        self.motions.set_effect_targets(targets);
    }

    pub fn set_user_data(&mut self, user_data: UserData) {
        self.user_data = Some(user_data);
    }

    pub fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    pub fn settings(&self) -> Option<&ModelSettings> {
        self.settings.as_ref()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// Direct parameter access for hosts (e.g. look-at or lip-sync input).
    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }

    pub fn matrix(&self) -> &ModelMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut ModelMatrix {
        &mut self.matrix
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn motions(&self) -> &MotionQueueManager {
        &self.motions
    }

    pub fn expressions(&self) -> &ExpressionManager {
        &self.expressions
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_frame(&self) -> &ModelFrame {
        &self.frame
    }
}
