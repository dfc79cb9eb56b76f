//! Automatic eye blinking: a timer-driven five-state cycle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{BlinkPolarity, EyeBlinkConfig};
use crate::parameters::ParameterStore;

/// Absorbs accumulated f32 error when comparing elapsed time with a phase length.
const TIME_EPSILON: f32 = 1e-5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EyeState {
    First,
    Interval,
    Closing,
    Closed,
    Opening,
}

#[derive(Debug)]
pub struct EyeBlink {
    cfg: EyeBlinkConfig,
    parameter_ids: Vec<String>,
    state: EyeState,
    state_start_time: f32,
    next_blink_time: f32,
    user_time: f32,
    rng: StdRng,
}

impl EyeBlink {
    pub fn new(parameter_ids: Vec<String>, cfg: EyeBlinkConfig) -> Self {
        Self::with_rng(parameter_ids, cfg, StdRng::from_entropy())
    }

    /// Deterministic blink spacing, for tests and replays.
    pub fn with_seed(parameter_ids: Vec<String>, cfg: EyeBlinkConfig, seed: u64) -> Self {
        Self::with_rng(parameter_ids, cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(parameter_ids: Vec<String>, cfg: EyeBlinkConfig, rng: StdRng) -> Self {
        Self {
            cfg,
            parameter_ids,
            state: EyeState::First,
            state_start_time: 0.0,
            next_blink_time: 0.0,
            user_time: 0.0,
            rng,
        }
    }

    pub fn config(&self) -> &EyeBlinkConfig {
        &self.cfg
    }

    pub fn set_config(&mut self, cfg: EyeBlinkConfig) {
        self.cfg = cfg;
    }

    pub fn parameter_ids(&self) -> &[String] {
        &self.parameter_ids
    }

    pub fn set_parameter_ids(&mut self, ids: Vec<String>) {
        self.parameter_ids = ids;
    }

    pub fn state(&self) -> EyeState {
        self.state
    }

    pub fn next_blink_time(&self) -> f32 {
        self.next_blink_time
    }

    fn determine_next_blink(&mut self) -> f32 {
        let r: f32 = self.rng.gen();
        self.user_time + r * (2.0 * self.cfg.interval_seconds - 1.0)
    }

    /// Fraction of `duration` elapsed in the current state, and whether the state is over.
    fn phase(&self, duration: f32) -> (f32, bool) {
        let elapsed = self.user_time - self.state_start_time;
        if elapsed + TIME_EPSILON >= duration {
            (1.0, true)
        } else {
            (elapsed / duration, false)
        }
    }

    fn enter(&mut self, state: EyeState) {
        log::trace!("eye blink {:?} -> {:?} at {}", self.state, state, self.user_time);
        self.state = state;
        self.state_start_time = self.user_time;
    }

    /// Advance by `dt` and write the eye-open value to every target.
    pub fn update(&mut self, store: &mut ParameterStore, dt: f32) {
        self.user_time += dt;

        let value = match self.state {
            EyeState::First => {
                self.state = EyeState::Interval;
                self.next_blink_time = self.determine_next_blink();
                1.0
            }
            EyeState::Interval => {
                if self.next_blink_time < self.user_time {
                    self.enter(EyeState::Closing);
                }
                1.0
            }
            EyeState::Closing => {
                let (t, done) = self.phase(self.cfg.closing_seconds);
                if done {
                    self.enter(EyeState::Closed);
                }
                1.0 - t
            }
            EyeState::Closed => {
                let (_, done) = self.phase(self.cfg.closed_seconds);
                if done {
                    self.enter(EyeState::Opening);
                }
                0.0
            }
            EyeState::Opening => {
                let (t, done) = self.phase(self.cfg.opening_seconds);
                if done {
                    self.enter(EyeState::Interval);
                    self.next_blink_time = self.determine_next_blink();
                }
                t
            }
        };

        let value = match self.cfg.polarity {
            BlinkPolarity::CloseAtZero => value,
            BlinkPolarity::SignInverted => -value,
        };
        for id in &self.parameter_ids {
            store.set_parameter_by_id(id, value, 1.0);
        }
    }
}
