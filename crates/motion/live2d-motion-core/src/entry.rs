//! Queue entries and the [`Playable`] seam shared by motions and expressions.
//!
//! An entry is one in-flight playback of a playable. It owns the fade envelope state
//! (start, fade-in start, optional end) and the finished flag; the playable itself is
//! immutable and may be shared by many entries and many models.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::MotionHandle;
use crate::interp::easing_sine;
use crate::parameters::ParameterStore;

/// Parameter ids that receive the eye-blink and lip-sync effect strengths of a motion.
/// Configured per model (from the "EyeBlink"/"LipSync" groups of its settings).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectTargets {
    pub eye_blink: Vec<String>,
    pub lip_sync: Vec<String>,
}

impl EffectTargets {
    pub fn new(eye_blink: Vec<String>, lip_sync: Vec<String>) -> Self {
        Self {
            eye_blink,
            lip_sync,
        }
    }
}

/// Anything the queue manager can play: a timeline that writes parameters under a fade weight.
pub trait Playable: fmt::Debug {
    fn fade_in_seconds(&self) -> f32;

    fn fade_out_seconds(&self) -> f32;

    fn weight(&self) -> f32 {
        1.0
    }

    /// Entries start this many seconds into the playable.
    fn offset_seconds(&self) -> f32 {
        0.0
    }

    /// Playback length; `None` when the playable never ends on its own.
    fn duration(&self) -> Option<f32>;

    /// Write this frame's contribution into `store`.
    fn apply(
        &self,
        store: &mut ParameterStore,
        targets: &EffectTargets,
        user_time: f32,
        fade_weight: f32,
        entry: &mut QueueEntry,
    );

    /// Event values with `before < fire_time <= now`, times relative to the entry start.
    fn fired_events(&self, _before: f32, _now: f32) -> Vec<&str> {
        Vec::new()
    }
}

/// Lifecycle of a queue entry as seen from outside.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EntryState {
    /// Registered, not yet updated.
    Pending,
    Playing,
    FadingOut,
    Finished,
}

pub type FinishedCallback = Box<dyn FnOnce(MotionHandle)>;

pub struct QueueEntry {
    handle: MotionHandle,
    playable: Arc<dyn Playable>,
    auto_delete: bool,
    started: bool,
    finished: bool,
    start_time: f32,
    fade_in_start_time: f32,
    end_time: Option<f32>,
    fade_out_seconds: Option<f32>,
    last_event_check_time: Option<f32>,
    last_weight: f32,
    on_finished: Option<FinishedCallback>,
}

impl fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEntry")
            .field("handle", &self.handle)
            .field("playable", &self.playable)
            .field("state", &self.state())
            .field("start_time", &self.start_time)
            .field("fade_in_start_time", &self.fade_in_start_time)
            .field("end_time", &self.end_time)
            .field("fade_out_seconds", &self.fade_out_seconds)
            .field("last_weight", &self.last_weight)
            .finish()
    }
}

impl QueueEntry {
    pub fn new(handle: MotionHandle, playable: Arc<dyn Playable>, auto_delete: bool) -> Self {
        Self {
            handle,
            playable,
            auto_delete,
            started: false,
            finished: false,
            start_time: 0.0,
            fade_in_start_time: 0.0,
            end_time: None,
            fade_out_seconds: None,
            last_event_check_time: None,
            last_weight: 0.0,
            on_finished: None,
        }
    }

    pub(crate) fn with_finished_callback(mut self, callback: FinishedCallback) -> Self {
        self.on_finished = Some(callback);
        self
    }

    pub fn handle(&self) -> MotionHandle {
        self.handle
    }

    pub fn playable(&self) -> &Arc<dyn Playable> {
        &self.playable
    }

    pub fn auto_delete(&self) -> bool {
        self.auto_delete
    }

    pub fn state(&self) -> EntryState {
        if self.finished {
            EntryState::Finished
        } else if self.fade_out_seconds.is_some() {
            EntryState::FadingOut
        } else if self.started {
            EntryState::Playing
        } else {
            EntryState::Pending
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn set_start_time(&mut self, time: f32) {
        self.start_time = time;
    }

    pub fn fade_in_start_time(&self) -> f32 {
        self.fade_in_start_time
    }

    pub fn set_fade_in_start_time(&mut self, time: f32) {
        self.fade_in_start_time = time;
    }

    /// Time the entry stops contributing; `None` while it plays open-ended.
    pub fn end_time(&self) -> Option<f32> {
        self.end_time
    }

    /// Fade-out length once a fade-out was requested.
    pub fn fade_out_seconds(&self) -> Option<f32> {
        self.fade_out_seconds
    }

    /// Fade weight computed by the last update.
    pub fn last_weight(&self) -> f32 {
        self.last_weight
    }

    /// Schedule the end at `now + seconds` unless an earlier end is already set.
    pub fn start_fade_out(&mut self, seconds: f32, now: f32) {
        let new_end = now + seconds;
        match self.end_time {
            Some(end) if end <= new_end => {
                self.fade_out_seconds.get_or_insert(seconds);
            }
            _ => {
                self.end_time = Some(new_end);
                self.fade_out_seconds = Some(seconds);
            }
        }
    }

    /// Flag the entry finished; the completion callback runs on the first call only.
    pub fn mark_finished(&mut self) {
        self.finished = true;
        if let Some(callback) = self.on_finished.take() {
            callback(self.handle);
        }
    }

    /// Event window `(before, now]` relative to the entry start, then advances the check time.
    pub(crate) fn take_event_window(&mut self, now: f32) -> (f32, f32) {
        let before = self
            .last_event_check_time
            .map_or(f32::NEG_INFINITY, |t| t - self.start_time);
        self.last_event_check_time = Some(now);
        (before, now - self.start_time)
    }

    /// Compute the fade envelope for `now` and let the playable write into `store`.
    pub(crate) fn update(&mut self, store: &mut ParameterStore, targets: &EffectTargets, now: f32) {
        if self.finished {
            return;
        }
        let playable = Arc::clone(&self.playable);

        if !self.started {
            self.started = true;
            self.start_time = now - playable.offset_seconds();
            self.fade_in_start_time = now;
            if self.end_time.is_none() {
                self.end_time = playable
                    .duration()
                    .filter(|d| *d > 0.0)
                    .map(|d| self.start_time + d);
            }
        }

        let fade_in = match playable.fade_in_seconds() {
            s if s <= 0.0 => 1.0,
            s => easing_sine((now - self.fade_in_start_time) / s),
        };
        let fade_out_seconds = self
            .fade_out_seconds
            .unwrap_or_else(|| playable.fade_out_seconds());
        let fade_out = match self.end_time {
            Some(end) if fade_out_seconds > 0.0 => easing_sine((end - now) / fade_out_seconds),
            _ => 1.0,
        };

        let weight = playable.weight() * fade_in * fade_out;
        self.last_weight = weight;
        playable.apply(store, targets, now, weight, self);

        if matches!(self.end_time, Some(end) if end < now) && !self.finished {
            self.mark_finished();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Constant {
        duration: Option<f32>,
        fade: f32,
    }

    impl Playable for Constant {
        fn fade_in_seconds(&self) -> f32 {
            self.fade
        }
        fn fade_out_seconds(&self) -> f32 {
            self.fade
        }
        fn duration(&self) -> Option<f32> {
            self.duration
        }
        fn apply(
            &self,
            store: &mut ParameterStore,
            _targets: &EffectTargets,
            _user_time: f32,
            fade_weight: f32,
            _entry: &mut QueueEntry,
        ) {
            store.set_parameter_by_id("P", 10.0, fade_weight);
        }
    }

    fn mk_entry(duration: Option<f32>, fade: f32) -> QueueEntry {
        QueueEntry::new(MotionHandle(0), Arc::new(Constant { duration, fade }), true)
    }

    #[test]
    fn first_update_fixes_start_and_end() {
        let mut store = ParameterStore::new([], []);
        let mut entry = mk_entry(Some(2.0), 0.0);
        assert_eq!(entry.state(), EntryState::Pending);
        entry.update(&mut store, &EffectTargets::default(), 1.0);
        assert_eq!(entry.state(), EntryState::Playing);
        assert_eq!(entry.start_time(), 1.0);
        assert_eq!(entry.end_time(), Some(3.0));
        assert_eq!(entry.last_weight(), 1.0);
    }

    #[test]
    fn fade_in_ramps_with_sine_ease() {
        let mut store = ParameterStore::new([], []);
        let mut entry = mk_entry(None, 1.0);
        let targets = EffectTargets::default();
        entry.update(&mut store, &targets, 0.0);
        assert_eq!(entry.last_weight(), 0.0);
        entry.update(&mut store, &targets, 0.5);
        assert!((entry.last_weight() - 0.5).abs() < 1e-6);
        entry.update(&mut store, &targets, 1.5);
        assert_eq!(entry.last_weight(), 1.0);
    }

    #[test]
    fn earlier_fade_out_wins() {
        let mut entry = mk_entry(None, 1.0);
        entry.start_fade_out(2.0, 1.0);
        entry.start_fade_out(5.0, 1.0);
        assert_eq!(entry.end_time(), Some(3.0));
        entry.start_fade_out(0.5, 1.0);
        assert_eq!(entry.end_time(), Some(1.5));
        assert_eq!(entry.state(), EntryState::FadingOut);
    }

    #[test]
    fn completion_callback_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let mut entry = mk_entry(Some(1.0), 0.0)
            .with_finished_callback(Box::new(move |_| seen.set(seen.get() + 1)));
        let mut store = ParameterStore::new([], []);
        let targets = EffectTargets::default();
        entry.update(&mut store, &targets, 0.0);
        entry.update(&mut store, &targets, 1.5);
        assert!(entry.is_finished());
        entry.mark_finished();
        entry.update(&mut store, &targets, 2.0);
        assert_eq!(calls.get(), 1);
    }
}
