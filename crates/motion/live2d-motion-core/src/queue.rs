//! Motion queue manager: concurrent entries, cooperative crossfades and timed events.
//!
//! Starting a motion never removes the running ones. Every existing entry is asked to
//! fade out over its own motion's fade-out time while the new entry fades in; entries are
//! pruned on the update that observes them finished.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entry::{EffectTargets, Playable, QueueEntry};
use crate::ids::{HandleAllocator, MotionHandle};
use crate::parameters::ParameterStore;

/// A timed motion event that fell inside an update's event window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub handle: MotionHandle,
    pub value: String,
}

pub type EventCallback = Box<dyn FnMut(&FiredEvent)>;

#[derive(Default)]
pub struct MotionQueueManager {
    entries: Vec<QueueEntry>,
    handles: HandleAllocator,
    targets: EffectTargets,
    event_callback: Option<EventCallback>,
    fired: Vec<FiredEvent>,
}

impl fmt::Debug for MotionQueueManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionQueueManager")
            .field("entries", &self.entries)
            .field("targets", &self.targets)
            .field("has_event_callback", &self.event_callback.is_some())
            .field("fired", &self.fired)
            .finish()
    }
}

impl MotionQueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect_targets(targets: EffectTargets) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    pub fn effect_targets(&self) -> &EffectTargets {
        &self.targets
    }

    pub fn set_effect_targets(&mut self, targets: EffectTargets) {
        self.targets = targets;
    }

    /// Called synchronously for every fired event during [`update`](Self::update).
    pub fn set_event_callback(&mut self, callback: impl FnMut(&FiredEvent) + 'static) {
        self.event_callback = Some(Box::new(callback));
    }

    pub fn clear_event_callback(&mut self) {
        self.event_callback = None;
    }

    /// Start `playable`, fading out everything already queued.
    pub fn start_motion(
        &mut self,
        playable: Arc<dyn Playable>,
        auto_delete: bool,
        now: f32,
    ) -> MotionHandle {
        let handle = self.handles.alloc();
        self.push_entry(QueueEntry::new(handle, playable, auto_delete), now)
    }

    /// Like [`start_motion`](Self::start_motion); `on_finished` runs once when the entry finishes.
    pub fn start_motion_with_callback(
        &mut self,
        playable: Arc<dyn Playable>,
        auto_delete: bool,
        now: f32,
        on_finished: impl FnOnce(MotionHandle) + 'static,
    ) -> MotionHandle {
        let handle = self.handles.alloc();
        let entry = QueueEntry::new(handle, playable, auto_delete)
            .with_finished_callback(Box::new(on_finished));
        self.push_entry(entry, now)
    }

    fn push_entry(&mut self, entry: QueueEntry, now: f32) -> MotionHandle {
        for existing in &mut self.entries {
            let seconds = existing.playable().fade_out_seconds();
            existing.start_fade_out(seconds, now);
        }
        let handle = entry.handle();
        log::debug!("queue start {handle:?} ({} already playing)", self.entries.len());
        self.entries.push(entry);
        handle
    }

    /// Evaluate every entry in insertion order, dispatch fired events, prune finished entries.
    /// Events buffered by the previous update are discarded first.
    /// Returns false only when the queue was empty.
    pub fn update(&mut self, store: &mut ParameterStore, now: f32) -> bool {
        let Self {
            entries,
            targets,
            event_callback,
            fired,
            ..
        } = self;
        fired.clear();
        let updated = !entries.is_empty();

        for entry in entries.iter_mut() {
            entry.update(store, targets, now);

            let (before, current) = entry.take_event_window(now);
            let playable = Arc::clone(entry.playable());
            for value in playable.fired_events(before, current) {
                let event = FiredEvent {
                    handle: entry.handle(),
                    value: value.to_owned(),
                };
                if let Some(callback) = event_callback.as_mut() {
                    callback(&event);
                }
                fired.push(event);
            }
        }

        entries.retain(|entry| {
            if entry.is_finished() {
                log::debug!("queue prune {:?}", entry.handle());
            }
            !entry.is_finished()
        });
        updated
    }

    /// True when nothing is left playing.
    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(QueueEntry::is_finished)
    }

    /// True when `handle` finished or was already pruned.
    pub fn is_finished_by_handle(&self, handle: MotionHandle) -> bool {
        self.entry(handle).map_or(true, QueueEntry::is_finished)
    }

    /// Drop every entry at once; no fade-out is applied.
    pub fn stop_all_motions(&mut self) {
        self.entries.clear();
    }

    /// Ask one entry to fade out over its motion's fade-out time.
    pub fn fade_out(&mut self, handle: MotionHandle, now: f32) -> bool {
        match self.entries.iter_mut().find(|e| e.handle() == handle) {
            Some(entry) => {
                let seconds = entry.playable().fade_out_seconds();
                entry.start_fade_out(seconds, now);
                true
            }
            None => false,
        }
    }

    pub fn entry(&self, handle: MotionHandle) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.handle() == handle)
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Events fired by the most recent [`update`](Self::update), in firing order. The buffer
    /// is cleared at the start of every update, so callers that poll must drain it each frame.
    pub fn take_fired_events(&mut self) -> Vec<FiredEvent> {
        std::mem::take(&mut self.fired)
    }
}
