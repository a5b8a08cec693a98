//! Notes sounding under the playhead
//!
//! Follows playback time and keeps the preview collaborator in sync:
//! notes entering `[onset, offset)` are triggered, notes leaving it are
//! released.

use std::collections::BTreeSet;

use pr_core::{NoteId, NoteStore};

use crate::host::NotePreview;

/// Active-note tracker
#[derive(Debug, Clone, Default)]
pub struct PlaybackTracker {
    active: BTreeSet<NoteId>,
    time: f64,
}

impl PlaybackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current playback time (seconds)
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn active(&self) -> &BTreeSet<NoteId> {
        &self.active
    }

    pub fn is_active(&self, id: NoteId) -> bool {
        self.active.contains(&id)
    }

    /// Advance to `time`. Returns true when the active set changed.
    pub fn update(&mut self, store: &NoteStore, time: f64, preview: &mut dyn NotePreview) -> bool {
        self.time = time;
        let now: BTreeSet<NoteId> = store.active_at(time).into_iter().collect();
        if now == self.active {
            return false;
        }

        if preview.enabled() {
            for id in self.active.difference(&now) {
                if let Some(note) = store.get(*id) {
                    preview.release_note(note);
                }
            }
            for id in now.difference(&self.active) {
                if let Some(note) = store.get(*id) {
                    preview.trigger_note(note);
                }
            }
        }

        self.active = now;
        true
    }

    /// Jump to `time`: silence everything and start over
    pub fn seek(&mut self, time: f64, preview: &mut dyn NotePreview) {
        preview.stop_all();
        self.active.clear();
        self.time = time;
    }

    /// Playback paused: silence everything
    pub fn pause(&mut self, preview: &mut dyn NotePreview) {
        preview.stop_all();
        self.active.clear();
    }

    /// A note was removed from the store
    pub fn forget(&mut self, id: NoteId) {
        self.active.remove(&id);
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.time = 0.0;
    }
}
