//! Note records
//!
//! A [`Note`] keeps `offset == onset + duration` and a canonical `name`
//! derived from its pitch. Timing and pitch are only mutated through methods
//! so neither invariant can be broken from outside.

use serde::Serialize;

use crate::pitch::{MAX_PITCH, clamp_pitch, note_name};

/// Shortest note the editor will produce by resizing (seconds)
pub const MIN_NOTE_DURATION: f64 = 0.05;

/// Duration used when an input record carries none (seconds)
pub const DEFAULT_INPUT_DURATION: f64 = 0.1;

/// Velocity used for notes without an explicit velocity
pub const DEFAULT_VELOCITY: f32 = 0.8;

/// Stable note identity, assigned by the store on insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NoteId(pub u64);

/// A normalized note that has not been inserted into a store yet
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub pitch: u8,
    pub onset: f64,
    pub duration: f64,
    pub velocity: f32,
    pub track: u32,
    pub channel: u8,
    pub color: Option<String>,
}

impl NoteDraft {
    pub fn new(pitch: u8, onset: f64, duration: f64) -> Self {
        Self {
            pitch,
            onset,
            duration,
            velocity: DEFAULT_VELOCITY,
            track: 0,
            channel: 0,
            color: None,
        }
    }

    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_track(mut self, track: u32, channel: u8) -> Self {
        self.track = track;
        self.channel = channel;
        self
    }
}

/// A note event on the piano roll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    id: NoteId,
    pitch: u8,
    name: String,
    onset: f64,
    offset: f64,
    duration: f64,
    /// Velocity (0.0-1.0)
    pub velocity: f32,
    pub track: u32,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Optional display color override (CSS-style string)
    pub color: Option<String>,
}

impl Note {
    pub(crate) fn from_draft(id: NoteId, draft: NoteDraft) -> Self {
        let onset = draft.onset.max(0.0);
        let duration = if draft.duration > 0.0 && draft.duration.is_finite() {
            draft.duration
        } else {
            DEFAULT_INPUT_DURATION
        };
        Self {
            id,
            pitch: draft.pitch.min(MAX_PITCH),
            name: note_name(draft.pitch),
            onset,
            offset: onset + duration,
            duration,
            velocity: draft.velocity.clamp(0.0, 1.0),
            track: draft.track,
            channel: draft.channel.min(15),
            color: draft.color,
        }
    }

    #[inline]
    pub fn id(&self) -> NoteId {
        self.id
    }

    #[inline]
    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn onset(&self) -> f64 {
        self.onset
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Set the pitch (clamped to 0-127) and refresh the name
    pub fn set_pitch(&mut self, pitch: i32) {
        let pitch = clamp_pitch(pitch as f64);
        if pitch != self.pitch {
            self.pitch = pitch;
            self.name = note_name(pitch);
        }
    }

    /// Move the note in time, keeping its duration
    pub fn move_to(&mut self, onset: f64) {
        self.onset = onset.max(0.0);
        self.offset = self.onset + self.duration;
    }

    /// Move the start, keeping the end fixed
    pub fn set_onset_keep_offset(&mut self, onset: f64) {
        self.onset = onset.max(0.0).min(self.offset);
        self.duration = self.offset - self.onset;
    }

    /// Move the end, keeping the start fixed
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset.max(self.onset);
        self.duration = self.offset - self.onset;
    }

    /// Restore timing and pitch from another snapshot of the same note
    pub fn restore_from(&mut self, other: &Note) {
        self.onset = other.onset;
        self.offset = other.offset;
        self.duration = other.duration;
        self.set_pitch(other.pitch as i32);
    }

    /// True if onset, offset or pitch differ from `other`
    pub fn geometry_differs(&self, other: &Note) -> bool {
        self.onset != other.onset || self.offset != other.offset || self.pitch != other.pitch
    }

    /// Is the note sounding at `time` (onset inclusive, offset exclusive)?
    #[inline]
    pub fn is_active_at(&self, time: f64) -> bool {
        self.onset <= time && time < self.offset
    }
}
