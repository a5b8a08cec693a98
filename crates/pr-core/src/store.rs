//! Note Store
//!
//! Owns the note list of one editor session:
//! - Bulk replacement from any normalized source (JSON, CSV, MIDI)
//! - Single insert/remove with stable [`NoteId`]s
//! - Onset-ordered storage and pure range/pitch queries
//! - Used-pitch set for folded display
//! - Automatic or explicit display pitch range

use std::collections::HashSet;

use crate::error::{PianoRollError, PrResult};
use crate::note::{Note, NoteDraft, NoteId};
use crate::pitch::MAX_PITCH;

/// Pitch range shown before any notes are loaded (A0 - C8)
pub const DEFAULT_PITCH_RANGE: (u8, u8) = (21, 108);

// ═══════════════════════════════════════════════════════════════════════════════
// NOTE STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered collection of notes
#[derive(Debug, Clone)]
pub struct NoteStore {
    /// Notes sorted ascending by onset
    notes: Vec<Note>,
    /// Distinct pitches, ascending
    used_pitches: Vec<u8>,
    /// Range derived from the loaded notes
    auto_range: (u8, u8),
    /// Range set by the caller, overrides `auto_range`
    explicit_range: Option<(u8, u8)>,
    /// Next note ID
    next_id: u64,
}

impl Default for NoteStore {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            used_pitches: Vec::new(),
            auto_range: DEFAULT_PITCH_RANGE,
            explicit_range: None,
            next_id: 1,
        }
    }
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        id
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Structural changes
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replace every note. Returns the number of notes stored.
    pub fn replace_all(&mut self, drafts: Vec<NoteDraft>) -> usize {
        let mut notes = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = self.allocate_id();
            notes.push(Note::from_draft(id, draft));
        }
        self.notes = notes;
        self.sort();
        self.refresh_used_pitches();
        self.recompute_auto_range();
        log::debug!("Note store replaced: {} notes", self.notes.len());
        self.notes.len()
    }

    /// Insert a single note, keeping onset order
    pub fn insert(&mut self, draft: NoteDraft) -> NoteId {
        let id = self.allocate_id();
        self.notes.push(Note::from_draft(id, draft));
        self.sort();
        self.refresh_used_pitches();
        id
    }

    /// Remove note by ID
    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        let pos = self.notes.iter().position(|n| n.id() == id)?;
        let note = self.notes.remove(pos);
        self.refresh_used_pitches();
        Some(note)
    }

    /// Remove every note whose ID is listed, in store order
    pub fn remove_many(&mut self, ids: &[NoteId]) -> Vec<Note> {
        let ids: HashSet<NoteId> = ids.iter().copied().collect();
        let (removed, kept): (Vec<Note>, Vec<Note>) = std::mem::take(&mut self.notes)
            .into_iter()
            .partition(|n| ids.contains(&n.id()));
        self.notes = kept;
        self.refresh_used_pitches();
        removed
    }

    /// Remove all notes
    pub fn clear(&mut self) {
        self.notes.clear();
        self.used_pitches.clear();
    }

    /// Re-sort by onset (stable for equal onsets)
    pub fn sort(&mut self) {
        self.notes.sort_by(|a, b| a.onset().total_cmp(&b.onset()));
    }

    /// Recompute the distinct pitch set
    pub fn refresh_used_pitches(&mut self) {
        let mut pitches: Vec<u8> = self.notes.iter().map(|n| n.pitch()).collect();
        pitches.sort_unstable();
        pitches.dedup();
        self.used_pitches = pitches;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Owned copy of every note
    pub fn snapshot(&self) -> Vec<Note> {
        self.notes.clone()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id() == id)
    }

    /// Mutable access for in-place edits. Callers editing pitch must call
    /// [`NoteStore::refresh_used_pitches`] once they are done.
    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id() == id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.get(id).is_some()
    }

    pub fn used_pitches(&self) -> &[u8] {
        &self.used_pitches
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Notes whose onset lies in `[start, end)`
    pub fn in_range(&self, start: f64, end: f64) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|n| n.onset() >= start && n.onset() < end)
            .cloned()
            .collect()
    }

    /// Notes with exactly this pitch
    pub fn at_pitch(&self, pitch: u8) -> Vec<Note> {
        self.notes.iter().filter(|n| n.pitch() == pitch).cloned().collect()
    }

    /// IDs of notes sounding at `time`. Does not rely on onset order, which
    /// in-place edits through [`NoteStore::get_mut`] can break until the next
    /// sort.
    pub fn active_at(&self, time: f64) -> Vec<NoteId> {
        self.notes
            .iter()
            .filter(|n| n.is_active_at(time))
            .map(|n| n.id())
            .collect()
    }

    /// Number of distinct tracks
    pub fn track_count(&self) -> usize {
        self.notes.iter().map(|n| n.track).collect::<HashSet<_>>().len()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Pitch range
    // ─────────────────────────────────────────────────────────────────────────────

    /// Effective display range (min, max)
    pub fn pitch_range(&self) -> (u8, u8) {
        self.explicit_range.unwrap_or(self.auto_range)
    }

    pub fn has_explicit_range(&self) -> bool {
        self.explicit_range.is_some()
    }

    /// Fix the display range, overriding the automatic one
    pub fn set_pitch_range(&mut self, min: u8, max: u8) -> PrResult<()> {
        if min > max || max > MAX_PITCH {
            return Err(PianoRollError::InvalidPitchRange { min, max });
        }
        self.explicit_range = Some((min, max));
        Ok(())
    }

    /// Return to the automatic range
    pub fn reset_pitch_range(&mut self) {
        self.explicit_range = None;
        self.recompute_auto_range();
    }

    /// Pad the used range out to octave boundaries. Empty stores keep the
    /// previous range.
    fn recompute_auto_range(&mut self) {
        let (Some(&lowest), Some(&highest)) = (self.used_pitches.first(), self.used_pitches.last())
        else {
            return;
        };
        self.auto_range = auto_pitch_range(lowest, highest);
    }
}

/// Automatic display range for notes spanning `lowest..=highest`
pub fn auto_pitch_range(lowest: u8, highest: u8) -> (u8, u8) {
    let min = (lowest as i32 / 12) * 12 - 2;
    let max = (highest as i32 + 11) / 12 * 12 + 2 + 11;
    (
        min.clamp(0, MAX_PITCH as i32) as u8,
        max.clamp(0, MAX_PITCH as i32) as u8,
    )
}
