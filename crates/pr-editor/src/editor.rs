//! Editor session
//!
//! One [`Editor`] owns everything for a piano roll instance: the note store,
//! selection, hover and gesture state, playback tracking, the spectrogram
//! engine and the listener registry. Every entry point runs to completion
//! on the caller's thread and reports what happened through [`EditorEvent`]s.

use std::collections::BTreeSet;

use pr_core::{
    CoordinateParams, CsvOptions, MIN_NOTE_DURATION, Note, NoteDraft, NoteId, NoteInput,
    NoteStore, normalize, parse_csv, parse_json, parse_midi, write_midi,
};
use pr_spectrogram::{ColorMap, FftSize, SpectrogramEngine, detect_note};

use crate::error::{EditorError, EditorResult};
use crate::events::{EditorEvent, EventBus, EventKind, ListenerId, ResizeEdge};
use crate::gesture::{BoxSelection, DragMode, DragState, Gesture};
use crate::hit::{drag_mode, hit_test, notes_in_rect};
use crate::host::{HostEvent, NotePreview, TimelineHost};
use crate::options::EditorOptions;
use crate::playback::PlaybackTracker;
use crate::render::{RenderFrame, RenderInput, SpectrogramCache, compose};
use crate::tooltip::{Tooltip, tooltip_text};

/// Length of notes created by double-click (seconds)
pub const CREATE_DURATION: f64 = 0.25;

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Modifier keys held during a pointer event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Other,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EDITOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Piano roll editor session
pub struct Editor {
    options: EditorOptions,
    host: Box<dyn TimelineHost>,
    preview: Box<dyn NotePreview>,
    store: NoteStore,
    selection: BTreeSet<NoteId>,
    hovered: Option<NoteId>,
    gesture: Gesture,
    tooltip: Tooltip,
    playback: PlaybackTracker,
    spectrogram: SpectrogramEngine,
    cache: SpectrogramCache,
    events: EventBus,
    folded: bool,
    show_spectrogram: bool,
    snap_mode: bool,
    color_map: ColorMap,
    dirty: bool,
    ready: bool,
    destroyed: bool,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("notes", &self.store.len())
            .field("selection", &self.selection)
            .field("hovered", &self.hovered)
            .field("gesture", &self.gesture)
            .field("spectrogram", &self.spectrogram)
            .field("events", &self.events)
            .field("folded", &self.folded)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Editor {
    /// Create an editor attached to a timeline host and a preview sink
    pub fn new(
        host: impl TimelineHost + 'static,
        preview: impl NotePreview + 'static,
        options: EditorOptions,
    ) -> EditorResult<Self> {
        let mut store = NoteStore::new();
        if let Some((min, max)) = options.pitch_range() {
            store.set_pitch_range(min, max)?;
        }

        let spectrogram = if options.background_analysis {
            SpectrogramEngine::with_worker(options.spectrogram)?
        } else {
            SpectrogramEngine::new(options.spectrogram)
        };

        Ok(Self {
            host: Box::new(host),
            preview: Box::new(preview),
            store,
            selection: BTreeSet::new(),
            hovered: None,
            gesture: Gesture::Idle,
            tooltip: Tooltip::default(),
            playback: PlaybackTracker::new(),
            spectrogram,
            cache: SpectrogramCache::new(),
            events: EventBus::new(),
            folded: options.folded,
            show_spectrogram: options.show_spectrogram,
            snap_mode: options.snap_to_spectrogram,
            color_map: options.color_map,
            dirty: true,
            ready: false,
            destroyed: false,
            options,
        })
    }

    /// Finish attaching: emits `Ready` once
    pub fn init(&mut self) {
        if self.ready || self.destroyed {
            return;
        }
        self.ready = true;
        log::debug!("Piano roll editor ready");
        self.emit(EditorEvent::Ready);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────────────

    /// Subscribe to every event
    pub fn on(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    /// Subscribe to one kind of event
    pub fn on_kind(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&EditorEvent) + 'static,
    ) -> ListenerId {
        self.events.subscribe_to(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    fn emit(&mut self, event: EditorEvent) {
        self.events.emit(event);
    }

    fn emit_selection(&mut self) {
        let selected = self.selected_notes();
        self.emit(EditorEvent::SelectionChange(selected));
    }

    fn emit_notes_change(&mut self) {
        let notes = self.store.snapshot();
        self.emit(EditorEvent::NotesChange(notes));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Geometry
    // ─────────────────────────────────────────────────────────────────────────────

    /// Snapshot of the current view geometry
    pub fn coordinate_params(&self) -> CoordinateParams {
        let (min_pitch, max_pitch) = self.store.pitch_range();
        CoordinateParams {
            width: self.host.width(),
            height: self.options.height,
            duration: self.host.duration(),
            min_pitch,
            max_pitch,
            is_folded: self.folded,
            used_pitches: self.store.used_pitches().to_vec(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replace all notes with normalized input records
    pub fn load_notes(&mut self, inputs: &[NoteInput], pitch_is_hz: Option<bool>) -> usize {
        self.install(normalize(inputs, pitch_is_hz))
    }

    /// Replace all notes from a JSON array of note records
    pub fn load_json(&mut self, text: &str, pitch_is_hz: Option<bool>) -> EditorResult<usize> {
        let inputs = parse_json(text)?;
        Ok(self.load_notes(&inputs, pitch_is_hz))
    }

    /// Replace all notes from delimited text
    pub fn load_csv(&mut self, text: &str, options: &CsvOptions) -> usize {
        let inputs = parse_csv(text, options);
        self.load_notes(&inputs, options.pitch_is_hz)
    }

    /// Replace all notes from a Standard MIDI File. Returns
    /// `(note_count, track_count)`.
    pub fn load_midi_data(&mut self, bytes: &[u8]) -> EditorResult<(usize, usize)> {
        let drafts = parse_midi(bytes)?;
        let count = self.install(drafts);
        Ok((count, self.store.track_count()))
    }

    fn install(&mut self, drafts: Vec<NoteDraft>) -> usize {
        let had_selection = self.reset_interaction();
        let note_count = self.store.replace_all(drafts);
        let track_count = self.store.track_count();
        log::info!("Loaded {} notes on {} tracks", note_count, track_count);

        if had_selection {
            self.emit(EditorEvent::SelectionChange(Vec::new()));
        }
        self.emit(EditorEvent::Load {
            note_count,
            track_count,
        });
        self.emit_notes_change();
        self.dirty = true;
        note_count
    }

    /// Drop gesture, selection, hover and sounding notes. Returns whether
    /// the selection was non-empty.
    fn reset_interaction(&mut self) -> bool {
        if let Gesture::Dragging(state) = &self.gesture {
            if let Some(note) = &state.previewing {
                self.preview.release_note(note);
            }
        }
        self.gesture = Gesture::Idle;
        self.hovered = None;
        self.tooltip.hide();
        self.playback.pause(self.preview.as_mut());
        let had_selection = !self.selection.is_empty();
        self.selection.clear();
        had_selection
    }

    /// Remove every note
    pub fn clear_notes(&mut self) {
        let had_selection = self.reset_interaction();
        self.store.clear();
        if had_selection {
            self.emit(EditorEvent::SelectionChange(Vec::new()));
        }
        self.emit_notes_change();
        self.dirty = true;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// All notes, sorted by onset
    pub fn notes(&self) -> Vec<Note> {
        self.store.snapshot()
    }

    pub fn note(&self, id: NoteId) -> Option<Note> {
        self.store.get(id).cloned()
    }

    pub fn note_count(&self) -> usize {
        self.store.len()
    }

    /// Notes with onset in `[start, end)`
    pub fn notes_in_range(&self, start: f64, end: f64) -> Vec<Note> {
        self.store.in_range(start, end)
    }

    pub fn notes_at_pitch(&self, pitch: u8) -> Vec<Note> {
        self.store.at_pitch(pitch)
    }

    pub fn used_pitches(&self) -> &[u8] {
        self.store.used_pitches()
    }

    pub fn track_count(&self) -> usize {
        self.store.track_count()
    }

    /// Selected notes, in store order
    pub fn selected_notes(&self) -> Vec<Note> {
        self.store
            .notes()
            .iter()
            .filter(|n| self.selection.contains(&n.id()))
            .cloned()
            .collect()
    }

    pub fn hovered_note(&self) -> Option<Note> {
        self.hovered.and_then(|id| self.note(id))
    }

    /// Notes sounding at the current playback time
    pub fn active_notes(&self) -> Vec<Note> {
        self.store
            .notes()
            .iter()
            .filter(|n| self.playback.is_active(n.id()))
            .cloned()
            .collect()
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn spectrogram(&self) -> &SpectrogramEngine {
        &self.spectrogram
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Something changed since the last [`Editor::render`]
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replace the selection. Unknown IDs are ignored.
    pub fn select_notes(&mut self, ids: &[NoteId]) {
        let next: BTreeSet<NoteId> = ids
            .iter()
            .copied()
            .filter(|id| self.store.contains(*id))
            .collect();
        if next != self.selection {
            self.selection = next;
            self.emit_selection();
            self.dirty = true;
        }
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit(EditorEvent::SelectionChange(Vec::new()));
            self.dirty = true;
        }
    }

    /// Remove every selected note. Returns how many were removed.
    pub fn delete_selected_notes(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids: Vec<NoteId> = std::mem::take(&mut self.selection).into_iter().collect();
        let removed = self.store.remove_many(&ids);
        for note in &removed {
            self.forget(note);
        }
        log::debug!("Deleted {} selected notes", removed.len());

        let count = removed.len();
        self.emit(EditorEvent::NoteDelete(removed));
        self.emit(EditorEvent::SelectionChange(Vec::new()));
        self.emit_notes_change();
        self.dirty = true;
        count
    }

    fn delete_note(&mut self, id: NoteId) {
        let Some(note) = self.store.remove(id) else {
            return;
        };
        let was_selected = self.selection.remove(&id);
        self.forget(&note);

        self.emit(EditorEvent::NoteDelete(vec![note]));
        if was_selected {
            self.emit_selection();
        }
        self.emit_notes_change();
        self.dirty = true;
    }

    /// Clear hover and playback state referring to a removed note
    fn forget(&mut self, note: &Note) {
        if self.playback.is_active(note.id()) {
            self.playback.forget(note.id());
            if self.preview.enabled() {
                self.preview.release_note(note);
            }
        }
        if self.hovered == Some(note.id()) {
            self.hovered = None;
            self.tooltip.hide();
            self.emit(EditorEvent::NoteHover(None));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Display settings
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn pitch_range(&self) -> (u8, u8) {
        self.store.pitch_range()
    }

    /// Fix the visible pitch range
    pub fn set_pitch_range(&mut self, min: u8, max: u8) -> EditorResult<()> {
        self.store.set_pitch_range(min, max)?;
        self.dirty = true;
        Ok(())
    }

    /// Return to the range derived from the loaded notes
    pub fn reset_pitch_range(&mut self) {
        self.store.reset_pitch_range();
        self.dirty = true;
    }

    pub fn is_folded(&self) -> bool {
        self.folded
    }

    pub fn set_folded(&mut self, folded: bool) {
        if self.folded != folded {
            self.folded = folded;
            self.dirty = true;
        }
    }

    /// Flip fold state; returns the new state
    pub fn toggle_fold(&mut self) -> bool {
        self.set_folded(!self.folded);
        self.folded
    }

    pub fn fft_size(&self) -> FftSize {
        self.spectrogram.fft_size()
    }

    /// Change the FFT size. Sizes outside 256..=8192 (powers of two) are
    /// rejected and leave the current size in place.
    pub fn set_fft_size(&mut self, size: usize) -> EditorResult<()> {
        self.spectrogram.set_fft_size(size)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_overlap(&mut self, overlap: f32) -> EditorResult<()> {
        self.spectrogram.set_overlap(overlap)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_color_map(&mut self, color_map: ColorMap) {
        if self.color_map != color_map {
            self.color_map = color_map;
            self.dirty = true;
        }
    }

    pub fn set_show_spectrogram(&mut self, show: bool) {
        if self.show_spectrogram != show {
            self.show_spectrogram = show;
            self.dirty = true;
        }
    }

    /// Snap double-click creation to the spectrogram
    pub fn set_snap_mode(&mut self, snap: bool) {
        self.snap_mode = snap;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────────

    /// Standard MIDI File bytes, or `None` when there are no notes
    pub fn export_midi(&self) -> EditorResult<Option<Vec<u8>>> {
        Ok(write_midi(self.store.notes())?)
    }

    /// JSON array of every note
    pub fn export_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self.store.notes())?)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Pointer input
    // ─────────────────────────────────────────────────────────────────────────────

    /// Pointer pressed: start a drag on a note, delete it with shift, or
    /// start a box selection on empty space
    pub fn pointer_down(&mut self, x: f64, y: f64, modifiers: Modifiers) {
        if self.destroyed || !self.gesture.is_idle() {
            return;
        }
        let params = self.coordinate_params();
        match hit_test(self.store.notes(), &params, x, y) {
            Some(id) if modifiers.shift => self.delete_note(id),
            Some(id) => self.begin_drag(id, &params, x, y),
            None => self.begin_box(x, y, modifiers),
        }
    }

    fn begin_drag(&mut self, id: NoteId, params: &CoordinateParams, x: f64, y: f64) {
        let Some(anchor) = self.store.get(id).cloned() else {
            return;
        };
        let mode = drag_mode(&params.note_hit_rect(&anchor), x);

        let group = mode == DragMode::Move && self.selection.len() >= 2 && self.selection.contains(&id);
        let originals = if group {
            self.selected_notes()
        } else {
            vec![anchor.clone()]
        };
        log::debug!("Drag start: {:?} on {} ({} notes)", mode, anchor.name(), originals.len());

        self.tooltip.hide();
        self.gesture = Gesture::Dragging(DragState::new(mode, &anchor, originals, x, y));
    }

    fn begin_box(&mut self, x: f64, y: f64, modifiers: Modifiers) {
        if !modifiers.shift && !self.selection.is_empty() {
            self.selection.clear();
            self.emit(EditorEvent::SelectionChange(Vec::new()));
        }
        self.gesture = Gesture::BoxSelecting(BoxSelection::new(x, y));
        self.dirty = true;
    }

    /// Pointer moved: continue the active gesture, or update hover
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if self.destroyed {
            return;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging(mut state) => {
                self.update_drag(&mut state, x, y);
                self.gesture = Gesture::Dragging(state);
            }
            Gesture::BoxSelecting(mut selection) => {
                selection.current_x = x;
                selection.current_y = y;
                self.gesture = Gesture::BoxSelecting(selection);
                self.dirty = true;
            }
            Gesture::Idle => self.update_hover(x, y),
        }
    }

    /// Pointer released: commit the active gesture
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        if self.destroyed {
            return;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging(mut state) => {
                self.update_drag(&mut state, x, y);
                self.finish_drag(state);
                self.update_hover(x, y);
            }
            Gesture::BoxSelecting(mut selection) => {
                selection.current_x = x;
                selection.current_y = y;
                self.finish_box(selection);
            }
            Gesture::Idle => {}
        }
    }

    /// Pointer left the editor
    pub fn pointer_leave(&mut self) {
        if self.destroyed || !self.gesture.is_idle() {
            return;
        }
        self.tooltip.hide();
        if self.hovered.take().is_some() {
            self.emit(EditorEvent::NoteHover(None));
            self.dirty = true;
        }
    }

    /// Double-click on empty space creates a note. Returns its ID.
    pub fn double_click(&mut self, x: f64, y: f64) -> Option<NoteId> {
        if self.destroyed || !self.gesture.is_idle() {
            return None;
        }
        let params = self.coordinate_params();
        if hit_test(self.store.notes(), &params, x, y).is_some() {
            return None;
        }

        let total = params.duration.max(0.0);
        let time = params.px_to_time(x).clamp(0.0, total);
        let pitch = params.px_to_pitch(y);

        let detected = if self.snap_mode {
            self.spectrogram
                .matrix()
                .and_then(|matrix| detect_note(matrix, time, pitch as f64, total))
        } else {
            None
        };

        let draft = match detected {
            Some(found) => {
                log::debug!(
                    "Snapped new note to {} at {:.3}s..{:.3}s",
                    found.pitch,
                    found.onset,
                    found.offset
                );
                NoteDraft::new(found.pitch, found.onset, found.duration())
            }
            None => {
                let offset = (time + CREATE_DURATION).min(total);
                if offset <= time {
                    log::debug!("No room for a new note at {:.3}s", time);
                    return None;
                }
                NoteDraft::new(pitch, time, offset - time)
            }
        };

        let id = self.store.insert(draft);
        let note = self.store.get(id).cloned()?;
        self.emit(EditorEvent::NoteCreate(note));
        self.emit_notes_change();
        self.dirty = true;
        Some(id)
    }

    /// Key pressed. Returns true when the key was handled.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.destroyed {
            return false;
        }
        match key {
            Key::Delete | Key::Backspace if self.gesture.is_idle() => {
                self.delete_selected_notes() > 0
            }
            Key::Escape if !self.gesture.is_idle() => self.cancel_gesture(),
            Key::Escape if !self.selection.is_empty() => {
                self.clear_selection();
                true
            }
            _ => false,
        }
    }

    /// Abandon the active gesture without emitting anything. Dragged notes
    /// return to where they started.
    pub fn cancel_gesture(&mut self) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging(state) => {
                if let Some(note) = &state.previewing {
                    self.preview.release_note(note);
                }
                for original in &state.originals {
                    if let Some(note) = self.store.get_mut(original.id()) {
                        note.restore_from(original);
                    }
                }
                self.store.sort();
                self.store.refresh_used_pitches();
                self.dirty = true;
                true
            }
            Gesture::BoxSelecting(_) => {
                self.dirty = true;
                true
            }
            Gesture::Idle => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Gestures
    // ─────────────────────────────────────────────────────────────────────────────

    fn update_drag(&mut self, state: &mut DragState, x: f64, y: f64) {
        let params = self.coordinate_params();
        let total = params.duration.max(0.0);
        let dt = if params.width > 0.0 {
            (x - state.start_x) / params.width * params.duration
        } else {
            0.0
        };
        let dp = params.px_to_pitch(y) as i32 - params.px_to_pitch(state.start_y) as i32;

        for original in &state.originals {
            let Some(note) = self.store.get_mut(original.id()) else {
                continue;
            };
            match state.mode {
                DragMode::Move => {
                    let latest = (total - original.duration()).max(0.0);
                    note.move_to((original.onset() + dt).clamp(0.0, latest));
                    note.set_pitch(original.pitch() as i32 + dp);
                }
                DragMode::ResizeLeft => {
                    let latest = (original.offset() - MIN_NOTE_DURATION).max(0.0);
                    note.set_onset_keep_offset((original.onset() + dt).clamp(0.0, latest));
                }
                DragMode::ResizeRight => {
                    let earliest = original.onset() + MIN_NOTE_DURATION;
                    note.set_offset((original.offset() + dt).clamp(earliest, total.max(earliest)));
                }
            }
        }

        if state.mode == DragMode::Move {
            self.preview_drag_pitch(state);
        }
        self.dirty = true;
    }

    /// Re-trigger the preview when the dragged note lands on a new pitch
    fn preview_drag_pitch(&mut self, state: &mut DragState) {
        if !self.preview.enabled() {
            return;
        }
        let Some(anchor) = self.store.get(state.anchor) else {
            return;
        };
        if anchor.pitch() == state.preview_pitch {
            return;
        }
        state.preview_pitch = anchor.pitch();
        let anchor = anchor.clone();

        if let Some(previous) = state.previewing.take() {
            self.preview.release_note(&previous);
        }
        self.preview.trigger_note(&anchor);
        state.previewing = Some(anchor);
    }

    fn finish_drag(&mut self, state: DragState) {
        if let Some(note) = &state.previewing {
            self.preview.release_note(note);
        }
        self.store.sort();
        self.store.refresh_used_pitches();

        let mut changed = false;
        for original in state.originals {
            let Some(after) = self.store.get(original.id()).cloned() else {
                continue;
            };
            if !after.geometry_differs(&original) {
                continue;
            }
            changed = true;
            let event = match state.mode {
                DragMode::Move => EditorEvent::NoteDrag {
                    before: original,
                    after,
                },
                DragMode::ResizeLeft => EditorEvent::NoteResize {
                    before: original,
                    after,
                    edge: ResizeEdge::Left,
                },
                DragMode::ResizeRight => EditorEvent::NoteResize {
                    before: original,
                    after,
                    edge: ResizeEdge::Right,
                },
            };
            self.emit(event);
        }

        if changed {
            self.emit_notes_change();
        }
        self.dirty = true;
    }

    fn finish_box(&mut self, selection: BoxSelection) {
        let params = self.coordinate_params();
        let before = self.selection.clone();
        self.selection
            .extend(notes_in_rect(self.store.notes(), &params, &selection.rect()));
        if self.selection != before {
            self.emit_selection();
        }
        self.dirty = true;
    }

    fn update_hover(&mut self, x: f64, y: f64) {
        let params = self.coordinate_params();
        let hit = hit_test(self.store.notes(), &params, x, y);

        if hit != self.hovered {
            self.hovered = hit;
            let note = hit.and_then(|id| self.store.get(id).cloned());
            self.emit(EditorEvent::NoteHover(note));
            self.dirty = true;
        }

        match hit.and_then(|id| self.store.get(id)) {
            Some(note) if self.options.show_tooltip => {
                let text = tooltip_text(note);
                self.tooltip.show(text, x, y, params.width, params.height);
            }
            _ => self.tooltip.hide(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Host integration
    // ─────────────────────────────────────────────────────────────────────────────

    /// React to a timeline notification
    pub fn handle_host_event(&mut self, event: HostEvent) -> EditorResult<()> {
        if self.destroyed {
            return Err(EditorError::Destroyed);
        }
        match event {
            HostEvent::Zoom | HostEvent::Scroll | HostEvent::Redraw => {}
            HostEvent::TimeUpdate(time) => {
                self.playback
                    .update(&self.store, time, self.preview.as_mut());
            }
            HostEvent::Seek(time) => self.playback.seek(time, self.preview.as_mut()),
            HostEvent::Pause => self.playback.pause(self.preview.as_mut()),
            HostEvent::AudioDecoded(audio) => {
                log::info!(
                    "Audio decoded: {:.2}s at {} Hz, {} channels",
                    audio.duration(),
                    audio.sample_rate,
                    audio.channels.len()
                );
                self.spectrogram.set_audio(&audio)?;
                self.cache.invalidate();
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Install a finished background analysis. Returns true if the
    /// spectrogram changed.
    pub fn poll_analysis(&mut self) -> bool {
        let changed = self.spectrogram.poll();
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Block until a pending background analysis is installed
    pub fn wait_for_analysis(&mut self) -> bool {
        let changed = self.spectrogram.wait();
        if changed {
            self.dirty = true;
        }
        changed
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────────

    /// Compose the current frame
    pub fn render(&mut self) -> RenderFrame {
        let params = self.coordinate_params();

        let image = match (self.show_spectrogram, self.spectrogram.matrix()) {
            (true, Some(matrix)) => Some(self.cache.get(
                matrix,
                self.spectrogram.matrix_generation(),
                &params,
                self.color_map,
                self.options.theme.background,
            )),
            _ => None,
        };

        let frame = compose(&RenderInput {
            params: &params,
            notes: self.store.notes(),
            selection: &self.selection,
            hovered: if self.gesture.is_dragging() { None } else { self.hovered },
            active: self.playback.active(),
            selection_box: self.gesture.selection_box(),
            playhead: Some(self.playback.time()),
            spectrogram: image.as_ref(),
            theme: &self.options.theme,
        });
        self.dirty = false;
        frame
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    /// Tear down: emits `Destroy`, silences previews, clears all state and
    /// drops every listener
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.emit(EditorEvent::Destroy);

        self.preview.stop_all();
        self.gesture = Gesture::Idle;
        self.selection.clear();
        self.hovered = None;
        self.tooltip.hide();
        self.store.clear();
        self.playback.clear();
        self.spectrogram.clear();
        self.cache.invalidate();
        self.events.clear();
        self.destroyed = true;
        log::debug!("Piano roll editor destroyed");
    }
}
