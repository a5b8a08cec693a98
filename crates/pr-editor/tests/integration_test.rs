//! Editor Integration Tests
//!
//! Drives a full editor session through its public entry points:
//! - Loading emits Load / NotesChange with sorted notes
//! - Drag, resize, box selection, delete and create gestures
//! - Hover, tooltip and playback preview
//! - Spectrogram snap and background analysis
//! - Teardown

use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use approx::assert_relative_eq;
use pr_core::{CsvOptions, Note, NoteInput};
use pr_editor::{
    DrawCommand, Editor, EditorError, EditorEvent, EditorOptions, EventKind, HostEvent, Key,
    Modifiers, NotePreview, StaticTimeline,
};
use pr_spectrogram::{AudioBuffer, FftSize, SpectrogramConfig};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

/// Preview sink that records every call
#[derive(Clone, Default)]
struct RecordingPreview {
    log: Rc<RefCell<Vec<String>>>,
}

impl NotePreview for RecordingPreview {
    fn enabled(&self) -> bool {
        true
    }

    fn trigger_note(&mut self, note: &Note) {
        self.log.borrow_mut().push(format!("on {}", note.pitch()));
    }

    fn release_note(&mut self, note: &Note) {
        self.log.borrow_mut().push(format!("off {}", note.pitch()));
    }

    fn stop_all(&mut self) {
        self.log.borrow_mut().push("stop".to_string());
    }
}

type EventLog = Rc<RefCell<Vec<EditorEvent>>>;

/// 8s timeline over 800px (100px per second); pitches 60..=83 over 240px
/// (10px rows)
fn options() -> EditorOptions {
    EditorOptions {
        height: 240.0,
        min_pitch: Some(60),
        max_pitch: Some(83),
        ..Default::default()
    }
}

fn editor_with(preview: RecordingPreview, options: EditorOptions) -> (Editor, EventLog) {
    init_logging();
    let mut editor = Editor::new(StaticTimeline::new(8.0, 800.0), preview, options).unwrap();
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    editor.on(move |event| sink.borrow_mut().push(event.clone()));
    editor.init();
    log.borrow_mut().clear();
    (editor, log)
}

fn editor() -> (Editor, EventLog) {
    editor_with(RecordingPreview::default(), options())
}

/// y at the middle of a pitch row
fn row_y(pitch: u8) -> f64 {
    240.0 - (pitch as f64 - 60.0 + 1.0) * 10.0 + 5.0
}

fn count(log: &EventLog, kind: EventKind) -> usize {
    log.borrow().iter().filter(|e| e.kind() == kind).count()
}

fn of_kind(log: &EventLog, kind: EventKind) -> Vec<EditorEvent> {
    log.borrow().iter().filter(|e| e.kind() == kind).cloned().collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_ready_emitted_once() {
    init_logging();
    let mut editor =
        Editor::new(StaticTimeline::new(8.0, 800.0), RecordingPreview::default(), options())
            .unwrap();
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    editor.on(move |event| sink.borrow_mut().push(event.clone()));

    editor.init();
    editor.init();
    assert_eq!(*log.borrow(), vec![EditorEvent::Ready]);
}

#[test]
fn test_load_emits_sorted_notes() {
    let (mut editor, log) = editor();
    let count = editor.load_notes(
        &[
            NoteInput::new(67.0, 3.0, 0.5),
            NoteInput::new(60.0, 0.0, 0.5),
            NoteInput::new(64.0, 1.5, 0.5),
        ],
        None,
    );
    assert_eq!(count, 3);

    let events = log.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        EditorEvent::Load {
            note_count: 3,
            track_count: 1
        }
    );
    let EditorEvent::NotesChange(notes) = &events[1] else {
        panic!("expected NotesChange, got {:?}", events[1]);
    };
    let pitches: Vec<u8> = notes.iter().map(Note::pitch).collect();
    assert_eq!(pitches, vec![60, 64, 67]);
    assert_eq!(editor.used_pitches(), &[60, 64, 67]);
}

#[test]
fn test_load_csv_hz() {
    let (mut editor, _log) = editor();
    let count = editor.load_csv("0.0,440,0.5\n1.0,880,0.25", &CsvOptions::hz());
    assert_eq!(count, 2);

    let notes = editor.notes();
    assert_eq!(notes[0].pitch(), 69);
    assert_eq!(notes[1].pitch(), 81);
    assert_relative_eq!(notes[0].onset(), 0.0);
    assert_relative_eq!(notes[1].onset(), 1.0);
}

#[test]
fn test_load_json_error_keeps_notes() {
    let (mut editor, log) = editor();
    editor.load_notes(&[NoteInput::new(60.0, 0.0, 1.0)], None);
    log.borrow_mut().clear();

    let err = editor.load_json("{not json", None).unwrap_err();
    assert!(matches!(err, EditorError::Core(_)));
    assert_eq!(editor.note_count(), 1);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_midi_export_round_trip() {
    let (mut other, _log) = editor();
    let (mut source, _log) = editor();
    assert!(source.export_midi().unwrap().is_none());

    source.load_notes(
        &[NoteInput::new(72.0, 0.5, 0.5), NoteInput::new(65.0, 1.0, 1.0)],
        None,
    );
    let bytes = source.export_midi().unwrap().unwrap();

    let (notes, tracks) = other.load_midi_data(&bytes).unwrap();
    assert_eq!(notes, 2);
    assert_eq!(tracks, 1);
    assert_eq!(other.notes_at_pitch(65).len(), 1);
    assert_relative_eq!(other.notes()[0].onset(), 0.5, epsilon = 1e-3);
}

#[test]
fn test_export_json() {
    let (mut editor, _log) = editor();
    editor.load_notes(&[NoteInput::new(60.0, 0.0, 1.0)], None);
    let json = editor.export_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(1));
    assert_eq!(value[0]["pitch"], 60);
    assert_eq!(value[0]["name"], "C4");
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRAG
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_drag_emits_single_event() {
    let (mut editor, log) = editor();
    editor.load_notes(&[NoteInput::new(64.0, 1.0, 1.0)], None);
    log.borrow_mut().clear();

    // Note spans x 100..200; grab the middle
    editor.pointer_down(150.0, row_y(64), Modifiers::NONE);
    editor.pointer_move(200.0, row_y(66));
    editor.pointer_up(250.0, row_y(67));

    let drags = of_kind(&log, EventKind::NoteDrag);
    assert_eq!(drags.len(), 1);
    let EditorEvent::NoteDrag { before, after } = &drags[0] else {
        unreachable!();
    };
    assert_eq!(before.pitch(), 64);
    assert_relative_eq!(before.onset(), 1.0);
    assert_eq!(after.pitch(), 67);
    assert_relative_eq!(after.onset(), 2.0);
    assert_relative_eq!(after.duration(), 1.0);
    assert_eq!(before.id(), after.id());
    assert_eq!(count(&log, EventKind::NotesChange), 1);
    assert_eq!(editor.used_pitches(), &[67]);
}

#[test]
fn test_zero_drag_emits_nothing() {
    let (mut editor, log) = editor();
    editor.load_notes(&[NoteInput::new(64.0, 1.0, 1.0)], None);
    log.borrow_mut().clear();

    editor.pointer_down(150.0, row_y(64), Modifiers::NONE);
    editor.pointer_move(250.0, row_y(64));
    editor.pointer_up(150.0, row_y(64));

    assert_eq!(count(&log, EventKind::NoteDrag), 0);
    assert_eq!(count(&log, EventKind::NotesChange), 0);
    assert!(editor.gesture().is_idle());
}

#[test]
fn test_move_clamped_to_timeline() {
    let (mut editor, _log) = editor();
    editor.load_notes(&[NoteInput::new(64.0, 1.0, 1.0)], None);
    let id = editor.notes()[0].id();

    editor.pointer_down(150.0, row_y(64), Modifiers::NONE);
    editor.pointer_up(5000.0, row_y(64));
    assert_relative_eq!(editor.note(id).unwrap().onset(), 7.0);

    editor.pointer_down(750.0, row_y(64), Modifiers::NONE);
    editor.pointer_up(-5000.0, row_y(64));
    assert_relative_eq!(editor.note(id).unwrap().onset(), 0.0);
}

#[test]
fn test_resize_right_emits_resize() {
    let (mut editor, log) = editor();
    editor.load_notes(&[NoteInput::new(64.0, 1.0, 1.0)], None);
    log.borrow_mut().clear();

    editor.pointer_down(198.0, row_y(64), Modifiers::NONE);
    editor.pointer_up(248.0, row_y(70));

    let resizes = of_kind(&log, EventKind::NoteResize);
    assert_eq!(resizes.len(), 1);
    let EditorEvent::NoteResize { after, edge, .. } = &resizes[0] else {
        unreachable!();
    };
    assert_eq!(*edge, pr_editor::ResizeEdge::Right);
    // Pitch is untouched by a resize
    assert_eq!(after.pitch(), 64);
    assert_relative_eq!(after.onset(), 1.0);
    assert_relative_eq!(after.offset(), 2.5);
}

#[test]
fn test_multi_selection_moves_together() {
    let (mut editor, log) = editor();
    editor.load_notes(
        &[
            NoteInput::new(60.0, 0.0, 1.0),
            NoteInput::new(64.0, 2.0, 1.0),
            NoteInput::new(70.0, 5.0, 1.0),
        ],
        None,
    );
    let ids: Vec<_> = editor.notes().iter().map(Note::id).collect();
    editor.select_notes(&ids[..2]);
    log.borrow_mut().clear();

    // Drag the second note right by 1s and up by 2 semitones
    editor.pointer_down(250.0, row_y(64), Modifiers::NONE);
    editor.pointer_up(350.0, row_y(66));

    let first = editor.note(ids[0]).unwrap();
    let second = editor.note(ids[1]).unwrap();
    let third = editor.note(ids[2]).unwrap();
    assert_eq!((first.pitch(), second.pitch(), third.pitch()), (62, 66, 70));
    assert_relative_eq!(first.onset(), 1.0);
    assert_relative_eq!(second.onset(), 3.0);
    assert_relative_eq!(third.onset(), 5.0);

    assert_eq!(count(&log, EventKind::NoteDrag), 2);
    assert_eq!(count(&log, EventKind::NotesChange), 1);
    assert_eq!(count(&log, EventKind::SelectionChange), 0);
}

#[test]
fn test_drag_preview_only_on_pitch_change() {
    let preview = RecordingPreview::default();
    let sounds = Rc::clone(&preview.log);
    let (mut editor, _log) = editor_with(preview, options());
    editor.load_notes(&[NoteInput::new(64.0, 1.0, 1.0)], None);
    sounds.borrow_mut().clear();

    editor.pointer_down(150.0, row_y(64), Modifiers::NONE);
    editor.pointer_move(160.0, row_y(64));
    editor.pointer_move(170.0, row_y(65));
    editor.pointer_move(180.0, row_y(65));
    editor.pointer_move(190.0, row_y(66));
    editor.pointer_up(190.0, row_y(66));

    assert_eq!(*sounds.borrow(), vec!["on 65", "off 65", "on 66", "off 66"]);
}

#[test]
fn test_escape_restores_drag() {
    let (mut editor, log) = editor();
    editor.load_notes(&[NoteInput::new(64.0, 1.0, 1.0)], None);
    let id = editor.notes()[0].id();
    log.borrow_mut().clear();

    editor.pointer_down(150.0, row_y(64), Modifiers::NONE);
    editor.pointer_move(450.0, row_y(72));
    assert!(editor.key_down(Key::Escape));

    let note = editor.note(id).unwrap();
    assert_eq!(note.pitch(), 64);
    assert_relative_eq!(note.onset(), 1.0);
    assert_eq!(editor.used_pitches(), &[64]);
    assert!(log.borrow().is_empty());

    // Release after cancel is ignored
    editor.pointer_up(450.0, row_y(72));
    assert_eq!(count(&log, EventKind::NoteDrag), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTION AND DELETE
// ═══════════════════════════════════════════════════════════════════════════════

fn three_notes(editor: &mut Editor) {
    editor.load_notes(
        &[
            NoteInput::new(60.0, 0.5, 0.5),
            NoteInput::new(62.0, 1.0, 0.5),
            NoteInput::new(70.0, 5.0, 1.0),
        ],
        None,
    );
}

#[test]
fn test_box_selects_intersecting_notes() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    log.borrow_mut().clear();

    // From empty space above-left to below-right of A and B, but short of C
    editor.pointer_down(10.0, row_y(64), Modifiers::NONE);
    editor.pointer_move(120.0, 230.0);
    assert!(editor.gesture().selection_box().is_some());
    editor.pointer_up(200.0, 239.0);

    let selected: Vec<u8> = editor.selected_notes().iter().map(Note::pitch).collect();
    assert_eq!(selected, vec![60, 62]);
    assert_eq!(count(&log, EventKind::SelectionChange), 1);
    assert!(editor.gesture().is_idle());
}

#[test]
fn test_box_dragged_up_left() {
    let (mut editor, _log) = editor();
    three_notes(&mut editor);

    editor.pointer_down(650.0, row_y(65), Modifiers::NONE);
    editor.pointer_up(450.0, row_y(75));

    let selected: Vec<u8> = editor.selected_notes().iter().map(Note::pitch).collect();
    assert_eq!(selected, vec![70]);
}

#[test]
fn test_box_without_shift_clears_selection() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    let ids: Vec<_> = editor.notes().iter().map(Note::id).collect();
    editor.select_notes(&ids[2..]);
    log.borrow_mut().clear();

    editor.pointer_down(10.0, row_y(80), Modifiers::NONE);
    editor.pointer_up(20.0, row_y(79));

    assert!(editor.selected_notes().is_empty());
    assert_eq!(
        of_kind(&log, EventKind::SelectionChange),
        vec![EditorEvent::SelectionChange(Vec::new())]
    );

    // Shift keeps what was there
    editor.select_notes(&ids[2..]);
    editor.pointer_down(10.0, row_y(80), Modifiers::SHIFT);
    editor.pointer_up(200.0, 239.0);
    assert_eq!(editor.selected_notes().len(), 3);
}

#[test]
fn test_delete_selected() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    let ids: Vec<_> = editor.notes().iter().map(Note::id).collect();
    editor.select_notes(&ids[..2]);
    log.borrow_mut().clear();

    assert!(editor.key_down(Key::Delete));
    assert_eq!(editor.note_count(), 1);
    assert_eq!(editor.notes()[0].pitch(), 70);
    assert!(editor.selected_notes().is_empty());

    let kinds: Vec<EventKind> = log.borrow().iter().map(EditorEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::NoteDelete,
            EventKind::SelectionChange,
            EventKind::NotesChange
        ]
    );
    assert_eq!(
        of_kind(&log, EventKind::SelectionChange),
        vec![EditorEvent::SelectionChange(Vec::new())]
    );

    // Nothing selected: key is not handled
    assert!(!editor.key_down(Key::Backspace));
}

#[test]
fn test_shift_click_deletes_note() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    let ids: Vec<_> = editor.notes().iter().map(Note::id).collect();
    editor.select_notes(&[ids[0], ids[2]]);
    log.borrow_mut().clear();

    // A spans x 50..100 on pitch 60
    editor.pointer_down(75.0, row_y(60), Modifiers::SHIFT);
    assert!(editor.note(ids[0]).is_none());
    assert!(editor.gesture().is_idle());

    let deleted = of_kind(&log, EventKind::NoteDelete);
    assert_eq!(deleted.len(), 1);
    let selection = of_kind(&log, EventKind::SelectionChange);
    let EditorEvent::SelectionChange(remaining) = &selection[0] else {
        unreachable!();
    };
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), ids[2]);
    assert_eq!(count(&log, EventKind::NotesChange), 1);
}

#[test]
fn test_escape_clears_selection() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    let ids: Vec<_> = editor.notes().iter().map(Note::id).collect();
    editor.select_notes(&ids);
    log.borrow_mut().clear();

    assert!(editor.key_down(Key::Escape));
    assert!(editor.selected_notes().is_empty());
    assert_eq!(count(&log, EventKind::SelectionChange), 1);
    assert!(!editor.key_down(Key::Escape));
}

// ═══════════════════════════════════════════════════════════════════════════════
// CREATE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_double_click_creates_note() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    log.borrow_mut().clear();

    let id = editor.double_click(300.0, row_y(67)).unwrap();
    let note = editor.note(id).unwrap();
    assert_eq!(note.pitch(), 67);
    assert_relative_eq!(note.onset(), 3.0);
    assert_relative_eq!(note.offset(), 3.25);
    assert_relative_eq!(note.velocity, 0.8);
    assert_eq!((note.track, note.channel), (0, 0));

    let kinds: Vec<EventKind> = log.borrow().iter().map(EditorEvent::kind).collect();
    assert_eq!(kinds, vec![EventKind::NoteCreate, EventKind::NotesChange]);

    // Store stays sorted by onset
    let onsets: Vec<f64> = editor.notes().iter().map(Note::onset).collect();
    assert_eq!(onsets, vec![0.5, 1.0, 3.0, 5.0]);
}

#[test]
fn test_double_click_on_note_is_noop() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    log.borrow_mut().clear();

    assert!(editor.double_click(75.0, row_y(60)).is_none());
    assert_eq!(editor.note_count(), 3);
    assert!(log.borrow().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOVER AND PLAYBACK
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_hover_only_on_change() {
    let (mut editor, log) = editor();
    three_notes(&mut editor);
    log.borrow_mut().clear();

    editor.pointer_move(60.0, row_y(60));
    editor.pointer_move(70.0, row_y(60));
    editor.pointer_move(80.0, row_y(60));

    let hovers = of_kind(&log, EventKind::NoteHover);
    assert_eq!(hovers.len(), 1);
    let EditorEvent::NoteHover(Some(note)) = &hovers[0] else {
        panic!("expected hovered note");
    };
    assert_eq!(note.pitch(), 60);

    let tooltip = editor.tooltip();
    assert!(tooltip.visible);
    assert_eq!(tooltip.text, "C4\n0.50s\n500ms");

    editor.pointer_leave();
    assert!(!editor.tooltip().visible);
    assert!(editor.hovered_note().is_none());
    assert_eq!(
        of_kind(&log, EventKind::NoteHover).last(),
        Some(&EditorEvent::NoteHover(None))
    );
}

#[test]
fn test_playback_triggers_active_notes() {
    let preview = RecordingPreview::default();
    let sounds = Rc::clone(&preview.log);
    let (mut editor, _log) = editor_with(preview, options());
    three_notes(&mut editor);
    sounds.borrow_mut().clear();

    editor.handle_host_event(HostEvent::TimeUpdate(0.6)).unwrap();
    editor.handle_host_event(HostEvent::TimeUpdate(0.7)).unwrap();
    editor.handle_host_event(HostEvent::TimeUpdate(1.2)).unwrap();
    assert_eq!(editor.active_notes().len(), 1);
    editor.handle_host_event(HostEvent::Pause).unwrap();

    assert_eq!(*sounds.borrow(), vec!["on 60", "off 60", "on 62", "stop"]);
    assert!(editor.active_notes().is_empty());
}

#[test]
fn test_time_update_during_drag() {
    let preview = RecordingPreview::default();
    let sounds = Rc::clone(&preview.log);
    let (mut editor, _log) = editor_with(preview, options());
    editor.load_notes(
        &[NoteInput::new(60.0, 0.0, 1.0), NoteInput::new(62.0, 2.0, 1.0)],
        None,
    );

    // Drag the first note past the second one and keep holding
    editor.pointer_down(50.0, row_y(60), Modifiers::NONE);
    editor.pointer_move(350.0, row_y(60));
    sounds.borrow_mut().clear();

    editor.handle_host_event(HostEvent::TimeUpdate(2.5)).unwrap();
    assert_eq!(*sounds.borrow(), vec!["on 62"]);
    let pitches: Vec<u8> = editor.active_notes().iter().map(|n| n.pitch()).collect();
    assert_eq!(pitches, vec![62]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPECTROGRAM
// ═══════════════════════════════════════════════════════════════════════════════

const SAMPLE_RATE: f32 = 16000.0;

/// E5 between 1.0s and 2.0s of a 3s clip
fn e5_clip() -> AudioBuffer {
    let len = (3.0 * SAMPLE_RATE) as usize;
    let samples = (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            if (1.0..2.0).contains(&t) {
                (2.0 * PI * 659.26 * t).sin()
            } else {
                0.0
            }
        })
        .collect();
    AudioBuffer::mono(samples, SAMPLE_RATE)
}

fn spectrogram_options(background: bool) -> EditorOptions {
    EditorOptions {
        spectrogram: SpectrogramConfig::new(FftSize::S2048, 0.75),
        show_spectrogram: true,
        snap_to_spectrogram: true,
        background_analysis: background,
        ..options()
    }
}

#[test]
fn test_snap_create_follows_audio() {
    init_logging();
    let mut editor = Editor::new(
        StaticTimeline::new(3.0, 300.0),
        RecordingPreview::default(),
        spectrogram_options(false),
    )
    .unwrap();
    editor.handle_host_event(HostEvent::AudioDecoded(e5_clip())).unwrap();
    assert!(editor.spectrogram().matrix().is_some());

    let id = editor.double_click(150.0, row_y(76)).unwrap();
    let note = editor.note(id).unwrap();
    assert_eq!(note.pitch(), 76);
    assert_relative_eq!(note.onset(), 1.0, epsilon = 0.15);
    assert_relative_eq!(note.offset(), 2.0, epsilon = 0.15);

    // Snap off: plain fixed-length note
    editor.set_snap_mode(false);
    let id = editor.double_click(250.0, row_y(70)).unwrap();
    assert_relative_eq!(editor.note(id).unwrap().duration(), 0.25, epsilon = 1e-9);
}

#[test]
fn test_background_analysis_renders_image() {
    init_logging();
    let mut editor = Editor::new(
        StaticTimeline::new(3.0, 300.0),
        RecordingPreview::default(),
        spectrogram_options(true),
    )
    .unwrap();
    editor.handle_host_event(HostEvent::AudioDecoded(e5_clip())).unwrap();
    assert!(editor.wait_for_analysis());
    assert!(editor.spectrogram().matrix().is_some());

    let frame = editor.render();
    assert!(matches!(frame.commands[0], DrawCommand::Clear(_)));
    assert!(matches!(frame.commands[1], DrawCommand::Image(_)));
    assert!(matches!(frame.commands.last(), Some(DrawCommand::Line { .. })));
    assert!(!editor.needs_redraw());

    editor.set_show_spectrogram(false);
    assert!(editor.needs_redraw());
    let frame = editor.render();
    assert!(!frame.commands.iter().any(|c| matches!(c, DrawCommand::Image(_))));
}

#[test]
fn test_undecodable_audio_keeps_analysis_idle() {
    init_logging();
    let mut editor = Editor::new(
        StaticTimeline::new(3.0, 300.0),
        RecordingPreview::default(),
        spectrogram_options(true),
    )
    .unwrap();
    let broken = AudioBuffer::mono(vec![0.0; 4096], 0.0);
    assert!(editor.handle_host_event(HostEvent::AudioDecoded(broken)).is_err());
    assert!(!editor.wait_for_analysis());
    assert!(editor.spectrogram().matrix().is_none());

    editor.handle_host_event(HostEvent::AudioDecoded(e5_clip())).unwrap();
    assert!(editor.wait_for_analysis());
    assert!(editor.spectrogram().matrix().is_some());
}

#[test]
fn test_invalid_fft_size_rejected() {
    let (mut editor, _log) = editor();
    let before = editor.fft_size();
    assert!(editor.set_fft_size(300).is_err());
    assert_eq!(editor.fft_size(), before);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISPLAY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_fold_hides_unused_rows() {
    let (mut editor, _log) = editor();
    three_notes(&mut editor);
    editor.set_folded(true);

    let params = editor.coordinate_params();
    assert_eq!(params.row_count(), 3);
    assert_relative_eq!(params.row_height(), 80.0);

    let frame = editor.render();
    assert_eq!(frame.notes().count(), 3);

    editor.set_pitch_range(61, 83).unwrap();
    let frame = editor.render();
    assert_eq!(frame.notes().count(), 2);
    assert!(editor.set_pitch_range(90, 80).is_err());
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEARDOWN
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_destroy() {
    let preview = RecordingPreview::default();
    let sounds = Rc::clone(&preview.log);
    let (mut editor, log) = editor_with(preview, options());
    three_notes(&mut editor);
    log.borrow_mut().clear();
    sounds.borrow_mut().clear();

    editor.destroy();
    assert_eq!(*log.borrow(), vec![EditorEvent::Destroy]);
    assert_eq!(*sounds.borrow(), vec!["stop"]);
    assert_eq!(editor.note_count(), 0);
    assert!(editor.is_destroyed());

    // Listeners are gone and host events are refused
    editor.load_notes(&[NoteInput::new(60.0, 0.0, 1.0)], None);
    assert_eq!(log.borrow().len(), 1);
    assert!(matches!(
        editor.handle_host_event(HostEvent::Redraw),
        Err(EditorError::Destroyed)
    ));
}
