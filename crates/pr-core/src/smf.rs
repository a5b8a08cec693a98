//! Standard MIDI File import/export
//!
//! Parsing and writing are done by `midly`; this module maps between SMF
//! events and note records. The tempo map is only read, to convert ticks
//! to seconds.

use std::collections::HashMap;

use midly::num::{u4, u7, u15, u24, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use crate::error::PrResult;
use crate::note::{Note, NoteDraft};

/// Resolution used for exported files
pub const EXPORT_PPQ: u16 = 480;

/// Tempo used for exported files and for files without tempo events
pub const DEFAULT_US_PER_BEAT: u32 = 500_000;

/// Largest delta time a track event can carry (28 bits)
const MAX_DELTA: u64 = 0x0FFF_FFFF;

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPO MAP
// ═══════════════════════════════════════════════════════════════════════════════

/// Tick → seconds conversion
#[derive(Debug, Clone)]
struct TempoMap {
    /// (tick, microseconds per beat), ascending by tick
    changes: Vec<(u64, u32)>,
    ticks_per_beat: f64,
    /// Fixed seconds per tick for timecode files
    timecode_tick: Option<f64>,
}

impl TempoMap {
    fn new(timing: Timing, mut changes: Vec<(u64, u32)>) -> Self {
        changes.sort_by_key(|&(tick, _)| tick);
        match timing {
            Timing::Metrical(ppq) => Self {
                changes,
                ticks_per_beat: ppq.as_int().max(1) as f64,
                timecode_tick: None,
            },
            Timing::Timecode(fps, subframes) => Self {
                changes,
                ticks_per_beat: 1.0,
                timecode_tick: Some(1.0 / (fps.as_f32() as f64 * subframes.max(1) as f64)),
            },
        }
    }

    fn seconds_at(&self, tick: u64) -> f64 {
        if let Some(per_tick) = self.timecode_tick {
            return tick as f64 * per_tick;
        }

        let mut seconds = 0.0;
        let mut last_tick = 0u64;
        let mut us_per_beat = DEFAULT_US_PER_BEAT;
        for &(change_tick, tempo) in &self.changes {
            if change_tick >= tick {
                break;
            }
            seconds += self.span_seconds(change_tick - last_tick, us_per_beat);
            last_tick = change_tick;
            us_per_beat = tempo;
        }
        seconds + self.span_seconds(tick - last_tick, us_per_beat)
    }

    fn span_seconds(&self, ticks: u64, us_per_beat: u32) -> f64 {
        ticks as f64 / self.ticks_per_beat * us_per_beat as f64 / 1_000_000.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse an SMF byte buffer into note drafts
pub fn parse_midi(bytes: &[u8]) -> PrResult<Vec<NoteDraft>> {
    let smf = Smf::parse(bytes)?;

    let tempo_changes: Vec<(u64, u32)> = smf
        .tracks
        .iter()
        .flat_map(|track| {
            let mut tick = 0u64;
            track.iter().filter_map(move |event| {
                tick += event.delta.as_int() as u64;
                match event.kind {
                    TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => Some((tick, tempo.as_int())),
                    _ => None,
                }
            })
        })
        .collect();
    let tempo = TempoMap::new(smf.header.timing, tempo_changes);

    let mut drafts = Vec::new();
    for (track_index, track) in smf.tracks.iter().enumerate() {
        // (channel, key) -> stack of (start tick, velocity)
        let mut open: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();
        let mut tick = 0u64;

        for event in track {
            tick += event.delta.as_int() as u64;
            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            let channel = channel.as_int();
            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    open.entry((channel, key.as_int()))
                        .or_default()
                        .push((tick, vel.as_int()));
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    let started = open
                        .get_mut(&(channel, key.as_int()))
                        .and_then(|stack| (!stack.is_empty()).then(|| stack.remove(0)));
                    if let Some((start, vel)) = started {
                        drafts.push(draft_from_ticks(
                            &tempo, key.as_int(), start, tick, vel, track_index, channel,
                        ));
                    }
                }
                _ => {}
            }
        }

        // Notes still held at the end of the track end there
        for ((channel, key), stack) in open {
            for (start, vel) in stack {
                drafts.push(draft_from_ticks(&tempo, key, start, tick, vel, track_index, channel));
            }
        }
    }

    drafts.sort_by(|a, b| a.onset.total_cmp(&b.onset));
    log::info!(
        "Parsed MIDI file: {} tracks, {} notes",
        smf.tracks.len(),
        drafts.len()
    );
    Ok(drafts)
}

fn draft_from_ticks(
    tempo: &TempoMap,
    key: u8,
    start: u64,
    end: u64,
    velocity: u8,
    track: usize,
    channel: u8,
) -> NoteDraft {
    let onset = tempo.seconds_at(start);
    let offset = tempo.seconds_at(end);
    NoteDraft::new(key, onset, offset - onset)
        .with_velocity(velocity as f32 / 127.0)
        .with_track(track as u32, channel)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════════

fn seconds_to_ticks(seconds: f64) -> u64 {
    let beats = seconds * 1_000_000.0 / DEFAULT_US_PER_BEAT as f64;
    (beats * EXPORT_PPQ as f64).round().max(0.0) as u64
}

/// Write notes as a format-1 SMF, one track per note track.
///
/// Returns `Ok(None)` without producing a file when there are no notes.
pub fn write_midi(notes: &[Note]) -> PrResult<Option<Vec<u8>>> {
    if notes.is_empty() {
        log::warn!("MIDI export skipped: no notes");
        return Ok(None);
    }

    let mut track_ids: Vec<u32> = notes.iter().map(|n| n.track).collect();
    track_ids.sort_unstable();
    track_ids.dedup();

    let mut tracks: Vec<Vec<TrackEvent<'static>>> = Vec::with_capacity(track_ids.len() + 1);

    // Conductor track
    tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(DEFAULT_US_PER_BEAT))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);

    for track_id in track_ids {
        // (tick, is_note_on, channel, key, velocity); offs sort before ons at equal ticks
        let mut events: Vec<(u64, bool, u8, u8, u8)> = Vec::new();
        for note in notes.iter().filter(|n| n.track == track_id) {
            let start = seconds_to_ticks(note.onset());
            let end = seconds_to_ticks(note.offset()).max(start + 1);
            let velocity = (note.velocity * 127.0).round().clamp(1.0, 127.0) as u8;
            events.push((start, true, note.channel, note.pitch(), velocity));
            events.push((end, false, note.channel, note.pitch(), 0));
        }
        events.sort_by_key(|&(tick, on, ..)| (tick, on));

        let mut track = Vec::with_capacity(events.len() + 1);
        let mut last_tick = 0u64;
        for (tick, on, channel, key, velocity) in events {
            let delta = (tick - last_tick).min(MAX_DELTA) as u32;
            last_tick = tick;
            let message = if on {
                MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(velocity),
                }
            } else {
                MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(64),
                }
            };
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: TrackEventKind::Midi {
                    channel: u4::new(channel),
                    message,
                },
            });
        }
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        tracks.push(track);
    }

    let smf = Smf {
        header: Header::new(Format::Parallel, Timing::Metrical(u15::new(EXPORT_PPQ))),
        tracks,
    };
    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)?;
    log::info!("Exported MIDI file: {} notes, {} bytes", notes.len(), bytes.len());
    Ok(Some(bytes))
}
