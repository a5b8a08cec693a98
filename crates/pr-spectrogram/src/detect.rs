//! Note detection from the spectrogram
//!
//! Given a click at (time, pitch), find the nearby spectral peak and
//! follow it backward and forward in time while it stays loud. Used to
//! snap newly created notes to what is actually audible.

use pr_core::{MIN_NOTE_DURATION, clamp_pitch, hz_to_pitch, pitch_to_hz};

use crate::analysis::FrameMatrix;

/// Fraction of a reference magnitude a bin must reach to count as present
pub const SNAP_THRESHOLD: f32 = 0.2;

/// Peak search radius around the clicked pitch, in semitones
pub const SNAP_SEARCH_SEMITONES: f64 = 2.0;

/// Length given to detections shorter than [`MIN_NOTE_DURATION`]
pub const SNAP_FALLBACK_DURATION: f64 = 0.25;

/// A note found in the spectrogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedNote {
    pub pitch: u8,
    pub onset: f64,
    pub offset: f64,
}

impl DetectedNote {
    pub fn duration(&self) -> f64 {
        self.offset - self.onset
    }
}

/// Detect the note under a click.
///
/// `duration` is the total length of the audio in seconds. Returns `None`
/// when there is nothing loud enough at the clicked pitch.
pub fn detect_note(
    matrix: &FrameMatrix,
    time: f64,
    pitch: f64,
    duration: f64,
) -> Option<DetectedNote> {
    let frames = matrix.frame_count();
    if frames == 0 || !(duration > 0.0) || !time.is_finite() || !pitch.is_finite() {
        return None;
    }

    let frame_index =
        ((time / duration * frames as f64).floor().max(0.0) as usize).min(frames - 1);
    let frame = matrix.frame(frame_index)?;

    let clicked_bin = matrix.frequency_to_bin(pitch_to_hz(pitch));
    let frame_max = frame.iter().copied().fold(0.0, f32::max);
    if frame_max <= 0.0 || frame[clicked_bin] < SNAP_THRESHOLD * frame_max {
        return None;
    }

    // Local peak within the search window
    let lo = matrix.frequency_to_bin(pitch_to_hz(pitch - SNAP_SEARCH_SEMITONES));
    let hi = matrix.frequency_to_bin(pitch_to_hz(pitch + SNAP_SEARCH_SEMITONES));
    let peak_bin = (lo..=hi)
        .max_by(|&a, &b| frame[a].total_cmp(&frame[b]))
        .unwrap_or(clicked_bin);
    let peak_pitch = clamp_pitch(hz_to_pitch(matrix.bin_to_frequency(peak_bin)));

    // Follow the peak bin through time
    let threshold = SNAP_THRESHOLD * frame[peak_bin];
    let mut start = frame_index;
    while start > 0 && matrix.magnitude(start, peak_bin) >= threshold {
        start -= 1;
    }
    let mut end = frame_index;
    while end < frames - 1 && matrix.magnitude(end, peak_bin) >= threshold {
        end += 1;
    }

    let seconds_per_frame = duration / frames as f64;
    let onset = start as f64 * seconds_per_frame;
    let mut offset = end as f64 * seconds_per_frame;
    if offset - onset < MIN_NOTE_DURATION {
        offset = (onset + SNAP_FALLBACK_DURATION).min(duration);
    }

    log::debug!(
        "Snap detection: frame {} bin {} → pitch {}, {:.3}s..{:.3}s",
        frame_index,
        peak_bin,
        peak_pitch,
        onset,
        offset
    );

    Some(DetectedNote {
        pitch: peak_pitch,
        onset,
        offset,
    })
}
