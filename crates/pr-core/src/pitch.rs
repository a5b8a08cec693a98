//! Pitch naming and conversion
//!
//! MIDI note numbers are the canonical pitch representation. This module
//! converts between note numbers, canonical names (`C#4`, `A4` = 69) and
//! frequencies in Hz (A4 = 440 Hz, equal temperament).

use std::sync::LazyLock;

use regex::Regex;

// ═══════════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Lowest valid MIDI pitch
pub const MIN_PITCH: u8 = 0;

/// Highest valid MIDI pitch
pub const MAX_PITCH: u8 = 127;

/// Concert pitch reference
pub const A4_HZ: f64 = 440.0;

/// MIDI number of A4
pub const A4_PITCH: f64 = 69.0;

static NOTE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-G])(#|b)?(-?\d+)$").expect("static regex"));

// ═══════════════════════════════════════════════════════════════════════════════
// NOTE NAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Pitch class of a MIDI note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteName {
    C, Cs, D, Ds, E, F, Fs, G, Gs, A, As, B,
}

impl NoteName {
    const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::Cs,
        NoteName::D,
        NoteName::Ds,
        NoteName::E,
        NoteName::F,
        NoteName::Fs,
        NoteName::G,
        NoteName::Gs,
        NoteName::A,
        NoteName::As,
        NoteName::B,
    ];

    /// Split a MIDI note into pitch class and octave (C4 = 60)
    pub fn from_pitch(pitch: u8) -> (Self, i8) {
        let octave = (pitch / 12) as i8 - 1;
        (Self::ALL[(pitch % 12) as usize], octave)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::Cs => "C#",
            NoteName::D => "D",
            NoteName::Ds => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::Fs => "F#",
            NoteName::G => "G",
            NoteName::Gs => "G#",
            NoteName::A => "A",
            NoteName::As => "A#",
            NoteName::B => "B",
        }
    }

    /// Semitone offset of a natural letter
    fn natural_offset(letter: &str) -> Option<i32> {
        Some(match letter {
            "C" => 0,
            "D" => 2,
            "E" => 4,
            "F" => 5,
            "G" => 7,
            "A" => 9,
            "B" => 11,
            _ => return None,
        })
    }
}

/// Canonical display name for a pitch, e.g. `C#4`
pub fn note_name(pitch: u8) -> String {
    let (name, octave) = NoteName::from_pitch(pitch.min(MAX_PITCH));
    format!("{}{}", name.name(), octave)
}

/// Parse a note name such as `A4`, `C#-1` or `Bb3`.
///
/// Accidentals may cross the octave boundary (`Cb4` = 59, `B#3` = 60).
/// Results outside the MIDI range are clamped.
pub fn parse_note_name(text: &str) -> Option<u8> {
    let caps = NOTE_NAME_RE.captures(text.trim())?;
    let base = NoteName::natural_offset(caps.get(1)?.as_str())?;
    let accidental = match caps.get(2).map(|m| m.as_str()) {
        Some("#") => 1,
        Some("b") => -1,
        _ => 0,
    };
    let octave: i32 = caps.get(3)?.as_str().parse().ok()?;
    let pitch = (octave + 1) * 12 + base + accidental;
    Some(clamp_pitch(pitch as f64))
}

/// Is this pitch a black key?
pub fn is_black_key(pitch: u8) -> bool {
    matches!(pitch % 12, 1 | 3 | 6 | 8 | 10)
}

// ═══════════════════════════════════════════════════════════════════════════════
// FREQUENCY CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Continuous MIDI pitch to frequency
#[inline]
pub fn pitch_to_hz(pitch: f64) -> f64 {
    A4_HZ * 2.0_f64.powf((pitch - A4_PITCH) / 12.0)
}

/// Frequency to continuous MIDI pitch (non-positive input maps to -inf)
#[inline]
pub fn hz_to_pitch(freq: f64) -> f64 {
    if freq <= 0.0 {
        return f64::NEG_INFINITY;
    }
    A4_PITCH + 12.0 * (freq / A4_HZ).log2()
}

/// Round and clamp a continuous pitch into the MIDI range
#[inline]
pub fn clamp_pitch(pitch: f64) -> u8 {
    if pitch.is_nan() {
        return MIN_PITCH;
    }
    pitch.round().clamp(MIN_PITCH as f64, MAX_PITCH as f64) as u8
}
