//! Normalization of heterogeneous note input
//!
//! Records may come from JSON, CSV or user code and disagree on units:
//! - pitch as MIDI number, note name (`"C#4"`) or frequency in Hz
//! - velocity as 0-1 or 0-127
//! - length as `duration`, as `offset`, or not at all
//!
//! [`normalize`] turns them into [`NoteDraft`]s ready for the store.

use serde::{Deserialize, Serialize};

use crate::error::PrResult;
use crate::note::{DEFAULT_INPUT_DURATION, DEFAULT_VELOCITY, NoteDraft};
use crate::pitch::{MAX_PITCH, clamp_pitch, hz_to_pitch, parse_note_name};

/// Pitch as it appears in input data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PitchValue {
    Number(f64),
    Name(String),
}

impl From<f64> for PitchValue {
    fn from(value: f64) -> Self {
        PitchValue::Number(value)
    }
}

impl From<&str> for PitchValue {
    fn from(value: &str) -> Self {
        PitchValue::Name(value.to_string())
    }
}

impl PitchValue {
    /// Numeric value, if this is a number or a numeric string
    fn numeric(&self) -> Option<f64> {
        match self {
            PitchValue::Number(v) => Some(*v),
            PitchValue::Name(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
    }
}

/// One raw note record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteInput {
    #[serde(alias = "note", alias = "midi")]
    pub pitch: Option<PitchValue>,
    #[serde(alias = "start", alias = "time")]
    pub onset: Option<f64>,
    #[serde(alias = "end")]
    pub offset: Option<f64>,
    pub duration: Option<f64>,
    pub velocity: Option<f64>,
    pub track: Option<u32>,
    pub channel: Option<u8>,
    pub color: Option<String>,
}

impl NoteInput {
    /// Minimal record: pitch, onset and duration
    pub fn new(pitch: impl Into<PitchValue>, onset: f64, duration: f64) -> Self {
        Self {
            pitch: Some(pitch.into()),
            onset: Some(onset),
            duration: Some(duration),
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }
}

/// Parse a JSON array of note records
pub fn parse_json(text: &str) -> PrResult<Vec<NoteInput>> {
    Ok(serde_json::from_str(text)?)
}

/// True if any numeric pitch is outside the MIDI range, which only makes
/// sense for frequencies.
pub fn looks_like_hz(inputs: &[NoteInput]) -> bool {
    inputs
        .iter()
        .filter_map(|n| n.pitch.as_ref().and_then(PitchValue::numeric))
        .any(|v| v > MAX_PITCH as f64)
}

/// Normalize raw records. `pitch_is_hz = None` auto-detects frequencies.
///
/// Records without a usable pitch or onset are dropped.
pub fn normalize(inputs: &[NoteInput], pitch_is_hz: Option<bool>) -> Vec<NoteDraft> {
    let hz = pitch_is_hz.unwrap_or_else(|| looks_like_hz(inputs));
    if hz && pitch_is_hz.is_none() {
        log::debug!("Pitch values exceed MIDI range, treating them as Hz");
    }

    inputs
        .iter()
        .filter_map(|input| {
            let draft = normalize_one(input, hz);
            if draft.is_none() {
                log::debug!("Dropping unusable note record: {:?}", input);
            }
            draft
        })
        .collect()
}

fn normalize_one(input: &NoteInput, hz: bool) -> Option<NoteDraft> {
    let pitch = resolve_pitch(input.pitch.as_ref()?, hz)?;

    let onset = input.onset.filter(|v| v.is_finite())?.max(0.0);

    let duration = input
        .duration
        .or_else(|| input.offset.map(|off| off - onset))
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(DEFAULT_INPUT_DURATION);

    let velocity = match input.velocity.filter(|v| v.is_finite()) {
        Some(v) if v > 1.0 => (v / 127.0) as f32,
        Some(v) => v as f32,
        None => DEFAULT_VELOCITY,
    };

    Some(NoteDraft {
        pitch,
        onset,
        duration,
        velocity: velocity.clamp(0.0, 1.0),
        track: input.track.unwrap_or(0),
        channel: input.channel.unwrap_or(0).min(15),
        color: input.color.clone(),
    })
}

fn resolve_pitch(value: &PitchValue, hz: bool) -> Option<u8> {
    match value.numeric() {
        Some(freq) if hz => (freq > 0.0).then(|| clamp_pitch(hz_to_pitch(freq))),
        Some(midi) => Some(clamp_pitch(midi)),
        None => match value {
            PitchValue::Name(name) => parse_note_name(name),
            PitchValue::Number(_) => None,
        },
    }
}
