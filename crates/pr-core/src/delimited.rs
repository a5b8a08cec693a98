//! Delimited-text note import
//!
//! One record per row with configurable column positions, read with the
//! `csv` crate (RFC 4180 quoting, ragged rows allowed). Rows whose onset or
//! pitch cannot be read are skipped without failing the import.

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::input::{NoteInput, PitchValue};
use crate::pitch::parse_note_name;

/// CSV import options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: char,
    /// Column index of the onset (seconds)
    pub onset_column: usize,
    /// Column index of the pitch (MIDI number, note name or Hz)
    pub pitch_column: usize,
    /// Column index of the duration (seconds); `None` uses the default length
    pub duration_column: Option<usize>,
    /// Treat the first row as a header and skip it
    pub skip_header: bool,
    /// Interpret numeric pitches as Hz; `None` auto-detects
    pub pitch_is_hz: Option<bool>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            onset_column: 0,
            pitch_column: 1,
            duration_column: Some(2),
            skip_header: false,
            pitch_is_hz: None,
        }
    }
}

impl CsvOptions {
    pub fn hz() -> Self {
        Self {
            pitch_is_hz: Some(true),
            ..Default::default()
        }
    }
}

/// Parse delimited text into raw note records
pub fn parse_csv(text: &str, options: &CsvOptions) -> Vec<NoteInput> {
    let delimiter = match u8::try_from(options.delimiter) {
        Ok(byte) if byte.is_ascii() => byte,
        _ => {
            log::warn!("CSV delimiter {:?} is not a single ASCII byte", options.delimiter);
            return Vec::new();
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(options.skip_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut dropped = 0usize;
    let records: Vec<NoteInput> = reader
        .records()
        .filter_map(|row| {
            let record = row.ok().and_then(|row| parse_row(&row, options));
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();

    if dropped > 0 {
        log::debug!("CSV import skipped {} malformed rows", dropped);
    }
    records
}

fn parse_row(row: &StringRecord, options: &CsvOptions) -> Option<NoteInput> {
    let onset = parse_number(row.get(options.onset_column)?)?;

    let pitch_field = row.get(options.pitch_column)?;
    let pitch = match parse_number(pitch_field) {
        Some(v) => PitchValue::Number(v),
        None => {
            parse_note_name(pitch_field)?;
            PitchValue::Name(pitch_field.to_string())
        }
    };

    let duration = match options.duration_column.and_then(|c| row.get(c)) {
        Some(field) if !field.is_empty() => Some(parse_number(field)?),
        _ => None,
    };

    Some(NoteInput {
        pitch: Some(pitch),
        onset: Some(onset),
        duration,
        ..Default::default()
    })
}

fn parse_number(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}
